use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// How quickly the host answers inquiries, bucketed the way host
/// profile pages report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseTime {
    WithinHour,
    WithinDay,
    WithinTwoDays,
    Slower,
}

/// The six guest-review sub-categories. A listing with no sub-category
/// data leaves all six at 0.0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SubRatings {
    pub cleanliness: f64,
    pub accuracy: f64,
    pub check_in: f64,
    pub communication: f64,
    pub location: f64,
    pub value: f64,
}

impl SubRatings {
    /// Field name / value pairs, in a fixed order.
    pub fn as_named(&self) -> [(&'static str, f64); 6] {
        [
            ("cleanliness", self.cleanliness),
            ("accuracy", self.accuracy),
            ("check_in", self.check_in),
            ("communication", self.communication),
            ("location", self.location),
            ("value", self.value),
        ]
    }

    pub fn all_zero(&self) -> bool {
        self.as_named().iter().all(|(_, v)| *v == 0.0)
    }
}

/// Raw listing attributes, as supplied by an external fetcher.
///
/// Immutable per scoring call. `review_count` is the number of reviews
/// within the 4-year Guest Favorites lookback window; supplying the
/// windowed count is the fetcher's contract.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListingData {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub photo_count: u32,
    /// Canonical photo variety tags (interior, exterior, bedroom, ...).
    #[serde(default)]
    pub photo_categories: Vec<String>,
    pub price_per_night: f64,
    /// Canonical amenity identifiers, matched case-insensitively.
    #[serde(default)]
    pub amenities: Vec<String>,
    pub rating: f64,
    pub review_count: u32,
    #[serde(default)]
    pub last_review_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub sub_ratings: SubRatings,
    #[serde(default)]
    pub superhost: bool,
    #[serde(default)]
    pub instant_book: bool,
    /// Percentage, 0-100.
    pub response_rate: f64,
    pub response_time: ResponseTime,
    /// Fraction, 0.0-1.0.
    pub cancellation_rate: f64,
    /// Fraction of upcoming nights open for booking, 0.0-1.0.
    pub open_nights_ratio: f64,
}

impl ListingData {
    /// Age of the most recent review relative to the injected reference
    /// time. The engine never reads the system clock.
    pub fn review_age(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.last_review_at.map(|at| now - at)
    }

    pub fn title_chars(&self) -> usize {
        self.title.chars().count()
    }

    pub fn description_chars(&self) -> usize {
        self.description.chars().count()
    }

    pub fn has_amenity(&self, canonical: &str) -> bool {
        self.amenities.iter().any(|a| a.eq_ignore_ascii_case(canonical))
    }
}

/// Externally supplied market data. The engine never computes this; a
/// market data provider (out of scope) does.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MarketSnapshot {
    pub avg_price_per_night: f64,
    /// Overall scores of nearby competitors, for percentile ranking.
    #[serde(default)]
    pub competitor_scores: Vec<u32>,
}
