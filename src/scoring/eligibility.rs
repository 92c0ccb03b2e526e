use chrono::{DateTime, Utc};
use std::fmt;

use super::config::EligibilityRules;
use crate::listing::ListingData;

/// A specific reason a listing misses the Guest Favorites badge.
#[derive(Debug, Clone, PartialEq)]
pub enum EligibilityFailure {
    RatingBelowMinimum {
        rating: f64,
        minimum: f64,
    },
    NotEnoughReviews {
        count: u32,
        minimum: u32,
        window_days: i64,
    },
    NoRecentReview {
        days_since: Option<i64>,
        window_days: i64,
    },
    CancellationRateTooHigh {
        rate: f64,
        maximum: f64,
    },
    SubRatingBelowBar {
        name: &'static str,
        rating: f64,
        bar: f64,
    },
}

impl fmt::Display for EligibilityFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EligibilityFailure::RatingBelowMinimum { rating, minimum } => {
                write!(f, "overall rating {:.2} is below the {:.1} minimum", rating, minimum)
            }
            EligibilityFailure::NotEnoughReviews {
                count,
                minimum,
                window_days,
            } => write!(
                f,
                "{} reviews in the last {} days, {} required",
                count, window_days, minimum
            ),
            EligibilityFailure::NoRecentReview {
                days_since,
                window_days,
            } => match days_since {
                Some(days) => write!(
                    f,
                    "most recent review is {} days old, must be within {}",
                    days, window_days
                ),
                None => write!(f, "no review within the last {} days", window_days),
            },
            EligibilityFailure::CancellationRateTooHigh { rate, maximum } => write!(
                f,
                "cancellation rate {:.1}% is at or above the {:.1}% limit",
                rate * 100.0,
                maximum * 100.0
            ),
            EligibilityFailure::SubRatingBelowBar { name, rating, bar } => {
                write!(f, "{} rating {:.2} is below the {:.1} bar", name, rating, bar)
            }
        }
    }
}

/// Evaluate all Guest Favorites criteria. Returns every failed
/// criterion, not just the first; an empty vec means eligible.
///
/// A listing with any cancellation history at or above the limit is
/// never eligible, regardless of how strong everything else is.
pub fn check_guest_favorites(
    listing: &ListingData,
    rules: &EligibilityRules,
    now: DateTime<Utc>,
) -> Vec<EligibilityFailure> {
    let mut failures = Vec::new();

    if listing.rating < rules.min_rating {
        failures.push(EligibilityFailure::RatingBelowMinimum {
            rating: listing.rating,
            minimum: rules.min_rating,
        });
    }

    if listing.review_count < rules.min_reviews {
        failures.push(EligibilityFailure::NotEnoughReviews {
            count: listing.review_count,
            minimum: rules.min_reviews,
            window_days: rules.lookback_days,
        });
    }

    let days_since = listing.review_age(now).map(|a| a.num_days());
    match days_since {
        Some(days) if days <= rules.recency_days => {}
        _ => failures.push(EligibilityFailure::NoRecentReview {
            days_since,
            window_days: rules.recency_days,
        }),
    }

    if listing.cancellation_rate >= rules.max_cancellation_rate {
        failures.push(EligibilityFailure::CancellationRateTooHigh {
            rate: listing.cancellation_rate,
            maximum: rules.max_cancellation_rate,
        });
    }

    for (name, rating) in listing.sub_ratings.as_named() {
        if rating < rules.sub_rating_bar {
            failures.push(EligibilityFailure::SubRatingBelowBar {
                name,
                rating,
                bar: rules.sub_rating_bar,
            });
        }
    }

    failures
}
