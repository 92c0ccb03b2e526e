use serde::{Deserialize, Serialize};
use std::fmt;

/// A ranking factor. Which categories run, and in what order, is set by
/// the active engine config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Reviews,
    Response,
    Pricing,
    Conversion,
    InstantBook,
    Cancellation,
    ListingQuality,
    Availability,
    Title,
    Description,
    Photos,
    Amenities,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Reviews => "Reviews",
            Category::Response => "Response",
            Category::Pricing => "Pricing",
            Category::Conversion => "Conversion",
            Category::InstantBook => "Instant Book",
            Category::Cancellation => "Cancellation",
            Category::ListingQuality => "Listing Quality",
            Category::Availability => "Availability",
            Category::Title => "Title",
            Category::Description => "Description",
            Category::Photos => "Photos",
            Category::Amenities => "Amenities",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryScore {
    pub category: Category,
    /// 0-100.
    pub score: u32,
    /// Fraction of the overall score this category carries.
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedBonus {
    pub name: String,
    pub points: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BadgeFlags {
    pub superhost: bool,
    pub instant_book: bool,
    pub guest_favorites_eligible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MarketComparison {
    /// Share of competitors this listing outscores, 0-100.
    pub percentile: u32,
    pub competitor_avg_score: u32,
    pub competitors_analyzed: usize,
}

/// Complete grading output. Immutable once produced; repeated calls with
/// identical input (including the reference time) are byte-identical.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeResult {
    pub listing_id: String,
    pub overall_score: u32,
    pub grade: String,
    /// One entry per active category, in config order.
    pub category_scores: Vec<CategoryScore>,
    pub bonuses: Vec<AppliedBonus>,
    pub badges: BadgeFlags,
    pub recommendations: Vec<String>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market: Option<MarketComparison>,
}

impl GradeResult {
    pub fn bonus_total(&self) -> u32 {
        self.bonuses.iter().map(|b| b.points).sum()
    }

    pub fn category(&self, category: Category) -> Option<&CategoryScore> {
        self.category_scores.iter().find(|c| c.category == category)
    }
}
