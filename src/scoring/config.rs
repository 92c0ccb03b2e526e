use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use super::result::Category;

/// Which published ranking model the engine follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringVersion {
    /// Original 6-factor content-oriented profile.
    Legacy,
    /// Current 8-factor profile aligned with the platform's ranking signals.
    Aligned,
}

pub const SUPERHOST_BONUS: u32 = 5;
pub const INSTANT_BOOK_BONUS: u32 = 3;
pub const GUEST_FAVORITES_BONUS: u32 = 8;

/// Categories at or above this are reported as strengths.
pub const STRONG_CATEGORY_THRESHOLD: u32 = 80;
/// Categories below this are reported as weaknesses.
pub const WEAK_CATEGORY_THRESHOLD: u32 = 60;

pub const MAX_RECOMMENDATIONS: usize = 10;
pub const WEIGHT_SUM_EPSILON: f64 = 1e-6;

/// Main engine configuration.
///
/// Selecting a scoring version is explicit: the weight table decides
/// which category scorers run and in what order, and the grade bands
/// and eligibility rules travel with it. No global state.
///
/// Example YAML override:
/// ```yaml
/// version: aligned
/// weights:
///   - { category: reviews, weight: 0.30 }
///   - { category: response, weight: 0.20 }
///   - { category: pricing, weight: 0.20 }
///   - { category: instant_book, weight: 0.10 }
///   - { category: cancellation, weight: 0.10 }
///   - { category: availability, weight: 0.10 }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    pub version: ScoringVersion,
    /// Active categories with their weights; must sum to 1.0.
    pub weights: Vec<CategoryWeight>,
    /// Sorted by `min` descending; the last band must start at 0.
    #[serde(default = "default_grade_bands")]
    pub grade_bands: Vec<GradeBand>,
    #[serde(default)]
    pub bonuses: BonusPoints,
    #[serde(default)]
    pub eligibility: EligibilityRules,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryWeight {
    pub category: Category,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GradeBand {
    pub min: u32,
    pub letter: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct BonusPoints {
    pub superhost: u32,
    pub instant_book: u32,
    pub guest_favorites: u32,
}

impl Default for BonusPoints {
    fn default() -> Self {
        Self {
            superhost: SUPERHOST_BONUS,
            instant_book: INSTANT_BOOK_BONUS,
            guest_favorites: GUEST_FAVORITES_BONUS,
        }
    }
}

/// Guest Favorites badge criteria. All conditions are AND-combined.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct EligibilityRules {
    pub min_rating: f64,
    /// Minimum reviews within the lookback window.
    pub min_reviews: u32,
    /// Window the fetcher counts reviews over (4 years).
    pub lookback_days: i64,
    /// The most recent review must fall within this many days.
    pub recency_days: i64,
    /// Exclusive upper bound; a rate at or above this disqualifies.
    pub max_cancellation_rate: f64,
    /// Every sub-category rating must be at least this.
    pub sub_rating_bar: f64,
}

impl Default for EligibilityRules {
    fn default() -> Self {
        Self {
            min_rating: 4.9,
            min_reviews: 5,
            lookback_days: 1461,
            recency_days: 730,
            max_cancellation_rate: 0.01,
            sub_rating_bar: 4.8,
        }
    }
}

impl EngineConfig {
    pub fn for_version(version: ScoringVersion) -> Self {
        match version {
            ScoringVersion::Legacy => Self::legacy(),
            ScoringVersion::Aligned => Self::aligned(),
        }
    }

    /// The original 6-factor content profile.
    pub fn legacy() -> Self {
        Self {
            version: ScoringVersion::Legacy,
            weights: weight_table(&[
                (Category::Title, 0.15),
                (Category::Description, 0.15),
                (Category::Photos, 0.20),
                (Category::Pricing, 0.15),
                (Category::Amenities, 0.15),
                (Category::Reviews, 0.20),
            ]),
            grade_bands: default_grade_bands(),
            bonuses: BonusPoints::default(),
            eligibility: EligibilityRules::default(),
        }
    }

    /// The 8-factor profile aligned with the platform's ranking signals.
    pub fn aligned() -> Self {
        Self {
            version: ScoringVersion::Aligned,
            weights: weight_table(&[
                (Category::Reviews, 0.25),
                (Category::Response, 0.15),
                (Category::Pricing, 0.15),
                (Category::Conversion, 0.12),
                (Category::InstantBook, 0.10),
                (Category::Cancellation, 0.08),
                (Category::ListingQuality, 0.08),
                (Category::Availability, 0.07),
            ]),
            grade_bands: default_grade_bands(),
            bonuses: BonusPoints::default(),
            eligibility: EligibilityRules::default(),
        }
    }

    /// Letter grade for an overall score. Bands are validated to be
    /// contiguous down to 0, so every score maps to exactly one letter.
    pub fn grade_for(&self, score: u32) -> &str {
        self.grade_bands
            .iter()
            .find(|b| score >= b.min)
            .map(|b| b.letter.as_str())
            .unwrap_or("F")
    }
}

fn weight_table(entries: &[(Category, f64)]) -> Vec<CategoryWeight> {
    entries
        .iter()
        .map(|(category, weight)| CategoryWeight {
            category: *category,
            weight: *weight,
        })
        .collect()
}

fn default_grade_bands() -> Vec<GradeBand> {
    [
        (95, "A+"),
        (90, "A"),
        (85, "A-"),
        (80, "B+"),
        (75, "B"),
        (70, "B-"),
        (65, "C+"),
        (60, "C"),
        (55, "C-"),
        (50, "D+"),
        (45, "D"),
        (40, "D-"),
        (0, "F"),
    ]
    .iter()
    .map(|(min, letter)| GradeBand {
        min: *min,
        letter: (*letter).to_string(),
    })
    .collect()
}

/// Default config file location (~/.config/listing-grader/config.yaml).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| {
        home.join(".config")
            .join("listing-grader")
            .join("config.yaml")
    })
}

/// Load the engine config.
///
/// An explicitly given `path` must exist. Without one, the default
/// config file is used when present, otherwise the built-in profile
/// for `fallback`.
pub fn load_config(path: Option<PathBuf>, fallback: ScoringVersion) -> Result<EngineConfig> {
    let explicit = path.is_some();
    let config_path = match path.or_else(default_config_path) {
        Some(p) => p,
        None => return Ok(EngineConfig::for_version(fallback)),
    };

    if !config_path.exists() {
        if explicit {
            bail!("Config file not found at {}", config_path.display());
        }
        return Ok(EngineConfig::for_version(fallback));
    }

    let raw = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;
    let config: EngineConfig = serde_saphyr::from_str(&raw).with_context(|| {
        format!(
            "Failed to parse config: invalid YAML in {}",
            config_path.display()
        )
    })?;
    Ok(config)
}
