use anyhow::{bail, Result};
use chrono::{DateTime, Utc};

use super::config::{EngineConfig, ScoringVersion, STRONG_CATEGORY_THRESHOLD, WEAK_CATEGORY_THRESHOLD};
use super::eligibility::check_guest_favorites;
use super::factors;
use super::market;
use super::recommend::{self, RuleContext};
use super::result::{AppliedBonus, BadgeFlags, Category, CategoryScore, GradeResult};
use super::validation::{validate_config, validate_listing};
use crate::listing::{ListingData, MarketSnapshot};

/// Grade one listing.
///
/// The reference time is injected; the engine never reads the clock,
/// so identical inputs always produce identical output. The weighted
/// category sum is rounded once, bonuses are added on top, and the
/// total is clamped to 100.
pub fn grade_listing(
    listing: &ListingData,
    config: &EngineConfig,
    market_snapshot: Option<&MarketSnapshot>,
    now: DateTime<Utc>,
) -> Result<GradeResult> {
    if let Err(errors) = validate_config(config) {
        bail!("Invalid configuration:\n  {}", errors.join("\n  "));
    }
    if let Err(errors) = validate_listing(listing, now) {
        bail!(
            "Invalid listing data for '{}':\n  {}",
            listing.id,
            errors.join("\n  ")
        );
    }

    let category_scores: Vec<CategoryScore> = config
        .weights
        .iter()
        .map(|w| CategoryScore {
            category: w.category,
            score: score_category(w.category, listing, config.version, market_snapshot, now),
            weight: w.weight,
        })
        .collect();

    let weighted: f64 = category_scores
        .iter()
        .map(|c| c.score as f64 * c.weight)
        .sum();
    let base = weighted.round() as u32;

    let failures = check_guest_favorites(listing, &config.eligibility, now);
    let eligible = failures.is_empty();

    let mut bonuses = Vec::new();
    if listing.superhost {
        bonuses.push(AppliedBonus {
            name: "superhost".to_string(),
            points: config.bonuses.superhost,
        });
    }
    if listing.instant_book {
        bonuses.push(AppliedBonus {
            name: "instant_book".to_string(),
            points: config.bonuses.instant_book,
        });
    }
    if eligible {
        bonuses.push(AppliedBonus {
            name: "guest_favorites".to_string(),
            points: config.bonuses.guest_favorites,
        });
    }
    let bonus_total: u32 = bonuses.iter().map(|b| b.points).sum();
    let overall = (base + bonus_total).min(100);

    let recommendations = recommend::generate(&RuleContext {
        listing,
        scores: &category_scores,
        market: market_snapshot,
        failures: &failures,
        now,
    });

    Ok(GradeResult {
        listing_id: listing.id.clone(),
        grade: config.grade_for(overall).to_string(),
        overall_score: overall,
        strengths: collect_strengths(listing, &category_scores),
        weaknesses: collect_weaknesses(&category_scores),
        category_scores,
        bonuses,
        badges: BadgeFlags {
            superhost: listing.superhost,
            instant_book: listing.instant_book,
            guest_favorites_eligible: eligible,
        },
        recommendations,
        market: market_snapshot.and_then(|s| market::compare(overall, s)),
    })
}

fn score_category(
    category: Category,
    listing: &ListingData,
    version: ScoringVersion,
    market_snapshot: Option<&MarketSnapshot>,
    now: DateTime<Utc>,
) -> u32 {
    match category {
        Category::Reviews => match version {
            ScoringVersion::Legacy => factors::score_reviews_v1(listing, now),
            ScoringVersion::Aligned => factors::score_reviews_v2(listing, now),
        },
        Category::Response => factors::score_response(listing),
        Category::Pricing => factors::score_pricing(listing, market_snapshot),
        Category::Conversion => factors::score_conversion(listing),
        Category::InstantBook => factors::score_instant_book(listing),
        Category::Cancellation => factors::score_cancellation(listing),
        Category::ListingQuality => factors::score_listing_quality(listing),
        Category::Availability => factors::score_availability(listing),
        Category::Title => factors::score_title(listing),
        Category::Description => factors::score_description(listing),
        Category::Photos => factors::score_photos(listing),
        Category::Amenities => factors::score_amenities(listing),
    }
}

fn collect_strengths(listing: &ListingData, scores: &[CategoryScore]) -> Vec<String> {
    let mut strengths: Vec<String> = scores
        .iter()
        .filter(|c| c.score >= STRONG_CATEGORY_THRESHOLD)
        .map(|c| strength_note(c.category, listing))
        .collect();

    // Attribute-level notes for signals the active profile has no
    // category for.
    let has_photos_category = scores.iter().any(|c| c.category == Category::Photos);
    if listing.photo_count >= 15 && !has_photos_category {
        strengths.push(format!("Good photo coverage ({} photos)", listing.photo_count));
    }
    if listing.superhost {
        strengths.push("Superhost status".to_string());
    }
    strengths
}

fn collect_weaknesses(scores: &[CategoryScore]) -> Vec<String> {
    scores
        .iter()
        .filter(|c| c.score < WEAK_CATEGORY_THRESHOLD)
        .map(|c| weakness_note(c.category))
        .collect()
}

fn strength_note(category: Category, listing: &ListingData) -> String {
    match category {
        Category::Reviews => format!(
            "Strong reviews ({:.2}\u{2605} across {} reviews)",
            listing.rating, listing.review_count
        ),
        Category::Response => "Fast, reliable host responses".to_string(),
        Category::Pricing => "Well positioned on price".to_string(),
        Category::Conversion => "Listing page converts lookers into bookers".to_string(),
        Category::InstantBook => "Instant Book enabled".to_string(),
        Category::Cancellation => "Clean cancellation record".to_string(),
        Category::ListingQuality => "Thorough, complete listing content".to_string(),
        Category::Availability => "Calendar wide open for bookings".to_string(),
        Category::Title => "Title reads well in search".to_string(),
        Category::Description => "Detailed, informative description".to_string(),
        Category::Photos => format!("Good photo coverage ({} photos)", listing.photo_count),
        Category::Amenities => "Well equipped with amenities".to_string(),
    }
}

fn weakness_note(category: Category) -> String {
    match category {
        Category::Reviews => "Reviews are holding the listing back".to_string(),
        Category::Response => "Host responsiveness lags behind".to_string(),
        Category::Pricing => "Price is out of step with the market".to_string(),
        Category::Conversion => "Listing page loses potential bookers".to_string(),
        Category::InstantBook => "No Instant Book".to_string(),
        Category::Cancellation => "Cancellation history is hurting rank".to_string(),
        Category::ListingQuality => "Listing content is thin".to_string(),
        Category::Availability => "Calendar is mostly blocked".to_string(),
        Category::Title => "Title underperforms in search".to_string(),
        Category::Description => "Description is too sparse".to_string(),
        Category::Photos => "Not enough photos".to_string(),
        Category::Amenities => "Amenity list is thin".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::{ResponseTime, SubRatings};
    use chrono::Duration;

    fn showcase_listing(now: DateTime<Utc>) -> ListingData {
        ListingData {
            id: "12345678".to_string(),
            title: "Bright loft with balcony".to_string(),
            description:
                "Tall windows, oak floors, and a quiet mezzanine bedroom make this loft an easy base for a city break. "
                    .repeat(3),
            photo_count: 18,
            photo_categories: vec![],
            price_per_night: 150.0,
            amenities: vec![
                "wifi".to_string(),
                "kitchen".to_string(),
                "heating".to_string(),
                "tv".to_string(),
            ],
            rating: 4.92,
            review_count: 87,
            last_review_at: Some(now - Duration::days(300)),
            sub_ratings: SubRatings {
                cleanliness: 4.9,
                accuracy: 4.9,
                check_in: 4.8,
                communication: 4.8,
                location: 4.9,
                value: 4.7,
            },
            superhost: true,
            instant_book: true,
            response_rate: 95.0,
            response_time: ResponseTime::WithinHour,
            cancellation_rate: 0.005,
            open_nights_ratio: 0.05,
        }
    }

    #[test]
    fn test_showcase_listing_grades_a_minus() {
        let now = Utc::now();
        let listing = showcase_listing(now);
        let result = grade_listing(&listing, &EngineConfig::aligned(), None, now).unwrap();

        assert_eq!(result.overall_score, 87);
        assert_eq!(result.grade, "A-");
        assert!(result
            .strengths
            .iter()
            .any(|s| s == "Strong reviews (4.92\u{2605} across 87 reviews)"));
        assert!(result
            .strengths
            .iter()
            .any(|s| s == "Good photo coverage (18 photos)"));
        assert!(!result.recommendations.is_empty());
        assert!(!result
            .recommendations
            .iter()
            .any(|r| r.contains("severely")));
    }

    #[test]
    fn test_showcase_category_breakdown() {
        let now = Utc::now();
        let listing = showcase_listing(now);
        let result = grade_listing(&listing, &EngineConfig::aligned(), None, now).unwrap();

        for (category, expected) in [
            (Category::Reviews, 90),
            (Category::Response, 100),
            (Category::Pricing, 70),
            (Category::Conversion, 65),
            (Category::InstantBook, 100),
            (Category::Cancellation, 100),
            (Category::ListingQuality, 59),
            (Category::Availability, 10),
        ] {
            assert_eq!(
                result.category(category).unwrap().score,
                expected,
                "{} score",
                category
            );
        }
        // Bonuses on top of the weighted base: superhost and instant
        // book apply, value 4.7 blocks Guest Favorites.
        assert_eq!(result.bonus_total(), 8);
        assert!(!result.badges.guest_favorites_eligible);
    }

    #[test]
    fn test_weighted_sum_matches_breakdown() {
        let now = Utc::now();
        let listing = showcase_listing(now);
        let result = grade_listing(&listing, &EngineConfig::aligned(), None, now).unwrap();

        let weighted: f64 = result
            .category_scores
            .iter()
            .map(|c| c.score as f64 * c.weight)
            .sum();
        assert_eq!(
            result.overall_score,
            (weighted.round() as u32 + result.bonus_total()).min(100)
        );
    }

    #[test]
    fn test_guest_favorites_bonus_applies() {
        let now = Utc::now();
        let mut listing = showcase_listing(now);
        listing.rating = 4.95;
        listing.review_count = 6;
        listing.last_review_at = Some(now - Duration::days(365));
        listing.cancellation_rate = 0.003;
        listing.sub_ratings = SubRatings {
            cleanliness: 4.9,
            accuracy: 4.9,
            check_in: 4.9,
            communication: 4.9,
            location: 4.9,
            value: 4.9,
        };
        let result = grade_listing(&listing, &EngineConfig::aligned(), None, now).unwrap();
        assert!(result.badges.guest_favorites_eligible);
        assert!(result
            .bonuses
            .iter()
            .any(|b| b.name == "guest_favorites" && b.points == 8));
        assert_eq!(result.bonus_total(), 16);
    }

    #[test]
    fn test_overall_clamped_at_100() {
        let now = Utc::now();
        let mut listing = showcase_listing(now);
        listing.title = "Sunny two-bedroom flat with harbour views".to_string();
        listing.description = format!(
            "{} House rules posted inside. Self check-in via lockbox. Walk to the market nearby.",
            "Tall windows and oak floors throughout the flat. ".repeat(25)
        );
        listing.photo_count = 30;
        listing.amenities = (0..10)
            .map(|i| factors::ESSENTIAL_AMENITIES[i].to_string())
            .chain(factors::PREMIUM_AMENITIES.iter().map(|a| a.to_string()))
            .chain(factors::SAFETY_AMENITIES.iter().map(|a| a.to_string()))
            .collect();
        listing.rating = 4.98;
        listing.review_count = 200;
        listing.last_review_at = Some(now - Duration::days(5));
        listing.sub_ratings = SubRatings {
            cleanliness: 5.0,
            accuracy: 5.0,
            check_in: 5.0,
            communication: 5.0,
            location: 4.9,
            value: 4.9,
        };
        listing.cancellation_rate = 0.0;
        listing.open_nights_ratio = 0.9;
        let market = MarketSnapshot {
            avg_price_per_night: 160.0,
            competitor_scores: vec![60, 70, 80],
        };
        let result =
            grade_listing(&listing, &EngineConfig::aligned(), Some(&market), now).unwrap();
        assert_eq!(result.overall_score, 100);
        assert_eq!(result.grade, "A+");
        assert_eq!(result.market.unwrap().percentile, 100);
    }

    #[test]
    fn test_no_market_means_neutral_pricing_and_no_comparison() {
        let now = Utc::now();
        let listing = showcase_listing(now);
        let result = grade_listing(&listing, &EngineConfig::aligned(), None, now).unwrap();
        assert_eq!(result.category(Category::Pricing).unwrap().score, 70);
        assert!(result.market.is_none());
    }

    #[test]
    fn test_legacy_profile_scores_content_categories() {
        let now = Utc::now();
        let listing = showcase_listing(now);
        let result = grade_listing(&listing, &EngineConfig::legacy(), None, now).unwrap();
        assert_eq!(result.category_scores.len(), 6);
        assert!(result.category(Category::Title).is_some());
        assert!(result.category(Category::Response).is_none());
    }

    #[test]
    fn test_deterministic_for_fixed_reference_time() {
        let now = "2026-08-27T12:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let listing = showcase_listing(now);
        let a = grade_listing(&listing, &EngineConfig::aligned(), None, now).unwrap();
        let b = grade_listing(&listing, &EngineConfig::aligned(), None, now).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_invalid_listing_is_rejected_with_field_names() {
        let now = Utc::now();
        let mut listing = showcase_listing(now);
        listing.rating = 6.0;
        listing.response_rate = -5.0;
        let err = grade_listing(&listing, &EngineConfig::aligned(), None, now).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("listing.rating"));
        assert!(message.contains("listing.response_rate"));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let now = Utc::now();
        let listing = showcase_listing(now);
        let mut config = EngineConfig::aligned();
        config.weights[0].weight = 0.9;
        let err = grade_listing(&listing, &config, None, now).unwrap_err();
        assert!(err.to_string().contains("must sum to 1.0"));
    }

    #[test]
    fn test_weak_categories_reported() {
        let now = Utc::now();
        let listing = showcase_listing(now);
        let result = grade_listing(&listing, &EngineConfig::aligned(), None, now).unwrap();
        assert!(result
            .weaknesses
            .iter()
            .any(|w| w.contains("Listing content is thin")));
        assert!(result
            .weaknesses
            .iter()
            .any(|w| w.contains("Calendar is mostly blocked")));
    }
}
