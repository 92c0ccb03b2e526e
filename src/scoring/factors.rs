use chrono::{DateTime, Utc};

use crate::listing::{ListingData, MarketSnapshot, ResponseTime};

// Title scoring.
const TITLE_BAND: std::ops::RangeInclusive<usize> = 30..=60;
const TITLE_FULL: i64 = 90;
const TITLE_FLOOR: i64 = 30;
const CAPS_RUN_LIMIT: usize = 10;

// Description scoring.
const DESCRIPTION_BAND: std::ops::RangeInclusive<usize> = 500..=1500;
const DESCRIPTION_FULL: i64 = 70;
const DESCRIPTION_FLOOR: i64 = 20;
const TOPIC_BONUS: i64 = 10;

/// Topics a thorough description covers, with the phrases that signal
/// each one. Matching is case-insensitive substring search.
pub const TOPIC_GROUPS: &[(&str, &[&str])] = &[
    (
        "house rules",
        &["house rules", "no smoking", "quiet hours", "no parties", "checkout"],
    ),
    (
        "check-in",
        &["check-in", "self check-in", "lockbox", "keypad", "arrival"],
    ),
    (
        "neighborhood",
        &["neighborhood", "neighbourhood", "district", "walk to", "minutes from", "nearby"],
    ),
];

pub const PHOTO_VARIETY_CATEGORIES: &[&str] = &[
    "interior",
    "exterior",
    "bedroom",
    "bathroom",
    "kitchen",
    "amenity",
    "neighborhood",
    "view",
];

pub const PRICING_NEUTRAL: u32 = 70;

// (upper bound on price / market average, score). First bound at or
// above the ratio wins; above the last bound scores 35.
const PRICE_RATIO_BANDS: &[(f64, u32)] = &[
    (0.75, 70),
    (0.85, 85),
    (1.00, 90),
    (1.10, 75),
    (1.20, 65),
    (1.35, 50),
];
const PRICE_RATIO_WORST: u32 = 35;

pub const ESSENTIAL_AMENITIES: &[&str] = &[
    "wifi",
    "kitchen",
    "heating",
    "air conditioning",
    "washer",
    "tv",
    "hot water",
    "essentials",
    "bed linens",
    "iron",
];
pub const PREMIUM_AMENITIES: &[&str] = &[
    "pool",
    "hot tub",
    "gym",
    "dedicated workspace",
    "ev charger",
    "balcony",
    "bbq grill",
    "fireplace",
];
pub const SAFETY_AMENITIES: &[&str] = &[
    "smoke alarm",
    "carbon monoxide alarm",
    "fire extinguisher",
    "first aid kit",
];

// Legacy review tiers: (minimum, points), first match wins.
const RATING_TIERS_V1: &[(f64, u32)] = &[
    (4.9, 50),
    (4.8, 45),
    (4.7, 40),
    (4.5, 32),
    (4.0, 20),
    (3.5, 10),
    (0.0, 5),
];
const COUNT_TIERS_V1: &[(u32, u32)] = &[(100, 35), (50, 32), (20, 26), (10, 18), (5, 12), (1, 5)];

// Aligned review tiers. Tighter at the top: the marketplace treats
// 4.8 and 4.95 very differently.
const RATING_TIERS_V2: &[(f64, u32)] = &[
    (4.95, 45),
    (4.9, 42),
    (4.85, 38),
    (4.8, 34),
    (4.7, 28),
    (4.5, 20),
    (4.0, 10),
    (0.0, 5),
];
const COUNT_TIERS_V2: &[(u32, u32)] = &[(100, 30), (50, 28), (20, 22), (10, 16), (5, 10), (1, 4)];
const SUB_POINT_TIERS: &[(f64, u32)] = &[(4.9, 4), (4.8, 3), (4.5, 2), (0.0, 1)];

/// A sub-category below this drags the whole reviews score down.
pub const SUB_WEAK_BAR: f64 = 4.5;
const SUB_WEAK_CAP: u32 = 70;

// Rows: response rate high (>=90) / mid (>=70) / low.
// Columns: within_hour, within_day, within_two_days, slower.
const RESPONSE_CREDIT: [[u32; 4]; 3] = [
    [100, 80, 60, 40],
    [75, 60, 45, 30],
    [50, 40, 25, 10],
];

const CONVERSION_BASE: i64 = 50;
const CONVERSION_PHOTO_TIERS: &[(u32, u32)] = &[(20, 25), (15, 20), (10, 15), (5, 8)];

const QUALITY_BASE: u32 = 30;
const QUALITY_PHOTO_TIERS: &[(u32, u32)] = &[(25, 35), (20, 30), (15, 25), (10, 20), (5, 10)];
const QUALITY_DESCRIPTION_TIERS: &[(u32, u32)] = &[(1200, 15), (800, 12), (500, 8), (200, 4)];
const QUALITY_AMENITY_TIERS: &[(u32, u32)] = &[(20, 25), (15, 22), (10, 18), (8, 15), (5, 10)];

const AVAILABILITY_TIERS: &[(f64, u32)] = &[(0.75, 100), (0.5, 80), (0.25, 55), (0.1, 30)];
const AVAILABILITY_FLOOR: u32 = 10;

/// Title quality: length band, emoji use, shouting.
pub fn score_title(listing: &ListingData) -> u32 {
    let chars = listing.title_chars();
    let mut score = if TITLE_BAND.contains(&chars) {
        TITLE_FULL
    } else {
        let dist = if chars < *TITLE_BAND.start() {
            TITLE_BAND.start() - chars
        } else {
            chars - TITLE_BAND.end()
        };
        TITLE_FLOOR.max(TITLE_FULL - 2 * dist as i64)
    };

    match emoji_count(&listing.title) {
        0 => {}
        1..=2 => score += 10,
        _ => score -= 10,
    }

    if longest_caps_run(&listing.title) > CAPS_RUN_LIMIT {
        score -= 15;
    }

    clamp_score(score)
}

/// Description quality: length band plus topic coverage.
pub fn score_description(listing: &ListingData) -> u32 {
    let chars = listing.description_chars();
    let base = if DESCRIPTION_BAND.contains(&chars) {
        DESCRIPTION_FULL
    } else {
        let dist = if chars < *DESCRIPTION_BAND.start() {
            DESCRIPTION_BAND.start() - chars
        } else {
            chars - DESCRIPTION_BAND.end()
        };
        DESCRIPTION_FLOOR.max(DESCRIPTION_FULL - dist as i64 / 25)
    };

    let score = base + TOPIC_BONUS * covered_topic_count(&listing.description) as i64;
    clamp_score(score)
}

/// Photo coverage. Strictly monotone in photo count up to the cap, so
/// adding a photo never lowers the score.
pub fn score_photos(listing: &ListingData) -> u32 {
    if listing.photo_count == 0 {
        return 0;
    }
    let count_points = listing.photo_count.min(15) * 5;
    let variety = recognized_variety_count(listing) as u32;
    let variety_points = (variety * 5).min(25);
    (count_points + variety_points).min(100)
}

/// Price position against the market average. Neutral without market
/// data rather than rewarding or punishing the unknown.
pub fn score_pricing(listing: &ListingData, market: Option<&MarketSnapshot>) -> u32 {
    match price_ratio(listing, market) {
        None => PRICING_NEUTRAL,
        Some(ratio) => PRICE_RATIO_BANDS
            .iter()
            .find(|(bound, _)| ratio <= *bound)
            .map(|(_, score)| *score)
            .unwrap_or(PRICE_RATIO_WORST),
    }
}

/// Amenity coverage: essentials dominate, premium and safety items and
/// overall breadth add on top. A listing with zero essentials is capped
/// hard regardless of how many extras it lists.
pub fn score_amenities(listing: &ListingData) -> u32 {
    let essentials = count_matching(listing, ESSENTIAL_AMENITIES);
    let premium = count_matching(listing, PREMIUM_AMENITIES);
    let safety = count_matching(listing, SAFETY_AMENITIES);

    let mut score = essentials * 6 + (premium * 4).min(20) + (safety * 2).min(8);
    score += match listing.amenities.len() {
        n if n >= 20 => 12,
        n if n >= 12 => 6,
        _ => 0,
    };

    if essentials == 0 {
        score = score.min(20);
    }
    score.min(100)
}

/// Legacy review score: rating tier, volume tier, recency bump.
pub fn score_reviews_v1(listing: &ListingData, now: DateTime<Utc>) -> u32 {
    let mut score = 0;
    if listing.rating > 0.0 {
        score += tier_f64(RATING_TIERS_V1, listing.rating);
    }
    score += tier_u32(COUNT_TIERS_V1, listing.review_count);
    score += match listing.review_age(now).map(|a| a.num_days()) {
        Some(days) if days <= 180 => 15,
        Some(days) if days <= 365 => 8,
        _ => 0,
    };
    score.min(100)
}

/// Aligned review score: rating and volume tiers, sub-category points,
/// and a recency term that penalizes stale listings instead of merely
/// not rewarding them. A single weak sub-category caps the result.
pub fn score_reviews_v2(listing: &ListingData, now: DateTime<Utc>) -> u32 {
    let mut score: i64 = 0;
    if listing.rating > 0.0 {
        score += tier_f64(RATING_TIERS_V2, listing.rating) as i64;
    }
    score += tier_u32(COUNT_TIERS_V2, listing.review_count) as i64;
    score += sub_rating_points(listing) as i64;

    if listing.review_count > 0 {
        score += match listing.review_age(now).map(|a| a.num_days()) {
            Some(days) if days <= 180 => 5,
            Some(days) if days <= 365 => 0,
            _ => -10,
        };
    }

    let score = clamp_score(score);
    let weak_sub = listing
        .sub_ratings
        .as_named()
        .iter()
        .any(|(_, v)| *v > 0.0 && *v < SUB_WEAK_BAR);
    if weak_sub {
        score.min(SUB_WEAK_CAP)
    } else {
        score
    }
}

fn sub_rating_points(listing: &ListingData) -> u32 {
    if listing.sub_ratings.all_zero() {
        // No per-category data; approximate from the overall rating.
        return match listing.rating {
            r if r >= 4.9 => 20,
            r if r >= 4.8 => 16,
            r if r >= 4.5 => 12,
            r if r > 0.0 => 8,
            _ => 0,
        };
    }
    listing
        .sub_ratings
        .as_named()
        .iter()
        .filter(|(_, v)| *v > 0.0)
        .map(|(_, v)| tier_f64(SUB_POINT_TIERS, *v))
        .sum()
}

/// Host responsiveness: rate tier crossed with time bucket.
pub fn score_response(listing: &ListingData) -> u32 {
    let row = if listing.response_rate >= 90.0 {
        0
    } else if listing.response_rate >= 70.0 {
        1
    } else {
        2
    };
    RESPONSE_CREDIT[row][response_time_column(listing.response_time)]
}

/// Proxy for booking conversion: photo depth, title length, and
/// description substance are what a guest sees before committing.
pub fn score_conversion(listing: &ListingData) -> u32 {
    let mut score = CONVERSION_BASE;
    score += tier_u32(CONVERSION_PHOTO_TIERS, listing.photo_count) as i64;

    score += match listing.title_chars() {
        40..=60 => 12,
        30..=39 | 61..=80 => 6,
        n if n < 30 => -5,
        _ => 0,
    };

    score += match listing.description_chars() {
        n if n >= 1000 => 13,
        n if n >= 500 => 7,
        _ => 0,
    };

    clamp_score(score)
}

pub fn score_instant_book(listing: &ListingData) -> u32 {
    if listing.instant_book {
        100
    } else {
        30
    }
}

/// Cancellations are the strongest negative ranking signal.
pub fn score_cancellation(listing: &ListingData) -> u32 {
    match listing.cancellation_rate {
        r if r < 0.01 => 100,
        r if r < 0.03 => 60,
        r if r < 0.10 => 25,
        _ => 0,
    }
}

/// Content completeness rolled into a single aligned factor.
pub fn score_listing_quality(listing: &ListingData) -> u32 {
    let mut score = QUALITY_BASE;
    score += tier_u32(QUALITY_PHOTO_TIERS, listing.photo_count);
    score += tier_u32(QUALITY_DESCRIPTION_TIERS, listing.description_chars() as u32);
    if covered_topic_count(&listing.description) == TOPIC_GROUPS.len() {
        score += 5;
    }
    score += tier_u32(QUALITY_AMENITY_TIERS, listing.amenities.len() as u32);
    score.min(100)
}

/// Calendar openness over the upcoming booking window.
pub fn score_availability(listing: &ListingData) -> u32 {
    AVAILABILITY_TIERS
        .iter()
        .find(|(bound, _)| listing.open_nights_ratio >= *bound)
        .map(|(_, score)| *score)
        .unwrap_or(AVAILABILITY_FLOOR)
}

/// Price relative to the market average, when market data exists.
pub fn price_ratio(listing: &ListingData, market: Option<&MarketSnapshot>) -> Option<f64> {
    let market = market?;
    if market.avg_price_per_night <= 0.0 {
        return None;
    }
    Some(listing.price_per_night / market.avg_price_per_night)
}

/// Topic groups the description covers.
pub fn covered_topic_count(description: &str) -> usize {
    let lower = description.to_lowercase();
    TOPIC_GROUPS
        .iter()
        .filter(|(_, phrases)| phrases.iter().any(|p| lower.contains(p)))
        .count()
}

/// Topic group names the description does not cover, in table order.
pub fn missing_topic_groups(description: &str) -> Vec<&'static str> {
    let lower = description.to_lowercase();
    TOPIC_GROUPS
        .iter()
        .filter(|(_, phrases)| !phrases.iter().any(|p| lower.contains(p)))
        .map(|(name, _)| *name)
        .collect()
}

/// Essential amenities the listing lacks, in table order.
pub fn missing_essentials(listing: &ListingData) -> Vec<&'static str> {
    ESSENTIAL_AMENITIES
        .iter()
        .filter(|a| !listing.has_amenity(a))
        .copied()
        .collect()
}

pub fn emoji_count(text: &str) -> usize {
    text.chars()
        .filter(|c| {
            ('\u{1F300}'..='\u{1FAFF}').contains(c) || ('\u{2600}'..='\u{27BF}').contains(c)
        })
        .count()
}

/// Longest run of uppercase letters. Lowercase letters break a run;
/// digits, spaces, and punctuation neither extend nor break it.
pub fn longest_caps_run(text: &str) -> usize {
    let mut longest = 0;
    let mut run = 0;
    for c in text.chars() {
        if c.is_uppercase() {
            run += 1;
            longest = longest.max(run);
        } else if c.is_lowercase() {
            run = 0;
        }
    }
    longest
}

fn recognized_variety_count(listing: &ListingData) -> usize {
    PHOTO_VARIETY_CATEGORIES
        .iter()
        .filter(|cat| {
            listing
                .photo_categories
                .iter()
                .any(|c| c.eq_ignore_ascii_case(cat))
        })
        .count()
}

fn count_matching(listing: &ListingData, canonical: &[&str]) -> u32 {
    canonical.iter().filter(|a| listing.has_amenity(a)).count() as u32
}

fn response_time_column(time: ResponseTime) -> usize {
    match time {
        ResponseTime::WithinHour => 0,
        ResponseTime::WithinDay => 1,
        ResponseTime::WithinTwoDays => 2,
        ResponseTime::Slower => 3,
    }
}

fn tier_f64(tiers: &[(f64, u32)], value: f64) -> u32 {
    tiers
        .iter()
        .find(|(min, _)| value >= *min)
        .map(|(_, points)| *points)
        .unwrap_or(0)
}

fn tier_u32(tiers: &[(u32, u32)], value: u32) -> u32 {
    tiers
        .iter()
        .find(|(min, _)| value >= *min)
        .map(|(_, points)| *points)
        .unwrap_or(0)
}

fn clamp_score(score: i64) -> u32 {
    score.clamp(0, 100) as u32
}
