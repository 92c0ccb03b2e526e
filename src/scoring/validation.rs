use chrono::{DateTime, Utc};
use std::collections::HashSet;

use super::config::{EngineConfig, WEIGHT_SUM_EPSILON};
use crate::listing::ListingData;

/// Validate raw listing data before scoring.
/// Returns all validation errors at once (not just the first).
/// Out-of-range values are never silently clamped.
pub fn validate_listing(listing: &ListingData, now: DateTime<Utc>) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if listing.id.trim().is_empty() {
        errors.push("listing.id: must not be empty".to_string());
    }

    check_unit_range(&mut errors, "listing.rating", listing.rating, 0.0, 5.0);
    for (name, value) in listing.sub_ratings.as_named() {
        check_unit_range(
            &mut errors,
            &format!("listing.sub_ratings.{}", name),
            value,
            0.0,
            5.0,
        );
    }

    if !listing.price_per_night.is_finite() || listing.price_per_night <= 0.0 {
        errors.push(format!(
            "listing.price_per_night: must be a positive number, got {}",
            listing.price_per_night
        ));
    }

    check_unit_range(
        &mut errors,
        "listing.response_rate",
        listing.response_rate,
        0.0,
        100.0,
    );
    check_unit_range(
        &mut errors,
        "listing.cancellation_rate",
        listing.cancellation_rate,
        0.0,
        1.0,
    );
    check_unit_range(
        &mut errors,
        "listing.open_nights_ratio",
        listing.open_nights_ratio,
        0.0,
        1.0,
    );

    if let Some(at) = listing.last_review_at {
        if at > now {
            errors.push(format!(
                "listing.last_review_at: {} is after the reference time {}",
                at.to_rfc3339(),
                now.to_rfc3339()
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate an engine configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &EngineConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if config.weights.is_empty() {
        errors.push("config.weights: must not be empty".to_string());
    }

    let mut seen = HashSet::new();
    for (i, entry) in config.weights.iter().enumerate() {
        if !seen.insert(entry.category) {
            errors.push(format!(
                "config.weights[{}]: duplicate category '{}'",
                i, entry.category
            ));
        }
        if !entry.weight.is_finite() || entry.weight < 0.0 || entry.weight > 1.0 {
            errors.push(format!(
                "config.weights[{}].weight: must be in 0.0..=1.0, got {}",
                i, entry.weight
            ));
        }
    }

    if !config.weights.is_empty() {
        let total: f64 = config.weights.iter().map(|w| w.weight).sum();
        if (total - 1.0).abs() > WEIGHT_SUM_EPSILON {
            errors.push(format!(
                "config.weights: must sum to 1.0, got {:.6}",
                total
            ));
        }
    }

    if config.grade_bands.is_empty() {
        errors.push("config.grade_bands: must not be empty".to_string());
    } else {
        for (i, pair) in config.grade_bands.windows(2).enumerate() {
            if pair[1].min >= pair[0].min {
                errors.push(format!(
                    "config.grade_bands[{}]: min {} must be below the previous band's {}",
                    i + 1,
                    pair[1].min,
                    pair[0].min
                ));
            }
        }
        let last = config.grade_bands.last().unwrap();
        if last.min != 0 {
            errors.push(format!(
                "config.grade_bands: last band must start at 0, got {}",
                last.min
            ));
        }
    }

    let rules = &config.eligibility;
    if !(0.0..=5.0).contains(&rules.min_rating) {
        errors.push(format!(
            "config.eligibility.min_rating: must be in 0.0..=5.0, got {}",
            rules.min_rating
        ));
    }
    if !(0.0..=5.0).contains(&rules.sub_rating_bar) {
        errors.push(format!(
            "config.eligibility.sub_rating_bar: must be in 0.0..=5.0, got {}",
            rules.sub_rating_bar
        ));
    }
    if !(0.0..=1.0).contains(&rules.max_cancellation_rate) {
        errors.push(format!(
            "config.eligibility.max_cancellation_rate: must be in 0.0..=1.0, got {}",
            rules.max_cancellation_rate
        ));
    }
    if rules.lookback_days <= 0 {
        errors.push(format!(
            "config.eligibility.lookback_days: must be positive, got {}",
            rules.lookback_days
        ));
    }
    if rules.recency_days <= 0 {
        errors.push(format!(
            "config.eligibility.recency_days: must be positive, got {}",
            rules.recency_days
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_unit_range(errors: &mut Vec<String>, field: &str, value: f64, lo: f64, hi: f64) {
    if !value.is_finite() || value < lo || value > hi {
        errors.push(format!(
            "{}: must be in {}..={}, got {}",
            field, lo, hi, value
        ));
    }
}
