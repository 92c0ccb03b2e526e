use super::config::MAX_RECOMMENDATIONS;
use super::eligibility::EligibilityFailure;
use super::factors;
use super::result::CategoryScore;
use crate::listing::{ListingData, MarketSnapshot};
use chrono::{DateTime, Utc};

/// Recommendation urgency. Critical items block visibility outright;
/// medium items are polish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    Critical,
    High,
    Medium,
}

/// Everything a rule may look at. Rules are pure functions of this.
pub struct RuleContext<'a> {
    pub listing: &'a ListingData,
    pub scores: &'a [CategoryScore],
    pub market: Option<&'a MarketSnapshot>,
    pub failures: &'a [EligibilityFailure],
    pub now: DateTime<Utc>,
}

struct Finding {
    message: String,
    /// How many points the issue is worth; larger sorts earlier
    /// within a tier.
    deficit: u32,
}

struct Rule {
    tier: Tier,
    check: fn(&RuleContext) -> Option<Finding>,
}

// The full advice catalog. Table order is the final tie-breaker, so
// rules are listed most-impactful first within each tier.
static RULES: &[Rule] = &[
    Rule { tier: Tier::Critical, check: no_photos },
    Rule { tier: Tier::Critical, check: no_reviews },
    Rule { tier: Tier::Critical, check: low_rating },
    Rule { tier: Tier::Critical, check: high_cancellation },
    Rule { tier: Tier::Critical, check: low_response_rate },
    Rule { tier: Tier::High, check: modest_rating },
    Rule { tier: Tier::High, check: weak_sub_rating },
    Rule { tier: Tier::High, check: few_reviews },
    Rule { tier: Tier::High, check: instant_book_off },
    Rule { tier: Tier::High, check: slow_response },
    Rule { tier: Tier::High, check: missing_essentials },
    Rule { tier: Tier::High, check: moderate_cancellation },
    Rule { tier: Tier::High, check: stale_reviews },
    Rule { tier: Tier::Medium, check: title_out_of_band },
    Rule { tier: Tier::Medium, check: too_many_emoji },
    Rule { tier: Tier::Medium, check: shouting_title },
    Rule { tier: Tier::Medium, check: description_short },
    Rule { tier: Tier::Medium, check: description_long },
    Rule { tier: Tier::Medium, check: missing_topics },
    Rule { tier: Tier::Medium, check: overpriced },
    Rule { tier: Tier::Medium, check: underpriced },
    Rule { tier: Tier::Medium, check: no_market_data },
    Rule { tier: Tier::Medium, check: low_availability },
    Rule { tier: Tier::Medium, check: few_amenities },
];

/// Run every rule and return the top recommendations, ordered by tier,
/// then by points at stake, then by catalog order. Capped so the report
/// stays actionable.
pub fn generate(ctx: &RuleContext) -> Vec<String> {
    generate_with_tiers(ctx)
        .into_iter()
        .map(|(_, message)| message)
        .collect()
}

pub fn generate_with_tiers(ctx: &RuleContext) -> Vec<(Tier, String)> {
    let mut findings: Vec<(Tier, u32, usize, String)> = RULES
        .iter()
        .enumerate()
        .filter_map(|(index, rule)| {
            (rule.check)(ctx).map(|f| (rule.tier, f.deficit, index, f.message))
        })
        .collect();
    findings.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then(b.1.cmp(&a.1))
            .then(a.2.cmp(&b.2))
    });
    findings
        .into_iter()
        .take(MAX_RECOMMENDATIONS)
        .map(|(tier, _, _, message)| (tier, message))
        .collect()
}

fn no_photos(ctx: &RuleContext) -> Option<Finding> {
    (ctx.listing.photo_count == 0).then(|| Finding {
        message: "Add photos: a listing with none is severely penalized in search".to_string(),
        deficit: 100,
    })
}

fn no_reviews(ctx: &RuleContext) -> Option<Finding> {
    (ctx.listing.review_count == 0).then(|| Finding {
        message:
            "No reviews yet, which severely limits trust; encourage early guests to leave one"
                .to_string(),
        deficit: 100,
    })
}

fn low_rating(ctx: &RuleContext) -> Option<Finding> {
    let rating = ctx.listing.rating;
    (rating > 0.0 && rating < 4.5).then(|| Finding {
        message: format!(
            "Overall rating {:.2} severely limits visibility; address the recurring complaints in recent reviews",
            rating
        ),
        deficit: ((4.8 - rating) * 100.0).round() as u32,
    })
}

fn high_cancellation(ctx: &RuleContext) -> Option<Finding> {
    let rate = ctx.listing.cancellation_rate;
    (rate >= 0.03).then(|| Finding {
        message: format!(
            "Cancellation rate {:.1}% severely hurts ranking and rules out Guest Favorites; stop cancelling confirmed stays",
            rate * 100.0
        ),
        deficit: 100,
    })
}

fn low_response_rate(ctx: &RuleContext) -> Option<Finding> {
    let rate = ctx.listing.response_rate;
    (rate < 70.0).then(|| Finding {
        message: format!(
            "Response rate {:.0}% severely impacts ranking; reply to every inquiry, even to decline",
            rate
        ),
        deficit: 100 - factors::score_response(ctx.listing),
    })
}

fn modest_rating(ctx: &RuleContext) -> Option<Finding> {
    let rating = ctx.listing.rating;
    (rating >= 4.5 && rating < 4.8).then(|| Finding {
        message: format!(
            "Push the overall rating ({:.2}) toward 4.8+; small service touches move it fastest",
            rating
        ),
        deficit: ((4.8 - rating) * 100.0).round() as u32,
    })
}

fn weak_sub_rating(ctx: &RuleContext) -> Option<Finding> {
    ctx.failures
        .iter()
        .filter_map(|f| match f {
            EligibilityFailure::SubRatingBelowBar { name, rating, bar } if *rating > 0.0 => {
                Some((*name, *rating, *bar))
            }
            _ => None,
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(name, rating, bar)| Finding {
            message: format!(
                "Improve the {} sub-rating ({:.2}); it drags the reviews factor and blocks Guest Favorites",
                name, rating
            ),
            deficit: ((bar - rating) * 100.0).round() as u32,
        })
}

fn few_reviews(ctx: &RuleContext) -> Option<Finding> {
    let count = ctx.listing.review_count;
    (count >= 1 && count < 5).then(|| Finding {
        message: format!(
            "Only {} review{} so far; prompt recent guests to build volume",
            count,
            if count == 1 { "" } else { "s" }
        ),
        deficit: (5 - count) * 20,
    })
}

fn instant_book_off(ctx: &RuleContext) -> Option<Finding> {
    (!ctx.listing.instant_book).then(|| Finding {
        message: "Enable Instant Book; it counts as a full ranking factor and many guests filter by it"
            .to_string(),
        deficit: 70,
    })
}

fn slow_response(ctx: &RuleContext) -> Option<Finding> {
    if ctx.listing.response_rate < 70.0 {
        return None;
    }
    let score = factors::score_response(ctx.listing);
    (score < 100).then(|| Finding {
        message: "Respond faster: replies within an hour earn full response credit".to_string(),
        deficit: 100 - score,
    })
}

fn missing_essentials(ctx: &RuleContext) -> Option<Finding> {
    let missing = factors::missing_essentials(ctx.listing);
    if missing.is_empty() {
        return None;
    }
    let named: Vec<&str> = missing.iter().take(3).copied().collect();
    Some(Finding {
        message: format!(
            "Add missing essential amenities ({} of {}): start with {}",
            missing.len(),
            factors::ESSENTIAL_AMENITIES.len(),
            named.join(", ")
        ),
        deficit: missing.len() as u32 * 6,
    })
}

fn moderate_cancellation(ctx: &RuleContext) -> Option<Finding> {
    let rate = ctx.listing.cancellation_rate;
    (rate >= 0.01 && rate < 0.03).then(|| Finding {
        message: format!(
            "Cancellation rate {:.1}% costs ranking points and Guest Favorites eligibility; avoid cancelling confirmed stays",
            rate * 100.0
        ),
        deficit: 40,
    })
}

fn stale_reviews(ctx: &RuleContext) -> Option<Finding> {
    if ctx.listing.review_count == 0 {
        return None;
    }
    let stale = match ctx.listing.review_age(ctx.now).map(|a| a.num_days()) {
        Some(days) => days > 365,
        None => true,
    };
    stale.then(|| Finding {
        message: "Most recent review is over a year old; fresh stays restore the recency credit"
            .to_string(),
        deficit: 30,
    })
}

fn title_out_of_band(ctx: &RuleContext) -> Option<Finding> {
    let chars = ctx.listing.title_chars();
    if (30..=60).contains(&chars) {
        return None;
    }
    let (direction, dist) = if chars < 30 {
        ("lengthen", 30 - chars)
    } else {
        ("shorten", chars - 60)
    };
    Some(Finding {
        message: format!(
            "Title is {} characters; {} it toward the 30-60 range",
            chars, direction
        ),
        deficit: (2 * dist).min(60) as u32,
    })
}

fn too_many_emoji(ctx: &RuleContext) -> Option<Finding> {
    let count = factors::emoji_count(&ctx.listing.title);
    (count > 2).then(|| Finding {
        message: format!("Title has {} emoji; two at most reads well", count),
        deficit: 10,
    })
}

fn shouting_title(ctx: &RuleContext) -> Option<Finding> {
    (factors::longest_caps_run(&ctx.listing.title) > 10).then(|| Finding {
        message: "Avoid long all-caps runs in the title".to_string(),
        deficit: 15,
    })
}

fn description_short(ctx: &RuleContext) -> Option<Finding> {
    let chars = ctx.listing.description_chars();
    (chars < 500).then(|| Finding {
        message: format!(
            "Description is {} characters; expand it toward 500+ with concrete details",
            chars
        ),
        deficit: ((500 - chars) / 25) as u32,
    })
}

fn description_long(ctx: &RuleContext) -> Option<Finding> {
    let chars = ctx.listing.description_chars();
    (chars > 1500).then(|| Finding {
        message: format!(
            "Description is {} characters; tighten it, guests stop reading past 1500",
            chars
        ),
        deficit: ((chars - 1500) / 25) as u32,
    })
}

fn missing_topics(ctx: &RuleContext) -> Option<Finding> {
    let missing = factors::missing_topic_groups(&ctx.listing.description);
    if missing.is_empty() {
        return None;
    }
    Some(Finding {
        message: format!("Cover {} in the description", missing.join(", ")),
        deficit: missing.len() as u32 * 10,
    })
}

fn overpriced(ctx: &RuleContext) -> Option<Finding> {
    let ratio = factors::price_ratio(ctx.listing, ctx.market)?;
    (ratio > 1.10).then(|| Finding {
        message: format!(
            "Priced {:.0}% above the market average; consider moving toward parity",
            (ratio - 1.0) * 100.0
        ),
        deficit: ((ratio - 1.0) * 100.0).round() as u32,
    })
}

fn underpriced(ctx: &RuleContext) -> Option<Finding> {
    let ratio = factors::price_ratio(ctx.listing, ctx.market)?;
    (ratio < 0.75).then(|| Finding {
        message: format!(
            "Priced {:.0}% below the market average; there is room to raise the rate",
            (1.0 - ratio) * 100.0
        ),
        deficit: ((0.75 - ratio) * 100.0).round() as u32,
    })
}

fn no_market_data(ctx: &RuleContext) -> Option<Finding> {
    factors::price_ratio(ctx.listing, ctx.market)
        .is_none()
        .then(|| Finding {
            message: "No market data supplied; pricing was scored neutral".to_string(),
            deficit: 5,
        })
}

fn low_availability(ctx: &RuleContext) -> Option<Finding> {
    let ratio = ctx.listing.open_nights_ratio;
    (ratio < 0.5).then(|| Finding {
        message: format!(
            "Only {:.0}% of upcoming nights are open; opening more of the calendar lifts ranking",
            ratio * 100.0
        ),
        deficit: ((0.5 - ratio) * 100.0).round() as u32,
    })
}

fn few_amenities(ctx: &RuleContext) -> Option<Finding> {
    let count = ctx.listing.amenities.len();
    (count < 12).then(|| Finding {
        message: format!(
            "Only {} amenities listed; audit the property, hosts routinely under-report",
            count
        ),
        deficit: (12 - count) as u32 * 5,
    })
}
