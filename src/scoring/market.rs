use super::result::MarketComparison;
use crate::listing::MarketSnapshot;

/// Rank an overall score against competitor scores from a market
/// snapshot. Returns None when the snapshot has no competitors; the
/// report then simply omits the comparison.
pub fn compare(overall_score: u32, snapshot: &MarketSnapshot) -> Option<MarketComparison> {
    if snapshot.competitor_scores.is_empty() {
        return None;
    }
    let n = snapshot.competitor_scores.len();
    let below = snapshot
        .competitor_scores
        .iter()
        .filter(|s| **s < overall_score)
        .count();
    let sum: u64 = snapshot.competitor_scores.iter().map(|s| *s as u64).sum();

    Some(MarketComparison {
        percentile: ((below as f64 / n as f64) * 100.0).round() as u32,
        competitor_avg_score: (sum as f64 / n as f64).round() as u32,
        competitors_analyzed: n,
    })
}
