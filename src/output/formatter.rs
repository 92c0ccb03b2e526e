use std::io::IsTerminal;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use terminal_size::{terminal_size, Width};

use crate::scoring::GradeResult;

const OVERALL_BAR_WIDTH: usize = 20;
const CATEGORY_BAR_WIDTH: usize = 10;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Render one grading result as a multi-section text report.
pub fn format_report(result: &GradeResult, use_colors: bool) -> String {
    let width = get_terminal_width();
    let mut lines: Vec<String> = Vec::new();

    lines.push(header_line(result, use_colors));
    lines.push(overall_line(result, use_colors));
    lines.push(String::new());

    lines.push("Categories:".to_string());
    for category in &result.category_scores {
        let bar = score_bar(category.score, CATEGORY_BAR_WIDTH);
        lines.push(format!(
            "  {:<16} {:>3}/100  {}",
            category.category.label(),
            category.score,
            bar
        ));
    }

    if !result.bonuses.is_empty() {
        let parts: Vec<String> = result
            .bonuses
            .iter()
            .map(|b| format!("+{} {}", b.points, b.name))
            .collect();
        lines.push(String::new());
        lines.push(format!("Bonuses: {}", parts.join(", ")));
    }

    lines.push(format!(
        "Guest Favorites: {}",
        if result.badges.guest_favorites_eligible {
            "eligible"
        } else {
            "not eligible"
        }
    ));

    if let Some(market) = &result.market {
        lines.push(format!(
            "Market: outscores {}% of {} competitors (avg {})",
            market.percentile, market.competitors_analyzed, market.competitor_avg_score
        ));
    }

    if !result.strengths.is_empty() {
        lines.push(String::new());
        lines.push("Strengths:".to_string());
        for strength in &result.strengths {
            let line = format!("  + {}", strength);
            lines.push(if use_colors {
                format!("  + {}", strength.green())
            } else {
                line
            });
        }
    }

    if !result.weaknesses.is_empty() {
        lines.push(String::new());
        lines.push("Weaknesses:".to_string());
        for weakness in &result.weaknesses {
            let line = format!("  - {}", weakness);
            lines.push(if use_colors {
                format!("  - {}", weakness.red())
            } else {
                line
            });
        }
    }

    if !result.recommendations.is_empty() {
        lines.push(String::new());
        lines.push("Recommendations:".to_string());
        for (idx, advice) in result.recommendations.iter().enumerate() {
            let line = format!("  {:>2}. {}", idx + 1, advice);
            lines.push(match width {
                Some(w) => truncate_line(&line, w),
                None => line,
            });
        }
    }

    lines.join("\n")
}

/// Serialize results as pretty JSON: a single object for one listing,
/// an array otherwise.
pub fn format_json(results: &[GradeResult]) -> Result<String> {
    let json = if results.len() == 1 {
        serde_json::to_string_pretty(&results[0])
    } else {
        serde_json::to_string_pretty(results)
    };
    json.context("Failed to serialize results as JSON")
}

fn header_line(result: &GradeResult, use_colors: bool) -> String {
    if use_colors {
        format!("Listing {}", result.listing_id.bold())
    } else {
        format!("Listing {}", result.listing_id)
    }
}

fn overall_line(result: &GradeResult, use_colors: bool) -> String {
    let bar = score_bar(result.overall_score, OVERALL_BAR_WIDTH);
    if use_colors {
        format!(
            "Overall: {}/100 ({})  {}",
            result.overall_score.bold(),
            result.grade.bold().cyan(),
            bar
        )
    } else {
        format!(
            "Overall: {}/100 ({})  {}",
            result.overall_score, result.grade, bar
        )
    }
}

/// Proportional bar, filled left to right.
fn score_bar(score: u32, width: usize) -> String {
    let filled = (score.min(100) as usize * width + 50) / 100;
    let mut bar = String::with_capacity(width * 3);
    for _ in 0..filled {
        bar.push('\u{2588}');
    }
    for _ in filled..width {
        bar.push('\u{2591}');
    }
    bar
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a line to fit available width, accounting for Unicode
fn truncate_line(line: &str, max_width: usize) -> String {
    let chars: Vec<char> = line.chars().collect();
    if chars.len() <= max_width {
        line.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::result::{AppliedBonus, BadgeFlags, CategoryScore, MarketComparison};
    use crate::scoring::Category;

    fn sample_result() -> GradeResult {
        GradeResult {
            listing_id: "12345678".to_string(),
            overall_score: 87,
            grade: "A-".to_string(),
            category_scores: vec![
                CategoryScore {
                    category: Category::Reviews,
                    score: 90,
                    weight: 0.25,
                },
                CategoryScore {
                    category: Category::Availability,
                    score: 10,
                    weight: 0.07,
                },
            ],
            bonuses: vec![
                AppliedBonus {
                    name: "superhost".to_string(),
                    points: 5,
                },
                AppliedBonus {
                    name: "instant_book".to_string(),
                    points: 3,
                },
            ],
            badges: BadgeFlags {
                superhost: true,
                instant_book: true,
                guest_favorites_eligible: false,
            },
            recommendations: vec!["Open more of the calendar".to_string()],
            strengths: vec!["Strong reviews (4.92\u{2605} across 87 reviews)".to_string()],
            weaknesses: vec!["Calendar is mostly blocked".to_string()],
            market: Some(MarketComparison {
                percentile: 75,
                competitor_avg_score: 71,
                competitors_analyzed: 4,
            }),
        }
    }

    #[test]
    fn test_report_includes_every_section() {
        let report = format_report(&sample_result(), false);
        assert!(report.contains("Listing 12345678"));
        assert!(report.contains("Overall: 87/100 (A-)"));
        assert!(report
            .lines()
            .any(|l| l.contains("Reviews") && l.contains("90/100")));
        assert!(report.contains("Bonuses: +5 superhost, +3 instant_book"));
        assert!(report.contains("Guest Favorites: not eligible"));
        assert!(report.contains("Market: outscores 75% of 4 competitors (avg 71)"));
        assert!(report.contains("+ Strong reviews"));
        assert!(report.contains("- Calendar is mostly blocked"));
        assert!(report.contains("1. Open more of the calendar"));
    }

    #[test]
    fn test_report_omits_empty_sections() {
        let mut result = sample_result();
        result.bonuses.clear();
        result.strengths.clear();
        result.weaknesses.clear();
        result.recommendations.clear();
        result.market = None;
        let report = format_report(&result, false);
        assert!(!report.contains("Bonuses:"));
        assert!(!report.contains("Strengths:"));
        assert!(!report.contains("Weaknesses:"));
        assert!(!report.contains("Recommendations:"));
        assert!(!report.contains("Market:"));
    }

    #[test]
    fn test_score_bar_proportions() {
        assert_eq!(score_bar(0, 10), "\u{2591}".repeat(10));
        assert_eq!(score_bar(100, 10), "\u{2588}".repeat(10));
        let half = score_bar(50, 10);
        assert_eq!(half.chars().filter(|c| *c == '\u{2588}').count(), 5);
    }

    #[test]
    fn test_format_json_single_is_object() {
        let json = format_json(&[sample_result()]).unwrap();
        assert!(json.trim_start().starts_with('{'));
        assert!(json.contains("\"overall_score\": 87"));
    }

    #[test]
    fn test_format_json_many_is_array() {
        let json = format_json(&[sample_result(), sample_result()]).unwrap();
        assert!(json.trim_start().starts_with('['));
    }

    #[test]
    fn test_truncate_line_unicode() {
        assert_eq!(truncate_line("Hello cafe", 10), "Hello cafe");
        assert_eq!(truncate_line("Hello cafe world", 10), "Hello c...");
        assert_eq!(truncate_line("Hello world", 3), "Hel");
    }
}
