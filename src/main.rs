use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;

use listing_grader::scoring::{GradeResult, ScoringVersion};

const EXIT_SUCCESS: i32 = 0;
const EXIT_INPUT: i32 = 1;
const EXIT_VALIDATION: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Profile {
    /// Original 6-factor content profile
    Legacy,
    /// Current 8-factor ranking-aligned profile
    Aligned,
}

impl From<Profile> for ScoringVersion {
    fn from(profile: Profile) -> Self {
        match profile {
            Profile::Legacy => ScoringVersion::Legacy,
            Profile::Aligned => ScoringVersion::Aligned,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "listing-grader")]
#[command(about = "Rental listing visibility scoring CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Listing JSON files to grade ("-" reads one listing from stdin)
    #[arg(required = true)]
    files: Vec<String>,

    /// Scoring profile to use when no config file overrides it
    #[arg(short, long, value_enum, default_value_t = Profile::Aligned)]
    profile: Profile,

    /// Path to config file (defaults to ~/.config/listing-grader/config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Market snapshot JSON for pricing and percentile comparison
    #[arg(short, long)]
    market: Option<PathBuf>,

    /// Emit JSON instead of the text report
    #[arg(long)]
    json: bool,

    /// Reference time as RFC 3339 (defaults to the current time)
    #[arg(long)]
    reference_time: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    let start_time = Instant::now();

    // One reference time for the whole run, so multi-file output is
    // mutually consistent.
    let now: DateTime<Utc> = match &cli.reference_time {
        Some(raw) => match raw.parse() {
            Ok(t) => t,
            Err(e) => {
                eprintln!("Invalid --reference-time '{}': {}", raw, e);
                std::process::exit(EXIT_INPUT);
            }
        },
        None => Utc::now(),
    };

    let config = match listing_grader::scoring::load_config(cli.config.clone(), cli.profile.into())
    {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if let Err(errors) = listing_grader::scoring::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let market = match &cli.market {
        Some(path) => match listing_grader::listing::load_market(path) {
            Ok(m) => Some(m),
            Err(e) => {
                eprintln!("Market error: {}", e);
                std::process::exit(EXIT_INPUT);
            }
        },
        None => None,
    };

    if cli.verbose {
        eprintln!(
            "Grading {} listing(s) with the {:?} profile",
            cli.files.len(),
            config.version
        );
    }

    let mut results: Vec<GradeResult> = Vec::with_capacity(cli.files.len());
    for file in &cli.files {
        let listing = match listing_grader::listing::load_listing(file) {
            Ok(l) => l,
            Err(e) => {
                eprintln!("Input error: {:#}", e);
                std::process::exit(EXIT_INPUT);
            }
        };

        match listing_grader::scoring::grade_listing(&listing, &config, market.as_ref(), now) {
            Ok(result) => {
                if cli.verbose {
                    eprintln!(
                        "  {}: {} ({})",
                        result.listing_id, result.overall_score, result.grade
                    );
                }
                results.push(result);
            }
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(EXIT_VALIDATION);
            }
        }
    }

    if cli.json {
        match listing_grader::output::format_json(&results) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Output error: {}", e);
                std::process::exit(EXIT_INPUT);
            }
        }
    } else {
        let use_colors = listing_grader::output::should_use_colors();
        let reports: Vec<String> = results
            .iter()
            .map(|r| listing_grader::output::format_report(r, use_colors))
            .collect();
        println!("{}", reports.join("\n\n"));
    }

    if cli.verbose {
        eprintln!();
        eprintln!(
            "Graded {} listing(s) in {:?}",
            results.len(),
            start_time.elapsed()
        );
    }

    std::process::exit(EXIT_SUCCESS);
}
