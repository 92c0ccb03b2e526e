use anyhow::{Context, Result};
use std::fs;
use std::io::Read;
use std::path::Path;

use super::types::{ListingData, MarketSnapshot};

/// Load a listing from a JSON file, or stdin when `path` is "-".
pub fn load_listing(path: &str) -> Result<ListingData> {
    let raw = read_source(path)?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse listing JSON from {}", display_name(path)))
}

/// Load a market snapshot from a JSON file.
pub fn load_market(path: &Path) -> Result<MarketSnapshot> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read market file at {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse market JSON from {}", path.display()))
}

fn read_source(path: &str) -> Result<String> {
    if path == "-" {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .context("Failed to read listing JSON from stdin")?;
        Ok(raw)
    } else {
        fs::read_to_string(path)
            .with_context(|| format!("Failed to read listing file at {}", path))
    }
}

fn display_name(path: &str) -> &str {
    if path == "-" {
        "stdin"
    } else {
        path
    }
}
