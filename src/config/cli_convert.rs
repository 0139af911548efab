//! CLI to Config conversion utilities

use crate::config::cli::FormatArg;
use crate::config::OutputFormat;
use anyhow::{Context, Result};

/// Parse a distance string (e.g., "100", "100m", "5km") to meters
pub fn parse_distance(s: &str) -> Result<f64> {
    let s = s.trim().to_lowercase();

    let (num_str, multiplier) = if s.ends_with("km") {
        (s.trim_end_matches("km"), 1000.0)
    } else if s.ends_with('m') {
        (s.trim_end_matches('m'), 1.0)
    } else {
        (s.as_str(), 1.0)
    };

    let num: f64 = num_str
        .trim()
        .parse()
        .with_context(|| format!("Invalid distance format: {}", s))?;

    Ok(num * multiplier)
}

/// Parse a cache window (e.g., "4320", "90m", "72h", "3d") to minutes
///
/// Bare numbers are minutes, matching the unit of simulated timestamps.
pub fn parse_ttl_minutes(s: &str) -> Result<u64> {
    let s = s.trim().to_lowercase();

    let (num_str, multiplier) = if s.ends_with("min") {
        (s.trim_end_matches("min"), 1u64)
    } else if s.ends_with('m') {
        (s.trim_end_matches('m'), 1)
    } else if s.ends_with('h') {
        (s.trim_end_matches('h'), 60)
    } else if s.ends_with('d') {
        (s.trim_end_matches('d'), 24 * 60)
    } else {
        (s.as_str(), 1)
    };

    let num: u64 = num_str
        .trim()
        .parse()
        .with_context(|| format!("Invalid TTL format: {}", s))?;

    num.checked_mul(multiplier)
        .with_context(|| format!("TTL too large: {}", s))
}

pub fn output_format(arg: FormatArg) -> OutputFormat {
    match arg {
        FormatArg::Text => OutputFormat::Text,
        FormatArg::Json => OutputFormat::Json,
        FormatArg::Csv => OutputFormat::Csv,
    }
}
