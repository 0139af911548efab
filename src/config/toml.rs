//! TOML configuration file parsing
//!
//! ```toml
//! densities = [100, 500, 1000]
//!
//! [simulation]
//! cell_size = 100.0
//! area_size = 5000.0
//! ttl = 4320
//! runs = 5
//! seed = 42
//!
//! [[models]]
//! name = "Downtown"
//! model = { type = "gaussian", mean = 2500.0, stddev = 150.0 }
//!
//! [[scenarios]]
//! name = "Urban (City)"
//! model = "Downtown"
//! requests = 5000
//! ```
//!
//! Omitted sections fall back to the built-in presets.

use super::cli_convert::{output_format, parse_distance, parse_ttl_minutes};
use super::*;
use crate::config::cli::{Cli, Command};
use crate::error::SimError;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Parse TOML configuration file
pub fn parse_toml_file(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_toml_string(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse TOML configuration from string
///
/// Syntax errors, unknown fields and unknown model types are all reported
/// as configuration errors.
pub fn parse_toml_string(contents: &str) -> Result<Config> {
    let config: Config = ::toml::from_str(contents)
        .map_err(|e| SimError::config(format!("invalid TOML configuration: {}", e)))?;

    Ok(config)
}

/// Serialize a configuration back to TOML
pub fn to_toml_string(config: &Config) -> Result<String> {
    ::toml::to_string_pretty(config).context("Failed to serialize configuration")
}

/// Load the configuration named on the command line, or the presets
pub fn load_config(cli: &Cli) -> Result<Config> {
    let config = match &cli.config {
        Some(path) => parse_toml_file(path)?,
        None => Config::default(),
    };
    merge_cli_with_config(cli, config)
}

/// Merge CLI arguments with TOML configuration (CLI takes precedence)
pub fn merge_cli_with_config(cli: &Cli, mut config: Config) -> Result<Config> {
    let sim = &cli.simulation;

    if let Some(ref cell_size) = sim.cell_size {
        config.simulation.cell_size = parse_distance(cell_size)?;
    }
    if let Some(ref area_size) = sim.area_size {
        config.simulation.area_size = parse_distance(area_size)?;
    }
    if let Some(ref ttl) = sim.ttl {
        config.simulation.ttl = parse_ttl_minutes(ttl)?;
    }
    if let Some(ref jitter) = sim.jitter {
        config.simulation.jitter = parse_distance(jitter)?;
    }
    if let Some(runs) = sim.runs {
        config.simulation.runs = runs;
    }
    if let Some(seed) = sim.seed {
        config.simulation.seed = Some(seed);
    }
    if let Some(threads) = sim.threads {
        config.simulation.threads = threads;
    }

    let report = match &cli.command {
        Command::Sweep(args) => {
            if let Some(ref names) = args.models {
                config.select_models(names)?;
            }
            if let Some(ref densities) = args.densities {
                config.densities = densities.clone();
            }
            if let Some(points) = args.sample_points {
                config.output.sample_points = points;
            }
            if args.no_heatmap {
                config.output.heatmap = false;
            }
            if args.keep_going {
                config.runtime.keep_going = true;
            }
            Some(&args.report)
        }
        Command::Summary(report) => Some(report),
        Command::Sample(args) => Some(&args.report),
        Command::ShowConfig => None,
    };

    if let Some(report) = report {
        if let Some(format) = report.format {
            config.output.format = output_format(format);
        }
        if let Some(ref path) = report.output {
            config.output.path = Some(path.clone());
        }
    }

    Ok(config)
}
