//! CLI argument parsing using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Text,
    Json,
    Csv,
}

/// geocache-sim - Monte-Carlo estimator for geographic API caches
#[derive(Parser, Debug)]
#[command(name = "geocache-sim")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// TOML configuration file (built-in defaults when omitted)
    #[arg(short = 'c', long, global = true, value_name = "FILE", env = "GEOCACHE_SIM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(flatten)]
    pub simulation: SimulationArgs,
}

/// Overrides for the `[simulation]` table
#[derive(Args, Debug, Default, Clone)]
pub struct SimulationArgs {
    /// Grid cell size (e.g., 100, 100m, 0.25km)
    #[arg(long, global = true)]
    pub cell_size: Option<String>,

    /// Edge length of the square area (e.g., 5000, 5km)
    #[arg(long, global = true)]
    pub area_size: Option<String>,

    /// Cache validity window (e.g., 4320, 72h, 3d; bare numbers are minutes)
    #[arg(long, global = true)]
    pub ttl: Option<String>,

    /// Jitter strength (e.g., 50, 50m)
    #[arg(long, global = true)]
    pub jitter: Option<String>,

    /// Smoothing runs per (model, density) pair
    #[arg(short = 'r', long, global = true)]
    pub runs: Option<usize>,

    /// Fixed random seed for reproducible results
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Worker threads for parallel runs (0 = one per CPU)
    #[arg(short = 't', long, global = true)]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sweep every model over every density and report hit-rate curves
    Sweep(SweepArgs),

    /// Run the named scenarios and print the cache performance summary
    Summary(ReportArgs),

    /// Draw sample request coordinates from one model
    Sample(SampleArgs),

    /// Print the effective configuration as TOML and exit
    ShowConfig,
}

/// Report destination options
#[derive(Args, Debug, Default, Clone)]
pub struct ReportArgs {
    /// Report format
    #[arg(short = 'f', long, value_enum)]
    pub format: Option<FormatArg>,

    /// Write the report to a file instead of stdout
    #[arg(short = 'o', long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Default, Clone)]
pub struct SweepArgs {
    /// Models to sweep (comma-separated names; default: all configured)
    #[arg(short = 'm', long, value_delimiter = ',', num_args = 1..)]
    pub models: Option<Vec<String>>,

    /// Request densities to sweep (comma-separated)
    #[arg(short = 'd', long, value_delimiter = ',', num_args = 1..)]
    pub densities: Option<Vec<u64>>,

    /// Illustrative request coordinates drawn per model
    #[arg(long)]
    pub sample_points: Option<usize>,

    /// Omit the per-cell heat grid
    #[arg(long)]
    pub no_heatmap: bool,

    /// Skip a failing model instead of aborting the sweep
    #[arg(long)]
    pub keep_going: bool,

    /// Validate the configuration without simulating
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub report: ReportArgs,
}

#[derive(Args, Debug, Clone)]
pub struct SampleArgs {
    /// Model name
    #[arg(short = 'm', long)]
    pub model: String,

    /// Number of coordinates to draw
    #[arg(short = 'n', long, default_value = "200")]
    pub count: usize,

    #[command(flatten)]
    pub report: ReportArgs,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
