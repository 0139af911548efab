//! geocache-sim CLI entry point

use anyhow::{Context, Result};
use geocache_sim::config::cli::{Cli, Command, SampleArgs};
use geocache_sim::config::{toml as config_toml, validator, Config};
use geocache_sim::grid::Grid;
use geocache_sim::output;
use geocache_sim::simulator::Simulator;
use geocache_sim::sweep;
use tracing::{debug, info, Level};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    init_logging(cli.debug);

    info!("geocache-sim v{}", env!("CARGO_PKG_VERSION"));

    let config = config_toml::load_config(&cli).context("Failed to build configuration")?;
    validator::validate_config(&config).context("Configuration validation failed")?;
    debug!(simulation = ?config.simulation, models = ?config.model_names(), "configuration loaded");

    match cli.command {
        Command::ShowConfig => show_config(&config),
        Command::Sweep(ref args) if args.dry_run => {
            print_configuration(&config);
            println!();
            println!("Dry run mode - configuration validated successfully");
            Ok(())
        }
        Command::Sweep(_) => run_sweep(&config),
        Command::Summary(_) => run_summary(&config),
        Command::Sample(ref args) => run_sample(&config, args),
    }
}

/// Logs go to stderr so reports on stdout stay machine-readable
fn init_logging(debug: bool) {
    let default_level = if debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn build_simulator(config: &Config) -> Result<Simulator> {
    let sim = Simulator::new(config.simulation.clone()).context("Failed to create simulator")?;
    info!(
        cells = sim.grid().num_cells(),
        threads = config.simulation.effective_threads(),
        runs = config.simulation.runs,
        "simulator ready"
    );
    Ok(sim)
}

fn run_sweep(config: &Config) -> Result<()> {
    let sim = build_simulator(config)?;
    let report = sweep::run_sweep(&sim, config)?;
    output::emit_sweep(&report, &config.output)?;

    if let Some(ref path) = config.output.path {
        info!("Sweep report written to {}", path.display());
    }
    Ok(())
}

fn run_summary(config: &Config) -> Result<()> {
    if config.scenarios.is_empty() {
        anyhow::bail!("No scenarios configured");
    }

    let sim = build_simulator(config)?;
    let outcomes = sweep::run_scenarios(&sim, config)?;
    output::emit_scenarios(&outcomes, &config.output)?;

    if let Some(ref path) = config.output.path {
        info!("Summary written to {}", path.display());
    }
    Ok(())
}

fn run_sample(config: &Config, args: &SampleArgs) -> Result<()> {
    let named = config.model(&args.model).with_context(|| {
        format!(
            "Unknown model '{}' (available: {})",
            args.model,
            config.model_names().join(", ")
        )
    })?;

    let sim = build_simulator(config)?;
    let report = sweep::draw_samples(&sim, named, args.count)?;
    output::emit_samples(&report, &config.output)
}

fn show_config(config: &Config) -> Result<()> {
    print!("{}", config_toml::to_toml_string(config)?);
    Ok(())
}

fn print_configuration(config: &Config) {
    let sim = &config.simulation;
    println!("Configuration:");
    println!("  Simulation:");
    println!("    Area: {} m, cell: {} m", sim.area_size, sim.cell_size);
    if let Ok(grid) = Grid::new(sim.cell_size, sim.area_size) {
        println!("    Grid: {0}x{0} cells", grid.cells_per_axis());
    }
    println!("    TTL: {} min, jitter: ±{} m", sim.ttl, sim.jitter);
    println!("    Runs: {}, threads: {}", sim.runs, sim.effective_threads());
    if let Some(seed) = sim.seed {
        println!("    Seed: {}", seed);
    }

    println!("  Models:");
    for named in &config.models {
        println!("    {}: {}", named.name, named.model);
    }

    println!("  Densities: {:?}", config.densities);
    let destination = config
        .output
        .path
        .as_ref()
        .map(|p| format!(" -> {}", p.display()))
        .unwrap_or_default();
    println!("  Output: {}{}", config.output.format, destination);
}
