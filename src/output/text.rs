//! Human-readable text output

use crate::sweep::{HeatGrid, ModelSweep, SampleReport, ScenarioOutcome, SweepReport};
use crate::Result;
use std::io::Write;

const RULE: &str = "═══════════════════════════════════════════════════════════";

/// Shading ramp for heat grids, coldest first
const SHADES: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Write a full sweep report
///
/// Displays, per model:
/// - Hit-rate curve over the density sweep
/// - Heat grid of where hits landed (if enabled)
///
/// followed by a comparison table of all models and any skipped models.
pub fn write_sweep<W: Write + ?Sized>(w: &mut W, report: &SweepReport) -> Result<()> {
    let sim = &report.simulation;

    writeln!(w, "{}", RULE)?;
    writeln!(w, "                 CACHE HIT-RATE SWEEP")?;
    writeln!(w, "{}", RULE)?;
    writeln!(w)?;
    writeln!(w, "Generated:  {}", report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"))?;
    writeln!(w, "Area:       {} m x {} m", sim.area_size, sim.area_size)?;
    writeln!(w, "Cell size:  {} m", sim.cell_size)?;
    writeln!(w, "TTL:        {} min", format_number(sim.ttl))?;
    writeln!(w, "Jitter:     ±{} m", sim.jitter)?;
    writeln!(w, "Runs:       {}", sim.runs)?;
    if let Some(seed) = sim.seed {
        writeln!(w, "Seed:       {}", seed)?;
    }
    writeln!(w)?;

    for sweep in &report.models {
        write_model_sweep(w, sweep)?;
    }

    write_comparison(w, report)?;

    if !report.skipped.is_empty() {
        writeln!(w, "Skipped models:")?;
        for skipped in &report.skipped {
            writeln!(w, "  {}: {}", skipped.name, skipped.error)?;
        }
        writeln!(w)?;
    }

    writeln!(w, "{}", RULE)?;
    Ok(())
}

fn write_model_sweep<W: Write + ?Sized>(w: &mut W, sweep: &ModelSweep) -> Result<()> {
    writeln!(w, "--- {} [{}] ---", sweep.name, sweep.model)?;
    writeln!(w)?;
    writeln!(w, "{:>10}  {:50}  {:>7}  {:>10}", "Requests", "", "Hit %", "Cells hit")?;

    for point in &sweep.points {
        let percent = point.average_hit_rate * 100.0;
        // Scale to 50 chars max
        let bar_len = (point.average_hit_rate.clamp(0.0, 1.0) * 50.0) as usize;
        writeln!(
            w,
            "{:>10}  {:50}  {:>6.2}%  {:>10}",
            format_number(point.requests),
            "█".repeat(bar_len),
            percent,
            format_number(point.cells_hit as u64)
        )?;
    }
    writeln!(w)?;

    if let Some(ref heat) = sweep.heat_grid {
        write_heat_grid(w, heat)?;
    }

    if !sweep.sample_points.is_empty() {
        writeln!(w, "Sample requests: {} drawn", sweep.sample_points.len())?;
        for c in sweep.sample_points.iter().take(5) {
            writeln!(w, "  ({:.1}, {:.1})", c.x, c.y)?;
        }
        writeln!(w)?;
    }

    Ok(())
}

/// Render a heat grid with `y` growing downwards, one character per cell
pub fn write_heat_grid<W: Write + ?Sized>(w: &mut W, heat: &HeatGrid) -> Result<()> {
    let max = heat.max();
    writeln!(w, "Hit Heatmap ({}x{} cells):", heat.cells_per_axis, heat.cells_per_axis)?;

    let border = "-".repeat(heat.cells_per_axis as usize);
    writeln!(w, "  +{}+", border)?;
    for row in &heat.values {
        let line: String = row.iter().map(|&v| shade(v, max)).collect();
        writeln!(w, "  |{}|", line)?;
    }
    writeln!(w, "  +{}+", border)?;
    writeln!(w)?;
    Ok(())
}

fn shade(value: f64, max: f64) -> char {
    if max <= 0.0 || value <= 0.0 {
        return SHADES[0];
    }
    let steps = (SHADES.len() - 1) as f64;
    // Any non-zero cell gets at least the faintest mark
    let idx = ((value / max) * steps).ceil().clamp(1.0, steps) as usize;
    SHADES[idx]
}

fn write_comparison<W: Write + ?Sized>(w: &mut W, report: &SweepReport) -> Result<()> {
    if report.models.is_empty() {
        return Ok(());
    }

    writeln!(w, "Average Hit Rate by Density (%):")?;
    write!(w, "{:>10}", "Requests")?;
    for sweep in &report.models {
        write!(w, "  {:>12}", truncate(&sweep.name, 12))?;
    }
    writeln!(w)?;

    for (i, requests) in report.densities.iter().enumerate() {
        write!(w, "{:>10}", format_number(*requests))?;
        for sweep in &report.models {
            match sweep.points.get(i) {
                Some(point) => write!(w, "  {:>12.2}", point.average_hit_rate * 100.0)?,
                None => write!(w, "  {:>12}", "-")?,
            }
        }
        writeln!(w)?;
    }
    writeln!(w)?;
    Ok(())
}

/// Write the scenario summary
pub fn write_summary<W: Write + ?Sized>(w: &mut W, outcomes: &[ScenarioOutcome]) -> Result<()> {
    writeln!(w, "--- Cache Performance Summary ---")?;

    for outcome in outcomes {
        writeln!(w)?;
        writeln!(w, "--- {} Simulation ---", outcome.name)?;
        writeln!(
            w,
            "Model: {} ({} requests per run)",
            outcome.model,
            format_number(outcome.requests)
        )?;
        writeln!(w, "Total API Calls: {}", format_number(outcome.total_calls))?;
        writeln!(w, "Cache Hits: {} ({:.2}%)", format_number(outcome.hits), outcome.hit_percent)?;
        writeln!(
            w,
            "Cache Misses: {} ({:.2}%)",
            format_number(outcome.misses),
            outcome.miss_percent
        )?;
        writeln!(w, "Estimated API Calls Saved: {:.2}%", outcome.calls_saved_percent())?;
    }

    Ok(())
}

/// Write sampled coordinates
pub fn write_samples<W: Write + ?Sized>(w: &mut W, report: &SampleReport) -> Result<()> {
    writeln!(
        w,
        "Sample requests for {} ({} points, {} m area, {} m cells):",
        report.model,
        report.points.len(),
        report.area_size,
        report.cell_size
    )?;
    writeln!(w, "{:>10}  {:>10}  {:>8}", "x", "y", "cell")?;
    for p in &report.points {
        writeln!(w, "{:>10.1}  {:>10.1}  ({}, {})", p.x, p.y, p.cell_x, p.cell_y)?;
    }
    Ok(())
}

fn truncate(name: &str, max: usize) -> String {
    if name.chars().count() <= max {
        name.to_string()
    } else {
        name.chars().take(max).collect()
    }
}

/// Format a number with thousands separators
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();

    for (count, c) in s.chars().rev().enumerate() {
        if count > 0 && count % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }

    result.chars().rev().collect()
}
