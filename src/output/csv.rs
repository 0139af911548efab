//! CSV output formatting
//!
//! One header row, then one row per record, ready for pandas or a
//! spreadsheet:
//! - Sweeps: one row per (model, density) pair
//! - Scenarios: one row per scenario
//! - Samples: one row per drawn coordinate
//!
//! Model and scenario names are quoted when they contain commas or quotes.

use crate::sweep::{SampleReport, ScenarioOutcome, SweepReport};
use crate::Result;
use std::io::Write;

/// Write sweep results
pub fn write_sweep<W: Write + ?Sized>(w: &mut W, report: &SweepReport) -> Result<()> {
    writeln!(w, "model,requests,average_hit_rate,hit_percent,total_hits,total_misses,cells_hit")?;

    for sweep in &report.models {
        let name = escape(&sweep.name);
        for point in &sweep.points {
            writeln!(
                w,
                "{},{},{:.6},{:.2},{},{},{}",
                name,
                point.requests,
                point.average_hit_rate,
                point.average_hit_rate * 100.0,
                point.total_hits,
                point.total_misses,
                point.cells_hit
            )?;
        }
    }

    Ok(())
}

/// Write scenario outcomes
pub fn write_scenarios<W: Write + ?Sized>(w: &mut W, outcomes: &[ScenarioOutcome]) -> Result<()> {
    writeln!(w, "scenario,model,requests,total_calls,hits,misses,hit_percent,miss_percent")?;

    for o in outcomes {
        writeln!(
            w,
            "{},{},{},{},{},{},{:.2},{:.2}",
            escape(&o.name),
            escape(&o.model),
            o.requests,
            o.total_calls,
            o.hits,
            o.misses,
            o.hit_percent,
            o.miss_percent
        )?;
    }

    Ok(())
}

/// Write sampled coordinates
pub fn write_samples<W: Write + ?Sized>(w: &mut W, report: &SampleReport) -> Result<()> {
    writeln!(w, "model,x,y,cell_x,cell_y")?;

    let model = escape(&report.model);
    for p in &report.points {
        writeln!(w, "{},{:.3},{:.3},{},{}", model, p.x, p.y, p.cell_x, p.cell_y)?;
    }

    Ok(())
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
