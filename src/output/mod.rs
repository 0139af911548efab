//! Report output
//!
//! Renders sweep, scenario and sample reports as human-readable text, JSON
//! or CSV. Reports go to stdout unless an output path is configured.

pub mod csv;
pub mod json;
pub mod text;

use crate::config::{OutputConfig, OutputFormat};
use crate::sweep::{SampleReport, ScenarioOutcome, SweepReport};
use crate::Result;
use anyhow::Context;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Open the report destination: a file when `path` is set, stdout otherwise
pub fn open_writer(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}

/// Write a sweep report in the configured format
pub fn emit_sweep(report: &SweepReport, output: &OutputConfig) -> Result<()> {
    let mut w = open_writer(output.path.as_deref())?;
    match output.format {
        OutputFormat::Text => text::write_sweep(&mut w, report)?,
        OutputFormat::Json => json::write_json(&mut w, report)?,
        OutputFormat::Csv => csv::write_sweep(&mut w, report)?,
    }
    w.flush()?;
    Ok(())
}

/// Write scenario outcomes in the configured format
pub fn emit_scenarios(outcomes: &[ScenarioOutcome], output: &OutputConfig) -> Result<()> {
    let mut w = open_writer(output.path.as_deref())?;
    match output.format {
        OutputFormat::Text => text::write_summary(&mut w, outcomes)?,
        OutputFormat::Json => json::write_json(&mut w, &outcomes)?,
        OutputFormat::Csv => csv::write_scenarios(&mut w, outcomes)?,
    }
    w.flush()?;
    Ok(())
}

/// Write sampled coordinates in the configured format
pub fn emit_samples(report: &SampleReport, output: &OutputConfig) -> Result<()> {
    let mut w = open_writer(output.path.as_deref())?;
    match output.format {
        OutputFormat::Text => text::write_samples(&mut w, report)?,
        OutputFormat::Json => json::write_json(&mut w, report)?,
        OutputFormat::Csv => csv::write_samples(&mut w, report)?,
    }
    w.flush()?;
    Ok(())
}
