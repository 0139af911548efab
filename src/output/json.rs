//! JSON output formatting
//!
//! Reports are written as pretty-printed JSON. Per-cell maps are serialized
//! as `{x, y, hits}` lists and heat grids as row-major `[y][x]` arrays.

use crate::Result;
use anyhow::Context;
use serde::Serialize;
use std::io::Write;

/// Write any report as pretty JSON followed by a newline
pub fn write_json<W: Write + ?Sized, T: Serialize + ?Sized>(w: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *w, value).context("Failed to serialize JSON report")?;
    writeln!(w)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::SimulationParams;
    use crate::sweep::{DensityPoint, HeatGrid, ModelSweep, SweepReport};
    use crate::distribution::SpatialModel;
    use chrono::Utc;

    fn report() -> SweepReport {
        SweepReport {
            generated_at: Utc::now(),
            simulation: SimulationParams::default(),
            densities: vec![100],
            models: vec![ModelSweep {
                name: "Downtown".into(),
                model: SpatialModel::Gaussian { mean: 2500.0, stddev: 150.0 },
                points: vec![DensityPoint {
                    requests: 100,
                    average_hit_rate: 0.5,
                    total_hits: 250,
                    total_misses: 250,
                    cells_hit: 12,
                }],
                heat_grid: Some(HeatGrid::new(2)),
                sample_points: vec![],
            }],
            skipped: vec![],
        }
    }

    #[test]
    fn test_sweep_report_json_shape() {
        let mut buf = Vec::new();
        write_json(&mut buf, &report()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(value["simulation"]["ttl"], 4320);
        assert_eq!(value["models"][0]["name"], "Downtown");
        assert_eq!(value["models"][0]["model"]["type"], "gaussian");
        assert_eq!(value["models"][0]["points"][0]["average_hit_rate"], 0.5);
        assert_eq!(value["models"][0]["heat_grid"]["values"][1][1], 0.0);
        assert!(value.get("skipped").is_none());
        assert!(value["generated_at"].is_string());
    }

    #[test]
    fn test_sweep_report_json_parses_back() {
        let original = report();
        let mut buf = Vec::new();
        write_json(&mut buf, &original).unwrap();
        let back: SweepReport = serde_json::from_slice(&buf).unwrap();
        assert_eq!(back.models, original.models);
        assert_eq!(back.simulation, original.simulation);
    }
}
