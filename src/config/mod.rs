//! Configuration module
//!
//! Handles CLI argument parsing, TOML configuration files, and validation.
//! Everything the simulation core needs arrives here as explicit values:
//! grid geometry, TTL, jitter, smoothing runs, the named models and the
//! densities to sweep.

pub mod cli;
pub mod cli_convert;
pub mod presets;
pub mod toml;
pub mod validator;

use crate::distribution::SpatialModel;
use crate::simulator::SimulationParams;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Complete sweep configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub simulation: SimulationParams,
    /// Request counts to sweep, per model
    #[serde(default = "presets::default_densities")]
    pub densities: Vec<u64>,
    #[serde(default = "presets::default_models")]
    pub models: Vec<NamedModel>,
    #[serde(default = "presets::default_scenarios")]
    pub scenarios: Vec<Scenario>,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            simulation: SimulationParams::default(),
            densities: presets::default_densities(),
            models: presets::default_models(),
            scenarios: presets::default_scenarios(),
            output: OutputConfig::default(),
            runtime: RuntimeConfig::default(),
        }
    }
}

impl Config {
    /// Look up a model by name (case-insensitive)
    pub fn model(&self, name: &str) -> Option<&NamedModel> {
        self.models.iter().find(|m| m.name.eq_ignore_ascii_case(name))
    }

    /// Keep only the named models, in the order given
    ///
    /// Scenarios that reference a dropped model are dropped as well.
    pub fn select_models(&mut self, names: &[String]) -> anyhow::Result<()> {
        let mut selected = Vec::with_capacity(names.len());
        for name in names {
            match self.model(name) {
                Some(model) => selected.push(model.clone()),
                None => anyhow::bail!(
                    "Unknown model '{}' (available: {})",
                    name,
                    self.model_names().join(", ")
                ),
            }
        }
        self.models = selected;
        let models = &self.models;
        self.scenarios
            .retain(|s| models.iter().any(|m| m.name.eq_ignore_ascii_case(&s.model)));
        Ok(())
    }

    pub fn model_names(&self) -> Vec<&str> {
        self.models.iter().map(|m| m.name.as_str()).collect()
    }
}

/// A distribution model with a display name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedModel {
    pub name: String,
    pub model: SpatialModel,
}

impl NamedModel {
    pub fn new(name: impl Into<String>, model: SpatialModel) -> Self {
        Self { name: name.into(), model }
    }
}

/// A named (model, request count) pair for the summary report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    /// Name of an entry in `models`
    pub model: String,
    /// Number of requests over the cache window
    pub requests: u64,
}

impl Scenario {
    pub fn new(name: impl Into<String>, model: impl Into<String>, requests: u64) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            requests,
        }
    }
}

/// Report format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Write the report to this file instead of stdout
    pub path: Option<PathBuf>,
    /// Illustrative points drawn per model at the highest density
    pub sample_points: usize,
    /// Include the per-cell heat grid in reports
    pub heatmap: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            path: None,
            sample_points: 200,
            heatmap: true,
        }
    }
}

/// Runtime behavior
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Skip a failing model instead of aborting the sweep
    pub keep_going: bool,
}
