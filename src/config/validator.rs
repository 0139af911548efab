//! Configuration validation
//!
//! Everything is checked up front so a sweep never starts with a
//! configuration that would fail halfway through.

use super::*;
use crate::error::SimError;
use anyhow::Result;
use std::collections::HashSet;
use tracing::warn;

/// Validate complete configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_simulation(&config.simulation)?;
    validate_models(&config.models)?;
    validate_densities(&config.densities)?;
    validate_scenarios(&config.scenarios, &config.models)?;
    validate_output(&config.output)?;

    Ok(())
}

/// Validate grid geometry, TTL, jitter and run count
pub fn validate_simulation(params: &SimulationParams) -> Result<()> {
    params.validate()?;

    if params.jitter >= params.cell_size {
        warn!(
            jitter = params.jitter,
            cell_size = params.cell_size,
            "jitter is at least one cell wide; requests will spill into neighbouring cells"
        );
    }

    Ok(())
}

/// Validate named models
pub fn validate_models(models: &[NamedModel]) -> Result<()> {
    if models.is_empty() {
        return Err(SimError::config("at least one model must be configured").into());
    }

    let mut seen = HashSet::new();
    for named in models {
        if named.name.trim().is_empty() {
            return Err(SimError::config("model names must not be empty").into());
        }
        if !seen.insert(named.name.to_lowercase()) {
            return Err(SimError::config(format!("duplicate model name '{}'", named.name)).into());
        }
        named.model.validate().map_err(|e| match e {
            SimError::Configuration(msg) => {
                SimError::config(format!("model '{}': {}", named.name, msg))
            }
            other => other,
        })?;
    }

    Ok(())
}

/// Validate the density sweep
pub fn validate_densities(densities: &[u64]) -> Result<()> {
    if densities.is_empty() {
        return Err(SimError::config("at least one density must be configured").into());
    }
    if densities.contains(&0) {
        warn!("density 0 configured; it will always report a 0% hit rate");
    }
    Ok(())
}

/// Validate scenarios against the configured models
pub fn validate_scenarios(scenarios: &[Scenario], models: &[NamedModel]) -> Result<()> {
    for scenario in scenarios {
        if !models.iter().any(|m| m.name.eq_ignore_ascii_case(&scenario.model)) {
            return Err(SimError::config(format!(
                "scenario '{}' references unknown model '{}'",
                scenario.name, scenario.model
            ))
            .into());
        }
    }
    Ok(())
}

/// Validate output configuration
pub fn validate_output(output: &OutputConfig) -> Result<()> {
    if let Some(ref path) = output.path {
        if path.as_os_str().is_empty() {
            return Err(SimError::config("output path must not be empty").into());
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                return Err(SimError::config(format!(
                    "output directory does not exist: {}",
                    parent.display()
                ))
                .into());
            }
        }
    }
    Ok(())
}
