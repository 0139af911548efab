//! Error types for the simulation core
//!
//! The core distinguishes fatal configuration problems from host-imposed
//! cancellation. Degenerate inputs (zero requests) are not errors; they are
//! logged and produce an empty result.

use thiserror::Error;

/// Errors raised by the simulation core
#[derive(Debug, Error)]
pub enum SimError {
    /// Malformed model, non-positive TTL, zero runs, bad grid geometry, etc.
    ///
    /// Always fatal. Raised before any run starts or as soon as a model is
    /// found to be unusable.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A host cancelled the aggregate call between two runs
    #[error("simulation cancelled after {completed_runs} completed run(s)")]
    Cancelled { completed_runs: usize },
}

impl SimError {
    /// Shorthand for building a [`SimError::Configuration`]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Whether this error is a configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_display() {
        let err = SimError::config("ttl must be positive");
        assert_eq!(err.to_string(), "configuration error: ttl must be positive");
        assert!(err.is_configuration());
    }

    #[test]
    fn test_cancelled_display() {
        let err = SimError::Cancelled { completed_runs: 3 };
        assert!(err.to_string().contains("3 completed run"));
        assert!(!err.is_configuration());
    }
}
