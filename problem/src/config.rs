//! Construction-time problem configuration.
//!
//! Configuration is fixed once a problem is built; nothing here is consulted
//! for mutation at run time.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::valuation::ValueOrder;

const DEFAULT_ACTION_COST: f64 = 1.0;
const DEFAULT_SAMPLE_SIZE: usize = 8;

/// Shared configuration for table-driven and sampled problems.
///
/// Every field has a default, so `{}` is a valid configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProblemConfig {
    /// Whether one action may yield several outcomes.
    pub stochastic: bool,
    /// Cost of an action with no per-action override.
    pub default_action_cost: f64,
    /// Upper bound on sampled actions per state (sampled problems only).
    pub default_sample_size: usize,
    /// Base seed mixed with each state's fingerprint when sampling.
    pub sampler_seed: u64,
    /// Direction of `is_better_or_equal`.
    pub value_order: ValueOrder,
}

impl Default for ProblemConfig {
    fn default() -> Self {
        Self {
            stochastic: false,
            default_action_cost: DEFAULT_ACTION_COST,
            default_sample_size: DEFAULT_SAMPLE_SIZE,
            sampler_seed: 0,
            value_order: ValueOrder::HigherIsBetter,
        }
    }
}

/// Failure loading or validating a [`ProblemConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {detail}")]
    Invalid { detail: String },
}

impl ProblemConfig {
    /// Parse and validate a JSON configuration document.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] on malformed JSON or unknown fields,
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a JSON configuration file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`ProblemConfig::from_json_str`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] if the default action cost is not finite or
    /// the default sample size is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.default_action_cost.is_finite() {
            return Err(ConfigError::Invalid {
                detail: format!(
                    "default_action_cost must be finite, got {}",
                    self.default_action_cost
                ),
            });
        }
        if self.default_sample_size == 0 {
            return Err(ConfigError::Invalid {
                detail: "default_sample_size must be at least 1".into(),
            });
        }
        Ok(())
    }
}
