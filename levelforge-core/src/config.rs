//! Configuration system for Levelforge.
//!
//! Uses `figment` for layered configuration: defaults -> config file -> environment -> overrides.
//! Environment variables are prefixed with `LEVELFORGE_` and use `__` to reach nested keys,
//! e.g. `LEVELFORGE_SEARCH__MAX_ATTEMPTS=50000`.

use crate::error::ConfigError;
use crate::level::LevelRange;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

const ENV_PREFIX: &str = "LEVELFORGE_";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LevelforgeConfig {
    /// Counterfactual search policy.
    #[serde(default)]
    pub search: SearchOptions,
    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Levels the scorer can represent.
    #[serde(default)]
    pub levels: LevelRange,
}

/// How replacement values are drawn from a characteristic's plausible range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingPolicy {
    /// Every integer in range is equally likely.
    #[default]
    Uniform,
    /// Values are weighted by how often the training data shows them.
    /// Falls back to uniform outside the observed range.
    Observed,
}

/// Counterfactual search policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Accepted counterfactuals that make a complete answer.
    #[serde(default = "default_total_counterfactuals")]
    pub total_counterfactuals: usize,
    /// Hard ceiling on generated candidates per request.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
    /// Candidates generated per stage before the search widens.
    #[serde(default = "default_attempts_per_stage")]
    pub attempts_per_stage: usize,
    /// Largest number of characteristics changed at once (schema length if unset).
    #[serde(default)]
    pub max_modified: Option<usize>,
    /// Number of range-widening rounds after every subset size was tried.
    #[serde(default = "default_range_widenings")]
    pub range_widenings: usize,
    /// Fraction of a characteristic's observed span added per widening round.
    #[serde(default = "default_widening_step")]
    pub widening_step: f64,
    #[serde(default)]
    pub sampling: SamplingPolicy,
    /// Probability that a sampled value moves toward the target level.
    #[serde(default = "default_direction_bias")]
    pub direction_bias: f64,
    /// Fixed seed for reproducible searches.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Score each batch across worker threads.
    #[serde(default = "default_true")]
    pub parallel: bool,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Wall-clock budget in milliseconds, checked between batches.
    #[serde(default)]
    pub deadline_ms: Option<u64>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            total_counterfactuals: default_total_counterfactuals(),
            max_attempts: default_max_attempts(),
            attempts_per_stage: default_attempts_per_stage(),
            max_modified: None,
            range_widenings: default_range_widenings(),
            widening_step: default_widening_step(),
            sampling: SamplingPolicy::default(),
            direction_bias: default_direction_bias(),
            seed: None,
            parallel: true,
            batch_size: default_batch_size(),
            deadline_ms: None,
        }
    }
}

impl SearchOptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("total_counterfactuals", self.total_counterfactuals),
            ("max_attempts", self.max_attempts),
            ("attempts_per_stage", self.attempts_per_stage),
            ("batch_size", self.batch_size),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(invalid(field, "must be greater than zero"));
            }
        }
        if self.max_modified == Some(0) {
            return Err(invalid("max_modified", "must be greater than zero"));
        }
        if !(0.0..=1.0).contains(&self.direction_bias) {
            return Err(invalid("direction_bias", "must lie in [0, 1]"));
        }
        if !self.widening_step.is_finite() || self.widening_step < 0.0 {
            return Err(invalid("widening_step", "must be a non-negative number"));
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `levelforge_ml=debug`.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
    #[serde(default)]
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
            with_target: false,
        }
    }
}

fn default_total_counterfactuals() -> usize {
    4
}

fn default_max_attempts() -> usize {
    20_000
}

fn default_attempts_per_stage() -> usize {
    400
}

fn default_range_widenings() -> usize {
    2
}

fn default_widening_step() -> f64 {
    0.25
}

fn default_direction_bias() -> f64 {
    0.8
}

fn default_batch_size() -> usize {
    64
}

fn default_log_filter() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Explicit overrides (passed as argument)
/// 2. Environment variables (prefixed with `LEVELFORGE_`)
/// 3. The TOML file at `file`, when it exists
/// 4. Built-in defaults
pub fn load_config(
    file: Option<&Path>,
    overrides: Option<&LevelforgeConfig>,
) -> Result<LevelforgeConfig, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(LevelforgeConfig::default()));

    if let Some(path) = file {
        if path.exists() {
            figment = figment.merge(Toml::file(path));
        } else {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
        }
    }

    figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

    if let Some(overrides) = overrides {
        figment = figment.merge(Serialized::defaults(overrides));
    }

    let config: LevelforgeConfig = figment.extract().map_err(Box::new)?;
    config.search.validate()?;
    Ok(config)
}
