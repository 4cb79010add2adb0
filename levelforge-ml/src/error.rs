//! Error types for the levelforge-ml crate.

use levelforge_core::{ConfigError, Level, LevelRange, VectorError};
use std::fmt;
use thiserror::Error;

/// Top-level error type for scoring and counterfactual search.
#[derive(Debug, Error)]
pub enum MlError {
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Scoring error: {0}")]
    Score(#[from] ScoreError),

    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    #[error("Invalid vector: {0}")]
    Vector(#[from] VectorError),

    #[error("Core error: {0}")]
    Core(#[from] levelforge_core::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// A predictive model that cannot be built or paired with a schema.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("model expects {expected} features but the schema has {actual}")]
    FeatureCount { expected: usize, actual: usize },

    #[error("invalid decision tree: {reason}")]
    InvalidTree { reason: String },

    #[error("ensemble needs at least one tree")]
    EmptyEnsemble,

    #[error("level range {range} has min above max")]
    InvalidLevelRange { range: LevelRange },
}

impl ModelError {
    pub fn invalid_tree(reason: impl Into<String>) -> Self {
        Self::InvalidTree {
            reason: reason.into(),
        }
    }
}

/// Failure to score a characteristic vector.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoreError {
    #[error("invalid characteristic vector: {0}")]
    InvalidVector(#[from] VectorError),

    #[error("model '{model}' returned a non-finite prediction ({value})")]
    NonFinite { model: String, value: f64 },
}

/// Why a search stopped without finding any counterfactual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExhaustionReason {
    AttemptCeiling,
    Deadline,
}

impl fmt::Display for ExhaustionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AttemptCeiling => f.write_str("attempt ceiling reached"),
            Self::Deadline => f.write_str("deadline passed"),
        }
    }
}

/// Failure of a counterfactual search request.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid characteristic vector: {0}")]
    InvalidVector(#[from] VectorError),

    #[error("target level {target} is outside the scorer's range {range}")]
    InvalidTarget { target: Level, range: LevelRange },

    #[error("dataset profile does not cover the scorer's feature schema")]
    ProfileMismatch,

    #[error("invalid search options: {0}")]
    InvalidOptions(#[from] ConfigError),

    #[error("scorer failed on a generated candidate: {0}")]
    Scoring(#[from] ScoreError),

    #[error("no counterfactual for level {target} after {attempts} attempts ({reason})")]
    Exhausted {
        target: Level,
        attempts: usize,
        reason: ExhaustionReason,
    },
}

impl SearchError {
    /// Exhaustion can be retried with a larger budget; every other failure is a caller
    /// or programming error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }
}
