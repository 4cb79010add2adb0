//! Level scorer: maps a characteristic vector to a predicted level.
//!
//! The trained model is opaque. Anything that turns a schema-ordered feature slice into a
//! number implements [`Predictor`]; the scorer adds schema validation, rounding, and
//! clamping to the representable level range.

use crate::error::{ModelError, ScoreError};
use levelforge_core::{CharacteristicVector, FeatureSchema, Level, LevelRange};
use std::fmt;
use std::sync::Arc;

/// A trained model exposing a single capability: predict a level from features in schema order.
///
/// Implementations must be pure: the same input always yields the same output.
pub trait Predictor: Send + Sync {
    fn predict(&self, features: &[f64]) -> f64;

    /// Human-readable model name for logs and errors.
    fn name(&self) -> &str {
        "predictor"
    }

    /// Number of features the model was trained on, if it knows.
    fn input_len(&self) -> Option<usize> {
        None
    }
}

impl<F> Predictor for F
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    fn predict(&self, features: &[f64]) -> f64 {
        self(features)
    }

    fn name(&self) -> &str {
        "closure"
    }
}

/// Wraps a [`Predictor`] with the schema and level range it serves.
///
/// Cheap to clone; every field is shared read-only.
#[derive(Clone)]
pub struct LevelScorer {
    schema: Arc<FeatureSchema>,
    model: Arc<dyn Predictor>,
    range: LevelRange,
}

impl LevelScorer {
    pub fn new(
        schema: Arc<FeatureSchema>,
        model: Arc<dyn Predictor>,
        range: LevelRange,
    ) -> Result<Self, ModelError> {
        if !range.is_ordered() {
            return Err(ModelError::InvalidLevelRange { range });
        }
        if let Some(expected) = model.input_len() {
            if expected != schema.len() {
                return Err(ModelError::FeatureCount {
                    expected,
                    actual: schema.len(),
                });
            }
        }
        Ok(Self {
            schema,
            model,
            range,
        })
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn level_range(&self) -> LevelRange {
        self.range
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Predict the level of `vector`.
    ///
    /// The raw prediction is rounded half away from zero and clamped into the level range.
    pub fn score(&self, vector: &CharacteristicVector) -> Result<Level, ScoreError> {
        self.schema.validate(vector)?;
        let raw = self.model.predict(&vector.as_features());
        if !raw.is_finite() {
            return Err(ScoreError::NonFinite {
                model: self.model.name().to_string(),
                value: raw,
            });
        }
        let level = raw
            .round()
            .clamp(f64::from(self.range.min.get()), f64::from(self.range.max.get()));
        tracing::trace!(raw, level, "Scored characteristic vector");
        Ok(Level(level as i32))
    }
}

impl fmt::Debug for LevelScorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LevelScorer")
            .field("model", &self.model.name())
            .field("characteristics", &self.schema.len())
            .field("range", &self.range)
            .finish()
    }
}
