//! # levelforge-ml: Level scoring and counterfactual search
//!
//! Wraps an externally trained level model behind the [`Predictor`] capability and searches
//! for small, plausible changes to a creature's characteristics that make the model predict
//! a requested level.
//!
//! ```no_run
//! use std::sync::Arc;
//! use levelforge_core::{DatasetProfile, FeatureSchema, Level, LevelRange, SearchOptions};
//! use levelforge_ml::{LevelScorer, LinearModel, MlError, counterfactual};
//!
//! # fn main() -> Result<(), MlError> {
//! let schema = Arc::new(FeatureSchema::core());
//! let profile = DatasetProfile::load("bestiary.jsonl", &schema)?;
//! let model = Arc::new(LinearModel::new(vec![0.1, 0.1, 0.2, 0.0, 0.1, 0.05, 0.3, 0.02], -9.0));
//! let scorer = LevelScorer::new(schema.clone(), model, LevelRange::PATHFINDER)?;
//!
//! let monster = schema.vector_from_pairs([
//!     ("str", 7), ("dex", 2), ("con", 5), ("int", 1),
//!     ("wis", 2), ("cha", 1), ("ac", 29), ("hp", 215),
//! ])?;
//! let found = counterfactual::generate(&monster, Level(9), &scorer, &profile, &SearchOptions::default())?;
//! for cf in &found {
//!     println!("{:?}", cf.changes(&monster));
//! }
//! # Ok(())
//! # }
//! ```

pub mod counterfactual;
pub mod error;
pub mod model;
pub mod scorer;

pub use counterfactual::{Counterfactual, CounterfactualEngine, CounterfactualSet, SearchStats};
pub use error::{ExhaustionReason, MlError, ModelError, ScoreError, SearchError};
pub use model::{Aggregation, DecisionTree, LinearModel, TreeEnsemble, TreeNode};
pub use scorer::{LevelScorer, Predictor};

pub use levelforge_core::{SamplingPolicy, SearchOptions};
