//! Counterfactual explanations: minimal characteristic changes that move a creature to a
//! requested level.

pub mod candidate;
pub mod engine;
pub(crate) mod sampler;

pub use candidate::{Change, Counterfactual, CounterfactualSet, SearchStats};
pub use engine::{CounterfactualEngine, generate};
