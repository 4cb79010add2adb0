//! # levelforge-core: Creature characteristics, dataset profiles and configuration
//!
//! Shared building blocks for predicting a Pathfinder 2e creature's level and suggesting
//! stat changes that reach a different level:
//!
//! - **Feature schema** - the fixed, ordered characteristics a model consumes
//! - **Characteristic vectors** - one creature's values in schema order
//! - **Level tables** - the flattened, labelled training data
//! - **Dataset profiles** - observed per-characteristic ranges that keep suggestions plausible
//! - **Configuration & logging** - layered `figment` config and `tracing` setup

pub mod config;
pub mod error;
pub mod level;
pub mod logging;
pub mod profile;
pub mod schema;
pub mod table;
pub mod vector;

pub use config::{LevelforgeConfig, LoggingConfig, SamplingPolicy, SearchOptions, load_config};
pub use error::{ConfigError, Error, ProfileError, Result, SchemaError, TableError, VectorError};
pub use level::{Level, LevelRange};
pub use profile::{CharacteristicProfile, DatasetProfile};
pub use schema::{Characteristic, CharacteristicKind, FeatureSchema, Trend, ValueDomain};
pub use table::{LevelRow, LevelTable};
pub use vector::CharacteristicVector;
