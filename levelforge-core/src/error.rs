//! Error types for the Levelforge core library.
//!
//! Uses `thiserror` for public API error types with structured variants covering
//! schema construction, characteristic vectors, labelled tables, dataset profiles
//! and configuration.

/// Top-level error type for the Levelforge core library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Invalid vector: {0}")]
    Vector(#[from] VectorError),

    #[error("Table error: {0}")]
    Table(#[from] TableError),

    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised while building a [`FeatureSchema`](crate::FeatureSchema).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("a feature schema needs at least one characteristic")]
    Empty,

    #[error("characteristic '{name}' is declared more than once")]
    DuplicateName { name: String },

    #[error("characteristic '{name}' has an empty domain [{min}, {max}]")]
    EmptyDomain { name: String, min: i64, max: i64 },
}

/// A characteristic vector that does not fit the feature schema.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VectorError {
    #[error("expected {expected} characteristics, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("missing characteristic '{name}'")]
    Missing { name: String },

    #[error("unknown characteristic '{name}'")]
    Unknown { name: String },

    #[error("characteristic '{name}' given more than once")]
    Duplicate { name: String },

    #[error("position {position}: expected '{expected}', found '{found}'")]
    OutOfOrder {
        position: usize,
        expected: String,
        found: String,
    },

    #[error("characteristic '{name}' must be an integer, got {value}")]
    NotIntegral { name: String, value: String },

    #[error("characteristic '{name}' = {value} is outside its domain {domain}")]
    OutOfDomain {
        name: String,
        value: i64,
        domain: String,
    },

    #[error("expected a JSON object of characteristics")]
    NotAnObject,
}

/// Errors raised while assembling or parsing a labelled table.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("row has {actual} values but the table has {expected} columns")]
    RowWidth { expected: usize, actual: usize },

    #[error("column '{name}' declared more than once")]
    DuplicateColumn { name: String },
}

/// Errors raised while deriving a dataset profile.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileError {
    #[error("cannot profile an empty table")]
    EmptyTable,

    #[error("table has no column for characteristic '{name}'")]
    MissingColumn { name: String },

    #[error("column '{name}' contains no observed values")]
    NoObservations { name: String },
}

/// Errors raised while loading layered configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to extract configuration: {0}")]
    Extract(#[from] Box<figment::Error>),

    #[error("invalid configuration value '{field}': {reason}")]
    Invalid { field: String, reason: String },
}

/// Result alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
