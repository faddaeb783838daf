//! Error types for impress-dedup

use thiserror::Error;

/// Result type alias for duplicate detection operations
pub type Result<T> = std::result::Result<T, DedupError>;

/// Main error type for duplicate detection
#[derive(Error, Debug)]
pub enum DedupError {
    /// Entry type has no row in the type registry
    #[error("Unknown entry type: {0}")]
    UnknownEntryType(String),

    /// Comparison mode name not recognized
    #[error("Unknown comparison mode: {0}")]
    UnknownMode(String),

    /// Configuration failed validation
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// TOML could not be parsed
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML could not be produced
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// JSON could not be parsed or produced
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration validation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Value is out of valid range
    #[error("Value out of range: {0}")]
    OutOfRange(String),

    /// Threshold values are invalid relative to each other
    #[error("Invalid thresholds: {0}")]
    InvalidThresholds(String),

    /// Field weight is not a positive finite number
    #[error("Invalid weight {weight} for field '{field}' of type '{entry_type}'")]
    InvalidWeight {
        entry_type: String,
        field: String,
        weight: f64,
    },

    /// Same entry type declared twice
    #[error("Entry type declared more than once: {0}")]
    DuplicateType(String),

    /// Same field declared twice within one entry type
    #[error("Field '{field}' declared more than once for type '{entry_type}'")]
    DuplicateField { entry_type: String, field: String },
}
