//! Error types for the specification engine

use std::path::PathBuf;
use thiserror::Error;

/// Result type for specification operations
pub type Result<T> = std::result::Result<T, SpecsError>;

/// Errors that can occur while editing templates, encoding payloads, or
/// loading configuration.
///
/// Malformed persisted payloads, per-field validation failures and template
/// lookup misses are not errors: they degrade to empty schemas, error maps and
/// `None` respectively.
#[derive(Debug, Error)]
pub enum SpecsError {
    /// Two fields in one template share a key
    #[error("duplicate field key: {key}")]
    DuplicateFieldKey { key: String },

    /// Field not found by key
    #[error("field not found: {key}")]
    FieldNotFound { key: String },

    /// Target position past the end of the field list
    #[error("index {index} out of range for template with {len} fields")]
    IndexOutOfRange { index: usize, len: usize },

    /// Template seed directory missing
    #[error("templates directory not found: {path}")]
    TemplatesDirNotFound { path: PathBuf },

    /// Configuration file extension not recognized
    #[error("unsupported configuration file format: {path}")]
    UnsupportedConfigFormat { path: PathBuf },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML decoding error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// Configuration extraction failed
    #[error("configuration error: {0}")]
    Config(#[from] Box<figment::Error>),
}

impl From<figment::Error> for SpecsError {
    fn from(error: figment::Error) -> Self {
        SpecsError::Config(Box::new(error))
    }
}
