//! Error types for st-core

use thiserror::Error;

/// Core error type for Strata
#[derive(Error, Debug)]
pub enum CoreError {
    /// C001: Configuration file not found
    #[error("[C001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// C002: Failed to parse configuration file
    #[error("[C002] Failed to parse config '{path}': {source}")]
    ConfigParseError {
        path: String,
        source: serde_yaml::Error,
    },

    /// C003: Invalid configuration value
    #[error("[C003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// C004: Project directory not found
    #[error("[C004] Project directory not found: {path}")]
    ProjectNotFound { path: String },

    /// C005: Migration identifier is empty or contains forbidden characters
    #[error("[C005] Invalid migration identifier '{id}': {reason}")]
    InvalidMigrationId { id: String, reason: String },

    /// C006: IO error with file path context
    #[error("[C006] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// C007: IO error
    #[error("[C007] IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
