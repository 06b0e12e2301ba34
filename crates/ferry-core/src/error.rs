//! Error types for ferry-core

use thiserror::Error;

/// Core error type for Ferry
#[derive(Error, Debug)]
pub enum CoreError {
    /// F001: Migration filename does not follow `V{version}__{description}.{up|down}.sql`
    #[error("[F001] Invalid migration file name '{path}': {reason}")]
    InvalidNaming { path: String, reason: String },

    /// F002: Migration file could not be read
    #[error("[F002] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// F003: Configuration file not found
    #[error("[F003] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// F004: Failed to parse configuration file
    #[error("[F004] Failed to parse config {path}: {message}")]
    ConfigParseError { path: String, message: String },

    /// F005: Invalid configuration value
    #[error("[F005] Invalid config: {message}")]
    ConfigInvalid { message: String },
}

impl CoreError {
    pub(crate) fn invalid_naming(path: &str, reason: impl Into<String>) -> Self {
        CoreError::InvalidNaming {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
