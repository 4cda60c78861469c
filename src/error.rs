//! Structured error types for configuration resolution.

use crate::config::ValidationError;
use crate::config::overrides::ValueKind;
use std::path::PathBuf;
use thiserror::Error;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    FileNotFound,
    FileUnreadable,
    MalformedFile,
    InvalidOverrideType,
    ValidationFailed,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::FileNotFound => "FILE_NOT_FOUND",
            ErrorCode::FileUnreadable => "FILE_UNREADABLE",
            ErrorCode::MalformedFile => "MALFORMED_FILE",
            ErrorCode::InvalidOverrideType => "INVALID_OVERRIDE_TYPE",
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
        }
    }
}

/// Everything that can stop a resolution.
///
/// `FileNotFound` is the only variant the resolver recovers from (it falls
/// back to defaults). Malformed environment values never surface here; the
/// environment overlay skips them and records an `EnvSkip` instead.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config file {}: {message}", .path.display())]
    MalformedFile { path: PathBuf, message: String },

    #[error("override '{key}' expects {expected}, got {found}")]
    InvalidOverrideType {
        key: String,
        expected: ValueKind,
        found: String,
    },

    #[error("invalid configuration: {0}")]
    Validation(#[from] ValidationError),
}

impl ConfigError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ConfigError::FileNotFound { .. } => ErrorCode::FileNotFound,
            ConfigError::Io { .. } => ErrorCode::FileUnreadable,
            ConfigError::MalformedFile { .. } => ErrorCode::MalformedFile,
            ConfigError::InvalidOverrideType { .. } => ErrorCode::InvalidOverrideType,
            ConfigError::Validation(_) => ErrorCode::ValidationFailed,
        }
    }

    pub fn malformed(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        ConfigError::MalformedFile {
            path: path.into(),
            message: err.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ConfigError::FileNotFound { .. })
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
