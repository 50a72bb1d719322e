//! Layered error definitions
//!
//! Categorized by source: config / backend / general

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Backend Errors =====
    /// Backend could not accept the write (full, disconnected)
    #[error("backend '{backend}' refused write: {message}")]
    BackendRefused { backend: String, message: String },

    /// Backend has been closed and accepts nothing
    #[error("backend '{backend}' is closed")]
    BackendClosed { backend: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create backend refusal error
    pub fn backend_refused(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BackendRefused {
            backend: backend.into(),
            message: message.into(),
        }
    }
}
