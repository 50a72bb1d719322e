//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Requested sink is not configured
    #[error("Sink '{name}' is not configured (available: {available})")]
    UnknownSink { name: String, available: String },

    /// Command arguments that cannot be honoured
    #[error("Invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// A producer task failed to complete
    #[error("Producer {index} failed: {message}")]
    Producer { index: usize, message: String },
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn unknown_sink(name: impl Into<String>, available: &[String]) -> Self {
        Self::UnknownSink {
            name: name.into(),
            available: available.join(", "),
        }
    }

    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            message: message.into(),
        }
    }

    pub fn producer(index: usize, message: impl Into<String>) -> Self {
        Self::Producer {
            index,
            message: message.into(),
        }
    }
}
