//! Dispatcher error types

use contracts::{ContractError, SinkName};
use thiserror::Error;

/// Why a message did not reach its backend
#[derive(Debug, Error)]
pub enum DropReason {
    /// Backend refused the write
    #[error("backend refused the message: {0}")]
    Refused(#[source] ContractError),

    /// Backend reported success but took zero bytes
    #[error("backend accepted zero bytes")]
    NothingWritten,

    /// Pending drops could not be announced, so the message was withheld
    #[error("announcement of {pending} dropped message(s) failed: {source}")]
    AnnouncementFailed {
        pending: u32,
        #[source]
        source: ContractError,
    },
}

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Message lost; the sink's drop counter was incremented before this was returned
    #[error("sink '{sink}' dropped a message: {reason}")]
    Dropped {
        sink: SinkName,
        #[source]
        reason: DropReason,
    },

    /// Standalone announcement could not be sent; the drop counter is unchanged
    #[error("sink '{sink}' could not announce {pending} dropped message(s): {source}")]
    AnnouncementFailed {
        sink: SinkName,
        pending: u32,
        #[source]
        source: ContractError,
    },

    /// More parts than a single message may carry
    #[error("message has {count} parts, at most {max} are supported")]
    TooManyParts { count: usize, max: usize },

    /// Message without any part
    #[error("message has no parts")]
    EmptyMessage,

    /// A sink with this name is already registered
    #[error("sink '{name}' already exists")]
    DuplicateSink { name: SinkName },

    /// No sink with this name is registered
    #[error("sink '{name}' not found")]
    SinkNotFound { name: String },

    /// Sink exists but is not backed by a ring buffer
    #[error("sink '{name}' is not a ring buffer sink")]
    NotARing { name: SinkName },

    /// Ring cannot hold a message of the requested size
    #[error("ring sink '{name}' holds {capacity} bytes, messages may reach {max_len}")]
    RingTooSmall {
        name: SinkName,
        capacity: usize,
        max_len: usize,
    },

    /// Sink creation error
    #[error("failed to create sink '{name}': {message}")]
    SinkCreation { name: String, message: String },

    /// Contract-level error
    #[error("sink error: {0}")]
    Contract(#[from] ContractError),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl DispatcherError {
    /// Create a sink creation error
    pub fn sink_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkCreation {
            name: name.into(),
            message: message.into(),
        }
    }

    /// True when the error stands for a lost message that was counted
    pub fn is_drop(&self) -> bool {
        matches!(self, Self::Dropped { .. })
    }
}
