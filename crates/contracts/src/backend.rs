//! SinkBackend trait - the transport seam under every sink
//!
//! The dispatcher and the drop-announcement protocol only ever talk to a
//! backend through this trait.

use std::fmt;

use crate::ContractError;

/// Concrete transport family behind a sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// File descriptor (stdout, stderr, file)
    Fd,
    /// In-memory ring buffer
    Ring,
    /// Any other transport (datagram, test doubles)
    Other,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Fd => "fd",
            Self::Ring => "ring",
            Self::Other => "other",
        })
    }
}

/// Byte-accepting transport.
///
/// Several producers may call [`write`](SinkBackend::write) at the same time
/// (they only hold shared access to the owning sink), so implementations must
/// serialize their own internal mutation.
pub trait SinkBackend: Send + Sync {
    /// Transport family
    fn kind(&self) -> BackendKind;

    /// Write one record made of `parts`, concatenated in order.
    ///
    /// The record is truncated, never rejected, when it exceeds `max_len`.
    /// Returns the number of bytes accepted, which is at most `max_len`.
    ///
    /// # Errors
    /// The backend could not take the record (full, disconnected, closed).
    fn write(&self, parts: &[&[u8]], max_len: usize) -> Result<usize, ContractError>;

    /// Flush any buffered output
    fn flush(&self) -> Result<(), ContractError> {
        Ok(())
    }

    /// Byte capacity for bounded in-memory backends, `None` for streams
    fn capacity(&self) -> Option<usize> {
        None
    }
}
