//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Delivery Model
//! - Producers hand a message (1..=8 byte parts) plus a [`Level`] and [`Facility`]
//!   to a sink
//! - Sinks forward bytes through a [`SinkBackend`], the only transport seam
//! - A backend refusal is a drop, never a blocking wait

mod backend;
mod blueprint;
mod error;
mod format;
mod message;
mod severity;
mod sink_name;

pub use backend::{BackendKind, SinkBackend};
pub use blueprint::*;
pub use error::*;
pub use format::LogFormat;
pub use message::{Metadata, MAX_MESSAGE_PARTS};
pub use severity::{Facility, Level};
pub use sink_name::SinkName;
