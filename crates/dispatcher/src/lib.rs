//! # Dispatcher
//!
//! Multi-producer event delivery with drop accounting.
//!
//! - Producers share an `Arc<Sink>` and call [`Sink::deliver`] concurrently
//! - A refusing backend costs the producer one counted drop, never a wait
//! - Pending drops are announced as `"<N> events dropped"` before any later
//!   normal message on the same sink

mod announce;
mod dispatch;
pub mod backends;
pub mod error;
pub mod header;
pub mod metrics;
pub mod registry;
mod sink;
mod state;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use announce::announcement_text;
pub use backends::{FdBackend, FdTarget, RingBackend, UdpBackend};
pub use contracts::{Facility, Level, LogFormat, Metadata, SinkBackend};
pub use error::{DispatcherError, DropReason};
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use registry::SinkRegistry;
pub use sink::Sink;
