//! Producer runs against a single sink.

mod producers;
mod stats;

pub use producers::{run_producers, ProducerPlan};
pub use stats::EmitStats;
