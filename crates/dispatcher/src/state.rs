//! Per-sink delivery state: drop counter and access lock
//!
//! Normal writes hold shared access, announcements hold exclusive access.
//! The drop counter is only ever *decreased* under exclusive access; the
//! failure-path increment is a lock-free atomic and may happen with or
//! without the lock held.

use std::sync::atomic::{AtomicU32, Ordering};

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Shared access to a sink's backend
pub(crate) type SharedAccess<'a> = RwLockReadGuard<'a, ()>;

/// Exclusive access to a sink's backend and drop counter
pub(crate) type ExclusiveAccess<'a> = RwLockWriteGuard<'a, ()>;

/// Proof that the caller holds some access to the sink.
///
/// Helpers that touch the backend take one of these by reference so a write
/// cannot be issued without a guard in scope.
pub(crate) trait AccessWitness: sealed::Sealed {}

impl AccessWitness for SharedAccess<'_> {}
impl AccessWitness for ExclusiveAccess<'_> {}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::SharedAccess<'_> {}
    impl Sealed for super::ExclusiveAccess<'_> {}
}

/// Mutable block shared by every producer holding the sink
#[derive(Debug, Default)]
pub(crate) struct SinkState {
    dropped: AtomicU32,
    access: RwLock<()>,
}

impl SinkState {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Messages lost and not yet announced
    pub(crate) fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Acquire)
    }

    /// parking_lot's lock is task-fair, so a pending exclusive request is not
    /// starved by a steady stream of readers.
    pub(crate) fn shared(&self) -> SharedAccess<'_> {
        self.access.read()
    }

    pub(crate) fn exclusive(&self) -> ExclusiveAccess<'_> {
        self.access.write()
    }

    /// Count one lost message. Saturates instead of wrapping.
    pub(crate) fn record_drop(&self) -> u32 {
        let previous = self
            .dropped
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                Some(n.saturating_add(1))
            })
            .unwrap_or_else(|n| n);
        previous.saturating_add(1)
    }

    /// Remove `announced` drops after a successful announcement.
    ///
    /// Increments that landed after the announced value was read survive
    /// and are reported by the next announcement.
    pub(crate) fn settle(&self, _access: &ExclusiveAccess<'_>, announced: u32) {
        self.dropped.fetch_sub(announced, Ordering::AcqRel);
    }
}
