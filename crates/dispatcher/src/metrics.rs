//! Per-sink counters for diagnostics

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for a single sink
///
/// Kept alongside the `metrics` facade so diagnostics work without a
/// recorder installed.
#[derive(Debug, Default)]
pub struct SinkMetrics {
    /// Messages accepted by the backend
    delivered: AtomicU64,
    /// Bytes accepted by the backend, announcements included
    bytes_written: AtomicU64,
    /// Messages lost
    dropped: AtomicU64,
    /// Successful drop announcements
    announcements: AtomicU64,
    /// Drops covered by successful announcements
    announced_drops: AtomicU64,
    /// Messages cut to the caller's size cap
    truncated: AtomicU64,
}

impl SinkMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    pub fn inc_delivered(&self, bytes: usize) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written.load(Ordering::Relaxed)
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn inc_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn announcements(&self) -> u64 {
        self.announcements.load(Ordering::Relaxed)
    }

    pub fn announced_drops(&self) -> u64 {
        self.announced_drops.load(Ordering::Relaxed)
    }

    pub fn inc_announcement(&self, covered: u32, bytes: usize) {
        self.announcements.fetch_add(1, Ordering::Relaxed);
        self.announced_drops
            .fetch_add(u64::from(covered), Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn truncated(&self) -> u64 {
        self.truncated.load(Ordering::Relaxed)
    }

    pub fn inc_truncated(&self) {
        self.truncated.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot of all counters; `pending_drops` comes from the sink state
    pub fn snapshot(&self, pending_drops: u32) -> MetricsSnapshot {
        MetricsSnapshot {
            delivered: self.delivered(),
            bytes_written: self.bytes_written(),
            dropped: self.dropped(),
            announcements: self.announcements(),
            announced_drops: self.announced_drops(),
            truncated: self.truncated(),
            pending_drops,
        }
    }
}

/// Snapshot of sink metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub delivered: u64,
    pub bytes_written: u64,
    pub dropped: u64,
    pub announcements: u64,
    pub announced_drops: u64,
    pub truncated: u64,
    pub pending_drops: u32,
}
