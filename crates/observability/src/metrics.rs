//! Delivery metrics
//!
//! Counters are published through the `metrics` facade; whichever recorder is
//! installed (Prometheus in production, none in tests) receives them.

use metrics::{counter, gauge};

/// Record a message accepted by a sink backend
pub fn record_delivery(sink: &str, bytes: usize) {
    counter!("eventsink_messages_delivered_total", "sink" => sink.to_string()).increment(1);
    counter!("eventsink_bytes_written_total", "sink" => sink.to_string()).increment(bytes as u64);
}

/// Record a message lost to a refusing backend or an aborted announcement
pub fn record_drop(sink: &str) {
    counter!("eventsink_messages_dropped_total", "sink" => sink.to_string()).increment(1);
}

/// Record a successful drop announcement covering `dropped` messages
pub fn record_announcement(sink: &str, dropped: u32) {
    counter!("eventsink_announcements_total", "sink" => sink.to_string()).increment(1);
    counter!("eventsink_announced_drops_total", "sink" => sink.to_string())
        .increment(u64::from(dropped));
}

/// Record a message cut down to the caller's size cap
pub fn record_truncation(sink: &str) {
    counter!("eventsink_messages_truncated_total", "sink" => sink.to_string()).increment(1);
}

/// Publish the number of drops not yet announced
pub fn record_pending_drops(sink: &str, pending: u32) {
    gauge!("eventsink_pending_drops", "sink" => sink.to_string()).set(f64::from(pending));
}

/// In-memory aggregation of delivery attempts
///
/// Each producer keeps its own aggregator; results are combined with
/// [`merge`](Self::merge) once producers finish.
#[derive(Debug, Clone, Default)]
pub struct DeliveryStatsAggregator {
    pub attempts: u64,
    pub delivered: u64,
    pub failed: u64,
    pub bytes_written: u64,

    /// Per-call latency in microseconds
    pub latency_us: RunningStats,

    /// Bytes accepted per successful call
    pub message_bytes: RunningStats,
}

impl DeliveryStatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self, bytes: usize, latency_us: f64) {
        self.attempts += 1;
        self.delivered += 1;
        self.bytes_written += bytes as u64;
        self.latency_us.push(latency_us);
        self.message_bytes.push(bytes as f64);
    }

    pub fn record_failure(&mut self, latency_us: f64) {
        self.attempts += 1;
        self.failed += 1;
        self.latency_us.push(latency_us);
    }

    /// Fold another aggregator into this one
    pub fn merge(&mut self, other: &Self) {
        self.attempts += other.attempts;
        self.delivered += other.delivered;
        self.failed += other.failed;
        self.bytes_written += other.bytes_written;
        self.latency_us.merge(&other.latency_us);
        self.message_bytes.merge(&other.message_bytes);
    }

    pub fn summary(&self) -> DeliverySummary {
        DeliverySummary {
            attempts: self.attempts,
            delivered: self.delivered,
            failed: self.failed,
            bytes_written: self.bytes_written,
            failure_rate: if self.attempts > 0 {
                self.failed as f64 / self.attempts as f64 * 100.0
            } else {
                0.0
            },
            latency_us: StatsSummary::from(&self.latency_us),
            message_bytes: StatsSummary::from(&self.message_bytes),
        }
    }
}

/// Summary of a producer run
#[derive(Debug, Clone, Default)]
pub struct DeliverySummary {
    pub attempts: u64,
    pub delivered: u64,
    pub failed: u64,
    pub bytes_written: u64,
    pub failure_rate: f64,
    pub latency_us: StatsSummary,
    pub message_bytes: StatsSummary,
}

impl std::fmt::Display for DeliverySummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Delivery Summary ===")?;
        writeln!(f, "Attempts: {}", self.attempts)?;
        writeln!(f, "Delivered: {}", self.delivered)?;
        writeln!(
            f,
            "Failed: {} ({:.2}%)",
            self.failed, self.failure_rate
        )?;
        writeln!(f, "Bytes written: {}", self.bytes_written)?;
        writeln!(f, "Latency (us): {}", self.latency_us)?;
        writeln!(f, "Message size (bytes): {}", self.message_bytes)?;
        Ok(())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// Combine two sample sets (Chan et al. parallel update)
    pub fn merge(&mut self, other: &Self) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = other.clone();
            return;
        }

        let count = self.count + other.count;
        let delta = other.mean - self.mean;
        self.mean += delta * other.count as f64 / count as f64;
        self.m2 += other.m2 + delta * delta * (self.count as f64 * other.count as f64) / count as f64;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self.count = count;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
