//! Emit run statistics.

use std::time::Duration;

use dispatcher::MetricsSnapshot;
use observability::DeliveryStatsAggregator;

/// Statistics from an emit run
#[derive(Debug, Clone, Default)]
pub struct EmitStats {
    /// Number of concurrent producers
    pub producers: usize,

    /// Wall-clock duration of the run
    pub duration: Duration,

    /// Producer-side view, merged across producers
    pub delivery: DeliveryStatsAggregator,

    /// Sink-side counters at the end of the run
    pub sink: MetricsSnapshot,
}

impl EmitStats {
    /// Delivery attempts per second
    pub fn rate(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.delivery.attempts as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                       Emit Statistics                        ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.3}s", self.duration.as_secs_f64());
        println!("   ├─ Producers: {}", self.producers);
        println!("   └─ Rate: {:.0} msg/s", self.rate());

        let summary = self.delivery.summary();
        println!("\n📈 Producers");
        println!("   ├─ Attempts: {}", summary.attempts);
        println!("   ├─ Delivered: {}", summary.delivered);
        println!(
            "   ├─ Dropped: {} ({:.2}%)",
            summary.failed, summary.failure_rate
        );
        println!("   ├─ Bytes: {}", summary.bytes_written);
        println!("   ├─ Latency (us): {}", summary.latency_us);
        println!("   └─ Message size: {}", summary.message_bytes);

        let sink = &self.sink;
        println!("\n📤 Sink");
        println!("   ├─ Delivered: {}", sink.delivered);
        println!("   ├─ Truncated: {}", sink.truncated);
        println!("   ├─ Dropped: {}", sink.dropped);
        println!(
            "   ├─ Announcements: {} (covering {} drops)",
            sink.announcements, sink.announced_drops
        );
        println!("   └─ Pending drops: {}", sink.pending_drops);

        println!();
    }
}
