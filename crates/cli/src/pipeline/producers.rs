//! Concurrent producers delivering to one sink.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use contracts::{Facility, Level, Metadata};
use dispatcher::Sink;
use observability::DeliveryStatsAggregator;
use tracing::{debug, instrument};

use super::EmitStats;
use crate::error::CliError;

/// What every producer sends
#[derive(Debug, Clone)]
pub struct ProducerPlan {
    pub producers: usize,
    pub count: u64,
    pub message: String,
    pub level: Level,
    pub facility: Facility,
    pub max_len: usize,
    pub metadata: Metadata,
}

/// Run `plan.producers` blocking producers and merge their statistics.
///
/// Producers stop early once `stop` is raised. Drops are part of the
/// statistics; only precondition errors abort a producer.
#[instrument(
    name = "run_producers",
    skip(sink, plan, stop),
    fields(sink = %sink.name(), producers = plan.producers, count = plan.count)
)]
pub async fn run_producers(
    sink: Arc<Sink>,
    plan: ProducerPlan,
    stop: Arc<AtomicBool>,
) -> Result<EmitStats> {
    let started = Instant::now();
    let plan = Arc::new(plan);

    let mut handles = Vec::with_capacity(plan.producers);
    for index in 0..plan.producers {
        let sink = Arc::clone(&sink);
        let plan = Arc::clone(&plan);
        let stop = Arc::clone(&stop);
        handles.push(tokio::task::spawn_blocking(move || {
            produce(index, &sink, &plan, &stop)
        }));
    }

    let mut delivery = DeliveryStatsAggregator::new();
    for (index, handle) in handles.into_iter().enumerate() {
        let stats = handle
            .await
            .map_err(|e| CliError::producer(index, e.to_string()))??;
        delivery.merge(&stats);
    }

    Ok(EmitStats {
        producers: plan.producers,
        duration: started.elapsed(),
        delivery,
        sink: sink.snapshot(),
    })
}

fn produce(
    index: usize,
    sink: &Sink,
    plan: &ProducerPlan,
    stop: &AtomicBool,
) -> Result<DeliveryStatsAggregator, CliError> {
    let mut stats = DeliveryStatsAggregator::new();
    let producer = format!(" producer={}", index);

    for seq in 0..plan.count {
        if stop.load(Ordering::Relaxed) {
            debug!(producer = index, sent = seq, "Producer stopped early");
            break;
        }

        let seq = format!(" seq={}", seq);
        let parts: [&[u8]; 3] = [plan.message.as_bytes(), producer.as_bytes(), seq.as_bytes()];

        let start = Instant::now();
        let result = sink.deliver(
            plan.max_len,
            &parts,
            plan.level,
            plan.facility,
            Some(&plan.metadata),
        );
        let latency_us = start.elapsed().as_secs_f64() * 1e6;

        match result {
            Ok(bytes) => stats.record_success(bytes, latency_us),
            Err(e) if e.is_drop() => stats.record_failure(latency_us),
            Err(e) => return Err(CliError::producer(index, e.to_string())),
        }
    }

    Ok(stats)
}
