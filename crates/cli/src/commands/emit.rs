//! `emit` command implementation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use dispatcher::SinkRegistry;
use tracing::{info, warn};

use super::{load_blueprint, release};
use crate::cli::EmitArgs;
use crate::error::CliError;
use crate::pipeline::{run_producers, ProducerPlan};

/// Execute the `emit` command
pub async fn run_emit(args: &EmitArgs) -> Result<()> {
    if args.producers == 0 {
        return Err(CliError::invalid_arguments("--producers must be at least 1").into());
    }

    let blueprint = load_blueprint(&args.config)?;
    let producer = &blueprint.producer;

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
    }

    let registry = SinkRegistry::from_blueprint(&blueprint).context("Failed to create sinks")?;
    let sink = registry.find(&args.sink).ok_or_else(|| {
        let available: Vec<String> = registry.names().iter().map(|n| n.to_string()).collect();
        CliError::unknown_sink(&args.sink, &available)
    })?;

    let plan = ProducerPlan {
        producers: args.producers,
        count: args.count,
        message: args.message.clone(),
        level: args.level.unwrap_or(producer.level),
        facility: args.facility.unwrap_or(producer.facility),
        max_len: args.max_len.unwrap_or(producer.max_len),
        metadata: producer.metadata(),
    };

    info!(
        sink = %sink.name(),
        producers = plan.producers,
        count = plan.count,
        max_len = plan.max_len,
        "Starting producers"
    );

    let stop = Arc::new(AtomicBool::new(false));
    let run = run_producers(Arc::clone(&sink), plan, Arc::clone(&stop));
    tokio::pin!(run);

    let outcome = tokio::select! {
        result = &mut run => result,
        _ = tokio::signal::ctrl_c() => {
            warn!("Received Ctrl+C, stopping producers...");
            stop.store(true, Ordering::Relaxed);
            run.await
        }
    };

    let report = outcome.map(|stats| {
        info!(
            delivered = stats.delivery.delivered,
            dropped = stats.delivery.failed,
            pending_drops = stats.sink.pending_drops,
            duration_secs = stats.duration.as_secs_f64(),
            "Producers finished"
        );
        stats.print_summary();

        if args.dump {
            match registry.ring(&args.sink) {
                Some(ring) => {
                    println!("── ring '{}' ({} records, {} bytes) ──", args.sink, ring.len(), ring.used());
                    for record in ring.records() {
                        println!("{}", String::from_utf8_lossy(&record));
                    }
                }
                None => warn!(sink = %args.sink, "--dump ignored: sink is not a ring buffer"),
            }
        }
    });

    release(&registry, report)
}
