//! `announce` command implementation.

use anyhow::{Context, Result};
use contracts::{SinkBlueprint, SinkName};
use dispatcher::{DispatcherError, SinkRegistry};
use tracing::{debug, info, warn};

use super::{load_blueprint, release};
use crate::cli::AnnounceArgs;
use crate::error::CliError;

/// What happened on one sink
#[derive(Debug)]
pub struct AnnounceOutcome {
    pub sink: SinkName,
    /// Drops pending just before the announcement
    pub pending: u32,
    /// Bytes sent, 0 when nothing was pending
    pub result: Result<usize, DispatcherError>,
}

/// Execute the `announce` command
///
/// Builds the configured sinks, optionally pushes a burst of messages and
/// drains ring sinks, then runs the drop announcement on each selected one.
pub fn run_announce(args: &AnnounceArgs) -> Result<()> {
    let blueprint = load_blueprint(&args.config)?;
    let registry = SinkRegistry::from_blueprint(&blueprint).context("Failed to create sinks")?;

    let report = announce_sinks(&registry, &blueprint, args).map(|outcomes| {
        let mut failures = 0;
        for outcome in &outcomes {
            match &outcome.result {
                Ok(0) => println!("{}: nothing to announce", outcome.sink),
                Ok(bytes) => println!(
                    "{}: announced {} dropped event(s), {} bytes",
                    outcome.sink, outcome.pending, bytes
                ),
                Err(e) => {
                    println!("{}: announcement failed: {}", outcome.sink, e);
                    failures += 1;
                }
            }
        }
        failures
    });

    let failures = release(&registry, report)?;
    if failures > 0 {
        anyhow::bail!("{} announcement(s) failed", failures);
    }
    Ok(())
}

/// Burst, drain and announce on the selected sinks of `registry`
pub(crate) fn announce_sinks(
    registry: &SinkRegistry,
    blueprint: &SinkBlueprint,
    args: &AnnounceArgs,
) -> Result<Vec<AnnounceOutcome>> {
    let producer = &blueprint.producer;
    let facility = args.facility.unwrap_or(producer.facility);
    let metadata = producer.metadata();

    let sinks = match &args.sink {
        Some(name) => {
            let sink = registry.find(name).ok_or_else(|| {
                let available: Vec<String> =
                    registry.names().iter().map(|n| n.to_string()).collect();
                CliError::unknown_sink(name, &available)
            })?;
            vec![sink]
        }
        None => registry.sinks(),
    };

    let mut outcomes = Vec::with_capacity(sinks.len());
    for sink in sinks {
        let mut lost = 0u64;
        for _ in 0..args.burst {
            match sink.deliver(
                producer.max_len,
                &[args.message.as_bytes()],
                producer.level,
                facility,
                Some(&metadata),
            ) {
                Ok(_) => {}
                Err(e) if e.is_drop() => lost += 1,
                Err(e) => return Err(e.into()),
            }
        }
        if args.burst > 0 {
            debug!(sink = %sink.name(), sent = args.burst, lost, "Burst finished");
        }

        if args.drain {
            if let Some(ring) = registry.ring(sink.name().as_str()) {
                let drained = ring.drain();
                debug!(sink = %sink.name(), records = drained.len(), "Ring drained");
            }
        }

        let pending = sink.dropped();
        let result = sink.announce_dropped(facility);
        match &result {
            Ok(bytes) if *bytes > 0 => info!(sink = %sink.name(), pending, bytes, "Announcement sent"),
            Ok(_) => {}
            Err(e) => warn!(sink = %sink.name(), error = %e, "Announcement failed"),
        }

        outcomes.push(AnnounceOutcome {
            sink: sink.name().clone(),
            pending,
            result,
        });
    }

    Ok(outcomes)
}
