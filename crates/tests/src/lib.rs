//! # Integration Tests
//!
//! Cross-crate scenarios.
//!
//! Covers:
//! - Drop accounting under concurrent producers
//! - Announcement ordering and exclusivity
//! - Configuration file to registry to ring, end to end

#[cfg(test)]
mod contract_tests {
    use contracts::{Facility, Level, LogFormat, MAX_MESSAGE_PARTS};

    #[test]
    fn test_contracts_compile() {
        let _ = contracts::ConfigVersion::V1;
        assert_eq!(MAX_MESSAGE_PARTS, 8);
        assert_eq!(Facility::Kern.priority(Level::Emerg), 0);
        assert_eq!(LogFormat::default(), LogFormat::Raw);
    }
}

#[cfg(test)]
mod delivery_tests {
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use contracts::{Facility, Level, LogFormat};
    use dispatcher::{DispatcherError, DropReason, Sink, SinkRegistry};

    use dispatcher::testing::ScriptedBackend;

    fn registered(backend: &ScriptedBackend) -> (SinkRegistry, Arc<Sink>) {
        let registry = SinkRegistry::new();
        let sink = registry
            .create("events", "recorded events", LogFormat::Raw, Box::new(backend.clone()))
            .unwrap();
        (registry, sink)
    }

    fn deliver(sink: &Sink, body: &str) -> Result<usize, DispatcherError> {
        sink.deliver(256, &[body.as_bytes()], Level::Info, Facility::User, None)
    }

    #[test]
    fn test_two_producers_both_delivered() {
        let backend = ScriptedBackend::new();
        let (_registry, sink) = registered(&backend);

        thread::scope(|s| {
            s.spawn(|| deliver(&sink, "from producer A").unwrap());
            s.spawn(|| deliver(&sink, "from producer B").unwrap());
        });

        let mut records = backend.records_utf8();
        records.sort();
        assert_eq!(records, vec!["from producer A", "from producer B"]);
        assert_eq!(sink.dropped(), 0);
    }

    #[test]
    fn test_refuse_then_restore() {
        let backend = ScriptedBackend::new();
        let (_registry, sink) = registered(&backend);

        backend.refuse();
        for i in 0..3 {
            let err = deliver(&sink, &format!("lost {}", i)).unwrap_err();
            assert!(err.is_drop());
        }
        assert_eq!(sink.dropped(), 3);
        assert!(backend.records_utf8().is_empty());

        backend.accept();
        deliver(&sink, "fourth").unwrap();

        assert_eq!(backend.records_utf8(), vec!["3 events dropped", "fourth"]);
        assert_eq!(sink.dropped(), 0);
    }

    #[test]
    fn test_refused_announcement() {
        let backend = ScriptedBackend::new();
        let (_registry, sink) = registered(&backend);

        backend.refuse();
        for _ in 0..3 {
            let _ = deliver(&sink, "lost");
        }

        // Standalone: the counter is left as it was
        let err = sink.announce_dropped(Facility::User).unwrap_err();
        assert!(matches!(err, DispatcherError::AnnouncementFailed { pending: 3, .. }));
        assert_eq!(sink.dropped(), 3);

        // Through deliver: the message is withheld and counted
        let err = deliver(&sink, "fourth").unwrap_err();
        assert!(matches!(
            err,
            DispatcherError::Dropped {
                reason: DropReason::AnnouncementFailed { pending: 3, .. },
                ..
            }
        ));
        assert!(backend.records_utf8().is_empty());
        assert_eq!(sink.dropped(), 4);

        backend.accept();
        deliver(&sink, "fifth").unwrap();
        assert_eq!(backend.records_utf8(), vec!["4 events dropped", "fifth"]);
    }

    #[test]
    fn test_idle_announcement_untouched_backend() {
        let backend = ScriptedBackend::new();
        let (_registry, sink) = registered(&backend);

        assert_eq!(sink.announce_dropped(Facility::Daemon).unwrap(), 0);
        assert_eq!(sink.announce_dropped(Facility::Daemon).unwrap(), 0);
        assert_eq!(backend.write_calls(), 0);
    }

    #[test]
    fn test_truncation_law() {
        let backend = ScriptedBackend::new();
        let (_registry, sink) = registered(&backend);

        for max_len in [1usize, 5, 16, 63] {
            let written = sink
                .deliver(
                    max_len,
                    &[&[b'x'; 40], &[b'y'; 40]],
                    Level::Info,
                    Facility::User,
                    None,
                )
                .unwrap();
            assert!(written <= max_len);
        }
        assert_eq!(sink.dropped(), 0);
        assert_eq!(sink.metrics().truncated(), 4);
    }

    /// Producers fail and succeed at random interleavings; every failure is
    /// either still pending or covered by an announcement.
    #[test]
    fn test_drop_accounting_under_contention() {
        let backend = ScriptedBackend::new();
        let (_registry, sink) = registered(&backend);
        backend.refuse_every(3);

        let failures: usize = thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|p| {
                    let sink = &sink;
                    s.spawn(move || {
                        (0..200)
                            .filter(|i| deliver(sink, &format!("p{} m{}", p, i)).is_err())
                            .count()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).sum()
        });

        let announced: u64 = backend
            .records_utf8()
            .iter()
            .filter_map(|r| r.strip_suffix(" events dropped").or_else(|| r.strip_suffix(" event dropped")))
            .map(|n| n.parse::<u64>().unwrap())
            .sum();

        assert!(failures > 0);
        assert_eq!(failures as u64, announced + u64::from(sink.dropped()));
        assert_eq!(sink.metrics().announced_drops(), announced);
    }

    #[test]
    fn test_no_write_overlaps_announcement() {
        let backend = ScriptedBackend::new();
        let (_registry, sink) = registered(&backend);
        backend.set_delay(Duration::from_micros(100));

        for round in 0..5 {
            backend.refuse();
            let _ = deliver(&sink, "lost");
            backend.accept();

            thread::scope(|s| {
                for p in 0..6 {
                    let sink = &sink;
                    s.spawn(move || {
                        for i in 0..10 {
                            deliver(sink, &format!("r{} p{} m{}", round, p, i)).unwrap();
                        }
                    });
                }
            });
            assert_eq!(sink.dropped(), 0);
        }

        assert_eq!(backend.overlaps(), 0);
        let announcements = backend
            .records_utf8()
            .iter()
            .filter(|r| r.as_str() == "1 event dropped")
            .count();
        assert_eq!(announcements, 5);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::io::Write;

    use config_loader::ConfigLoader;
    use contracts::{BackendKind, Level};
    use dispatcher::SinkRegistry;
    use observability::DeliveryStatsAggregator;

    const CONFIG: &str = r#"
version = "V1"

[producer]
facility = "local0"
level = "info"
tag = "eventsink"
hostname = "edge-01"
max_len = 128

[[sinks]]
name = "buf0"
description = "in-memory event ring"
format = "rfc5424"
sink_type = "ring"
[sinks.params]
size = "8192"

[[sinks]]
name = "tiny"
format = "raw"
sink_type = "ring"
[sinks.params]
size = "128"
overwrite = "false"
"#;

    fn load() -> contracts::SinkBlueprint {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(CONFIG.as_bytes()).unwrap();
        ConfigLoader::load_from_path(file.path()).unwrap()
    }

    #[test]
    fn test_config_to_ring() {
        let blueprint = load();
        let registry = SinkRegistry::from_blueprint(&blueprint).unwrap();
        let producer = &blueprint.producer;

        let names: Vec<String> = registry.names().iter().map(|n| n.to_string()).collect();
        assert_eq!(names, vec!["buf0", "tiny"]);

        let sink = registry.resolve_ring("buf0", producer.max_len).unwrap();
        assert_eq!(sink.backend_kind(), BackendKind::Ring);
        assert_eq!(sink.description(), "in-memory event ring");

        let metadata = producer.metadata();
        sink.deliver(
            producer.max_len,
            &[b"service ", b"started"],
            Level::Notice,
            producer.facility,
            Some(&metadata),
        )
        .unwrap();

        let records = registry.ring("buf0").unwrap().records();
        assert_eq!(records.len(), 1);
        let line = String::from_utf8(records[0].to_vec()).unwrap();
        assert!(line.starts_with("<133>1 "), "{}", line);
        assert!(line.contains(" edge-01 eventsink "), "{}", line);
        assert!(line.ends_with(" - - service started"), "{}", line);

        let report = registry.teardown();
        assert_eq!(report.len(), 2);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_full_ring_drops_then_announces() {
        let blueprint = load();
        let registry = SinkRegistry::from_blueprint(&blueprint).unwrap();
        let sink = registry.find("tiny").unwrap();
        let ring = registry.ring("tiny").unwrap();

        let mut stats = DeliveryStatsAggregator::new();
        for i in 0..20 {
            let body = format!("message {:02} padded to 32 bytes...", i);
            match sink.deliver(64, &[body.as_bytes()], Level::Info, blueprint.producer.facility, None) {
                Ok(n) => stats.record_success(n, 0.0),
                Err(e) => {
                    assert!(e.is_drop());
                    stats.record_failure(0.0);
                }
            }
        }

        // 128-byte ring holds four 32-byte records
        assert_eq!(stats.delivered, 4);
        assert_eq!(stats.failed, 16);
        assert_eq!(sink.dropped(), 16);

        ring.drain();
        sink.deliver(64, &[b"after drain"], Level::Info, blueprint.producer.facility, None)
            .unwrap();

        let records: Vec<String> = ring
            .records()
            .iter()
            .map(|r| String::from_utf8(r.to_vec()).unwrap())
            .collect();
        assert_eq!(records, vec!["16 events dropped", "after drain"]);
        assert_eq!(sink.dropped(), 0);
    }

    #[test]
    fn test_resolve_ring_rejects_small_ring() {
        let blueprint = load();
        let registry = SinkRegistry::from_blueprint(&blueprint).unwrap();

        assert!(registry.resolve_ring("tiny", 128).is_ok());
        assert!(registry.resolve_ring("tiny", 129).is_err());
    }
}
