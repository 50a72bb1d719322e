//! Write dispatcher
//!
//! Producers call [`Sink::deliver`] from any thread. A pending drop count is
//! announced under exclusive access first; the message itself is written
//! under shared access, so normal traffic runs concurrently.

use contracts::{Facility, Level, Metadata, MAX_MESSAGE_PARTS};
use tracing::trace;

use crate::error::{DispatcherError, DropReason};
use crate::header::encode_header;
use crate::sink::Sink;
use crate::state::AccessWitness;

impl Sink {
    /// Deliver one message made of `parts` (1 to [`MAX_MESSAGE_PARTS`]).
    ///
    /// Returns the number of bytes the backend accepted, never more than
    /// `max_len`. Oversized messages are truncated rather than rejected.
    ///
    /// # Errors
    /// - [`DispatcherError::EmptyMessage`] / [`DispatcherError::TooManyParts`]:
    ///   nothing was attempted and no state changed.
    /// - [`DispatcherError::Dropped`]: the message was lost and the drop
    ///   counter was already incremented. This covers an announcement that
    ///   could not be sent, in which case the message is withheld.
    pub fn deliver(
        &self,
        max_len: usize,
        parts: &[&[u8]],
        level: Level,
        facility: Facility,
        metadata: Option<&Metadata>,
    ) -> Result<usize, DispatcherError> {
        check_parts(parts)?;

        match self.try_deliver(max_len, parts, level, facility, metadata) {
            Ok(written) => {
                self.metrics.inc_delivered(written);
                observability::record_delivery(&self.name, written);
                Ok(written)
            }
            Err(reason) => {
                // Locks are released here; the increment does not need them.
                let pending = self.state.record_drop();
                self.metrics.inc_dropped();
                observability::record_drop(&self.name);
                observability::record_pending_drops(&self.name, pending);
                trace!(sink = %self.name, pending, error = %reason, "message dropped");
                Err(DispatcherError::Dropped {
                    sink: self.name.clone(),
                    reason,
                })
            }
        }
    }

    fn try_deliver(
        &self,
        max_len: usize,
        parts: &[&[u8]],
        level: Level,
        facility: Facility,
        metadata: Option<&Metadata>,
    ) -> Result<usize, DropReason> {
        if self.state.dropped() > 0 {
            let access = self.state.exclusive();
            self.announce_locked(&access, facility)
                .map_err(|failure| DropReason::AnnouncementFailed {
                    pending: failure.pending,
                    source: failure.source,
                })?;
        }

        let access = self.state.shared();
        self.write_locked(&access, max_len, parts, level, facility, metadata)
    }

    /// Encode the header and hand header + parts to the backend.
    ///
    /// Callers must hold shared or exclusive access.
    pub(crate) fn write_locked<A: AccessWitness>(
        &self,
        _access: &A,
        max_len: usize,
        parts: &[&[u8]],
        level: Level,
        facility: Facility,
        metadata: Option<&Metadata>,
    ) -> Result<usize, DropReason> {
        let mut header = Vec::new();
        encode_header(self.format, level, facility, metadata, &mut header);

        let empty: &[u8] = &[];
        let mut iov = [empty; MAX_MESSAGE_PARTS + 1];
        iov[0] = header.as_slice();
        iov[1..=parts.len()].copy_from_slice(parts);
        let iov = &iov[..=parts.len()];

        let encoded: usize = iov.iter().map(|p| p.len()).sum();
        let written = self
            .backend
            .write(iov, max_len)
            .map_err(DropReason::Refused)?;
        if written == 0 {
            return Err(DropReason::NothingWritten);
        }

        if encoded > max_len {
            self.metrics.inc_truncated();
            observability::record_truncation(&self.name);
        }
        Ok(written)
    }
}

fn check_parts(parts: &[&[u8]]) -> Result<(), DispatcherError> {
    if parts.is_empty() {
        return Err(DispatcherError::EmptyMessage);
    }
    if parts.len() > MAX_MESSAGE_PARTS {
        return Err(DispatcherError::TooManyParts {
            count: parts.len(),
            max: MAX_MESSAGE_PARTS,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedBackend;
    use contracts::LogFormat;

    fn sink(backend: &ScriptedBackend, format: LogFormat) -> Sink {
        Sink::new("test", "test sink", format, Box::new(backend.clone()))
    }

    #[test]
    fn test_deliver_concatenates_parts() {
        let backend = ScriptedBackend::new();
        let sink = sink(&backend, LogFormat::Raw);

        let written = sink
            .deliver(64, &[b"hello", b", ", b"world"], Level::Info, Facility::User, None)
            .unwrap();

        assert_eq!(written, 12);
        assert_eq!(backend.records(), vec![b"hello, world".to_vec()]);
        assert_eq!(sink.metrics().delivered(), 1);
    }

    #[test]
    fn test_deliver_prefixes_header() {
        let backend = ScriptedBackend::new();
        let sink = sink(&backend, LogFormat::Short);

        sink.deliver(64, &[b"up"], Level::Warning, Facility::Daemon, None)
            .unwrap();

        assert_eq!(backend.records(), vec![b"<4>up".to_vec()]);
    }

    #[test]
    fn test_parts_preconditions() {
        let backend = ScriptedBackend::new();
        let sink = sink(&backend, LogFormat::Raw);

        let err = sink
            .deliver(64, &[], Level::Info, Facility::User, None)
            .unwrap_err();
        assert!(matches!(err, DispatcherError::EmptyMessage));

        let parts: Vec<&[u8]> = vec![&b"x"[..]; MAX_MESSAGE_PARTS + 1];
        let err = sink
            .deliver(64, &parts, Level::Info, Facility::User, None)
            .unwrap_err();
        assert!(matches!(
            err,
            DispatcherError::TooManyParts { count: 9, max: 8 }
        ));

        assert_eq!(sink.dropped(), 0);
        assert_eq!(backend.write_calls(), 0);
    }

    #[test]
    fn test_max_parts_accepted() {
        let backend = ScriptedBackend::new();
        let sink = sink(&backend, LogFormat::Raw);

        let parts: Vec<&[u8]> = vec![&b"ab"[..]; MAX_MESSAGE_PARTS];
        let written = sink
            .deliver(64, &parts, Level::Info, Facility::User, None)
            .unwrap();
        assert_eq!(written, 16);
    }

    #[test]
    fn test_truncation() {
        let backend = ScriptedBackend::new();
        let sink = sink(&backend, LogFormat::Raw);

        let written = sink
            .deliver(4, &[b"abcdef", b"gh"], Level::Info, Facility::User, None)
            .unwrap();

        assert_eq!(written, 4);
        assert_eq!(backend.records(), vec![b"abcd".to_vec()]);
        assert_eq!(sink.metrics().truncated(), 1);
        assert_eq!(sink.dropped(), 0);
    }

    #[test]
    fn test_refusal_counts_drop() {
        let backend = ScriptedBackend::new();
        backend.refuse();
        let sink = sink(&backend, LogFormat::Raw);

        let err = sink
            .deliver(64, &[b"lost"], Level::Info, Facility::User, None)
            .unwrap_err();

        assert!(err.is_drop());
        assert!(matches!(
            err,
            DispatcherError::Dropped {
                reason: DropReason::Refused(_),
                ..
            }
        ));
        assert_eq!(sink.dropped(), 1);
        assert_eq!(sink.metrics().dropped(), 1);
    }

    #[test]
    fn test_zero_bytes_counts_drop() {
        let backend = ScriptedBackend::new();
        backend.accept_nothing();
        let sink = sink(&backend, LogFormat::Raw);

        let err = sink
            .deliver(64, &[b"lost"], Level::Info, Facility::User, None)
            .unwrap_err();

        assert!(matches!(
            err,
            DispatcherError::Dropped {
                reason: DropReason::NothingWritten,
                ..
            }
        ));
        assert_eq!(sink.dropped(), 1);
    }

    #[test]
    fn test_announcement_precedes_message() {
        let backend = ScriptedBackend::new();
        let sink = sink(&backend, LogFormat::Raw);

        backend.refuse();
        for _ in 0..3 {
            assert!(sink
                .deliver(64, &[b"lost"], Level::Info, Facility::User, None)
                .is_err());
        }
        assert_eq!(sink.dropped(), 3);

        backend.accept();
        sink.deliver(64, &[b"fourth"], Level::Info, Facility::User, None)
            .unwrap();

        assert_eq!(
            backend.records(),
            vec![b"3 events dropped".to_vec(), b"fourth".to_vec()]
        );
        assert_eq!(sink.dropped(), 0);
        assert_eq!(sink.metrics().announcements(), 1);
        assert_eq!(sink.metrics().announced_drops(), 3);
    }

    #[test]
    fn test_failed_announcement_withholds_message() {
        let backend = ScriptedBackend::new();
        let sink = sink(&backend, LogFormat::Raw);

        backend.refuse();
        for _ in 0..3 {
            let _ = sink.deliver(64, &[b"lost"], Level::Info, Facility::User, None);
        }

        // Refuse only the announcement
        backend.refuse_matching(b"dropped");
        let err = sink
            .deliver(64, &[b"fourth"], Level::Info, Facility::User, None)
            .unwrap_err();

        assert!(matches!(
            err,
            DispatcherError::Dropped {
                reason: DropReason::AnnouncementFailed { pending: 3, .. },
                ..
            }
        ));
        assert!(backend.records().is_empty());
        // The withheld message is itself a drop
        assert_eq!(sink.dropped(), 4);
    }

    #[test]
    fn test_announcement_uses_sink_format() {
        let backend = ScriptedBackend::new();
        let sink = sink(&backend, LogFormat::Priority);

        backend.refuse();
        let _ = sink.deliver(64, &[b"lost"], Level::Info, Facility::User, None);
        backend.accept();
        sink.deliver(64, &[b"next"], Level::Info, Facility::Local0, None)
            .unwrap();

        // local0 notice = 133, local0 info = 134
        assert_eq!(
            backend.records(),
            vec![b"<133>1 event dropped".to_vec(), b"<134>next".to_vec()]
        );
    }

    #[test]
    fn test_concurrent_failures_all_counted() {
        let backend = ScriptedBackend::new();
        backend.refuse();
        let sink = sink(&backend, LogFormat::Raw);

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..100 {
                        assert!(sink
                            .deliver(64, &[b"lost"], Level::Info, Facility::User, None)
                            .is_err());
                    }
                });
            }
        });

        assert_eq!(sink.dropped(), 800);
        assert_eq!(sink.metrics().dropped(), 800);
    }

    #[test]
    fn test_announcement_excludes_concurrent_writers() {
        let backend = ScriptedBackend::new();
        let sink = sink(&backend, LogFormat::Raw);

        backend.refuse();
        for _ in 0..5 {
            let _ = sink.deliver(64, &[b"lost"], Level::Info, Facility::User, None);
        }
        backend.accept();
        backend.set_delay(std::time::Duration::from_micros(200));

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..20 {
                        sink.deliver(64, &[b"msg"], Level::Info, Facility::User, None)
                            .unwrap();
                    }
                });
            }
        });

        let records = backend.records();
        assert_eq!(backend.overlaps(), 0);
        assert_eq!(records.len(), 161);
        assert_eq!(records[0], b"5 events dropped".to_vec());
        assert_eq!(sink.dropped(), 0);
    }
}
