//! Controllable backend for tests
//!
//! Enabled for this crate's unit tests and, through the `testing` feature,
//! for the integration crate.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use contracts::{BackendKind, ContractError, SinkBackend};
use parking_lot::Mutex;

use crate::backends::gather;

#[derive(Debug, Clone)]
enum Mode {
    Accept,
    Refuse,
    AcceptNothing,
    RefuseMatching(Vec<u8>),
}

#[derive(Debug)]
struct Inner {
    mode: Mutex<Mode>,
    /// Refuse every n-th write that is not an announcement, when non-zero
    refuse_every: AtomicUsize,
    records: Mutex<Vec<Vec<u8>>>,
    write_calls: AtomicUsize,
    in_flight: AtomicUsize,
    announcing: AtomicBool,
    overlaps: AtomicUsize,
    delay: Mutex<Option<Duration>>,
}

/// Records every accepted write; can be switched to refuse at any time.
///
/// Clones share state, so a test keeps one handle while the sink owns
/// another. Writes that run alongside an announcement are counted as
/// overlaps.
#[derive(Debug, Clone)]
pub struct ScriptedBackend {
    inner: Arc<Inner>,
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                mode: Mutex::new(Mode::Accept),
                refuse_every: AtomicUsize::new(0),
                records: Mutex::new(Vec::new()),
                write_calls: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                announcing: AtomicBool::new(false),
                overlaps: AtomicUsize::new(0),
                delay: Mutex::new(None),
            }),
        }
    }

    pub fn accept(&self) {
        *self.inner.mode.lock() = Mode::Accept;
    }

    pub fn refuse(&self) {
        *self.inner.mode.lock() = Mode::Refuse;
    }

    pub fn accept_nothing(&self) {
        *self.inner.mode.lock() = Mode::AcceptNothing;
    }

    /// Refuse only records containing `pattern`
    pub fn refuse_matching(&self, pattern: &[u8]) {
        *self.inner.mode.lock() = Mode::RefuseMatching(pattern.to_vec());
    }

    /// Refuse every `n`-th normal write; announcements still go through
    pub fn refuse_every(&self, n: usize) {
        self.inner.refuse_every.store(n, Ordering::SeqCst);
    }

    /// Hold each write open for `delay` to widen race windows
    pub fn set_delay(&self, delay: Duration) {
        *self.inner.delay.lock() = Some(delay);
    }

    pub fn records(&self) -> Vec<Vec<u8>> {
        self.inner.records.lock().clone()
    }

    pub fn records_utf8(&self) -> Vec<String> {
        self.records()
            .into_iter()
            .map(|r| String::from_utf8_lossy(&r).into_owned())
            .collect()
    }

    pub fn write_calls(&self) -> usize {
        self.inner.write_calls.load(Ordering::SeqCst)
    }

    /// Writes that ran concurrently with an announcement
    pub fn overlaps(&self) -> usize {
        self.inner.overlaps.load(Ordering::SeqCst)
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    !needle.is_empty() && haystack.windows(needle.len()).any(|w| w == needle)
}

impl SinkBackend for ScriptedBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Other
    }

    fn write(&self, parts: &[&[u8]], max_len: usize) -> Result<usize, ContractError> {
        let inner = &self.inner;
        let call = inner.write_calls.fetch_add(1, Ordering::SeqCst) + 1;
        let record = gather(parts, max_len);
        let is_announcement = contains(&record, b"dropped");

        let concurrent = inner.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        if is_announcement {
            if concurrent > 1 {
                inner.overlaps.fetch_add(1, Ordering::SeqCst);
            }
            inner.announcing.store(true, Ordering::SeqCst);
        } else if inner.announcing.load(Ordering::SeqCst) {
            inner.overlaps.fetch_add(1, Ordering::SeqCst);
        }

        let delay = *inner.delay.lock();
        if let Some(delay) = delay {
            thread::sleep(delay);
        }

        let every = inner.refuse_every.load(Ordering::SeqCst);
        let periodic_refusal = !is_announcement && every > 0 && call % every == 0;

        let mode = inner.mode.lock().clone();
        let result = match mode {
            Mode::Refuse => Err(ContractError::backend_refused("scripted", "refused")),
            Mode::RefuseMatching(ref pattern) if contains(&record, pattern) => {
                Err(ContractError::backend_refused("scripted", "refused"))
            }
            _ if periodic_refusal => Err(ContractError::backend_refused("scripted", "refused")),
            Mode::AcceptNothing => Ok(0),
            Mode::Accept | Mode::RefuseMatching(_) => {
                let len = record.len();
                inner.records.lock().push(record);
                Ok(len)
            }
        };

        if is_announcement {
            inner.announcing.store(false, Ordering::SeqCst);
        }
        inner.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
