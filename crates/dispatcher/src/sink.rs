//! Sink entity
//!
//! A [`Sink`] is created once through the registry and shared by producers
//! as `Arc<Sink>`. Its name, description, format and backend never change;
//! only the delivery state does.

use std::fmt;

use contracts::{BackendKind, ContractError, LogFormat, SinkBackend, SinkName};

use crate::metrics::{MetricsSnapshot, SinkMetrics};
use crate::state::SinkState;

pub struct Sink {
    pub(crate) name: SinkName,
    pub(crate) description: String,
    pub(crate) format: LogFormat,
    pub(crate) backend: Box<dyn SinkBackend>,
    pub(crate) state: SinkState,
    pub(crate) metrics: SinkMetrics,
}

impl Sink {
    /// Wrap `backend` in a new sink with no pending drops.
    pub fn new(
        name: impl Into<SinkName>,
        description: impl Into<String>,
        format: LogFormat,
        backend: Box<dyn SinkBackend>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            format,
            backend,
            state: SinkState::new(),
            metrics: SinkMetrics::new(),
        }
    }

    pub fn name(&self) -> &SinkName {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn format(&self) -> LogFormat {
        self.format
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Ring size for ring-backed sinks
    pub fn capacity(&self) -> Option<usize> {
        self.backend.capacity()
    }

    /// Messages lost since the last successful announcement
    pub fn dropped(&self) -> u32 {
        self.state.dropped()
    }

    pub fn metrics(&self) -> &SinkMetrics {
        &self.metrics
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot(self.state.dropped())
    }

    /// Flush the backend under shared access
    pub fn flush(&self) -> Result<(), ContractError> {
        let _access = self.state.shared();
        self.backend.flush()
    }
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sink")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("format", &self.format)
            .field("backend", &self.backend.kind())
            .field("dropped", &self.state.dropped())
            .finish()
    }
}
