//! Sink registry - name lookup and ordered enumeration
//!
//! The registry is an explicit object created with [`SinkRegistry::new`] and
//! closed with [`SinkRegistry::teardown`]; callers inject it wherever lookup
//! is needed.

use std::collections::HashMap;
use std::sync::Arc;

use contracts::{BackendKind, LogFormat, SinkBackend, SinkBlueprint, SinkConfig, SinkName, SinkType};
use parking_lot::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::backends::{backend_from_params, FdBackend, FdTarget, RingBackend};
use crate::error::DispatcherError;
use crate::metrics::MetricsSnapshot;
use crate::sink::Sink;

#[derive(Default)]
struct RegistryInner {
    /// Creation order
    sinks: Vec<Arc<Sink>>,
    index: HashMap<SinkName, usize>,
    /// Handles onto ring contents, by sink name
    rings: HashMap<SinkName, RingBackend>,
}

/// Registry of named sinks
#[derive(Default)]
pub struct SinkRegistry {
    inner: RwLock<RegistryInner>,
}

impl std::fmt::Debug for SinkRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SinkRegistry").finish_non_exhaustive()
    }
}

impl SinkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry holding every sink of a validated blueprint, in order
    #[instrument(
        name = "registry_from_blueprint",
        skip(blueprint),
        fields(sink_count = blueprint.sinks.len())
    )]
    pub fn from_blueprint(blueprint: &SinkBlueprint) -> Result<Self, DispatcherError> {
        let registry = Self::new();
        for config in &blueprint.sinks {
            registry.create_from_config(config)?;
        }
        info!(sinks = registry.len(), "Sink registry built");
        Ok(registry)
    }

    fn create_from_config(&self, config: &SinkConfig) -> Result<Arc<Sink>, DispatcherError> {
        let description = config.description_or_name().to_string();
        match config.sink_type {
            SinkType::Ring => {
                let ring = RingBackend::from_params(&config.params)
                    .map_err(|e| DispatcherError::sink_creation(&config.name, e.to_string()))?;
                self.register_ring(&config.name, description, config.format, ring)
            }
            sink_type => {
                let backend = backend_from_params(sink_type, &config.params)
                    .map_err(|e| DispatcherError::sink_creation(&config.name, e.to_string()))?;
                self.create(config.name.as_str(), description, config.format, backend)
            }
        }
    }

    /// Find a sink by name
    pub fn find(&self, name: &str) -> Option<Arc<Sink>> {
        let inner = self.inner.read();
        inner.index.get(name).map(|&i| Arc::clone(&inner.sinks[i]))
    }

    /// Register a new sink around `backend`
    ///
    /// # Errors
    /// [`DispatcherError::DuplicateSink`] when the name is taken; the
    /// existing sink is left in place.
    #[instrument(
        name = "registry_create",
        skip(self, description, backend),
        fields(backend = %backend.kind())
    )]
    pub fn create(
        &self,
        name: &str,
        description: impl Into<String>,
        format: LogFormat,
        backend: Box<dyn SinkBackend>,
    ) -> Result<Arc<Sink>, DispatcherError> {
        let sink = Arc::new(Sink::new(name, description, format, backend));

        let mut inner = self.inner.write();
        if inner.index.contains_key(name) {
            return Err(DispatcherError::DuplicateSink {
                name: sink.name().clone(),
            });
        }
        let position = inner.sinks.len();
        inner.index.insert(sink.name().clone(), position);
        inner.sinks.push(Arc::clone(&sink));

        debug!(sink = %name, position, "Sink registered");
        Ok(sink)
    }

    /// Register a sink writing lines to stdout, stderr or a file
    pub fn create_fd(
        &self,
        name: &str,
        description: impl Into<String>,
        format: LogFormat,
        target: FdTarget,
    ) -> Result<Arc<Sink>, DispatcherError> {
        let backend = FdBackend::open(target)
            .map_err(|e| DispatcherError::sink_creation(name, e.to_string()))?;
        self.create(name, description, format, Box::new(backend))
    }

    /// Register a sink writing into an in-memory ring of `size` bytes
    pub fn create_ring(
        &self,
        name: &str,
        description: impl Into<String>,
        format: LogFormat,
        size: usize,
    ) -> Result<Arc<Sink>, DispatcherError> {
        if size == 0 {
            return Err(DispatcherError::sink_creation(name, "ring size must be > 0"));
        }
        self.register_ring(name, description, format, RingBackend::new(size))
    }

    fn register_ring(
        &self,
        name: &str,
        description: impl Into<String>,
        format: LogFormat,
        ring: RingBackend,
    ) -> Result<Arc<Sink>, DispatcherError> {
        let handle = ring.clone();
        let sink = self.create(name, description, format, Box::new(ring))?;
        self.inner.write().rings.insert(sink.name().clone(), handle);
        Ok(sink)
    }

    /// Resolve a log target naming a ring sink able to hold `max_len` bytes
    pub fn resolve_ring(&self, name: &str, max_len: usize) -> Result<Arc<Sink>, DispatcherError> {
        let sink = self.find(name).ok_or_else(|| DispatcherError::SinkNotFound {
            name: name.to_string(),
        })?;

        if sink.backend_kind() != BackendKind::Ring {
            return Err(DispatcherError::NotARing {
                name: sink.name().clone(),
            });
        }

        let capacity = sink.capacity().unwrap_or(0);
        if capacity < max_len {
            return Err(DispatcherError::RingTooSmall {
                name: sink.name().clone(),
                capacity,
                max_len,
            });
        }
        Ok(sink)
    }

    /// Handle onto the contents of a ring sink created by this registry
    pub fn ring(&self, name: &str) -> Option<RingBackend> {
        self.inner.read().rings.get(name).cloned()
    }

    /// Sinks in creation order
    pub fn sinks(&self) -> Vec<Arc<Sink>> {
        self.inner.read().sinks.clone()
    }

    /// Sink names in creation order
    pub fn names(&self) -> Vec<SinkName> {
        self.inner
            .read()
            .sinks
            .iter()
            .map(|s| s.name().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().sinks.is_empty()
    }

    /// Flush every backend, report per-sink state and empty the registry.
    ///
    /// Producers still holding an `Arc<Sink>` keep a working sink; it is
    /// simply no longer reachable by name.
    #[instrument(name = "registry_teardown", skip(self))]
    pub fn teardown(&self) -> Vec<(SinkName, MetricsSnapshot)> {
        let sinks = {
            let mut inner = self.inner.write();
            inner.index.clear();
            inner.rings.clear();
            std::mem::take(&mut inner.sinks)
        };

        let mut report = Vec::with_capacity(sinks.len());
        for sink in sinks {
            if let Err(e) = sink.flush() {
                warn!(sink = %sink.name(), error = %e, "Flush failed during teardown");
            }

            let snapshot = sink.snapshot();
            if snapshot.pending_drops > 0 {
                warn!(
                    sink = %sink.name(),
                    pending = snapshot.pending_drops,
                    "Sink torn down with unannounced drops"
                );
            }
            info!(
                sink = %sink.name(),
                delivered = snapshot.delivered,
                dropped = snapshot.dropped,
                announcements = snapshot.announcements,
                "Sink closed"
            );
            report.push((sink.name().clone(), snapshot));
        }
        report
    }
}
