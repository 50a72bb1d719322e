//! # Observability
//!
//! Tracing initialisation, Prometheus export and delivery metrics.
//!
//! ## Features
//!
//! - Tracing setup (JSON / Pretty / Compact)
//! - Prometheus exporter
//! - Per-sink delivery, drop and announcement counters
//! - In-memory aggregation of producer runs
//!
//! ## Example
//!
//! ```ignore
//! use observability::metrics;
//!
//! observability::init_with_config(ObservabilityConfig {
//!     metrics_port: None,
//!     ..Default::default()
//! })?;
//!
//! match sink.deliver(1024, &[b"hello"], Level::Info, Facility::User, None) {
//!     Ok(bytes) => metrics::record_delivery("buf0", bytes),
//!     Err(_) => metrics::record_drop("buf0"),
//! }
//! ```

pub mod metrics;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::Subscriber;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

// Re-exports
pub use crate::metrics::{
    record_announcement, record_delivery, record_drop, record_pending_drops, record_truncation,
    DeliveryStatsAggregator, DeliverySummary, RunningStats, StatsSummary,
};

/// Observability configuration
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Log output format
    pub log_format: LogFormat,
    /// Prometheus port (None = disabled)
    pub metrics_port: Option<u16>,
    /// Filter used when `RUST_LOG` is unset
    pub default_log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Json,
            metrics_port: Some(9000),
            default_log_level: "info".to_string(),
        }
    }
}

/// Log format
#[derive(Debug, Clone, Copy, Default)]
pub enum LogFormat {
    /// Structured JSON
    #[default]
    Json,
    /// Human-readable
    Pretty,
    /// Single-line compact
    Compact,
}

/// Install the global tracing subscriber and, when a port is set, the
/// Prometheus recorder.
///
/// Fails if a global subscriber is already installed.
pub fn init_with_config(config: ObservabilityConfig) -> Result<()> {
    tracing_subscriber::registry()
        .with(env_filter(&config.default_log_level))
        .with(fmt_layer(config.log_format))
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    if let Some(port) = config.metrics_port {
        install_prometheus(port)?;
    }

    tracing::info!(
        log_format = ?config.log_format,
        metrics_port = ?config.metrics_port,
        "Observability initialized"
    );

    Ok(())
}

/// Install only the Prometheus recorder
///
/// For binaries that set up their own tracing subscriber.
pub fn init_metrics_only(port: u16) -> Result<()> {
    install_prometheus(port)
}

/// `RUST_LOG` if set and valid, otherwise `default_level`
fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Formatting layer for the requested output format
fn fmt_layer<S>(format: LogFormat) -> Box<dyn Layer<S> + Send + Sync + 'static>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    match format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        LogFormat::Pretty => fmt::layer().pretty().boxed(),
        LogFormat::Compact => fmt::layer().compact().boxed(),
    }
}

fn install_prometheus(port: u16) -> Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install()
        .context("Failed to install Prometheus recorder")?;

    tracing::info!(port = port, "Prometheus metrics endpoint initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ObservabilityConfig::default();
        assert_eq!(config.metrics_port, Some(9000));
        assert_eq!(config.default_log_level, "info");
        assert!(matches!(config.log_format, LogFormat::Json));
    }

    #[test]
    fn test_init_without_metrics_installs_once() {
        let config = ObservabilityConfig {
            log_format: LogFormat::Compact,
            metrics_port: None,
            default_log_level: "warn".to_string(),
        };

        assert!(init_with_config(config.clone()).is_ok());
        assert!(init_with_config(config).is_err());
    }
}
