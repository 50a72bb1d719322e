//! SinkBlueprint - Config Loader output
//!
//! Describes the producer defaults and the ordered list of sinks to create.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

use crate::{Facility, Level, LogFormat, Metadata};

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete sink configuration blueprint
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SinkBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Defaults applied to messages emitted by local producers
    #[serde(default)]
    #[validate(nested)]
    pub producer: ProducerConfig,

    /// Sinks, created in declaration order
    #[serde(default)]
    #[validate(nested)]
    pub sinks: Vec<SinkConfig>,
}

impl SinkBlueprint {
    /// Look up a sink configuration by name
    pub fn sink(&self, name: &str) -> Option<&SinkConfig> {
        self.sinks.iter().find(|s| s.name == name)
    }
}

/// Producer defaults: facility, level, header fields and size cap
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProducerConfig {
    #[serde(default)]
    pub facility: Facility,

    #[serde(default)]
    pub level: Level,

    /// Application tag placed in syslog headers
    #[serde(default)]
    pub tag: Option<String>,

    #[serde(default)]
    pub hostname: Option<String>,

    /// Upper bound on the serialized length of one message
    #[serde(default = "default_max_len")]
    #[validate(range(min = 1, message = "max_len must be > 0"))]
    pub max_len: usize,
}

impl ProducerConfig {
    /// Header metadata derived from these defaults
    pub fn metadata(&self) -> Metadata {
        Metadata {
            hostname: self.hostname.clone(),
            tag: self.tag.clone(),
            pid: Some(std::process::id()),
            ..Metadata::default()
        }
    }
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            facility: Facility::default(),
            level: Level::default(),
            tag: None,
            hostname: None,
            max_len: default_max_len(),
        }
    }
}

fn default_max_len() -> usize {
    1024
}

/// Sink output configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SinkConfig {
    /// Unique sink name
    #[validate(length(min = 1, message = "sink name cannot be empty"))]
    pub name: String,

    /// Free-form description shown in diagnostics
    #[serde(default)]
    pub description: Option<String>,

    /// Header encoding
    #[serde(default)]
    pub format: LogFormat,

    /// Backend type
    pub sink_type: SinkType,

    /// Backend-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

impl SinkConfig {
    /// Description, falling back to the sink name
    pub fn description_or_name(&self) -> &str {
        self.description.as_deref().unwrap_or(&self.name)
    }
}

/// Sink backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// File descriptor output (stdout / stderr / file)
    Fd,
    /// In-memory ring buffer
    Ring,
    /// UDP datagrams
    Udp,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_blueprint() -> SinkBlueprint {
        SinkBlueprint {
            version: ConfigVersion::V1,
            producer: ProducerConfig::default(),
            sinks: vec![SinkConfig {
                name: "buf0".into(),
                description: None,
                format: LogFormat::Rfc5424,
                sink_type: SinkType::Ring,
                params: HashMap::from([("size".into(), "4096".into())]),
            }],
        }
    }

    #[test]
    fn test_field_validation_passes() {
        assert!(sample_blueprint().validate().is_ok());
    }

    #[test]
    fn test_field_validation_rejects_empty_name() {
        let mut bp = sample_blueprint();
        bp.sinks[0].name.clear();
        assert!(bp.validate().is_err());
    }

    #[test]
    fn test_field_validation_rejects_zero_max_len() {
        let mut bp = sample_blueprint();
        bp.producer.max_len = 0;
        assert!(bp.validate().is_err());
    }

    #[test]
    fn test_lookup_and_description() {
        let bp = sample_blueprint();
        let sink = bp.sink("buf0").unwrap();
        assert_eq!(sink.description_or_name(), "buf0");
        assert!(bp.sink("missing").is_none());
    }

    #[test]
    fn test_producer_metadata() {
        let producer = ProducerConfig {
            tag: Some("edge".into()),
            hostname: Some("node-1".into()),
            ..ProducerConfig::default()
        };
        let meta = producer.metadata();
        assert_eq!(meta.tag.as_deref(), Some("edge"));
        assert_eq!(meta.pid, Some(std::process::id()));
    }
}
