//! Per-message header metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of parts a single message may be split into.
pub const MAX_MESSAGE_PARTS: usize = 8;

/// Optional header fields attached to a message.
///
/// Encoders that need a field which is absent fall back to a placeholder
/// (`-` for RFC 5424) or omit it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Event time; encoders use the current time when absent
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,

    #[serde(default)]
    pub hostname: Option<String>,

    /// Application tag (syslog APP-NAME)
    #[serde(default)]
    pub tag: Option<String>,

    #[serde(default)]
    pub pid: Option<u32>,

    #[serde(default)]
    pub msgid: Option<String>,

    /// Pre-rendered RFC 5424 STRUCTURED-DATA
    #[serde(default)]
    pub structured_data: Option<String>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_pid(mut self, pid: u32) -> Self {
        self.pid = Some(pid);
        self
    }

    pub fn with_msgid(mut self, msgid: impl Into<String>) -> Self {
        self.msgid = Some(msgid.into());
        self
    }

    pub fn with_structured_data(mut self, sd: impl Into<String>) -> Self {
        self.structured_data = Some(sd.into());
        self
    }
}
