//! Output encodings a sink can be configured with.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Header encoding applied in front of every message a sink emits.
///
/// The encoding only changes the bytes that reach the backend; delivery and
/// drop accounting are identical for every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Message parts as-is, no header
    #[default]
    Raw,
    /// `<LEVEL>` prefix only
    Short,
    /// `<PRI>` prefix only
    Priority,
    /// RFC 3339 timestamp prefix
    Iso,
    /// `<PRI>` followed by an RFC 3339 timestamp
    Timed,
    /// BSD syslog header
    Rfc3164,
    /// IETF syslog header
    Rfc5424,
}

impl LogFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "raw" => Some(Self::Raw),
            "short" => Some(Self::Short),
            "priority" => Some(Self::Priority),
            "iso" => Some(Self::Iso),
            "timed" => Some(Self::Timed),
            "rfc3164" => Some(Self::Rfc3164),
            "rfc5424" => Some(Self::Rfc5424),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Short => "short",
            Self::Priority => "priority",
            Self::Iso => "iso",
            Self::Timed => "timed",
            Self::Rfc3164 => "rfc3164",
            Self::Rfc5424 => "rfc5424",
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, String> {
        Self::from_name(s).ok_or_else(|| format!("unknown log format '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(LogFormat::from_name("RFC5424"), Some(LogFormat::Rfc5424));
        assert_eq!(LogFormat::from_name("short"), Some(LogFormat::Short));
        assert_eq!(LogFormat::from_name("json"), None);
    }

    #[test]
    fn test_serde_snake_case() {
        let parsed: LogFormat = serde_json::from_str("\"rfc3164\"").unwrap();
        assert_eq!(parsed, LogFormat::Rfc3164);
        assert_eq!(serde_json::to_string(&LogFormat::Timed).unwrap(), "\"timed\"");
    }
}
