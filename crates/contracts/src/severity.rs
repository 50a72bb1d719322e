//! Syslog-style severity levels and facility codes.
//!
//! Numeric values follow RFC 5424 so that `facility * 8 + level` is the
//! on-the-wire PRI value.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Message severity (RFC 5424 section 6.2.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Level {
    Emerg = 0,
    Alert = 1,
    Crit = 2,
    #[serde(rename = "err", alias = "error")]
    Error = 3,
    Warning = 4,
    Notice = 5,
    #[default]
    Info = 6,
    Debug = 7,
}

impl Level {
    const ALL: [Level; 8] = [
        Level::Emerg,
        Level::Alert,
        Level::Crit,
        Level::Error,
        Level::Warning,
        Level::Notice,
        Level::Info,
        Level::Debug,
    ];

    /// Numeric severity code.
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Parse a severity name, case-insensitive.
    ///
    /// Accepts the syslog spellings plus the common `error`/`warn`/`emergency` aliases.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "emerg" | "emergency" => Some(Self::Emerg),
            "alert" => Some(Self::Alert),
            "crit" | "critical" => Some(Self::Crit),
            "err" | "error" => Some(Self::Error),
            "warning" | "warn" => Some(Self::Warning),
            "notice" => Some(Self::Notice),
            "info" => Some(Self::Info),
            "debug" => Some(Self::Debug),
            _ => None,
        }
    }

    /// Look a level up by its numeric code.
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Emerg => "emerg",
            Self::Alert => "alert",
            Self::Crit => "crit",
            Self::Error => "err",
            Self::Warning => "warning",
            Self::Notice => "notice",
            Self::Info => "info",
            Self::Debug => "debug",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, String> {
        Self::from_name(s).ok_or_else(|| format!("unknown log level '{s}'"))
    }
}

/// Syslog facility code (RFC 5424 section 6.2.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Facility {
    Kern = 0,
    #[default]
    User = 1,
    Mail = 2,
    Daemon = 3,
    Auth = 4,
    Syslog = 5,
    Lpr = 6,
    News = 7,
    Uucp = 8,
    Cron = 9,
    Auth2 = 10,
    Ftp = 11,
    Ntp = 12,
    Audit = 13,
    Alert = 14,
    Cron2 = 15,
    Local0 = 16,
    Local1 = 17,
    Local2 = 18,
    Local3 = 19,
    Local4 = 20,
    Local5 = 21,
    Local6 = 22,
    Local7 = 23,
}

impl Facility {
    const ALL: [Facility; 24] = [
        Facility::Kern,
        Facility::User,
        Facility::Mail,
        Facility::Daemon,
        Facility::Auth,
        Facility::Syslog,
        Facility::Lpr,
        Facility::News,
        Facility::Uucp,
        Facility::Cron,
        Facility::Auth2,
        Facility::Ftp,
        Facility::Ntp,
        Facility::Audit,
        Facility::Alert,
        Facility::Cron2,
        Facility::Local0,
        Facility::Local1,
        Facility::Local2,
        Facility::Local3,
        Facility::Local4,
        Facility::Local5,
        Facility::Local6,
        Facility::Local7,
    ];

    /// Numeric facility code.
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// PRI value combining this facility with `level`.
    #[inline]
    pub const fn priority(self, level: Level) -> u8 {
        self.code() * 8 + level.code()
    }

    /// Parse a facility name, case-insensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        Self::ALL.iter().copied().find(|f| f.as_str() == lower)
    }

    /// Look a facility up by its numeric code.
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Kern => "kern",
            Self::User => "user",
            Self::Mail => "mail",
            Self::Daemon => "daemon",
            Self::Auth => "auth",
            Self::Syslog => "syslog",
            Self::Lpr => "lpr",
            Self::News => "news",
            Self::Uucp => "uucp",
            Self::Cron => "cron",
            Self::Auth2 => "auth2",
            Self::Ftp => "ftp",
            Self::Ntp => "ntp",
            Self::Audit => "audit",
            Self::Alert => "alert",
            Self::Cron2 => "cron2",
            Self::Local0 => "local0",
            Self::Local1 => "local1",
            Self::Local2 => "local2",
            Self::Local3 => "local3",
            Self::Local4 => "local4",
            Self::Local5 => "local5",
            Self::Local6 => "local6",
            Self::Local7 => "local7",
        }
    }
}

impl fmt::Display for Facility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Facility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, String> {
        Self::from_name(s).ok_or_else(|| format!("unknown syslog facility '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority() {
        assert_eq!(Facility::Kern.priority(Level::Emerg), 0);
        assert_eq!(Facility::Local0.priority(Level::Info), 134);
        assert_eq!(Facility::Daemon.priority(Level::Notice), 29);
    }

    #[test]
    fn test_level_names() {
        assert_eq!(Level::from_name("WARN"), Some(Level::Warning));
        assert_eq!(Level::from_name("error"), Some(Level::Error));
        assert_eq!(Level::from_name("verbose"), None);
        assert_eq!("notice".parse::<Level>(), Ok(Level::Notice));
    }

    #[test]
    fn test_facility_names_and_codes() {
        assert_eq!(Facility::from_name("LOCAL3"), Some(Facility::Local3));
        assert_eq!(Facility::from_code(23), Some(Facility::Local7));
        assert_eq!(Facility::from_code(24), None);
        for code in 0..24u8 {
            let facility = Facility::from_code(code).unwrap();
            assert_eq!(facility.code(), code);
            assert_eq!(Facility::from_name(facility.as_str()), Some(facility));
        }
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&Facility::Local0).unwrap();
        assert_eq!(json, "\"local0\"");
        let level: Level = serde_json::from_str("\"debug\"").unwrap();
        assert_eq!(level, Level::Debug);
    }
}
