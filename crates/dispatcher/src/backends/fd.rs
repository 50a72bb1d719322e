//! FdBackend - one line per message to stdout, stderr or a file

use std::collections::HashMap;
use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;

use contracts::{BackendKind, ContractError, SinkBackend};
use parking_lot::Mutex;
use tracing::debug;

use super::gather;

/// Where an [`FdBackend`] writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FdTarget {
    Stdout,
    Stderr,
    /// Opened in append mode, created when missing
    File(PathBuf),
}

impl FdTarget {
    /// Parse `target` (default `stdout`) and `path` params
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, ContractError> {
        match params.get("target").map(String::as_str) {
            None | Some("stdout") => Ok(Self::Stdout),
            Some("stderr") => Ok(Self::Stderr),
            Some("file") => params
                .get("path")
                .map(|p| Self::File(PathBuf::from(p)))
                .ok_or_else(|| ContractError::config_validation("params.path", "file target requires a path")),
            Some(other) => Err(ContractError::config_validation(
                "params.target",
                format!("unknown fd target '{}'", other),
            )),
        }
    }
}

impl fmt::Display for FdTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => f.write_str("stdout"),
            Self::Stderr => f.write_str("stderr"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Writes each message as one line; the trailing `\n` counts toward `max_len`.
pub struct FdBackend {
    label: String,
    writer: Mutex<Box<dyn Write + Send>>,
}

impl FdBackend {
    pub fn open(target: FdTarget) -> io::Result<Self> {
        let label = target.to_string();
        let writer: Box<dyn Write + Send> = match target {
            FdTarget::Stdout => Box::new(io::stdout()),
            FdTarget::Stderr => Box::new(io::stderr()),
            FdTarget::File(path) => Box::new(
                OpenOptions::new().create(true).append(true).open(&path)?,
            ),
        };
        debug!(target_fd = %label, "FdBackend opened");
        Ok(Self::from_writer(label, writer))
    }

    /// Wrap an arbitrary writer
    pub fn from_writer(label: impl Into<String>, writer: impl Write + Send + 'static) -> Self {
        Self {
            label: label.into(),
            writer: Mutex::new(Box::new(writer)),
        }
    }

    /// Create from params (for registry)
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, ContractError> {
        let target = FdTarget::from_params(params)?;
        Self::open(target).map_err(ContractError::Io)
    }
}

impl fmt::Debug for FdBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FdBackend")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl SinkBackend for FdBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Fd
    }

    fn write(&self, parts: &[&[u8]], max_len: usize) -> Result<usize, ContractError> {
        if max_len == 0 {
            return Ok(0);
        }
        // Keep room for the newline
        let mut line = gather(parts, max_len - 1);
        line.push(b'\n');

        self.writer.lock().write_all(&line)?;
        Ok(line.len())
    }

    fn flush(&self) -> Result<(), ContractError> {
        self.writer.lock().flush()?;
        Ok(())
    }
}
