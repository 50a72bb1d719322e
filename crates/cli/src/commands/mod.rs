//! Command implementations.

mod announce;
mod emit;
mod info;
mod validate;

pub use announce::run_announce;
pub use emit::run_emit;
pub use info::run_info;
pub use validate::run_validate;

use std::path::Path;

use anyhow::{Context, Result};
use contracts::SinkBlueprint;
use dispatcher::SinkRegistry;

use crate::error::CliError;

/// Load a validated blueprint, failing early on a missing file
pub(crate) fn load_blueprint(path: &Path) -> Result<SinkBlueprint> {
    if !path.exists() {
        return Err(CliError::config_not_found(path.display().to_string()).into());
    }
    config_loader::ConfigLoader::load_from_path(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))
}

/// Tear down every sink, then hand back the command's outcome.
///
/// Sinks are flushed and their pending drops logged even when the command
/// failed.
pub(crate) fn release<T>(registry: &SinkRegistry, outcome: Result<T>) -> Result<T> {
    registry.teardown();
    outcome
}
