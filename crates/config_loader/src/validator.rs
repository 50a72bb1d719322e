//! Configuration validation
//!
//! Rules:
//! - field-level constraints declared on the blueprint types (`validator` derive)
//! - sink names unique
//! - ring `size` parses and can hold at least one `producer.max_len` message
//! - fd `target` is stdout / stderr / file (file requires `path`)
//! - udp `addr` is a socket address

use std::collections::HashSet;
use std::net::SocketAddr;

use contracts::{ContractError, SinkBlueprint, SinkConfig, SinkType};
use validator::Validate;

/// Validate a SinkBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &SinkBlueprint) -> Result<(), ContractError> {
    validate_fields(blueprint)?;
    validate_sink_names(blueprint)?;
    for (idx, sink) in blueprint.sinks.iter().enumerate() {
        validate_sink_params(idx, sink, blueprint.producer.max_len)?;
    }
    Ok(())
}

/// Field-level rules declared with `#[validate(..)]`
fn validate_fields(blueprint: &SinkBlueprint) -> Result<(), ContractError> {
    blueprint
        .validate()
        .map_err(|e| ContractError::config_validation("blueprint", e.to_string()))
}

/// Sink names must be unique
fn validate_sink_names(blueprint: &SinkBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, sink) in blueprint.sinks.iter().enumerate() {
        if !seen.insert(sink.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("sinks[{}].name", idx),
                format!("duplicate sink name '{}'", sink.name),
            ));
        }
    }
    Ok(())
}

fn validate_sink_params(idx: usize, sink: &SinkConfig, max_len: usize) -> Result<(), ContractError> {
    let field = |key: &str| format!("sinks[{}].params.{}", idx, key);

    match sink.sink_type {
        SinkType::Fd => match sink.params.get("target").map(String::as_str) {
            None | Some("stdout") | Some("stderr") => Ok(()),
            Some("file") => {
                if sink.params.get("path").is_none_or(|p| p.is_empty()) {
                    return Err(ContractError::config_validation(
                        field("path"),
                        "fd target 'file' requires a path",
                    ));
                }
                Ok(())
            }
            Some(other) => Err(ContractError::config_validation(
                field("target"),
                format!("unknown fd target '{}'", other),
            )),
        },
        SinkType::Ring => {
            let raw = sink.params.get("size").ok_or_else(|| {
                ContractError::config_validation(field("size"), "ring sink requires a size")
            })?;
            let size: usize = raw.parse().map_err(|_| {
                ContractError::config_validation(field("size"), format!("invalid ring size '{}'", raw))
            })?;
            if size < max_len {
                return Err(ContractError::config_validation(
                    field("size"),
                    format!(
                        "ring size ({}) must be >= producer.max_len ({})",
                        size, max_len
                    ),
                ));
            }
            if let Some(flag) = sink.params.get("overwrite") {
                flag.parse::<bool>().map_err(|_| {
                    ContractError::config_validation(
                        field("overwrite"),
                        format!("expected true/false, got '{}'", flag),
                    )
                })?;
            }
            Ok(())
        }
        SinkType::Udp => {
            let raw = sink.params.get("addr").ok_or_else(|| {
                ContractError::config_validation(field("addr"), "udp sink requires an addr")
            })?;
            raw.parse::<SocketAddr>().map_err(|e| {
                ContractError::config_validation(field("addr"), format!("invalid address '{}': {}", raw, e))
            })?;
            Ok(())
        }
    }
}
