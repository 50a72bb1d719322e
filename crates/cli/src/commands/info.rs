//! `info` command implementation.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use contracts::SinkBlueprint;
use serde::Serialize;
use tracing::info;

use super::load_blueprint;
use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    producer: ProducerInfo,
    sinks: Vec<SinkInfo>,
}

#[derive(Serialize)]
struct ProducerInfo {
    facility: String,
    level: String,
    max_len: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hostname: Option<String>,
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    description: String,
    sink_type: String,
    format: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    params: BTreeMap<String, String>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    let blueprint = load_blueprint(&args.config)?;

    if args.json {
        let info = build_config_info(&blueprint, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint, args);
    }

    Ok(())
}

fn build_config_info(blueprint: &SinkBlueprint, args: &InfoArgs) -> ConfigInfo {
    let producer = &blueprint.producer;
    let sinks = blueprint
        .sinks
        .iter()
        .map(|s| SinkInfo {
            name: s.name.clone(),
            description: s.description_or_name().to_string(),
            sink_type: format!("{:?}", s.sink_type),
            format: s.format.to_string(),
            params: if args.params {
                s.params.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
            } else {
                BTreeMap::new()
            },
        })
        .collect();

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        producer: ProducerInfo {
            facility: producer.facility.to_string(),
            level: producer.level.to_string(),
            max_len: producer.max_len,
            tag: producer.tag.clone(),
            hostname: producer.hostname.clone(),
        },
        sinks,
    }
}

fn print_config_info(blueprint: &SinkBlueprint, args: &InfoArgs) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                 Eventsink Configuration                      ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let producer = &blueprint.producer;
    println!("📝 Producer");
    println!("   ├─ Version: {:?}", blueprint.version);
    println!("   ├─ Facility: {}", producer.facility);
    println!("   ├─ Level: {}", producer.level);
    println!("   ├─ Tag: {}", producer.tag.as_deref().unwrap_or("-"));
    println!("   ├─ Hostname: {}", producer.hostname.as_deref().unwrap_or("-"));
    println!("   └─ Max length: {} bytes", producer.max_len);

    println!("\n📤 Sinks ({})", blueprint.sinks.len());
    for (i, sink) in blueprint.sinks.iter().enumerate() {
        let is_last = i == blueprint.sinks.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };
        let child_prefix = if is_last { "   " } else { "│  " };

        println!(
            "   {} {} ({:?}, {}) - {}",
            prefix,
            sink.name,
            sink.sink_type,
            sink.format,
            sink.description_or_name()
        );

        if args.params && !sink.params.is_empty() {
            let params: BTreeMap<_, _> = sink.params.iter().collect();
            for (j, (key, value)) in params.iter().enumerate() {
                let param_prefix = if j == params.len() - 1 { "└─" } else { "├─" };
                println!("   {}  {} {} = {}", child_prefix, param_prefix, key, value);
            }
        }
    }

    println!();
}
