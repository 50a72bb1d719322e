//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use contracts::{Facility, Level};
use std::path::PathBuf;

/// Eventsink - concurrent event delivery with drop accounting
#[derive(Parser, Debug)]
#[command(
    name = "eventsink",
    author,
    version,
    about = "Concurrent event sink dispatcher",
    long_about = "Delivers log events from concurrent producers to configured sinks.\n\n\
                  Messages a sink cannot accept are counted, and the count is announced \n\
                  in the sink's output before any further message."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "EVENTSINK_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "EVENTSINK_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate configuration file
    Validate(ValidateArgs),

    /// Display configured sinks
    Info(InfoArgs),

    /// Run concurrent producers against one sink
    Emit(EmitArgs),

    /// Announce pending drops on one or every sink
    Announce(AnnounceArgs),
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "eventsink.toml", env = "EVENTSINK_CONFIG")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "eventsink.toml", env = "EVENTSINK_CONFIG")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show backend parameters
    #[arg(long)]
    pub params: bool,
}

/// Arguments for the `emit` command
#[derive(Parser, Debug, Clone)]
pub struct EmitArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "eventsink.toml", env = "EVENTSINK_CONFIG")]
    pub config: PathBuf,

    /// Sink to deliver to
    #[arg(short, long)]
    pub sink: String,

    /// Number of concurrent producers
    #[arg(long, default_value = "1")]
    pub producers: usize,

    /// Messages per producer
    #[arg(long, default_value = "10")]
    pub count: u64,

    /// Message body
    #[arg(long, default_value = "event")]
    pub message: String,

    /// Severity (defaults to producer.level)
    #[arg(long)]
    pub level: Option<Level>,

    /// Facility (defaults to producer.facility)
    #[arg(long)]
    pub facility: Option<Facility>,

    /// Output size cap in bytes (defaults to producer.max_len)
    #[arg(long)]
    pub max_len: Option<usize>,

    /// Print ring contents after the run
    #[arg(long)]
    pub dump: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "EVENTSINK_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `announce` command
#[derive(Parser, Debug)]
pub struct AnnounceArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "eventsink.toml", env = "EVENTSINK_CONFIG")]
    pub config: PathBuf,

    /// Sink to announce on (all sinks when omitted)
    #[arg(short, long)]
    pub sink: Option<String>,

    /// Facility (defaults to producer.facility)
    #[arg(long)]
    pub facility: Option<Facility>,

    /// Messages delivered to each sink before announcing
    #[arg(long, default_value = "0")]
    pub burst: u64,

    /// Body of the burst messages
    #[arg(long, default_value = "event")]
    pub message: String,

    /// Empty ring sinks before announcing
    #[arg(long)]
    pub drain: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_emit() {
        let cli = Cli::try_parse_from([
            "eventsink",
            "emit",
            "-c",
            "sinks.toml",
            "--sink",
            "buf0",
            "--producers",
            "4",
            "--level",
            "warning",
            "--facility",
            "local3",
            "--dump",
        ])
        .unwrap();

        match cli.command {
            Commands::Emit(args) => {
                assert_eq!(args.sink, "buf0");
                assert_eq!(args.producers, 4);
                assert_eq!(args.count, 10);
                assert_eq!(args.level, Some(Level::Warning));
                assert_eq!(args.facility, Some(Facility::Local3));
                assert!(args.dump);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_announce() {
        let cli = Cli::try_parse_from([
            "eventsink", "announce", "--sink", "buf0", "--burst", "20", "--drain",
        ])
        .unwrap();

        match cli.command {
            Commands::Announce(args) => {
                assert_eq!(args.sink.as_deref(), Some("buf0"));
                assert_eq!(args.burst, 20);
                assert_eq!(args.message, "event");
                assert!(args.drain);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_unknown_level() {
        let result = Cli::try_parse_from(["eventsink", "emit", "--sink", "a", "--level", "loud"]);
        assert!(result.is_err());
    }
}
