//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// OSMP Sensor - host driver for the dummy perception sensor
#[derive(Parser, Debug)]
#[command(
    name = "osmp-sensor",
    author,
    version,
    about = "Host driver for the OSMP dummy perception sensor",
    long_about = "Drives sensor instances through their co-simulation lifecycle.\n\n\
                  `run` chains a ground-truth source instance into a filtering \n\
                  sensor instance, stepping both at a fixed communication step."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "OSMP_SENSOR_VERBOSE")]
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
        env = "OSMP_SENSOR_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a source -> filter co-simulation
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "sensor.toml",
        env = "OSMP_SENSOR_CONFIG"
    )]
    pub config: PathBuf,

    /// Number of communication steps to run
    #[arg(long, default_value = "100", env = "OSMP_SENSOR_STEPS")]
    pub steps: u64,

    /// Communication step size in seconds
    #[arg(long, default_value = "0.1", env = "OSMP_SENSOR_STEP_SIZE")]
    pub step_size: f64,

    /// Simulation start time in seconds
    #[arg(long, default_value = "0.0")]
    pub start_time: f64,

    /// Pace steps to wall-clock time
    #[arg(long)]
    pub realtime: bool,

    /// Enable debug logging categories on both instances
    #[arg(long)]
    pub debug_logging: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "OSMP_SENSOR_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "sensor.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "sensor.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show the synthetic traffic lanes
    #[arg(long)]
    pub traffic: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
