//! # OSMP Sensor CLI
//!
//! 命令行接口入口点。
//!
//! 提供：
//! - 配置加载与验证
//! - source -> filter 联合仿真驱动
//! - 优雅关闭处理

mod cli;
mod commands;
mod error;
mod pipeline;

use anyhow::Result;
use clap::Parser;
use observability::ObservabilityConfig;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_info, run_pipeline, run_validate};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging based on CLI options
    init_logging(&cli)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "OSMP sensor CLI starting"
    );

    // Execute command
    let result = match &cli.command {
        Commands::Run(args) => run_pipeline(args).await,
        Commands::Validate(args) => run_validate(args),
        Commands::Info(args) => run_info(args),
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}

/// Initialize logging based on CLI options
///
/// Metrics are installed later by `run`, only when a port is given.
fn init_logging(cli: &Cli) -> Result<()> {
    observability::init_with_config(logging_config(cli))
}

/// `-q` caps everything at warn; `-vvv` additionally opens per-entity scene output
fn logging_config(cli: &Cli) -> ObservabilityConfig {
    let level = if cli.quiet {
        "warn"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let mut config = ObservabilityConfig::with_level(level);
    if !cli.quiet && cli.verbose >= 3 {
        config = config.category_level(observability::TARGET_OSI, "trace");
    }
    ObservabilityConfig {
        log_format: cli.log_format.into(),
        metrics_port: None,
        ..config
    }
}
