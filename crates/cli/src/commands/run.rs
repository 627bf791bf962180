//! `run` command implementation.

use anyhow::{Context, Result};
use contracts::{OperatingMode, SensorConfig};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    // Validate config path
    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }
    check_run_args(args)?;

    // Load and parse configuration
    let sensor = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if sensor.mode == OperatingMode::Source {
        warn!("Configuration selects source mode; `run` always chains source -> filter");
    }

    info!(
        wire_format = sensor.wire_format.as_str(),
        max_range = sensor.detection.max_range,
        traffic = sensor.source.traffic.len(),
        ego_index = sensor.source.ego_index,
        "Configuration loaded"
    );
    print_config_summary(&sensor);

    // Initialize Metrics (optional)
    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
    }

    let pipeline = Pipeline::new(PipelineConfig {
        sensor,
        steps: args.steps,
        step_size: args.step_size,
        start_time: args.start_time,
        realtime: args.realtime,
        debug_logging: args.debug_logging,
    });

    // Setup graceful shutdown handler
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        warn!("Received shutdown signal, stopping after the current step...");
        let _ = shutdown_tx.send(true);
    });

    info!("Starting co-simulation...");
    let stats = pipeline
        .run(shutdown_rx)
        .await
        .context("Co-simulation failed")?;

    info!(
        steps = stats.steps,
        valid_outputs = stats.valid_outputs,
        detections = stats.detections,
        final_time = stats.final_time,
        duration_secs = stats.duration.as_secs_f64(),
        interrupted = stats.interrupted,
        "Co-simulation finished"
    );
    stats.print_summary();

    Ok(())
}

fn check_run_args(args: &RunArgs) -> Result<(), CliError> {
    if !(args.step_size.is_finite() && args.step_size > 0.0) {
        return Err(CliError::invalid_argument(
            "step-size",
            format!("must be a positive number, got {}", args.step_size),
        ));
    }
    if !args.start_time.is_finite() {
        return Err(CliError::invalid_argument(
            "start-time",
            format!("must be finite, got {}", args.start_time),
        ));
    }
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary before running
fn print_config_summary(sensor: &SensorConfig) {
    println!("\n=== Configuration Summary ===\n");
    println!("Exchange:");
    println!("  Wire format: {}", sensor.wire_format.as_str());
    println!("\nDetection:");
    println!("  Max range: {} m", sensor.detection.max_range);
    println!(
        "  Forward half-angle: {:.2}°",
        sensor.detection.min_forward_cosine.acos().to_degrees()
    );
    println!(
        "  Probability: cos((d - {}) / {})",
        sensor.detection.probability_center, sensor.detection.probability_scale
    );
    println!("\nSource:");
    println!("  Vehicles: {}", sensor.source.traffic.len());
    println!("  Ego index: {}", sensor.source.ego_index);
    println!();
}
