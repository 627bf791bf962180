//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::{SensorConfig, INTEGER_VARS};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;
use crate::error::CliError;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo<'a> {
    config: &'a SensorConfig,
    derived: DerivedInfo,
}

#[derive(Serialize)]
struct DerivedInfo {
    /// Half-angle of the forward detection cone
    half_angle_deg: f64,
    /// Distance at which the existence probability peaks
    peak_probability_distance: f64,
    /// Integer variables exposed to the host
    integer_variables: usize,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    let config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&config);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&config, args);
    }

    Ok(())
}

fn build_config_info(config: &SensorConfig) -> ConfigInfo<'_> {
    ConfigInfo {
        config,
        derived: DerivedInfo {
            half_angle_deg: config.detection.min_forward_cosine.acos().to_degrees(),
            peak_probability_distance: config.detection.probability_center,
            integer_variables: INTEGER_VARS,
        },
    }
}

fn print_config_info(config: &SensorConfig, args: &InfoArgs) {
    println!("=== OSMP Sensor Configuration ===\n");

    println!("Instance");
    println!("   ├─ Mode: {}", config.mode.as_str());
    println!("   └─ Wire format: {}", config.wire_format.as_str());

    let detection = &config.detection;
    println!("\nDetection");
    println!("   ├─ Max range: {} m", detection.max_range);
    println!(
        "   ├─ Forward cone: cos > {} ({:.2}° half-angle)",
        detection.min_forward_cosine,
        detection.min_forward_cosine.acos().to_degrees()
    );
    println!(
        "   └─ Existence probability: cos((d - {}) / {})",
        detection.probability_center, detection.probability_scale
    );

    let source = &config.source;
    println!("\nSource");
    println!("   ├─ Kind: {:?}", source.kind);
    println!(
        "   ├─ Dimension: {} x {} x {} m",
        source.dimension.length, source.dimension.width, source.dimension.height
    );
    println!("   ├─ Lateral amplitude: {} m", source.lateral_amplitude);
    println!("   ├─ Ego index: {}", source.ego_index);

    if args.traffic {
        println!("   └─ Traffic ({}):", source.traffic.len());
        for (i, lane) in source.traffic.iter().enumerate() {
            let prefix = if i + 1 == source.traffic.len() { "└─" } else { "├─" };
            let ego = if i == source.ego_index { " (ego)" } else { "" };
            println!(
                "        {} #{}: x0={} y0={} v={}{}",
                prefix, i, lane.longitudinal_offset, lane.lateral_offset, lane.speed, ego
            );
        }
    } else {
        println!("   └─ Traffic: {} vehicles", source.traffic.len());
    }

    println!();
}
