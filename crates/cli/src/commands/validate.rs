//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{OperatingMode, SensorConfig};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    mode: String,
    wire_format: String,
    max_range: f64,
    half_angle_deg: f64,
    vehicle_count: usize,
    ego_index: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    // Check file exists
    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    // Try to load and validate
    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    mode: config.mode.as_str().to_string(),
                    wire_format: config.wire_format.as_str().to_string(),
                    max_range: config.detection.max_range,
                    half_angle_deg: config.detection.min_forward_cosine.acos().to_degrees(),
                    vehicle_count: config.source.traffic.len(),
                    ego_index: config.source.ego_index,
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &SensorConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.mode == OperatingMode::Source {
        warnings.push(
            "mode = source: the detection section is unused by a source instance".to_string(),
        );
    }

    // Probability cosine turns negative beyond center + scale * pi / 2
    let positive_limit = config.detection.probability_center
        + config.detection.probability_scale.abs() * std::f64::consts::FRAC_PI_2;
    if config.detection.max_range > positive_limit {
        warnings.push(format!(
            "existence probability is negative for distances above {:.1} m (max_range = {})",
            positive_limit, config.detection.max_range
        ));
    }

    if config.detection.min_forward_cosine < 0.0 {
        warnings.push("min_forward_cosine < 0: the detection cone extends behind the sensor".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Mode: {}", summary.mode);
            println!("  Wire format: {}", summary.wire_format);
            println!("  Max range: {} m", summary.max_range);
            println!("  Half angle: {:.2}°", summary.half_angle_deg);
            println!("  Vehicles: {} (ego #{})", summary.vehicle_count, summary.ego_index);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
