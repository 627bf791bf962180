//! Co-simulation orchestrator - drives a source instance into a filter
//! instance at a fixed communication step.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use component::{Instance, InstanceParams, StepReport};
use contracts::{FmiStatus, OperatingMode, SensorConfig};
use exchange::InboundGrant;
use observability::{StepSample, StepStatsAggregator};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::PipelineStats;
use crate::error::CliError;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Configuration of the filter instance; the source instance reuses its
    /// `source` and `wire_format` sections
    pub sensor: SensorConfig,

    /// Number of communication steps
    pub steps: u64,

    /// Communication step size (seconds)
    pub step_size: f64,

    /// Simulation start time (seconds)
    pub start_time: f64,

    /// Pace steps to wall-clock time
    pub realtime: bool,

    /// Enable all debug-logging categories on both instances
    pub debug_logging: bool,
}

impl PipelineConfig {
    pub fn stop_time(&self) -> f64 {
        self.start_time + self.steps as f64 * self.step_size
    }
}

/// Main co-simulation orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run all steps, or until `shutdown` flips to `true`
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> Result<PipelineStats> {
        let config = &self.config;
        let started = Instant::now();

        let filter_config = SensorConfig {
            mode: OperatingMode::Filter,
            ..config.sensor.clone()
        };
        let source_config = SensorConfig {
            mode: OperatingMode::Source,
            ..config.sensor.clone()
        };

        let mut source = Instance::instantiate(
            InstanceParams::new("source").with_logging(config.debug_logging),
            source_config,
        )
        .context("Failed to instantiate source instance")?;
        let mut filter = Instance::instantiate(
            InstanceParams::new("filter").with_logging(config.debug_logging),
            filter_config,
        )
        .context("Failed to instantiate filter instance")?;

        for instance in [&mut source, &mut filter] {
            start_instance(instance, config.start_time, config.stop_time())?;
        }

        info!(
            steps = config.steps,
            step_size = config.step_size,
            start_time = config.start_time,
            realtime = config.realtime,
            "Instances running"
        );

        let mut stats = PipelineStats {
            final_time: config.start_time,
            ..Default::default()
        };
        let mut ticker = config
            .realtime
            .then(|| tokio::time::interval(Duration::from_secs_f64(config.step_size)));

        for step in 0..config.steps {
            if *shutdown.borrow() {
                stats.interrupted = true;
                break;
            }
            if let Some(ticker) = ticker.as_mut() {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = shutdown.changed() => {
                        stats.interrupted = true;
                        break;
                    }
                }
            }

            let current = config.start_time + step as f64 * config.step_size;
            step_instance(&mut source, current, config.step_size, &mut stats)?;

            // Chain source output into the filter for the same communication point
            match source.outbound() {
                Some(bytes) => {
                    let grant = InboundGrant::new(bytes.to_vec())
                        .context("Failed to grant source output to filter")?;
                    filter.grant_inbound(grant);
                }
                None => filter.withdraw_inbound(),
            }
            step_instance(&mut filter, current, config.step_size, &mut stats)?;

            if let (Some(src), Some(flt)) = (source.last_report(), filter.last_report()) {
                aggregate(&mut stats.source_metrics, source.name(), src);
                aggregate(&mut stats.filter_metrics, filter.name(), flt);
                if flt.valid {
                    stats.valid_outputs += 1;
                }
                stats.detections += flt.object_count as u64;
                stats.final_time = flt.time;

                debug!(
                    step,
                    time = flt.time,
                    entities = src.object_count,
                    detected = flt.object_count,
                    valid = flt.valid,
                    "Step completed"
                );
            }
            stats.steps += 1;

            // Let the shutdown watcher run between steps
            tokio::task::yield_now().await;
        }

        for instance in [&mut source, &mut filter] {
            let status = instance.terminate();
            if !status.is_ok() {
                warn!(instance = instance.name(), %status, "Terminate reported non-OK status");
            }
        }
        source.free_instance();
        filter.free_instance();

        stats.duration = started.elapsed();
        Ok(stats)
    }
}

fn start_instance(instance: &mut Instance, start_time: f64, stop_time: f64) -> Result<()> {
    let status = instance.setup_experiment(None, start_time, Some(stop_time));
    ensure_ok(instance, "setup_experiment", status)?;
    let status = instance.enter_initialization_mode();
    ensure_ok(instance, "enter_initialization_mode", status)?;
    let status = instance.exit_initialization_mode();
    ensure_ok(instance, "exit_initialization_mode", status)
}

fn ensure_ok(instance: &Instance, operation: &'static str, status: FmiStatus) -> Result<()> {
    if status.is_ok() {
        Ok(())
    } else {
        Err(CliError::host_call(instance.name(), operation, status).into())
    }
}

fn step_instance(
    instance: &mut Instance,
    current: f64,
    step_size: f64,
    stats: &mut PipelineStats,
) -> Result<()> {
    match instance.do_step(current, step_size, true) {
        FmiStatus::Ok => Ok(()),
        FmiStatus::Warning => {
            stats.warnings += 1;
            warn!(instance = instance.name(), time = current, "Step completed with warning");
            Ok(())
        }
        status => Err(CliError::host_call(instance.name(), "do_step", status).into()),
    }
}

fn aggregate(aggregator: &mut StepStatsAggregator, instance: &str, report: &StepReport) {
    aggregator.update(&StepSample {
        instance,
        branch: report.branch.as_str(),
        valid: report.valid,
        object_count: report.object_count,
        payload_bytes: report.payload_bytes,
    });
}
