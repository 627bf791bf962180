//! Run statistics.

use std::time::Duration;

use observability::StepStatsAggregator;

/// Statistics from a co-simulation run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Steps completed by both instances
    pub steps: u64,

    /// Steps where the filter published a valid output
    pub valid_outputs: u64,

    /// Steps that ended with a warning status
    pub warnings: u64,

    /// Detected objects summed over all steps
    pub detections: u64,

    /// Simulation time reached
    pub final_time: f64,

    /// Wall-clock duration of the run
    pub duration: Duration,

    /// Stopped by a shutdown signal before the last step
    pub interrupted: bool,

    /// Source instance step metrics
    pub source_metrics: StepStatsAggregator,

    /// Filter instance step metrics
    pub filter_metrics: StepStatsAggregator,
}

impl PipelineStats {
    /// Steps per wall-clock second
    pub fn steps_per_sec(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.steps as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Mean detections per step
    pub fn mean_detections(&self) -> f64 {
        if self.steps > 0 {
            self.detections as f64 / self.steps as f64
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n=== Co-simulation Statistics ===\n");

        println!("Overview");
        println!("   ├─ Steps: {}", self.steps);
        println!("   ├─ Final time: {:.3}s", self.final_time);
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Steps/s: {:.2}", self.steps_per_sec());
        println!("   ├─ Valid outputs: {}", self.valid_outputs);
        println!("   ├─ Warnings: {}", self.warnings);
        println!("   └─ Mean detections: {:.2}", self.mean_detections());

        if self.interrupted {
            println!("\n(interrupted by shutdown signal)");
        }

        println!("\nSource");
        print!("{}", self.source_metrics.summary());
        println!("\nFilter");
        print!("{}", self.filter_metrics.summary());

        println!();
    }
}
