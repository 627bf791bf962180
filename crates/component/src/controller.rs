//! Step controller: one branch per step.
//!
//! | mode   | inbound      | branch     | valid | count            |
//! |--------|--------------|------------|-------|------------------|
//! | source | ignored      | `Source`   | true  | entities         |
//! | filter | decodable    | `Filter`   | true  | detected objects |
//! | filter | absent/bad   | `NoInput`  | false | 0                |

use contracts::{ContractError, OperatingMode, Scene, SensorConfig, SourceConfig};
use exchange::{BufferDescriptor, ExchangeBuffer, WireCodec};
use sensor_model::{generate_ground_truth, DetectionPipeline, DetectionStats};
use tracing::{debug, instrument, trace, warn};

use crate::logging::{LogCategory, LoggingCategories};

/// Branch executed by a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepBranch {
    Source,
    Filter,
    NoInput,
}

impl StepBranch {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Filter => "filter",
            Self::NoInput => "no_input",
        }
    }
}

/// What a step produced
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    /// Output time (end of the step)
    pub time: f64,
    pub branch: StepBranch,
    pub valid: bool,
    pub object_count: usize,
    /// Published outbound triple ([`BufferDescriptor::EMPTY`] on no-input)
    pub descriptor: BufferDescriptor,
    pub payload_bytes: usize,
    /// Present on the filter branch only
    pub detection: Option<DetectionStats>,
    /// Inbound bytes were offered but could not be used
    pub rejected_input: bool,
}

/// Per-instance step logic and outbound storage
#[derive(Debug)]
pub struct StepController {
    mode: OperatingMode,
    source: SourceConfig,
    pipeline: DetectionPipeline,
    codec: WireCodec,
    outbound: ExchangeBuffer,
}

impl StepController {
    pub fn new(config: &SensorConfig) -> Self {
        Self {
            mode: config.mode,
            source: config.source.clone(),
            pipeline: DetectionPipeline::new(config.detection.clone()),
            codec: WireCodec::new(config.wire_format),
            outbound: ExchangeBuffer::new(),
        }
    }

    #[inline]
    pub fn mode(&self) -> OperatingMode {
        self.mode
    }

    #[inline]
    pub fn codec(&self) -> WireCodec {
        self.codec
    }

    #[inline]
    pub fn outbound(&self) -> &ExchangeBuffer {
        &self.outbound
    }

    /// Clear the published triple
    pub fn reset(&mut self) {
        self.outbound.reset();
    }

    /// Execute one step at output time `time`
    ///
    /// `inbound` is the granted inbound message, if the host offered one.
    /// Only encoding failures are errors; unusable input selects the
    /// no-input branch.
    #[instrument(
        name = "step",
        skip(self, inbound, logging),
        fields(mode = self.mode.as_str(), inbound_bytes = inbound.map_or(0, |b| b.len()))
    )]
    pub fn step(
        &mut self,
        time: f64,
        inbound: Option<&[u8]>,
        logging: LoggingCategories,
    ) -> Result<StepReport, ContractError> {
        match self.mode {
            OperatingMode::Source => self.source_step(time, logging),
            OperatingMode::Filter => match inbound {
                None => Ok(self.no_input_step(time, false, logging)),
                Some(bytes) => match self.codec.decode(bytes) {
                    Ok(scene) => self.filter_step(time, &scene, logging),
                    Err(e) => {
                        warn!(error = %e, "Inbound scene could not be decoded");
                        Ok(self.no_input_step(time, true, logging))
                    }
                },
            },
        }
    }

    fn source_step(
        &mut self,
        time: f64,
        logging: LoggingCategories,
    ) -> Result<StepReport, ContractError> {
        let scene = generate_ground_truth(&self.source, time);
        let object_count = scene.ground_truth.entities.len();
        let descriptor = self.publish(&scene, logging)?;

        Ok(StepReport {
            time,
            branch: StepBranch::Source,
            valid: true,
            object_count,
            descriptor,
            payload_bytes: descriptor.len as usize,
            detection: None,
            rejected_input: false,
        })
    }

    fn filter_step(
        &mut self,
        time: f64,
        inbound: &Scene,
        logging: LoggingCategories,
    ) -> Result<StepReport, ContractError> {
        let outcome = self.pipeline.run(inbound);
        if logging.enabled(LogCategory::Osi) {
            debug!(
                target: "osmp::osi",
                ego = ?outcome.ego.entity_id,
                matched_by = ?outcome.ego.matched_by,
                considered = outcome.stats.considered,
                detected = outcome.stats.detected,
                "Filtered inbound scene"
            );
        }
        let object_count = outcome.scene.detected_objects.len();
        let descriptor = self.publish(&outcome.scene, logging)?;

        Ok(StepReport {
            time,
            branch: StepBranch::Filter,
            valid: true,
            object_count,
            descriptor,
            payload_bytes: descriptor.len as usize,
            detection: Some(outcome.stats),
            rejected_input: false,
        })
    }

    fn no_input_step(
        &mut self,
        time: f64,
        rejected_input: bool,
        logging: LoggingCategories,
    ) -> StepReport {
        self.outbound.reset();
        if logging.enabled(LogCategory::Osmp) {
            debug!(target: "osmp::osmp", time, rejected_input, "No valid input, clearing outbound buffer");
        }
        StepReport {
            time,
            branch: StepBranch::NoInput,
            valid: false,
            object_count: 0,
            descriptor: BufferDescriptor::EMPTY,
            payload_bytes: 0,
            detection: None,
            rejected_input,
        }
    }

    fn publish(
        &mut self,
        scene: &Scene,
        logging: LoggingCategories,
    ) -> Result<BufferDescriptor, ContractError> {
        let codec = self.codec;
        let descriptor = self
            .outbound
            .publish_with(|slot| codec.encode_into(scene, slot))?;
        if logging.enabled(LogCategory::Osmp) {
            debug!(
                target: "osmp::osmp",
                address_hi = %format!("{:08X}", descriptor.address_hi),
                address_lo = %format!("{:08X}", descriptor.address_lo),
                len = descriptor.len,
                generation = self.outbound.generation(),
                "Providing outbound scene"
            );
        }
        if logging.enabled(LogCategory::Osi) {
            trace!(target: "osmp::osi", scene = ?scene, "Outbound scene");
        }
        Ok(descriptor)
    }
}
