//! Sensor configuration contracts.
//!
//! Defaults reproduce the reference dummy-sensor behaviour: a 150 m forward
//! cone of ±30°, and ten synthetic vehicles when acting as a scene source.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{Dimension, EntityKind, OperatingMode, WireFormat};

/// Complete sensor configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct SensorConfig {
    /// Source or filter, fixed at construction
    #[serde(default)]
    pub mode: OperatingMode,

    /// Serialization used for exchanged scenes
    #[serde(default)]
    pub wire_format: WireFormat,

    /// FOV/range gate
    #[serde(default)]
    #[validate(nested)]
    pub detection: DetectionConfig,

    /// Synthetic traffic (source mode only)
    #[serde(default)]
    #[validate(nested)]
    pub source: SourceConfig,
}

/// FOV/range gate and existence-probability model
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct DetectionConfig {
    /// Maximum detection distance (inclusive)
    #[validate(range(exclusive_min = 0.0))]
    pub max_range: f64,

    /// Forward component / distance must exceed this value
    #[validate(range(min = -1.0, exclusive_max = 1.0))]
    pub min_forward_cosine: f64,

    /// Distance at which the existence probability peaks
    pub probability_center: f64,

    /// Distance scale of the probability cosine
    pub probability_scale: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            max_range: 150.0,
            min_forward_cosine: 0.866025,
            probability_center: 75.0,
            probability_scale: 75.0,
        }
    }
}

/// One synthetic vehicle: `x = longitudinal_offset + speed * t`,
/// `y = lateral_offset + amplitude * sin(t / speed)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrafficLane {
    pub longitudinal_offset: f64,
    pub lateral_offset: f64,
    pub speed: f64,
}

impl TrafficLane {
    pub const fn new(longitudinal_offset: f64, lateral_offset: f64, speed: f64) -> Self {
        Self {
            longitudinal_offset,
            lateral_offset,
            speed,
        }
    }
}

/// Synthetic ground-truth population
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SourceConfig {
    /// Index into `traffic` designated as ego
    pub ego_index: usize,

    /// Amplitude of the lateral sinusoid (m)
    #[validate(range(min = 0.0))]
    pub lateral_amplitude: f64,

    /// Shared bounding box
    pub dimension: Dimension,

    /// Shared kind tag
    pub kind: EntityKind,

    /// Vehicle population
    #[validate(length(min = 1))]
    pub traffic: Vec<TrafficLane>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            ego_index: 4,
            lateral_amplitude: 0.25,
            dimension: Dimension::new(5.0, 2.0, 1.5),
            kind: EntityKind::Car,
            traffic: default_traffic(),
        }
    }
}

/// The ten reference lanes
pub fn default_traffic() -> Vec<TrafficLane> {
    const LATERAL: [f64; 10] = [3.0, 3.0, 3.0, 0.5, 0.0, -0.5, -3.0, -3.0, -3.0, -3.0];
    const LONGITUDINAL: [f64; 10] = [0.0, 40.0, 100.0, 100.0, 0.0, 150.0, 5.0, 45.0, 85.0, 125.0];
    const SPEED: [f64; 10] = [29.0, 30.0, 31.0, 25.0, 26.0, 28.0, 20.0, 22.0, 22.5, 23.0];

    (0..10)
        .map(|i| TrafficLane::new(LONGITUDINAL[i], LATERAL[i], SPEED[i]))
        .collect()
}
