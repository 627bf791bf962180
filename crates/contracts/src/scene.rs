//! Scene - the message exchanged with the host
//!
//! A timestamped world state: ground-truth traffic entities around an
//! identified ego entity, plus the detected-object list produced by the
//! sensor.

use serde::{Deserialize, Serialize};

/// Entity identifier, unique within a scene
pub type EntityId = u64;

/// Simulation timestamp split into whole seconds and nanosecond remainder
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamp {
    pub seconds: i64,
    pub nanos: u32,
}

impl Timestamp {
    /// Split simulation time (seconds) into seconds + nanos
    pub fn from_sim_time(time: f64) -> Self {
        let whole = time.floor();
        Self {
            seconds: whole as i64,
            nanos: ((time - whole) * 1_000_000_000.0) as u32,
        }
    }

    /// Simulation time in seconds
    pub fn as_secs_f64(&self) -> f64 {
        self.seconds as f64 + f64::from(self.nanos) / 1_000_000_000.0
    }
}

/// 3D vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean length
    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

impl std::ops::Sub for Vector3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

/// Orientation (rad) or orientation rate (rad/s)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
}

impl Orientation {
    pub const fn new(yaw: f64, pitch: f64, roll: f64) -> Self {
        Self { yaw, pitch, roll }
    }
}

/// Bounding box dimension (m)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

impl Dimension {
    pub const fn new(length: f64, width: f64, height: f64) -> Self {
        Self {
            length,
            width,
            height,
        }
    }
}

/// Entity kind tag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    #[default]
    Unknown,
    Other,
    Car,
    Truck,
    Bus,
    Motorbike,
    Bicycle,
    Pedestrian,
}

/// Kinematic state and extent of an entity
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BaseMoving {
    pub position: Vector3,
    pub velocity: Vector3,
    pub acceleration: Vector3,
    pub orientation: Orientation,
    pub orientation_rate: Orientation,
    pub dimension: Dimension,
}

/// Brake light state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrakeLightState {
    #[default]
    Unknown,
    Off,
    Normal,
    Strong,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightState {
    pub brake: BrakeLightState,
}

/// Traffic entity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    /// Explicit ego flag; overrides the scene's declared ego id
    pub is_ego: bool,
    pub base: BaseMoving,
    #[serde(default)]
    pub light_state: LightState,
}

/// Global ground truth
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroundTruth {
    pub timestamp: Timestamp,
    pub entities: Vec<Entity>,
}

/// Object reported by the sensor
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectedObject {
    /// Sequential id in scan order of the current step
    pub tracking_id: u64,
    /// Absolute position, copied from the entity
    pub position: Vector3,
    pub dimension: Dimension,
    /// `cos((distance - center) / scale)`, not clamped
    pub existence_probability: f64,
}

/// Scene message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub timestamp: Timestamp,
    /// Declared ego identifier
    pub ego_id: EntityId,
    pub ground_truth: GroundTruth,
    pub detected_objects: Vec<DetectedObject>,
}
