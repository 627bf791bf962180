//! # Sensor Model
//!
//! Per-step simulation and detection algorithm of the dummy perception sensor.
//!
//! 负责：
//! - 几何内核：Z-Y-X (yaw-pitch-roll) 旋转
//! - 场景模型：合成真值场景 (source) / 解析输入场景的 ego (filter)
//! - 检测管线：ego 相对坐标 + FOV/距离门限，输出 `DetectedObject`
//!
//! ## 使用示例
//!
//! ```
//! use contracts::{DetectionConfig, SourceConfig};
//! use sensor_model::{generate_ground_truth, DetectionPipeline};
//!
//! let scene = generate_ground_truth(&SourceConfig::default(), 1.0);
//! let outcome = DetectionPipeline::new(DetectionConfig::default()).run(&scene);
//! assert!(outcome.scene.detected_objects.len() <= scene.ground_truth.entities.len());
//! ```

mod detection;
mod geometry;
mod scene;

pub use detection::{DetectionOutcome, DetectionPipeline, DetectionStats};
pub use geometry::{rotate, rotate_vector, rotation_matrix};
pub use scene::{generate_ground_truth, resolve_ego, EgoMatch, EgoReference};
