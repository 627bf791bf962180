//! Detection pipeline: ego-relative projection and FOV/range gating.
//!
//! For every non-ego entity the translated position `entity - ego` is
//! rotated by the entity's own orientation; the rotated vector is used only
//! for the gate, the reported position is the absolute one.

use contracts::{DetectedObject, DetectionConfig, Scene, Vector3};
use tracing::{debug, instrument};

use crate::geometry::rotate_vector;
use crate::scene::{resolve_ego, EgoReference};

/// Per-step counters (for logging/metrics)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetectionStats {
    /// Entities in the inbound ground truth
    pub considered: usize,
    /// Entities skipped as ego
    pub ego_skipped: usize,
    /// Entities failing the FOV/range gate
    pub out_of_scope: usize,
    /// Entities reported as detected objects
    pub detected: usize,
}

/// Result of one pipeline run
#[derive(Debug, Clone)]
pub struct DetectionOutcome {
    /// Inbound scene with the detected-object list rebuilt
    pub scene: Scene,
    pub ego: EgoReference,
    pub stats: DetectionStats,
}

/// FOV/range detection pipeline
#[derive(Debug, Clone)]
pub struct DetectionPipeline {
    config: DetectionConfig,
}

impl DetectionPipeline {
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Gate a detection-frame vector; returns its distance when it passes
    ///
    /// Passes iff `distance <= max_range` and `x / distance > min_forward_cosine`.
    /// A zero vector never passes.
    #[inline]
    pub fn gate(&self, relative: Vector3) -> Option<f64> {
        let distance = relative.norm();
        let in_range = distance <= self.config.max_range;
        let in_cone = relative.x / distance > self.config.min_forward_cosine;
        (in_range && in_cone).then_some(distance)
    }

    /// `cos((distance - center) / scale)`, deliberately not clamped
    #[inline]
    pub fn existence_probability(&self, distance: f64) -> f64 {
        ((distance - self.config.probability_center) / self.config.probability_scale).cos()
    }

    /// Run the pipeline over an inbound scene
    ///
    /// The output keeps all inbound content (timestamp, ego id, ground truth)
    /// and replaces the detected-object list.
    #[instrument(
        name = "detection_run",
        skip(self, inbound),
        fields(ego_id = inbound.ego_id, entities = inbound.ground_truth.entities.len())
    )]
    pub fn run(&self, inbound: &Scene) -> DetectionOutcome {
        let ego = resolve_ego(inbound);
        // Output is the inbound message cloned whole: its timestamp and ego id
        // pass through, the step time is not stamped in.
        let mut scene = inbound.clone();
        scene.detected_objects.clear();

        let mut stats = DetectionStats {
            considered: inbound.ground_truth.entities.len(),
            ..Default::default()
        };
        let mut tracking_id: u64 = 0;

        for entity in &inbound.ground_truth.entities {
            let base = &entity.base;
            let translated = base.position - ego.position;

            if ego.excludes(inbound.ego_id, entity) {
                stats.ego_skipped += 1;
                debug!(
                    entity_id = entity.id,
                    rel_x = translated.x,
                    rel_y = translated.y,
                    rel_z = translated.z,
                    "Ignoring ego vehicle"
                );
                continue;
            }

            let relative = rotate_vector(translated, &base.orientation);
            match self.gate(relative) {
                Some(distance) => {
                    let object = DetectedObject {
                        tracking_id,
                        position: base.position,
                        dimension: base.dimension,
                        existence_probability: self.existence_probability(distance),
                    };
                    debug!(
                        tracking_id,
                        entity_id = entity.id,
                        probability = object.existence_probability,
                        rel_x = relative.x,
                        rel_y = relative.y,
                        rel_z = relative.z,
                        "Output vehicle"
                    );
                    scene.detected_objects.push(object);
                    tracking_id += 1;
                }
                None => {
                    stats.out_of_scope += 1;
                    debug!(
                        entity_id = entity.id,
                        rel_x = translated.x,
                        rel_y = translated.y,
                        rel_z = translated.z,
                        "Ignoring vehicle outside sensor scope"
                    );
                }
            }
        }

        stats.detected = scene.detected_objects.len();
        debug!(detected = stats.detected, "Mapped vehicles to output");

        DetectionOutcome { scene, ego, stats }
    }
}

impl Default for DetectionPipeline {
    fn default() -> Self {
        Self::new(DetectionConfig::default())
    }
}
