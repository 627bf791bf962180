//! Scene model: synthetic ground truth and ego resolution.

use contracts::{
    BaseMoving, BrakeLightState, Entity, EntityId, GroundTruth, LightState, Orientation, Scene,
    SourceConfig, Timestamp, Vector3,
};
use tracing::{debug, trace};

/// Generate the synthetic ground-truth scene at simulation time `time`
///
/// Each lane drives along x at constant speed with a small lateral sinusoid;
/// velocity and acceleration are its analytic derivatives.
pub fn generate_ground_truth(config: &SourceConfig, time: f64) -> Scene {
    let timestamp = Timestamp::from_sim_time(time);
    let amplitude = config.lateral_amplitude;

    let entities: Vec<Entity> = config
        .traffic
        .iter()
        .enumerate()
        .map(|(i, lane)| {
            let speed = lane.speed;
            let phase = time / speed;
            let (sin, cos) = phase.sin_cos();

            let entity = Entity {
                id: i as EntityId,
                kind: config.kind,
                is_ego: i == config.ego_index,
                base: BaseMoving {
                    position: Vector3::new(
                        lane.longitudinal_offset + time * speed,
                        lane.lateral_offset + sin * amplitude,
                        0.0,
                    ),
                    velocity: Vector3::new(speed, cos * amplitude / speed, 0.0),
                    acceleration: Vector3::new(0.0, -sin * amplitude / (speed * speed), 0.0),
                    orientation: Orientation::default(),
                    orientation_rate: Orientation::default(),
                    dimension: config.dimension,
                },
                light_state: LightState {
                    brake: BrakeLightState::Off,
                },
            };

            trace!(
                entity_id = entity.id,
                x = entity.base.position.x,
                y = entity.base.position.y,
                vx = entity.base.velocity.x,
                vy = entity.base.velocity.y,
                "GT: adding vehicle"
            );
            entity
        })
        .collect();

    Scene {
        timestamp,
        ego_id: config.ego_index as EntityId,
        ground_truth: GroundTruth {
            timestamp,
            entities,
        },
        detected_objects: Vec::new(),
    }
}

/// How the ego entity was identified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EgoMatch {
    /// Entity carries the explicit ego flag
    Flag,
    /// Entity id equals the scene's declared ego id
    DeclaredId,
    /// No entity matched; origin is the world origin
    None,
}

/// Resolved ego origin of a scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EgoReference {
    /// Id of the matched entity, if any
    pub entity_id: Option<EntityId>,
    pub position: Vector3,
    pub matched_by: EgoMatch,
}

impl EgoReference {
    /// True if `entity` must not be reported as a detection
    #[inline]
    pub fn excludes(&self, declared_ego_id: EntityId, entity: &Entity) -> bool {
        entity.is_ego || entity.id == declared_ego_id || self.entity_id == Some(entity.id)
    }
}

/// Locate the ego entity of an inbound scene
///
/// An entity flagged `is_ego` wins over one whose id matches the declared
/// ego id. Without any match the world origin is used.
pub fn resolve_ego(scene: &Scene) -> EgoReference {
    let entities = &scene.ground_truth.entities;
    debug!(ego_id = scene.ego_id, "Looking for ego vehicle");

    let (found, matched_by) = if let Some(e) = entities.iter().find(|e| e.is_ego) {
        (Some(e), EgoMatch::Flag)
    } else if let Some(e) = entities.iter().find(|e| e.id == scene.ego_id) {
        (Some(e), EgoMatch::DeclaredId)
    } else {
        (None, EgoMatch::None)
    };

    let reference = EgoReference {
        entity_id: found.map(|e| e.id),
        position: found.map(|e| e.base.position).unwrap_or(Vector3::ZERO),
        matched_by,
    };

    debug!(
        entity_id = ?reference.entity_id,
        matched_by = ?reference.matched_by,
        x = reference.position.x,
        y = reference.position.y,
        z = reference.position.z,
        "Current ego position"
    );
    reference
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{EntityKind, TrafficLane};

    fn entity(id: EntityId, is_ego: bool, position: Vector3) -> Entity {
        Entity {
            id,
            kind: EntityKind::Car,
            is_ego,
            base: BaseMoving {
                position,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn scene(ego_id: EntityId, entities: Vec<Entity>) -> Scene {
        Scene {
            ego_id,
            ground_truth: GroundTruth {
                entities,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_generate_population() {
        let config = SourceConfig::default();
        let scene = generate_ground_truth(&config, 2.5);

        assert_eq!(scene.ground_truth.entities.len(), 10);
        assert_eq!(scene.ego_id, 4);
        assert_eq!(scene.timestamp, Timestamp { seconds: 2, nanos: 500_000_000 });
        assert_eq!(scene.ground_truth.timestamp, scene.timestamp);
        assert!(scene.detected_objects.is_empty());

        let egos: Vec<_> = scene.ground_truth.entities.iter().filter(|e| e.is_ego).collect();
        assert_eq!(egos.len(), 1);
        assert_eq!(egos[0].id, 4);
    }

    #[test]
    fn test_generate_kinematics() {
        let config = SourceConfig::default();
        let time = 3.0;
        let scene = generate_ground_truth(&config, time);
        let e = &scene.ground_truth.entities[1];
        let (offset, lateral, speed) = (40.0, 3.0, 30.0);

        assert_eq!(e.base.position.x, offset + time * speed);
        assert!((e.base.position.y - (lateral + 0.25 * (time / speed).sin())).abs() < 1e-12);
        assert_eq!(e.base.velocity.x, speed);
        assert!((e.base.velocity.y - 0.25 * (time / speed).cos() / speed).abs() < 1e-12);
        assert!(
            (e.base.acceleration.y + 0.25 * (time / speed).sin() / (speed * speed)).abs() < 1e-12
        );
        assert_eq!(e.base.dimension.length, 5.0);
        assert_eq!(e.base.dimension.width, 2.0);
        assert_eq!(e.base.dimension.height, 1.5);
        assert_eq!(e.base.orientation, Orientation::default());
        assert_eq!(e.light_state.brake, BrakeLightState::Off);
    }

    #[test]
    fn test_generate_custom_traffic() {
        let config = SourceConfig {
            ego_index: 0,
            traffic: vec![TrafficLane::new(10.0, 1.0, 5.0)],
            ..Default::default()
        };
        let scene = generate_ground_truth(&config, 0.0);
        assert_eq!(scene.ground_truth.entities.len(), 1);
        assert_eq!(scene.ground_truth.entities[0].base.position, Vector3::new(10.0, 1.0, 0.0));
    }

    #[test]
    fn test_resolve_by_declared_id() {
        let s = scene(
            2,
            vec![
                entity(1, false, Vector3::new(1.0, 0.0, 0.0)),
                entity(2, false, Vector3::new(5.0, 6.0, 7.0)),
            ],
        );
        let ego = resolve_ego(&s);
        assert_eq!(ego.matched_by, EgoMatch::DeclaredId);
        assert_eq!(ego.entity_id, Some(2));
        assert_eq!(ego.position, Vector3::new(5.0, 6.0, 7.0));
    }

    #[test]
    fn test_flag_takes_precedence() {
        // Declared id 1 exists, but entity 3 is flagged
        let s = scene(
            1,
            vec![
                entity(1, false, Vector3::new(1.0, 0.0, 0.0)),
                entity(3, true, Vector3::new(9.0, 0.0, 0.0)),
            ],
        );
        let ego = resolve_ego(&s);
        assert_eq!(ego.matched_by, EgoMatch::Flag);
        assert_eq!(ego.entity_id, Some(3));
        assert_eq!(ego.position, Vector3::new(9.0, 0.0, 0.0));
    }

    #[test]
    fn test_no_match_defaults_to_origin() {
        let s = scene(99, vec![entity(1, false, Vector3::new(1.0, 2.0, 3.0))]);
        let ego = resolve_ego(&s);
        assert_eq!(ego.matched_by, EgoMatch::None);
        assert_eq!(ego.entity_id, None);
        assert_eq!(ego.position, Vector3::ZERO);
    }

    #[test]
    fn test_excludes_flagged_and_declared() {
        let s = scene(
            1,
            vec![
                entity(1, false, Vector3::ZERO),
                entity(3, true, Vector3::ZERO),
                entity(4, false, Vector3::ZERO),
            ],
        );
        let ego = resolve_ego(&s);
        let excluded: Vec<_> = s
            .ground_truth
            .entities
            .iter()
            .filter(|e| ego.excludes(s.ego_id, e))
            .map(|e| e.id)
            .collect();
        assert_eq!(excluded, vec![1, 3]);
    }
}
