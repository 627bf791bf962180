//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约测试（默认配置、变量表布局）
//! - source -> filter 端到端测试（安全授权与原始地址握手）
//! - 配置文件到实例的完整链路

#[cfg(test)]
mod contract_tests {
    use contracts::{SensorConfig, VariableKind, INTEGER_VARS};

    #[test]
    fn test_default_config_is_valid() {
        config_loader::ConfigLoader::validate(&SensorConfig::default()).unwrap();
    }

    #[test]
    fn test_variable_layout() {
        assert_eq!(VariableKind::Real.size(), 1);
        assert_eq!(VariableKind::Integer.size(), INTEGER_VARS);
        assert_eq!(VariableKind::Integer.size(), 7);
        assert_eq!(VariableKind::Boolean.size(), 1);
        assert_eq!(VariableKind::String.size(), 1);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::io::Write;

    use component::{Instance, InstanceParams, StepBranch};
    use contracts::{
        BaseMoving, Entity, EntityKind, FmiStatus, GroundTruth, OperatingMode, Orientation, Scene,
        SensorConfig, Timestamp, Vector3, WireFormat, INTEGER_SENSORDATA_IN_BASEHI_IDX,
        INTEGER_SENSORDATA_IN_BASELO_IDX, INTEGER_SENSORDATA_IN_SIZE_IDX,
    };
    use exchange::{consume, InboundGrant, WireCodec};
    use sensor_model::DetectionPipeline;

    fn running(name: &str, config: SensorConfig) -> Instance {
        let mut instance = Instance::instantiate(InstanceParams::new(name), config).unwrap();
        assert_eq!(instance.setup_experiment(None, 0.0, None), FmiStatus::Ok);
        assert_eq!(instance.enter_initialization_mode(), FmiStatus::Ok);
        assert_eq!(instance.exit_initialization_mode(), FmiStatus::Ok);
        instance
    }

    fn mode(mode: OperatingMode) -> SensorConfig {
        SensorConfig {
            mode,
            ..Default::default()
        }
    }

    fn entity(id: u64, position: Vector3, is_ego: bool) -> Entity {
        Entity {
            id,
            kind: EntityKind::Car,
            is_ego,
            base: BaseMoving {
                position,
                orientation: Orientation::new(0.0, 0.0, 0.0),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn scene(ego_id: u64, entities: Vec<Entity>) -> Scene {
        let timestamp = Timestamp::from_sim_time(3.0);
        Scene {
            timestamp,
            ego_id,
            ground_truth: GroundTruth {
                timestamp,
                entities,
            },
            detected_objects: Vec::new(),
        }
    }

    /// Encode a scene, grant it to a filter instance and step once
    fn filter_scene(inbound: &Scene) -> Scene {
        let codec = WireCodec::new(WireFormat::default());
        let mut filter = running("filter", mode(OperatingMode::Filter));
        filter.grant_inbound(InboundGrant::new(codec.encode(inbound).unwrap()).unwrap());
        assert_eq!(filter.do_step(3.0, 0.1, true), FmiStatus::Ok);
        assert!(filter.output_valid());
        codec.decode(filter.outbound().unwrap()).unwrap()
    }

    /// End-to-end: source -> filter over several steps through granted buffers
    ///
    /// The filter output must match running the detection pipeline directly
    /// on the decoded source scene.
    #[test]
    fn test_e2e_source_to_filter_chain() {
        let mut source = running("source", mode(OperatingMode::Source));
        let mut filter = running("filter", mode(OperatingMode::Filter));
        let codec = WireCodec::new(WireFormat::default());
        let pipeline = DetectionPipeline::new(Default::default());

        let step_size = 0.5;
        for step in 0..20 {
            let t = step as f64 * step_size;

            assert_eq!(source.do_step(t, step_size, true), FmiStatus::Ok);
            assert!(source.output_valid());
            assert_eq!(source.object_count(), 10);

            let bytes = source.outbound().unwrap().to_vec();
            let ground_truth = codec.decode(&bytes).unwrap();
            filter.grant_inbound(InboundGrant::new(bytes).unwrap());

            assert_eq!(filter.do_step(t, step_size, true), FmiStatus::Ok);
            assert!(filter.output_valid());

            let output = codec.decode(filter.outbound().unwrap()).unwrap();
            let expected = pipeline.run(&ground_truth);
            assert_eq!(output, expected.scene);
            assert_eq!(filter.object_count() as usize, output.detected_objects.len());
            assert_eq!(output.timestamp, ground_truth.timestamp);
            assert_eq!(output.ground_truth, ground_truth.ground_truth);

            let report = filter.last_report().unwrap();
            assert_eq!(report.branch, StepBranch::Filter);
            assert!((report.time - (t + step_size)).abs() < 1e-12);
        }
    }

    /// End-to-end: raw address handshake, host copies the outbound triple
    /// into the inbound integer variables
    #[test]
    fn test_e2e_raw_descriptor_handshake() {
        let mut source = running("source", mode(OperatingMode::Source));
        let mut filter = running("filter", mode(OperatingMode::Filter));

        for step in 0..5 {
            let t = step as f64 * 0.1;
            source.do_step(t, 0.1, true);
            let out = source.outbound_descriptor();
            assert_eq!(
                filter.set_integer(
                    &[
                        INTEGER_SENSORDATA_IN_BASELO_IDX,
                        INTEGER_SENSORDATA_IN_BASEHI_IDX,
                        INTEGER_SENSORDATA_IN_SIZE_IDX,
                    ],
                    &[out.address_lo, out.address_hi, out.len],
                ),
                FmiStatus::Ok
            );
            // SAFETY: the source keeps its published slot alive until its next step
            assert!(unsafe { filter.accept_raw_inbound() }.unwrap());

            assert_eq!(filter.do_step(t, 0.1, true), FmiStatus::Ok);
            assert!(filter.output_valid());
        }
    }

    /// The triple published in step N stays readable, unchanged, during step N+1
    #[test]
    fn test_published_buffer_outlives_next_step() {
        let mut source = running("source", mode(OperatingMode::Source));

        source.do_step(0.0, 0.1, true);
        let first = source.outbound_descriptor();
        let first_bytes = source.outbound().unwrap().to_vec();

        source.do_step(0.1, 0.1, true);
        let second = source.outbound_descriptor();
        assert_ne!(first.address(), second.address());

        // SAFETY: slot of step N is not rewritten before step N+2
        let still_there = unsafe { consume(first) }.unwrap().unwrap();
        assert_eq!(&still_there[..], &first_bytes[..]);

        // SAFETY: live slot
        let live = unsafe { consume(second) }.unwrap().unwrap();
        assert_eq!(&live[..], source.outbound().unwrap());
    }

    #[test]
    fn test_e2e_filter_without_input() {
        let mut filter = running("filter", mode(OperatingMode::Filter));
        for step in 0..10 {
            assert_eq!(filter.do_step(step as f64, 1.0, true), FmiStatus::Ok);
            assert!(!filter.output_valid());
            assert_eq!(filter.object_count(), 0);
            assert!(filter.outbound_descriptor().is_empty());
        }
    }

    /// Ego at origin, one entity 100 m ahead with zero orientation
    #[test]
    fn test_e2e_single_entity_ahead() {
        let inbound = scene(
            1,
            vec![
                entity(1, Vector3::ZERO, true),
                entity(2, Vector3::new(100.0, 0.0, 0.0), false),
            ],
        );
        let output = filter_scene(&inbound);

        assert_eq!(output.detected_objects.len(), 1);
        let object = &output.detected_objects[0];
        assert_eq!(object.tracking_id, 0);
        assert_eq!(object.position, Vector3::new(100.0, 0.0, 0.0));
        let expected = ((100.0_f64 - 75.0) / 75.0).cos();
        assert!((object.existence_probability - expected).abs() < 1e-12);
        assert_eq!(output.timestamp, inbound.timestamp);
        assert_eq!(output.ego_id, 1);
    }

    /// No ego flag and an ego id matching nothing: world origin is the reference
    #[test]
    fn test_e2e_unmatched_ego_uses_origin() {
        let inbound = scene(
            99,
            vec![
                entity(1, Vector3::new(75.0, 0.0, 0.0), false),
                entity(2, Vector3::new(-20.0, 0.0, 0.0), false),
                entity(3, Vector3::new(10.0, 30.0, 0.0), false),
            ],
        );
        let output = filter_scene(&inbound);

        // Only the entity straight ahead of the origin is inside the cone
        assert_eq!(output.detected_objects.len(), 1);
        assert_eq!(output.detected_objects[0].position, Vector3::new(75.0, 0.0, 0.0));
        assert!((output.detected_objects[0].existence_probability - 1.0).abs() < 1e-12);
    }

    /// The ego flag wins over a declared ego id naming another entity
    #[test]
    fn test_e2e_flagged_ego_takes_precedence() {
        let inbound = scene(
            2,
            vec![
                entity(1, Vector3::new(-50.0, 0.0, 0.0), true),
                entity(2, Vector3::new(0.0, 0.0, 0.0), false),
                entity(3, Vector3::new(20.0, 0.0, 0.0), false),
            ],
        );
        let output = filter_scene(&inbound);

        // Reference is entity 1 at x = -50; entity 2 (declared) is skipped as ego
        assert_eq!(output.detected_objects.len(), 1);
        let object = &output.detected_objects[0];
        assert_eq!(object.position, Vector3::new(20.0, 0.0, 0.0));
        let expected = ((70.0_f64 - 75.0) / 75.0).cos();
        assert!((object.existence_probability - expected).abs() < 1e-12);
    }

    /// Config file -> loader -> instance, with JSON on the wire
    #[test]
    fn test_e2e_config_file_to_instance() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(
            br#"
mode = "source"
wire_format = "json"

[source]
ego_index = 0
lateral_amplitude = 0.0
traffic = [
    { longitudinal_offset = 0.0, lateral_offset = 0.0, speed = 10.0 },
    { longitudinal_offset = 50.0, lateral_offset = 0.0, speed = 10.0 },
]
"#,
        )
        .unwrap();

        let config = config_loader::ConfigLoader::load_from_path(file.path()).unwrap();
        assert_eq!(config.wire_format, WireFormat::Json);

        let mut source = running("source", config.clone());
        assert_eq!(source.do_step(0.0, 1.0, true), FmiStatus::Ok);
        assert_eq!(source.object_count(), 2);

        let bytes = source.outbound().unwrap().to_vec();
        let ground_truth = WireCodec::new(WireFormat::Json).decode(&bytes).unwrap();
        assert_eq!(ground_truth.ground_truth.entities[1].base.position.x, 60.0);

        let mut filter = running(
            "filter",
            SensorConfig {
                mode: OperatingMode::Filter,
                ..config
            },
        );
        filter.grant_inbound(InboundGrant::new(bytes).unwrap());
        assert_eq!(filter.do_step(0.0, 1.0, true), FmiStatus::Ok);
        assert_eq!(filter.object_count(), 1);
    }

    /// A filter configured for bincode rejects a JSON scene without failing the step
    #[test]
    fn test_e2e_wire_format_mismatch() {
        let json = WireCodec::new(WireFormat::Json)
            .encode(&scene(0, vec![entity(0, Vector3::ZERO, true)]))
            .unwrap();
        let mut filter = running("filter", mode(OperatingMode::Filter));
        filter.grant_inbound(InboundGrant::new(json).unwrap());

        assert_eq!(filter.do_step(0.0, 0.1, true), FmiStatus::Warning);
        assert!(!filter.output_valid());
        assert_eq!(filter.object_count(), 0);
    }
}
