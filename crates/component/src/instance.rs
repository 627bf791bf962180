//! Lifecycle shell exposed to the co-simulation host.
//!
//! Every host call returns an [`FmiStatus`]; failures are logged and counted
//! before conversion, and never leave the instance half-updated.

use contracts::{
    ContractError, FmiStatus, FmuType, LifecycleState, OperatingMode, SensorConfig, StatusKind,
    ValueReference, BOOLEAN_VALID_IDX, INTEGER_COUNT_IDX, INTEGER_SENSORDATA_IN_BASEHI_IDX,
    INTEGER_SENSORDATA_IN_BASELO_IDX, INTEGER_SENSORDATA_IN_SIZE_IDX,
    INTEGER_SENSORDATA_OUT_BASEHI_IDX, INTEGER_SENSORDATA_OUT_BASELO_IDX,
    INTEGER_SENSORDATA_OUT_SIZE_IDX,
};
use exchange::{BufferDescriptor, InboundGrant};
use observability::{record_detection_metrics, record_lifecycle_error, record_step_metrics, StepSample};
use tracing::{debug, error, info, warn};

use crate::controller::{StepController, StepReport};
use crate::logging::{LogCategory, LoggingCategories};
use crate::variables::VariableTable;

/// Arguments of the host's instantiate call
#[derive(Debug, Clone)]
pub struct InstanceParams {
    pub instance_name: String,
    pub fmu_type: FmuType,
    pub guid: String,
    pub resource_location: Option<String>,
    pub visible: bool,
    /// Initial state of every logging category
    pub logging_on: bool,
}

impl InstanceParams {
    pub fn new(instance_name: impl Into<String>) -> Self {
        Self {
            instance_name: instance_name.into(),
            fmu_type: FmuType::CoSimulation,
            guid: String::new(),
            resource_location: None,
            visible: false,
            logging_on: false,
        }
    }

    pub fn with_logging(mut self, logging_on: bool) -> Self {
        self.logging_on = logging_on;
        self
    }
}

/// One sensor instance
#[derive(Debug)]
pub struct Instance {
    params: InstanceParams,
    state: LifecycleState,
    logging: LoggingCategories,
    vars: VariableTable,
    controller: StepController,
    /// Inbound message the host has granted, resolved against the
    /// inbound integer triple at each step
    inbound: Option<InboundGrant>,
    start_time: f64,
    last_time: f64,
    last_report: Option<StepReport>,
}

impl Instance {
    /// Create an instance and run its initialization
    ///
    /// Only co-simulation instances are supported. The configuration is
    /// validated before anything is allocated.
    pub fn instantiate(params: InstanceParams, config: SensorConfig) -> Result<Self, ContractError> {
        if params.fmu_type != FmuType::CoSimulation {
            return Err(ContractError::instantiation(
                &params.instance_name,
                "only co-simulation instances are supported",
            ));
        }
        config_loader::ConfigLoader::validate(&config)?;

        let logging = if params.logging_on {
            LoggingCategories::ALL
        } else {
            LoggingCategories::NONE
        };

        let mut instance = Self {
            controller: StepController::new(&config),
            params,
            state: LifecycleState::Uninitialized,
            logging,
            vars: VariableTable::default(),
            inbound: None,
            start_time: 0.0,
            last_time: 0.0,
            last_report: None,
        };
        instance.initialize();

        info!(
            instance = %instance.params.instance_name,
            guid = %instance.params.guid,
            mode = config.mode.as_str(),
            wire_format = config.wire_format.as_str(),
            "Instance created"
        );
        Ok(instance)
    }

    fn initialize(&mut self) {
        self.vars.reset();
        self.controller.reset();
        self.inbound = None;
        self.start_time = 0.0;
        self.last_time = 0.0;
        self.last_report = None;
        self.state = LifecycleState::Initialized;
    }

    // ========== Accessors ==========

    #[inline]
    pub fn name(&self) -> &str {
        &self.params.instance_name
    }

    #[inline]
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    #[inline]
    pub fn mode(&self) -> OperatingMode {
        self.controller.mode()
    }

    #[inline]
    pub fn logging(&self) -> LoggingCategories {
        self.logging
    }

    #[inline]
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// Output time of the last successful step (start time before any step)
    #[inline]
    pub fn last_time(&self) -> f64 {
        self.last_time
    }

    #[inline]
    pub fn last_report(&self) -> Option<&StepReport> {
        self.last_report.as_ref()
    }

    /// Current value of the output-valid flag
    #[inline]
    pub fn output_valid(&self) -> bool {
        self.vars.boolean(BOOLEAN_VALID_IDX)
    }

    /// Current value of the object-count variable
    #[inline]
    pub fn object_count(&self) -> i32 {
        self.vars.integer(INTEGER_COUNT_IDX)
    }

    /// Bytes behind the published outbound triple
    ///
    /// The borrow ends before the next `do_step`, which is exactly the window
    /// in which the published address is guaranteed stable.
    #[inline]
    pub fn outbound(&self) -> Option<&[u8]> {
        self.controller.outbound().published()
    }

    /// Outbound triple as currently held in the integer variables
    pub fn outbound_descriptor(&self) -> BufferDescriptor {
        BufferDescriptor {
            address_hi: self.vars.integer(INTEGER_SENSORDATA_OUT_BASEHI_IDX),
            address_lo: self.vars.integer(INTEGER_SENSORDATA_OUT_BASELO_IDX),
            len: self.vars.integer(INTEGER_SENSORDATA_OUT_SIZE_IDX),
        }
    }

    /// Inbound triple as currently held in the integer variables
    pub fn inbound_descriptor(&self) -> BufferDescriptor {
        BufferDescriptor {
            address_hi: self.vars.integer(INTEGER_SENSORDATA_IN_BASEHI_IDX),
            address_lo: self.vars.integer(INTEGER_SENSORDATA_IN_BASELO_IDX),
            len: self.vars.integer(INTEGER_SENSORDATA_IN_SIZE_IDX),
        }
    }

    // ========== Inbound handshake ==========

    /// Hand an inbound message to the instance
    ///
    /// The grant is held until replaced or withdrawn, and its triple is
    /// written into the inbound integer variables.
    pub fn grant_inbound(&mut self, grant: InboundGrant) {
        self.write_inbound_triple(grant.descriptor());
        if self.logging.enabled(LogCategory::Osmp) {
            let descriptor = grant.descriptor();
            debug!(
                target: "osmp::osmp",
                instance = %self.params.instance_name,
                address_hi = %format!("{:08X}", descriptor.address_hi),
                address_lo = %format!("{:08X}", descriptor.address_lo),
                len = descriptor.len,
                "Inbound buffer granted"
            );
        }
        self.inbound = Some(grant);
    }

    /// Drop the held grant and zero the inbound triple
    pub fn withdraw_inbound(&mut self) {
        self.inbound = None;
        self.write_inbound_triple(BufferDescriptor::EMPTY);
    }

    /// Take a copy of the raw buffer the host described through the inbound
    /// integer variables
    ///
    /// Returns whether a message was taken; a zero length withdraws any
    /// held grant. On success the inbound triple is rewritten to describe
    /// the copy, so the host buffer may be released right after this call.
    ///
    /// # Safety
    /// The inbound triple must describe a readable allocation of at least
    /// `len` bytes that stays alive for the duration of this call.
    pub unsafe fn accept_raw_inbound(&mut self) -> Result<bool, ContractError> {
        let descriptor = self.inbound_descriptor();
        // SAFETY: forwarded to the caller.
        match unsafe { InboundGrant::from_descriptor(descriptor)? } {
            Some(grant) => {
                self.grant_inbound(grant);
                Ok(true)
            }
            None => {
                self.withdraw_inbound();
                Ok(false)
            }
        }
    }

    fn write_inbound_triple(&mut self, descriptor: BufferDescriptor) {
        self.vars
            .put_integer(INTEGER_SENSORDATA_IN_BASEHI_IDX, descriptor.address_hi);
        self.vars
            .put_integer(INTEGER_SENSORDATA_IN_BASELO_IDX, descriptor.address_lo);
        self.vars
            .put_integer(INTEGER_SENSORDATA_IN_SIZE_IDX, descriptor.len);
    }

    fn write_outputs(&mut self, report: &StepReport) {
        let descriptor = report.descriptor;
        self.vars
            .put_integer(INTEGER_SENSORDATA_OUT_BASEHI_IDX, descriptor.address_hi);
        self.vars
            .put_integer(INTEGER_SENSORDATA_OUT_BASELO_IDX, descriptor.address_lo);
        self.vars
            .put_integer(INTEGER_SENSORDATA_OUT_SIZE_IDX, descriptor.len);
        self.vars.put_boolean(BOOLEAN_VALID_IDX, report.valid);
        self.vars.put_integer(
            INTEGER_COUNT_IDX,
            i32::try_from(report.object_count).unwrap_or(i32::MAX),
        );
    }

    // ========== Lifecycle ==========

    fn require(
        &self,
        operation: &'static str,
        allowed: &[LifecycleState],
    ) -> Result<(), ContractError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(ContractError::Lifecycle {
                operation,
                state: self.state,
            })
        }
    }

    fn log_call(&self, operation: &'static str) {
        if self.logging.enabled(LogCategory::Fmi) {
            debug!(
                target: "osmp::fmi",
                instance = %self.params.instance_name,
                operation,
                state = ?self.state,
                "Host call"
            );
        }
    }

    /// Convert a call result into a host status
    fn finish(&self, operation: &'static str, result: Result<(), ContractError>) -> FmiStatus {
        match result {
            Ok(()) => FmiStatus::Ok,
            Err(e) => {
                error!(
                    instance = %self.params.instance_name,
                    operation,
                    error = %e,
                    "Host call failed"
                );
                record_lifecycle_error(&self.params.instance_name, operation);
                e.status()
            }
        }
    }

    /// Record the experiment start time and start running
    pub fn setup_experiment(
        &mut self,
        tolerance: Option<f64>,
        start_time: f64,
        stop_time: Option<f64>,
    ) -> FmiStatus {
        self.log_call("setup_experiment");
        let result = self
            .require("setup_experiment", &[LifecycleState::Initialized])
            .map(|()| {
                self.start_time = start_time;
                self.last_time = start_time;
                self.state = LifecycleState::Running;
                info!(
                    instance = %self.params.instance_name,
                    start_time,
                    stop_time = ?stop_time,
                    tolerance = ?tolerance,
                    "Experiment set up"
                );
            });
        self.finish("setup_experiment", result)
    }

    pub fn enter_initialization_mode(&mut self) -> FmiStatus {
        self.log_call("enter_initialization_mode");
        let result = self.require(
            "enter_initialization_mode",
            &[LifecycleState::Initialized, LifecycleState::Running],
        );
        self.finish("enter_initialization_mode", result)
    }

    pub fn exit_initialization_mode(&mut self) -> FmiStatus {
        self.log_call("exit_initialization_mode");
        let result = self.require(
            "exit_initialization_mode",
            &[LifecycleState::Initialized, LifecycleState::Running],
        );
        self.finish("exit_initialization_mode", result)
    }

    /// Advance by one communication step
    ///
    /// The output time is `current_communication_point + communication_step_size`.
    /// Returns `Warning` when an inbound message was offered but could not be
    /// used; the step still completes on the no-input branch.
    pub fn do_step(
        &mut self,
        current_communication_point: f64,
        communication_step_size: f64,
        _no_set_fmu_state_prior: bool,
    ) -> FmiStatus {
        self.log_call("do_step");
        if let Err(e) = self.require("do_step", &[LifecycleState::Running]) {
            return self.finish("do_step", Err(e));
        }

        let time = current_communication_point + communication_step_size;
        let descriptor = self.inbound_descriptor();
        let (inbound, unresolved) = if descriptor.is_empty() {
            (None, false)
        } else {
            match &self.inbound {
                Some(grant) if grant.matches(&descriptor) => (Some(&grant.payload()[..]), false),
                _ => (None, true),
            }
        };
        if unresolved {
            warn!(
                instance = %self.params.instance_name,
                len = descriptor.len,
                "Inbound triple does not refer to a granted buffer"
            );
        }

        let mut report = match self.controller.step(time, inbound, self.logging) {
            Ok(report) => report,
            Err(e) => return self.finish("do_step", Err(e)),
        };
        report.rejected_input |= unresolved;

        self.write_outputs(&report);
        self.last_time = time;
        self.record(&report);

        let status = if report.rejected_input {
            FmiStatus::Warning
        } else {
            FmiStatus::Ok
        };
        self.last_report = Some(report);
        status
    }

    fn record(&self, report: &StepReport) {
        let name = self.params.instance_name.as_str();
        record_step_metrics(&StepSample {
            instance: name,
            branch: report.branch.as_str(),
            valid: report.valid,
            object_count: report.object_count,
            payload_bytes: report.payload_bytes,
        });
        if let Some(stats) = report.detection {
            record_detection_metrics(name, stats.considered, stats.considered - stats.detected);
        }
        if self.logging.enabled(LogCategory::Fmi) {
            debug!(
                target: "osmp::fmi",
                instance = name,
                time = report.time,
                branch = report.branch.as_str(),
                valid = report.valid,
                count = report.object_count,
                "Step completed"
            );
        }
    }

    pub fn terminate(&mut self) -> FmiStatus {
        self.log_call("terminate");
        self.state = LifecycleState::Terminated;
        info!(
            instance = %self.params.instance_name,
            last_time = self.last_time,
            "Instance terminated"
        );
        FmiStatus::Ok
    }

    /// Return to the freshly initialized state
    pub fn reset(&mut self) -> FmiStatus {
        self.log_call("reset");
        self.initialize();
        FmiStatus::Ok
    }

    /// Release the instance
    pub fn free_instance(self) {
        self.log_call("free_instance");
        info!(instance = %self.params.instance_name, "Instance freed");
    }

    /// Update the debug-logging categories
    ///
    /// An empty list applies to all categories; unknown names are ignored.
    pub fn set_debug_logging<S: AsRef<str>>(&mut self, logging_on: bool, categories: &[S]) -> FmiStatus {
        let unknown = self.logging.apply(logging_on, categories);
        for name in unknown {
            warn!(
                instance = %self.params.instance_name,
                category = name,
                "Ignoring unknown logging category"
            );
        }
        self.log_call("set_debug_logging");
        FmiStatus::Ok
    }

    // ========== Variables ==========

    pub fn get_real(&self, handles: &[ValueReference], values: &mut [f64]) -> FmiStatus {
        self.log_call("get_real");
        self.finish("get_real", self.vars.get_real(handles, values))
    }

    pub fn get_integer(&self, handles: &[ValueReference], values: &mut [i32]) -> FmiStatus {
        self.log_call("get_integer");
        self.finish("get_integer", self.vars.get_integer(handles, values))
    }

    pub fn get_boolean(&self, handles: &[ValueReference], values: &mut [bool]) -> FmiStatus {
        self.log_call("get_boolean");
        self.finish("get_boolean", self.vars.get_boolean(handles, values))
    }

    pub fn get_string(&self, handles: &[ValueReference], values: &mut [String]) -> FmiStatus {
        self.log_call("get_string");
        self.finish("get_string", self.vars.get_string(handles, values))
    }

    pub fn set_real(&mut self, handles: &[ValueReference], values: &[f64]) -> FmiStatus {
        self.log_call("set_real");
        let result = self.vars.set_real(handles, values);
        self.finish("set_real", result)
    }

    pub fn set_integer(&mut self, handles: &[ValueReference], values: &[i32]) -> FmiStatus {
        self.log_call("set_integer");
        let result = self.vars.set_integer(handles, values);
        self.finish("set_integer", result)
    }

    pub fn set_boolean(&mut self, handles: &[ValueReference], values: &[bool]) -> FmiStatus {
        self.log_call("set_boolean");
        let result = self.vars.set_boolean(handles, values);
        self.finish("set_boolean", result)
    }

    pub fn set_string(&mut self, handles: &[ValueReference], values: &[String]) -> FmiStatus {
        self.log_call("set_string");
        let result = self.vars.set_string(handles, values);
        self.finish("set_string", result)
    }

    // ========== Unsupported ==========

    fn unsupported(&self, operation: &'static str) -> FmiStatus {
        self.log_call(operation);
        self.finish(operation, Err(ContractError::Unsupported { operation }))
    }

    fn discard(&self, operation: &'static str, kind: StatusKind) -> FmiStatus {
        self.log_call(operation);
        debug!(
            instance = %self.params.instance_name,
            operation,
            kind = ?kind,
            "Status enquiry not supported"
        );
        FmiStatus::Discard
    }

    pub fn get_fmu_state(&mut self) -> FmiStatus {
        self.unsupported("get_fmu_state")
    }

    pub fn set_fmu_state(&mut self) -> FmiStatus {
        self.unsupported("set_fmu_state")
    }

    pub fn free_fmu_state(&mut self) -> FmiStatus {
        self.unsupported("free_fmu_state")
    }

    pub fn serialized_fmu_state_size(&self) -> FmiStatus {
        self.unsupported("serialized_fmu_state_size")
    }

    pub fn serialize_fmu_state(&self, _out: &mut [u8]) -> FmiStatus {
        self.unsupported("serialize_fmu_state")
    }

    pub fn deserialize_fmu_state(&mut self, _serialized: &[u8]) -> FmiStatus {
        self.unsupported("deserialize_fmu_state")
    }

    pub fn get_directional_derivative(
        &self,
        _unknowns: &[ValueReference],
        _knowns: &[ValueReference],
        _seed: &[f64],
        _sensitivity: &mut [f64],
    ) -> FmiStatus {
        self.unsupported("get_directional_derivative")
    }

    pub fn set_real_input_derivatives(
        &mut self,
        _handles: &[ValueReference],
        _orders: &[i32],
        _values: &[f64],
    ) -> FmiStatus {
        self.unsupported("set_real_input_derivatives")
    }

    pub fn get_real_output_derivatives(
        &self,
        _handles: &[ValueReference],
        _orders: &[i32],
        _values: &mut [f64],
    ) -> FmiStatus {
        self.unsupported("get_real_output_derivatives")
    }

    pub fn cancel_step(&mut self) -> FmiStatus {
        self.unsupported("cancel_step")
    }

    pub fn get_status(&self, kind: StatusKind) -> FmiStatus {
        self.discard("get_status", kind)
    }

    pub fn get_real_status(&self, kind: StatusKind) -> FmiStatus {
        self.discard("get_real_status", kind)
    }

    pub fn get_integer_status(&self, kind: StatusKind) -> FmiStatus {
        self.discard("get_integer_status", kind)
    }

    pub fn get_boolean_status(&self, kind: StatusKind) -> FmiStatus {
        self.discard("get_boolean_status", kind)
    }

    pub fn get_string_status(&self, kind: StatusKind) -> FmiStatus {
        self.discard("get_string_status", kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::INTEGER_VARS;

    fn running(mode: OperatingMode, name: &str) -> Instance {
        let config = SensorConfig {
            mode,
            ..Default::default()
        };
        let mut instance = Instance::instantiate(InstanceParams::new(name), config).unwrap();
        assert_eq!(instance.setup_experiment(None, 0.0, None), FmiStatus::Ok);
        assert_eq!(instance.enter_initialization_mode(), FmiStatus::Ok);
        assert_eq!(instance.exit_initialization_mode(), FmiStatus::Ok);
        instance
    }

    #[test]
    fn test_instantiate_resets_variables() {
        let instance =
            Instance::instantiate(InstanceParams::new("sensor"), SensorConfig::default()).unwrap();
        assert_eq!(instance.state(), LifecycleState::Initialized);

        let handles: Vec<u32> = (0..INTEGER_VARS as u32).collect();
        let mut ints = vec![-1; INTEGER_VARS];
        assert_eq!(instance.get_integer(&handles, &mut ints), FmiStatus::Ok);
        assert!(ints.iter().all(|v| *v == 0));
        assert!(!instance.output_valid());
    }

    #[test]
    fn test_instantiate_rejects_model_exchange() {
        let mut params = InstanceParams::new("me");
        params.fmu_type = FmuType::ModelExchange;
        let err = Instance::instantiate(params, SensorConfig::default()).unwrap_err();
        assert!(matches!(err, ContractError::Instantiation { .. }));
    }

    #[test]
    fn test_instantiate_rejects_invalid_config() {
        let mut config = SensorConfig::default();
        config.detection.max_range = -1.0;
        let err = Instance::instantiate(InstanceParams::new("bad"), config).unwrap_err();
        assert!(matches!(err, ContractError::ConfigValidation { .. }));
    }

    #[test]
    fn test_do_step_requires_running() {
        let mut instance =
            Instance::instantiate(InstanceParams::new("early"), SensorConfig::default()).unwrap();
        assert_eq!(instance.do_step(0.0, 0.1, true), FmiStatus::Error);
        assert_eq!(instance.state(), LifecycleState::Initialized);
        assert!(instance.last_report().is_none());

        instance.setup_experiment(None, 0.0, None);
        instance.terminate();
        assert_eq!(instance.do_step(0.0, 0.1, true), FmiStatus::Error);
        assert_eq!(instance.state(), LifecycleState::Terminated);
    }

    #[test]
    fn test_setup_experiment_records_start_time() {
        let mut instance =
            Instance::instantiate(InstanceParams::new("t"), SensorConfig::default()).unwrap();
        assert_eq!(instance.setup_experiment(Some(1e-6), 2.5, Some(10.0)), FmiStatus::Ok);
        assert_eq!(instance.start_time(), 2.5);
        assert_eq!(instance.last_time(), 2.5);
        assert_eq!(instance.state(), LifecycleState::Running);
        // A second setup is not allowed while running
        assert_eq!(instance.setup_experiment(None, 0.0, None), FmiStatus::Error);
    }

    #[test]
    fn test_source_steps_always_valid() {
        let mut instance = running(OperatingMode::Source, "source");
        for i in 0..5 {
            let t = i as f64 * 0.1;
            assert_eq!(instance.do_step(t, 0.1, true), FmiStatus::Ok);
            assert!(instance.output_valid());
            assert_eq!(instance.object_count(), 10);
            assert!(!instance.outbound_descriptor().is_empty());
            assert!((instance.last_time() - (t + 0.1)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_filter_without_input_is_invalid() {
        let mut instance = running(OperatingMode::Filter, "filter");
        for i in 0..3 {
            assert_eq!(instance.do_step(i as f64, 1.0, true), FmiStatus::Ok);
            assert!(!instance.output_valid());
            assert_eq!(instance.object_count(), 0);
            assert_eq!(instance.outbound_descriptor(), BufferDescriptor::EMPTY);
            assert!(instance.outbound().is_none());
        }
    }

    #[test]
    fn test_outbound_triple_matches_published_bytes() {
        let mut instance = running(OperatingMode::Source, "source");
        instance.do_step(0.0, 0.1, true);

        let descriptor = instance.outbound_descriptor();
        let bytes = instance.outbound().unwrap();
        assert_eq!(descriptor.len as usize, bytes.len());
        assert_eq!(descriptor.address(), bytes.as_ptr() as usize);
    }

    #[test]
    fn test_granted_inbound_feeds_filter() {
        let mut source = running(OperatingMode::Source, "source");
        let mut filter = running(OperatingMode::Filter, "filter");

        source.do_step(0.0, 1.0, true);
        let grant = InboundGrant::new(source.outbound().unwrap().to_vec()).unwrap();
        filter.grant_inbound(grant);
        assert_eq!(filter.inbound_descriptor().len as usize, source.outbound().unwrap().len());

        assert_eq!(filter.do_step(0.0, 1.0, true), FmiStatus::Ok);
        assert!(filter.output_valid());
        let report = filter.last_report().unwrap();
        assert_eq!(report.object_count as i32, filter.object_count());
        assert_eq!(report.detection.unwrap().considered, 10);

        filter.withdraw_inbound();
        assert_eq!(filter.do_step(1.0, 1.0, true), FmiStatus::Ok);
        assert!(!filter.output_valid());
    }

    #[test]
    fn test_foreign_inbound_triple_is_rejected() {
        let mut filter = running(OperatingMode::Filter, "filter");
        let status = filter.set_integer(
            &[
                INTEGER_SENSORDATA_IN_BASELO_IDX,
                INTEGER_SENSORDATA_IN_BASEHI_IDX,
                INTEGER_SENSORDATA_IN_SIZE_IDX,
            ],
            &[0x1000, 0, 64],
        );
        assert_eq!(status, FmiStatus::Ok);

        assert_eq!(filter.do_step(0.0, 0.1, true), FmiStatus::Warning);
        assert!(!filter.output_valid());
        assert_eq!(filter.object_count(), 0);
        assert!(filter.last_report().unwrap().rejected_input);
    }

    #[test]
    fn test_accept_raw_inbound() {
        let mut source = running(OperatingMode::Source, "source");
        let mut filter = running(OperatingMode::Filter, "filter");
        source.do_step(0.0, 1.0, true);

        let out = source.outbound_descriptor();
        filter.set_integer(
            &[
                INTEGER_SENSORDATA_IN_BASELO_IDX,
                INTEGER_SENSORDATA_IN_BASEHI_IDX,
                INTEGER_SENSORDATA_IN_SIZE_IDX,
            ],
            &[out.address_lo, out.address_hi, out.len],
        );
        // SAFETY: the source instance keeps the published slot alive until its next step
        let taken = unsafe { filter.accept_raw_inbound() }.unwrap();
        assert!(taken);

        assert_eq!(filter.do_step(0.0, 1.0, true), FmiStatus::Ok);
        assert!(filter.output_valid());
    }

    #[test]
    fn test_accept_raw_inbound_retargets_triple() {
        let mut filter = running(OperatingMode::Filter, "filter");
        let host = b"host-owned bytes".to_vec();
        let host_descriptor = BufferDescriptor::from_slice(&host).unwrap();
        filter.set_integer(
            &[
                INTEGER_SENSORDATA_IN_BASELO_IDX,
                INTEGER_SENSORDATA_IN_BASEHI_IDX,
                INTEGER_SENSORDATA_IN_SIZE_IDX,
            ],
            &[
                host_descriptor.address_lo,
                host_descriptor.address_hi,
                host_descriptor.len,
            ],
        );
        // SAFETY: `host` outlives the call
        assert!(unsafe { filter.accept_raw_inbound() }.unwrap());
        drop(host);

        // Triple now describes the instance-owned copy
        let held = filter.inbound_descriptor();
        assert_eq!(held.len, host_descriptor.len);
        // SAFETY: the copy is owned by `filter` and not replaced before this read
        let copied = unsafe { exchange::consume(held) }.unwrap().unwrap();
        assert_eq!(&copied[..], &b"host-owned bytes"[..]);

        // Not a scene message, so the step rejects it on the no-input branch
        // rather than for an unresolved triple
        assert_eq!(filter.do_step(0.0, 0.1, true), FmiStatus::Warning);
        assert!(filter.last_report().unwrap().rejected_input);
    }

    #[test]
    fn test_accept_raw_inbound_zero_length_withdraws() {
        let mut filter = running(OperatingMode::Filter, "filter");
        filter.grant_inbound(InboundGrant::new(b"x".to_vec()).unwrap());
        filter.set_integer(&[INTEGER_SENSORDATA_IN_SIZE_IDX], &[0]);
        // SAFETY: zero length reads nothing
        assert!(!unsafe { filter.accept_raw_inbound() }.unwrap());
        assert!(filter.inbound_descriptor().is_empty());
        assert_eq!(filter.do_step(0.0, 0.1, true), FmiStatus::Ok);
        assert!(!filter.output_valid());
    }

    #[test]
    fn test_range_error_stops_batch() {
        let mut instance = running(OperatingMode::Filter, "vars");
        let status = instance.set_integer(&[INTEGER_COUNT_IDX, 7, 0], &[42, 1, 1]);
        assert_eq!(status, FmiStatus::Error);
        assert_eq!(instance.object_count(), 42);
        assert_eq!(instance.inbound_descriptor().address_lo, 0);

        let mut reals = [0.0; 1];
        assert_eq!(instance.get_real(&[1], &mut reals), FmiStatus::Error);
        let mut strings = vec![String::new()];
        assert_eq!(instance.get_string(&[0], &mut strings), FmiStatus::Ok);
    }

    #[test]
    fn test_reset_returns_to_initialized() {
        let mut instance = running(OperatingMode::Source, "reset");
        instance.do_step(0.0, 0.1, true);
        assert!(instance.output_valid());

        assert_eq!(instance.reset(), FmiStatus::Ok);
        assert_eq!(instance.state(), LifecycleState::Initialized);
        assert!(!instance.output_valid());
        assert_eq!(instance.object_count(), 0);
        assert!(instance.outbound().is_none());
        assert_eq!(instance.last_time(), 0.0);
    }

    #[test]
    fn test_unsupported_operations() {
        let mut instance = running(OperatingMode::Filter, "unsupported");
        assert_eq!(instance.get_fmu_state(), FmiStatus::Error);
        assert_eq!(instance.set_fmu_state(), FmiStatus::Error);
        assert_eq!(instance.free_fmu_state(), FmiStatus::Error);
        assert_eq!(instance.serialized_fmu_state_size(), FmiStatus::Error);
        assert_eq!(instance.serialize_fmu_state(&mut []), FmiStatus::Error);
        assert_eq!(instance.deserialize_fmu_state(&[]), FmiStatus::Error);
        assert_eq!(
            instance.get_directional_derivative(&[], &[], &[], &mut []),
            FmiStatus::Error
        );
        assert_eq!(instance.set_real_input_derivatives(&[], &[], &[]), FmiStatus::Error);
        assert_eq!(instance.get_real_output_derivatives(&[], &[], &mut []), FmiStatus::Error);
        assert_eq!(instance.cancel_step(), FmiStatus::Error);

        assert_eq!(instance.get_status(StatusKind::DoStepStatus), FmiStatus::Discard);
        assert_eq!(instance.get_real_status(StatusKind::LastSuccessfulTime), FmiStatus::Discard);
        assert_eq!(instance.get_integer_status(StatusKind::PendingStatus), FmiStatus::Discard);
        assert_eq!(instance.get_boolean_status(StatusKind::Terminated), FmiStatus::Discard);
        assert_eq!(instance.get_string_status(StatusKind::PendingStatus), FmiStatus::Discard);
        // Nothing changed
        assert_eq!(instance.state(), LifecycleState::Running);
    }

    #[test]
    fn test_debug_logging_categories() {
        let mut instance = running(OperatingMode::Filter, "log");
        assert!(!instance.logging().any());

        assert_eq!(instance.set_debug_logging(true, &["OSI", "nope"]), FmiStatus::Ok);
        assert!(instance.logging().enabled(LogCategory::Osi));
        assert!(!instance.logging().enabled(LogCategory::Fmi));

        instance.set_debug_logging::<&str>(true, &[]);
        assert_eq!(instance.logging(), LoggingCategories::ALL);

        let logged = Instance::instantiate(
            InstanceParams::new("verbose").with_logging(true),
            SensorConfig::default(),
        )
        .unwrap();
        assert_eq!(logged.logging(), LoggingCategories::ALL);
    }

    #[test]
    fn test_free_instance() {
        let instance = running(OperatingMode::Source, "free");
        instance.free_instance();
    }
}
