//! # Component
//!
//! The sensor as seen by a co-simulation host: lifecycle state machine,
//! scalar variable table and the per-step controller.
//!
//! ```
//! use component::{Instance, InstanceParams};
//! use contracts::{FmiStatus, OperatingMode, SensorConfig};
//!
//! let config = SensorConfig { mode: OperatingMode::Source, ..Default::default() };
//! let mut sensor = Instance::instantiate(InstanceParams::new("source"), config).unwrap();
//! assert_eq!(sensor.setup_experiment(None, 0.0, None), FmiStatus::Ok);
//! assert_eq!(sensor.do_step(0.0, 0.1, true), FmiStatus::Ok);
//! assert!(sensor.output_valid());
//! assert_eq!(sensor.object_count(), 10);
//! ```

mod controller;
mod instance;
mod logging;
mod variables;

pub use controller::{StepBranch, StepController, StepReport};
pub use instance::{Instance, InstanceParams};
pub use logging::{LogCategory, LoggingCategories};
pub use variables::VariableTable;
