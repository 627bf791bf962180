//! # Contracts
//!
//! Frozen interface contracts shared by every crate of the sensor component:
//! the scene message exchanged with the co-simulation host, the host-facing
//! status codes and variable handles, the sensor configuration and the
//! unified error type. Business crates depend on this crate, never the
//! other way around.
//!
//! ## Time Model
//! - Simulation time is carried as `f64` seconds by the host
//! - Messages carry a split [`Timestamp`] (whole seconds + nanoseconds)

mod config;
mod error;
mod mode;
mod scene;
mod status;
mod variables;

pub use config::*;
pub use error::*;
pub use mode::*;
pub use scene::*;
pub use status::*;
pub use variables::*;
