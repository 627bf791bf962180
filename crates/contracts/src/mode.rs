//! Operating mode and lifecycle state of a sensor instance.

use serde::{Deserialize, Serialize};

/// Operating mode, fixed for the lifetime of an instance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatingMode {
    /// Synthesize ground truth, ignore inbound messages
    Source,
    /// Consume an inbound scene and emit detections
    #[default]
    Filter,
}

impl OperatingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Filter => "filter",
        }
    }
}

/// Serialization of scene messages crossing the exchange buffer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireFormat {
    /// Bincode (binary, compact)
    #[default]
    Bincode,
    /// JSON (human-readable, larger)
    Json,
}

impl WireFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bincode => "bincode",
            Self::Json => "json",
        }
    }
}

/// Lifecycle state machine of an instance
///
/// `Uninitialized -> Initialized -> Running -> Terminated`, with `reset`
/// returning any state to `Initialized`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LifecycleState {
    #[default]
    Uninitialized,
    Initialized,
    Running,
    Terminated,
}
