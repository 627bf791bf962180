//! Host-facing status codes.

use std::fmt;

/// Status reported to the co-simulation host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FmiStatus {
    Ok,
    Warning,
    /// Enquiry not supported, nothing was done
    Discard,
    /// Handle/range violation or unsupported operation
    Error,
    Fatal,
    Pending,
}

impl FmiStatus {
    #[inline]
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl fmt::Display for FmiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Ok => "fmi2OK",
            Self::Warning => "fmi2Warning",
            Self::Discard => "fmi2Discard",
            Self::Error => "fmi2Error",
            Self::Fatal => "fmi2Fatal",
            Self::Pending => "fmi2Pending",
        };
        f.write_str(s)
    }
}

/// Instance type requested at instantiation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FmuType {
    ModelExchange,
    #[default]
    CoSimulation,
}

/// Status enquiry kinds (all answered with `Discard`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    DoStepStatus,
    PendingStatus,
    LastSuccessfulTime,
    Terminated,
}
