//! Error types for CLI operations.

use contracts::FmiStatus;
use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Invalid run arguments
    #[error("Invalid argument '{name}': {message}")]
    InvalidArgument { name: &'static str, message: String },

    /// A host call returned a failing status
    #[error("{instance}: {operation} returned {status}")]
    HostCall {
        instance: String,
        operation: &'static str,
        status: FmiStatus,
    },
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn invalid_argument(name: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            message: message.into(),
        }
    }

    pub fn host_call(
        instance: impl Into<String>,
        operation: &'static str,
        status: FmiStatus,
    ) -> Self {
        Self::HostCall {
            instance: instance.into(),
            operation,
            status,
        }
    }
}
