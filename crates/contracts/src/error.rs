//! Layered error definitions
//!
//! Categorized by source: config / codec / exchange / lifecycle / variables

use thiserror::Error;

use crate::{FmiStatus, LifecycleState, VariableKind};

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Codec Errors =====
    /// Scene message could not be encoded or decoded
    #[error("codec error ({format}): {message}")]
    Codec { format: String, message: String },

    // ===== Exchange Errors =====
    /// Buffer descriptor does not describe a readable buffer
    #[error("invalid buffer descriptor: {message}")]
    Descriptor { message: String },

    // ===== Lifecycle Errors =====
    /// Operation not permitted in the current lifecycle state
    #[error("'{operation}' not allowed in state {state:?}")]
    Lifecycle {
        operation: &'static str,
        state: LifecycleState,
    },

    /// Instance could not be created
    #[error("instantiation of '{instance_name}' failed: {message}")]
    Instantiation {
        instance_name: String,
        message: String,
    },

    // ===== Variable Errors =====
    /// Variable handle outside the declared table size
    #[error("{kind:?} handle {handle} out of range (size {size})")]
    VariableRange {
        kind: VariableKind,
        handle: u32,
        size: usize,
    },

    /// Handle slice and value slice differ in length
    #[error("{kind:?} batch length mismatch: {handles} handles, {values} values")]
    BatchLength {
        kind: VariableKind,
        handles: usize,
        values: usize,
    },

    /// Operation is contractually unsupported
    #[error("unsupported operation: {operation}")]
    Unsupported { operation: &'static str },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create codec error
    pub fn codec(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Codec {
            format: format.into(),
            message: message.into(),
        }
    }

    /// Create descriptor error
    pub fn descriptor(message: impl Into<String>) -> Self {
        Self::Descriptor {
            message: message.into(),
        }
    }

    /// Create instantiation error
    pub fn instantiation(instance_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Instantiation {
            instance_name: instance_name.into(),
            message: message.into(),
        }
    }

    /// Status reported to the host for this error
    pub fn status(&self) -> FmiStatus {
        match self {
            Self::Io(_) => FmiStatus::Fatal,
            _ => FmiStatus::Error,
        }
    }
}
