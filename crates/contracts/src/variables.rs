//! Scalar variable table layout.
//!
//! Handles (value references) are stable small integers. The integer table
//! carries the exchange-buffer triples for both directions.

/// Which typed array a handle indexes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableKind {
    Real,
    Integer,
    Boolean,
    String,
}

/// Host-side value reference
pub type ValueReference = u32;

// ===== Booleans =====
pub const BOOLEAN_VALID_IDX: ValueReference = 0;
pub const BOOLEAN_VARS: usize = 1;

// ===== Integers =====
pub const INTEGER_SENSORDATA_IN_BASELO_IDX: ValueReference = 0;
pub const INTEGER_SENSORDATA_IN_BASEHI_IDX: ValueReference = 1;
pub const INTEGER_SENSORDATA_IN_SIZE_IDX: ValueReference = 2;
pub const INTEGER_SENSORDATA_OUT_BASELO_IDX: ValueReference = 3;
pub const INTEGER_SENSORDATA_OUT_BASEHI_IDX: ValueReference = 4;
pub const INTEGER_SENSORDATA_OUT_SIZE_IDX: ValueReference = 5;
pub const INTEGER_COUNT_IDX: ValueReference = 6;
pub const INTEGER_VARS: usize = 7;

// ===== Reals / Strings (reserved) =====
pub const REAL_VARS: usize = 1;
pub const STRING_VARS: usize = 1;

impl VariableKind {
    /// Declared size of the typed array
    pub fn size(&self) -> usize {
        match self {
            Self::Real => REAL_VARS,
            Self::Integer => INTEGER_VARS,
            Self::Boolean => BOOLEAN_VARS,
            Self::String => STRING_VARS,
        }
    }
}
