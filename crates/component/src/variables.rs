//! Scalar variable table.
//!
//! Four fixed-size typed arrays addressed by value reference. Batched
//! accesses walk the handles in order and stop at the first invalid one:
//! entries before it are applied, nothing at or after it is touched.

use contracts::{
    ContractError, ValueReference, VariableKind, BOOLEAN_VARS, INTEGER_VARS, REAL_VARS,
    STRING_VARS,
};

#[derive(Debug, Clone)]
pub struct VariableTable {
    reals: [f64; REAL_VARS],
    integers: [i32; INTEGER_VARS],
    booleans: [bool; BOOLEAN_VARS],
    strings: [String; STRING_VARS],
}

impl Default for VariableTable {
    fn default() -> Self {
        Self {
            reals: [0.0; REAL_VARS],
            integers: [0; INTEGER_VARS],
            booleans: [false; BOOLEAN_VARS],
            strings: std::array::from_fn(|_| String::new()),
        }
    }
}

fn check_batch(kind: VariableKind, handles: usize, values: usize) -> Result<(), ContractError> {
    if handles != values {
        return Err(ContractError::BatchLength {
            kind,
            handles,
            values,
        });
    }
    Ok(())
}

fn slot(kind: VariableKind, handle: ValueReference) -> Result<usize, ContractError> {
    let idx = handle as usize;
    if idx < kind.size() {
        Ok(idx)
    } else {
        Err(ContractError::VariableRange {
            kind,
            handle,
            size: kind.size(),
        })
    }
}

fn get_batch<T: Clone>(
    kind: VariableKind,
    table: &[T],
    handles: &[ValueReference],
    out: &mut [T],
) -> Result<(), ContractError> {
    check_batch(kind, handles.len(), out.len())?;
    for (handle, value) in handles.iter().zip(out.iter_mut()) {
        *value = table[slot(kind, *handle)?].clone();
    }
    Ok(())
}

fn set_batch<T: Clone>(
    kind: VariableKind,
    table: &mut [T],
    handles: &[ValueReference],
    values: &[T],
) -> Result<(), ContractError> {
    check_batch(kind, handles.len(), values.len())?;
    for (handle, value) in handles.iter().zip(values) {
        table[slot(kind, *handle)?] = value.clone();
    }
    Ok(())
}

impl VariableTable {
    /// Zero every slot
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn get_real(&self, handles: &[ValueReference], out: &mut [f64]) -> Result<(), ContractError> {
        get_batch(VariableKind::Real, &self.reals, handles, out)
    }

    pub fn get_integer(&self, handles: &[ValueReference], out: &mut [i32]) -> Result<(), ContractError> {
        get_batch(VariableKind::Integer, &self.integers, handles, out)
    }

    pub fn get_boolean(&self, handles: &[ValueReference], out: &mut [bool]) -> Result<(), ContractError> {
        get_batch(VariableKind::Boolean, &self.booleans, handles, out)
    }

    pub fn get_string(&self, handles: &[ValueReference], out: &mut [String]) -> Result<(), ContractError> {
        get_batch(VariableKind::String, &self.strings, handles, out)
    }

    pub fn set_real(&mut self, handles: &[ValueReference], values: &[f64]) -> Result<(), ContractError> {
        set_batch(VariableKind::Real, &mut self.reals, handles, values)
    }

    pub fn set_integer(&mut self, handles: &[ValueReference], values: &[i32]) -> Result<(), ContractError> {
        set_batch(VariableKind::Integer, &mut self.integers, handles, values)
    }

    pub fn set_boolean(&mut self, handles: &[ValueReference], values: &[bool]) -> Result<(), ContractError> {
        set_batch(VariableKind::Boolean, &mut self.booleans, handles, values)
    }

    pub fn set_string(&mut self, handles: &[ValueReference], values: &[String]) -> Result<(), ContractError> {
        set_batch(VariableKind::String, &mut self.strings, handles, values)
    }

    // Internal single-slot accessors for reserved handles (always in range)

    #[inline]
    pub(crate) fn integer(&self, handle: ValueReference) -> i32 {
        self.integers[handle as usize]
    }

    #[inline]
    pub(crate) fn put_integer(&mut self, handle: ValueReference, value: i32) {
        self.integers[handle as usize] = value;
    }

    #[inline]
    pub(crate) fn boolean(&self, handle: ValueReference) -> bool {
        self.booleans[handle as usize]
    }

    #[inline]
    pub(crate) fn put_boolean(&mut self, handle: ValueReference, value: bool) {
        self.booleans[handle as usize] = value;
    }
}
