//! Address/length descriptor and the inbound capability.

use bytes::Bytes;
use contracts::ContractError;

/// The integer triple describing a buffer to the host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BufferDescriptor {
    pub address_hi: i32,
    pub address_lo: i32,
    pub len: i32,
}

impl BufferDescriptor {
    /// "Nothing published"
    pub const EMPTY: Self = Self {
        address_hi: 0,
        address_lo: 0,
        len: 0,
    };

    /// Describe a live slice; an empty slice yields [`Self::EMPTY`]
    pub fn from_slice(data: &[u8]) -> Result<Self, ContractError> {
        if data.is_empty() {
            return Ok(Self::EMPTY);
        }
        let len = i32::try_from(data.len()).map_err(|_| {
            ContractError::descriptor(format!("{} bytes exceed the 32-bit length field", data.len()))
        })?;
        let (address_hi, address_lo) = encode_address(data.as_ptr() as usize);
        Ok(Self {
            address_hi,
            address_lo,
            len,
        })
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn address(&self) -> usize {
        decode_address(self.address_hi, self.address_lo)
    }
}

/// Split an address into (high, low) 32-bit halves
#[cfg(target_pointer_width = "64")]
#[inline]
pub fn encode_address(address: usize) -> (i32, i32) {
    let address = address as u64;
    ((address >> 32) as u32 as i32, address as u32 as i32)
}

/// Split an address into (high, low); high is always zero
#[cfg(target_pointer_width = "32")]
#[inline]
pub fn encode_address(address: usize) -> (i32, i32) {
    (0, address as u32 as i32)
}

/// Rebuild an address from its (high, low) halves
#[cfg(target_pointer_width = "64")]
#[inline]
pub fn decode_address(hi: i32, lo: i32) -> usize {
    (((hi as u32 as u64) << 32) | lo as u32 as u64) as usize
}

/// Rebuild an address; the high half is ignored
#[cfg(target_pointer_width = "32")]
#[inline]
pub fn decode_address(_hi: i32, lo: i32) -> usize {
    lo as u32 as usize
}

/// Read exactly `descriptor.len` bytes from the described address
///
/// Returns `Ok(None)` for a zero length (no valid input).
///
/// # Safety
/// For a non-zero length the caller guarantees that the address points to
/// `len` initialized bytes that stay valid and unmodified for the duration
/// of this call.
pub unsafe fn consume(descriptor: BufferDescriptor) -> Result<Option<Bytes>, ContractError> {
    if descriptor.len == 0 {
        return Ok(None);
    }
    if descriptor.len < 0 {
        return Err(ContractError::descriptor(format!(
            "negative length {}",
            descriptor.len
        )));
    }
    let address = descriptor.address();
    if address == 0 {
        return Err(ContractError::descriptor("null address with non-zero length"));
    }

    tracing::debug!(
        address_hi = %format!("{:08X}", descriptor.address_hi),
        address_lo = %format!("{:08X}", descriptor.address_lo),
        len = descriptor.len,
        "Reading inbound buffer"
    );
    // SAFETY: upheld by the caller, see above.
    let data = unsafe { std::slice::from_raw_parts(address as *const u8, descriptor.len as usize) };
    Ok(Some(Bytes::copy_from_slice(data)))
}

/// Inbound message granted to an instance by the host
///
/// Owns its bytes, so the described address stays valid for as long as the
/// grant is held.
#[derive(Debug, Clone)]
pub struct InboundGrant {
    payload: Bytes,
    descriptor: BufferDescriptor,
}

impl InboundGrant {
    /// Grant an owned payload
    pub fn new(payload: impl Into<Bytes>) -> Result<Self, ContractError> {
        let payload = payload.into();
        let descriptor = BufferDescriptor::from_slice(&payload)?;
        Ok(Self {
            payload,
            descriptor,
        })
    }

    /// Grant a copy of a raw buffer described by the host
    ///
    /// # Safety
    /// Same contract as [`consume`].
    pub unsafe fn from_descriptor(
        descriptor: BufferDescriptor,
    ) -> Result<Option<Self>, ContractError> {
        // SAFETY: forwarded to the caller.
        match unsafe { consume(descriptor)? } {
            Some(payload) => Self::new(payload).map(Some),
            None => Ok(None),
        }
    }

    #[inline]
    pub fn descriptor(&self) -> BufferDescriptor {
        self.descriptor
    }

    #[inline]
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// True if the host-side triple refers to this grant
    #[inline]
    pub fn matches(&self, descriptor: &BufferDescriptor) -> bool {
        self.descriptor == *descriptor
    }
}
