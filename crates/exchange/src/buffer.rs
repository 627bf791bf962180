//! Outbound double buffer.
//!
//! Two slots and a `current` selector:
//! - `publish` writes into `slots[current]`, publishes its descriptor, then
//!   flips `current`
//! - the slot published in step N is next written in step N+2, so its
//!   address is stable for the whole of step N+1
//!
//! Storage is never freed by `reset`; only the published triple is cleared.

use std::fmt;

use contracts::ContractError;
use tracing::{debug, instrument};

use crate::descriptor::BufferDescriptor;

/// Two-slot arena for serialized outbound messages
pub struct ExchangeBuffer {
    slots: [Vec<u8>; 2],
    /// Slot the next publish writes into
    current: usize,
    /// Slot holding the live published message
    published_slot: Option<usize>,
    descriptor: BufferDescriptor,
    /// Number of publishes so far; a descriptor of generation `g` is valid
    /// until generation `g + 1` is published
    generation: u64,
}

impl fmt::Debug for ExchangeBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExchangeBuffer")
            .field("current", &self.current)
            .field("published_slot", &self.published_slot)
            .field("descriptor", &self.descriptor)
            .field("generation", &self.generation)
            .finish()
    }
}

impl Default for ExchangeBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl ExchangeBuffer {
    pub fn new() -> Self {
        Self {
            slots: [Vec::new(), Vec::new()],
            current: 0,
            published_slot: None,
            descriptor: BufferDescriptor::EMPTY,
            generation: 0,
        }
    }

    /// Copy `payload` into the next slot and publish it
    pub fn publish(&mut self, payload: &[u8]) -> Result<BufferDescriptor, ContractError> {
        self.publish_with(|slot| {
            slot.extend_from_slice(payload);
            Ok(())
        })
    }

    /// Serialize directly into the next slot and publish it
    ///
    /// `write` receives the cleared slot. On error nothing is published and
    /// the previously published descriptor stays live.
    #[instrument(name = "exchange_publish", skip(self, write), fields(generation = self.generation + 1))]
    pub fn publish_with<F>(&mut self, write: F) -> Result<BufferDescriptor, ContractError>
    where
        F: FnOnce(&mut Vec<u8>) -> Result<(), ContractError>,
    {
        let slot_idx = self.current;
        let slot = &mut self.slots[slot_idx];
        slot.clear();
        write(slot)?;

        let descriptor = BufferDescriptor::from_slice(slot)?;

        // Only flip once the new content is fully written
        self.published_slot = Some(slot_idx);
        self.descriptor = descriptor;
        self.generation += 1;
        self.current ^= 1;

        debug!(
            address_hi = %format!("{:08X}", descriptor.address_hi),
            address_lo = %format!("{:08X}", descriptor.address_lo),
            len = descriptor.len,
            slot = slot_idx,
            "Providing outbound buffer"
        );
        Ok(descriptor)
    }

    /// Clear the published triple without freeing storage
    pub fn reset(&mut self) {
        self.published_slot = None;
        self.descriptor = BufferDescriptor::EMPTY;
    }

    /// Descriptor of the live message ([`BufferDescriptor::EMPTY`] if none)
    #[inline]
    pub fn descriptor(&self) -> BufferDescriptor {
        self.descriptor
    }

    /// Bytes of the live message
    #[inline]
    pub fn published(&self) -> Option<&[u8]> {
        self.published_slot.map(|idx| self.slots[idx].as_slice())
    }

    /// Bytes of the message published before the live one
    ///
    /// Still intact until the next publish overwrites it.
    #[inline]
    pub fn previous(&self) -> Option<&[u8]> {
        match self.published_slot {
            Some(idx) if self.generation > 1 => Some(self.slots[idx ^ 1].as_slice()),
            _ => None,
        }
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
