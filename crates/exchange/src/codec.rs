//! Scene wire codec (bincode / JSON)

use contracts::{ContractError, Scene, WireFormat};

/// Encodes and decodes scene messages in the configured wire format
#[derive(Debug, Clone, Copy, Default)]
pub struct WireCodec {
    format: WireFormat,
}

impl WireCodec {
    pub fn new(format: WireFormat) -> Self {
        Self { format }
    }

    #[inline]
    pub fn format(&self) -> WireFormat {
        self.format
    }

    /// Append the encoded scene to `buf`
    pub fn encode_into(&self, scene: &Scene, buf: &mut Vec<u8>) -> Result<(), ContractError> {
        match self.format {
            WireFormat::Bincode => bincode::serialize_into(buf, scene)
                .map_err(|e| ContractError::codec("bincode", e.to_string())),
            WireFormat::Json => serde_json::to_writer(buf, scene)
                .map_err(|e| ContractError::codec("json", e.to_string())),
        }
    }

    pub fn encode(&self, scene: &Scene) -> Result<Vec<u8>, ContractError> {
        let mut buf = Vec::new();
        self.encode_into(scene, &mut buf)?;
        Ok(buf)
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<Scene, ContractError> {
        match self.format {
            WireFormat::Bincode => bincode::deserialize(bytes)
                .map_err(|e| ContractError::codec("bincode", e.to_string())),
            WireFormat::Json => serde_json::from_slice(bytes)
                .map_err(|e| ContractError::codec("json", e.to_string())),
        }
    }
}
