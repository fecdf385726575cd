//! Payload codec: bincode encoding of typed records into coded messages.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{CodecError, MessageCode};

/// Maximum encoded payload size in bytes.
pub const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024; // 16 MiB

/// A coded message as it crosses the transport: a raw code and an encoded
/// payload. The code is kept raw so that unknown codes can still be read and
/// rejected by whoever inspects them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub code: u64,
    pub payload: Vec<u8>,
}

impl Message {
    /// Encode `payload` under `code`.
    pub fn new(code: MessageCode, payload: &impl Serialize) -> Result<Self, CodecError> {
        Ok(Self {
            code: code.as_u64(),
            payload: encode(payload)?,
        })
    }

    /// The known code of this message, or the raw value if unknown.
    pub fn kind(&self) -> Result<MessageCode, u64> {
        MessageCode::try_from(self.code)
    }

    /// Decode the payload into a typed record.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, CodecError> {
        decode(&self.payload)
    }
}

/// Encode a payload record.
pub fn encode(payload: &impl Serialize) -> Result<Vec<u8>, CodecError> {
    let bytes = bincode::serialize(payload).map_err(|e| CodecError::Encode(e.to_string()))?;
    if bytes.len() > MAX_MESSAGE_SIZE {
        return Err(CodecError::TooLarge {
            size: bytes.len(),
            max: MAX_MESSAGE_SIZE,
        });
    }
    Ok(bytes)
}

/// Decode a payload record from raw bytes.
pub fn decode<T: DeserializeOwned>(data: &[u8]) -> Result<T, CodecError> {
    if data.len() > MAX_MESSAGE_SIZE {
        return Err(CodecError::TooLarge {
            size: data.len(),
            max: MAX_MESSAGE_SIZE,
        });
    }
    bincode::deserialize(data).map_err(|e| CodecError::Decode(e.to_string()))
}
