//! Wire protocol: message codes, payload encoding, framing, handshake.

pub mod codec;
pub mod codes;
pub mod error;
pub mod handshake;
pub mod messages;
pub mod transport;

pub use codec::{Message, MAX_MESSAGE_SIZE};
pub use codes::MessageCode;
pub use error::{CodecError, HandshakeError, TransportError};
pub use handshake::{perform_handshake, HANDSHAKE_TIMEOUT};
pub use messages::{
    BlockRange, GetBlockByHashRequest, GetBlocksRangeRequest, HandshakeData, ProposeProof,
};
pub use transport::{FramedReader, FramedWriter, MsgReader, MsgWriter};
