use strand_protocol::{CodecError, TransportError};
use thiserror::Error;

/// Failures of a session after its handshake.
///
/// Handshake failures are reported separately as [`HandshakeError`](strand_protocol::HandshakeError).
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("transmit failed: {0}")]
    Write(#[source] TransportError),

    #[error("encode failed: {0}")]
    Encode(#[from] CodecError),

    #[error("session closed")]
    Closed,

    #[error("config error: {0}")]
    Config(String),
}
