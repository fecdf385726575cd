use std::time::Duration;

use strand_types::{Hash, NetworkId};
use thiserror::Error;

/// Payload encoding and decoding failures.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("encode failed: {0}")]
    Encode(String),

    #[error("decode failed: {0}")]
    Decode(String),

    #[error("message too large: {size} > {max}")]
    TooLarge { size: usize, max: usize },
}

/// Failures of the underlying message transport.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection closed")]
    Closed,

    #[error("frame too large: {size} > {max}")]
    FrameTooLarge { size: usize, max: usize },

    #[error("malformed frame: {0}")]
    Malformed(String),
}

/// Why a handshake did not reach the verified state.
///
/// Every variant is fatal: the caller must discard the session.
#[derive(Debug, Error)]
pub enum HandshakeError {
    #[error("handshake timed out after {0:?}")]
    Timeout(Duration),

    #[error("first msg has code {code:#x} (!= {expected:#x})")]
    UnexpectedFirstMessage { code: u64, expected: u64 },

    #[error("can't decode handshake: {0}")]
    DecodeFailure(#[source] CodecError),

    #[error("bad genesis block {} (!= {})", .theirs.short(), .ours.short())]
    GenesisMismatch { ours: Hash, theirs: Hash },

    #[error("network mismatch: {theirs} (!= {ours})")]
    NetworkMismatch { ours: NetworkId, theirs: NetworkId },

    #[error("handshake read failed: {0}")]
    Read(#[source] TransportError),

    #[error("handshake write failed: {0}")]
    Write(#[source] TransportError),

    #[error("can't encode handshake: {0}")]
    Encode(#[source] CodecError),

    #[error("handshake already started or completed")]
    AlreadyCompleted,
}
