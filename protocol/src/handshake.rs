//! Session handshake.
//!
//! Both sides send their [`HandshakeData`] and read the other's at the same
//! time. The exchange succeeds only if our record went out and theirs came
//! in and validated, all before [`HANDSHAKE_TIMEOUT`] (or the caller's
//! deadline) elapses. The first failure wins.

use std::time::Duration;

use crate::{HandshakeData, HandshakeError, Message, MessageCode, MsgReader, MsgWriter};

/// Default deadline for the whole exchange.
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Exchange handshake records with a peer and return the peer's record.
///
/// The send and the receive are polled concurrently inside this call. When
/// one fails or the deadline fires, the other is dropped along with its
/// pending read or write, so nothing keeps running after this returns.
pub async fn perform_handshake<W, R>(
    writer: &mut W,
    reader: &mut R,
    local: &HandshakeData,
    timeout: Duration,
) -> Result<HandshakeData, HandshakeError>
where
    W: MsgWriter,
    R: MsgReader,
{
    let send = async {
        let msg = Message::new(MessageCode::Handshake, local).map_err(HandshakeError::Encode)?;
        writer.write_msg(&msg).await.map_err(HandshakeError::Write)
    };
    let receive = read_status(reader, local);

    match tokio::time::timeout(timeout, async { tokio::try_join!(send, receive) }).await {
        Ok(Ok(((), remote))) => Ok(remote),
        Ok(Err(e)) => Err(e),
        Err(_) => Err(HandshakeError::Timeout(timeout)),
    }
}

/// Read the first inbound message and check it against our own record.
async fn read_status<R: MsgReader>(
    reader: &mut R,
    local: &HandshakeData,
) -> Result<HandshakeData, HandshakeError> {
    let msg = reader.read_msg().await.map_err(HandshakeError::Read)?;
    validate(&msg, local)
}

fn validate(msg: &Message, local: &HandshakeData) -> Result<HandshakeData, HandshakeError> {
    let expected = MessageCode::Handshake.as_u64();
    if msg.code != expected {
        return Err(HandshakeError::UnexpectedFirstMessage {
            code: msg.code,
            expected,
        });
    }
    let remote: HandshakeData = msg.decode().map_err(HandshakeError::DecodeFailure)?;
    if remote.genesis_block != local.genesis_block {
        return Err(HandshakeError::GenesisMismatch {
            ours: local.genesis_block,
            theirs: remote.genesis_block,
        });
    }
    if remote.network_id != local.network_id {
        return Err(HandshakeError::NetworkMismatch {
            ours: local.network_id,
            theirs: remote.network_id,
        });
    }
    Ok(remote)
}
