//! Message transport seam.
//!
//! A session only needs two capabilities from its connection: write one
//! coded message, read the next one. [`MsgWriter`] and [`MsgReader`] are
//! those capabilities; the framed implementations below provide them over
//! any tokio byte stream (TCP halves, in-memory duplex streams).
//!
//! Frame layout: 4-byte big-endian body length, then the body, which is the
//! 8-byte big-endian message code followed by the encoded payload.

use std::future::Future;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::{Message, TransportError, MAX_MESSAGE_SIZE};

const CODE_LEN: usize = 8;

/// Largest accepted frame body.
const MAX_BODY_SIZE: usize = MAX_MESSAGE_SIZE + CODE_LEN;

/// The write side of a peer connection.
pub trait MsgWriter: Send {
    /// Transmit one message. Completes once the message is handed to the
    /// connection.
    fn write_msg(&mut self, msg: &Message) -> impl Future<Output = Result<(), TransportError>> + Send;
}

/// The read side of a peer connection.
pub trait MsgReader: Send {
    /// Wait for the next inbound message.
    fn read_msg(&mut self) -> impl Future<Output = Result<Message, TransportError>> + Send;
}

/// Length-prefixed message writer over a tokio byte sink.
pub struct FramedWriter<W> {
    inner: W,
}

impl<W: AsyncWrite + Unpin + Send> FramedWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: AsyncWrite + Unpin + Send> MsgWriter for FramedWriter<W> {
    async fn write_msg(&mut self, msg: &Message) -> Result<(), TransportError> {
        let body_len = CODE_LEN + msg.payload.len();
        if body_len > MAX_BODY_SIZE {
            return Err(TransportError::FrameTooLarge {
                size: body_len,
                max: MAX_BODY_SIZE,
            });
        }
        let mut frame = Vec::with_capacity(4 + body_len);
        frame.extend_from_slice(&(body_len as u32).to_be_bytes());
        frame.extend_from_slice(&msg.code.to_be_bytes());
        frame.extend_from_slice(&msg.payload);
        self.inner.write_all(&frame).await?;
        self.inner.flush().await?;
        Ok(())
    }
}

/// Length-prefixed message reader over a tokio byte source.
pub struct FramedReader<R> {
    inner: R,
}

impl<R: AsyncRead + Unpin + Send> FramedReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: AsyncRead + Unpin + Send> MsgReader for FramedReader<R> {
    async fn read_msg(&mut self) -> Result<Message, TransportError> {
        let mut len_buf = [0u8; 4];
        match self.inner.read_exact(&mut len_buf).await {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                return Err(TransportError::Closed)
            }
            Err(e) => return Err(e.into()),
        }
        let body_len = u32::from_be_bytes(len_buf) as usize;
        if body_len > MAX_BODY_SIZE {
            return Err(TransportError::FrameTooLarge {
                size: body_len,
                max: MAX_BODY_SIZE,
            });
        }
        if body_len < CODE_LEN {
            return Err(TransportError::Malformed(format!(
                "frame body of {body_len} bytes cannot hold a message code"
            )));
        }

        let mut code_buf = [0u8; CODE_LEN];
        self.inner.read_exact(&mut code_buf).await?;
        let mut payload = vec![0u8; body_len - CODE_LEN];
        self.inner.read_exact(&mut payload).await?;

        Ok(Message {
            code: u64::from_be_bytes(code_buf),
            payload,
        })
    }
}
