//! In-memory message transports that record writes and replay scripted reads.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use strand_protocol::{Message, MsgReader, MsgWriter, TransportError};

#[derive(Clone, Copy, Debug)]
enum WriteMode {
    Record,
    /// Record this many messages, then fail every write.
    FailAfter(usize),
    /// Never complete a write.
    Stall,
}

/// A test writer that records messages instead of sending them.
///
/// Clones share the same record, so a test can keep one clone while the
/// other is moved into the code under test.
#[derive(Clone)]
pub struct NullWriter {
    sent: Arc<Mutex<Vec<Message>>>,
    mode: WriteMode,
}

impl NullWriter {
    pub fn new() -> Self {
        Self::with_mode(WriteMode::Record)
    }

    /// Accept `count` messages, then fail like a dropped connection.
    pub fn failing_after(count: usize) -> Self {
        Self::with_mode(WriteMode::FailAfter(count))
    }

    /// A writer whose writes never complete (a peer that stopped reading).
    pub fn stalled() -> Self {
        Self::with_mode(WriteMode::Stall)
    }

    fn with_mode(mode: WriteMode) -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            mode,
        }
    }

    /// All messages written so far (for assertions).
    pub fn sent(&self) -> Vec<Message> {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn record(&self, msg: &Message) -> Result<(), TransportError> {
        let mut sent = self.sent.lock().unwrap_or_else(PoisonError::into_inner);
        if let WriteMode::FailAfter(limit) = self.mode {
            if sent.len() >= limit {
                return Err(TransportError::Io(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "null writer closed",
                )));
            }
        }
        sent.push(msg.clone());
        Ok(())
    }
}

impl Default for NullWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl MsgWriter for NullWriter {
    async fn write_msg(&mut self, msg: &Message) -> Result<(), TransportError> {
        if let WriteMode::Stall = self.mode {
            std::future::pending::<()>().await;
        }
        self.record(msg)
    }
}

/// A test reader that replays scripted messages.
///
/// Once the script runs out it either waits forever (a silent peer) or
/// reports the connection as closed.
pub struct NullReader {
    inbox: VecDeque<Message>,
    close_when_empty: bool,
}

impl NullReader {
    /// A peer that never sends anything.
    pub fn silent() -> Self {
        Self::scripted(Vec::new())
    }

    /// Deliver `messages` in order, then go silent.
    pub fn scripted(messages: Vec<Message>) -> Self {
        Self {
            inbox: messages.into(),
            close_when_empty: false,
        }
    }

    /// Deliver `messages` in order, then report the connection closed.
    pub fn closing(messages: Vec<Message>) -> Self {
        Self {
            inbox: messages.into(),
            close_when_empty: true,
        }
    }

    /// Enqueue a message for the next read.
    pub fn push(&mut self, msg: Message) {
        self.inbox.push_back(msg);
    }
}

impl MsgReader for NullReader {
    async fn read_msg(&mut self) -> Result<Message, TransportError> {
        match self.inbox.pop_front() {
            Some(msg) => Ok(msg),
            None if self.close_when_empty => Err(TransportError::Closed),
            None => std::future::pending().await,
        }
    }
}
