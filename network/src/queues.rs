//! Per-kind outbound queues between send callers and the broadcaster.
//!
//! Each message kind gets its own bounded channel so that a burst of one
//! kind cannot delay another beyond the broadcaster's fair selection. Order
//! is FIFO within a kind only.

use std::sync::Arc;

use serde::Serialize;
use strand_protocol::{BlockRange, CodecError, Message, MessageCode, ProposeProof};
use strand_types::{Block, Transaction, Vote};
use tokio::sync::mpsc;

use crate::QueueCapacities;

/// A generic (code, payload) message for sync requests and header pushes.
///
/// The payload is encoded when the request is built, so encoding problems
/// surface to the caller rather than inside the broadcaster.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    pub code: MessageCode,
    pub payload: Vec<u8>,
}

impl Request {
    pub fn new(code: MessageCode, payload: &impl Serialize) -> Result<Self, CodecError> {
        let msg = Message::new(code, payload)?;
        Ok(Self {
            code,
            payload: msg.payload,
        })
    }

    pub fn into_message(self) -> Message {
        Message {
            code: self.code.as_u64(),
            payload: self.payload,
        }
    }
}

/// Producer halves, owned by the session.
pub(crate) struct OutboundQueues {
    pub block_ranges: mpsc::Sender<Arc<BlockRange>>,
    pub proofs: mpsc::Sender<Arc<ProposeProof>>,
    pub proposals: mpsc::Sender<Arc<Block>>,
    pub votes: mpsc::Sender<Arc<Vote>>,
    pub txs: mpsc::Sender<Arc<Transaction>>,
    pub requests: mpsc::Sender<Request>,
}

/// Consumer halves, owned by the broadcaster.
pub(crate) struct OutboundReceivers {
    pub block_ranges: mpsc::Receiver<Arc<BlockRange>>,
    pub proofs: mpsc::Receiver<Arc<ProposeProof>>,
    pub proposals: mpsc::Receiver<Arc<Block>>,
    pub votes: mpsc::Receiver<Arc<Vote>>,
    pub txs: mpsc::Receiver<Arc<Transaction>>,
    pub requests: mpsc::Receiver<Request>,
}

/// Build the six queues. Zero capacities are raised to one.
pub(crate) fn outbound_queues(caps: &QueueCapacities) -> (OutboundQueues, OutboundReceivers) {
    let (block_ranges_tx, block_ranges_rx) = mpsc::channel(caps.block_ranges.max(1));
    let (proofs_tx, proofs_rx) = mpsc::channel(caps.proofs.max(1));
    let (proposals_tx, proposals_rx) = mpsc::channel(caps.proposals.max(1));
    let (votes_tx, votes_rx) = mpsc::channel(caps.votes.max(1));
    let (txs_tx, txs_rx) = mpsc::channel(caps.txs.max(1));
    let (requests_tx, requests_rx) = mpsc::channel(caps.requests.max(1));

    (
        OutboundQueues {
            block_ranges: block_ranges_tx,
            proofs: proofs_tx,
            proposals: proposals_tx,
            votes: votes_tx,
            txs: txs_tx,
            requests: requests_tx,
        },
        OutboundReceivers {
            block_ranges: block_ranges_rx,
            proofs: proofs_rx,
            proposals: proposals_rx,
            votes: votes_rx,
            txs: txs_rx,
            requests: requests_rx,
        },
    )
}
