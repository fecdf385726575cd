//! The single writer of a peer connection.
//!
//! [`Broadcaster::run`] owns the write half for the whole life of the
//! session. It multiplexes the six outbound queues and the termination
//! signal, picking at random among whatever is ready, and transmits one
//! message at a time. The first transmit failure ends the session; nothing
//! is retried or requeued. Termination means stop now: queued items are
//! dropped, not flushed.

use std::sync::Arc;

use strand_protocol::{Message, MessageCode, MsgWriter};
use tokio::sync::watch;

use crate::queues::OutboundReceivers;
use crate::SessionError;

/// One-way termination flag shared by a session and its broadcaster.
#[derive(Clone)]
pub(crate) struct Termination(Arc<watch::Sender<bool>>);

impl Termination {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self(Arc::new(tx))
    }

    /// Raise the flag. Returns `true` for the call that raised it.
    pub fn trigger(&self) -> bool {
        !self.0.send_replace(true)
    }

    pub fn is_triggered(&self) -> bool {
        *self.0.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.0.subscribe()
    }

    pub async fn wait(&self) {
        let mut rx = self.subscribe();
        // The sender lives in `self`, so this only returns once raised.
        let _ = rx.wait_for(|terminated| *terminated).await;
    }
}

/// Drains a session's outbound queues onto its connection.
///
/// Created together with its [`PeerSession`](crate::PeerSession); spawn
/// [`run`](Self::run) once the handshake has succeeded.
pub struct Broadcaster {
    peer_id: String,
    pub(crate) queues: OutboundReceivers,
    pub(crate) termination: Termination,
}

impl Broadcaster {
    pub(crate) fn new(peer_id: String, queues: OutboundReceivers, termination: Termination) -> Self {
        Self {
            peer_id,
            queues,
            termination,
        }
    }

    pub fn peer_id(&self) -> &str {
        &self.peer_id
    }

    /// Transmit queued messages on `writer` until the session terminates or
    /// a transmit fails.
    ///
    /// Returns `Ok(())` on termination and the failure otherwise. Either way
    /// the session is marked terminated on return and its queues close, so
    /// later sends fail with [`SessionError::Closed`].
    pub async fn run<W: MsgWriter>(self, mut writer: W) -> Result<(), SessionError> {
        let Self {
            peer_id,
            mut queues,
            termination,
        } = self;
        let mut term = termination.subscribe();

        let result = broadcast(&peer_id, &mut queues, &mut term, &mut writer).await;
        termination.trigger();
        drop(queues);

        match &result {
            Ok(()) => tracing::info!(peer = %peer_id, "peer exited from broadcast loop"),
            Err(e) => tracing::error!(peer = %peer_id, error = %e, "peer exited from broadcast loop"),
        }
        result
    }
}

async fn broadcast<W: MsgWriter>(
    peer_id: &str,
    queues: &mut OutboundReceivers,
    term: &mut watch::Receiver<bool>,
    writer: &mut W,
) -> Result<(), SessionError> {
    loop {
        if *term.borrow() {
            return Ok(());
        }

        // Unbiased: ready branches are polled in random order.
        let msg = tokio::select! {
            Some(range) = queues.block_ranges.recv() => Message::new(MessageCode::BlocksRange, &*range)?,
            Some(proof) = queues.proofs.recv() => Message::new(MessageCode::ProposeProof, &*proof)?,
            Some(block) = queues.proposals.recv() => Message::new(MessageCode::ProposeBlock, &*block)?,
            Some(vote) = queues.votes.recv() => Message::new(MessageCode::Vote, &*vote)?,
            Some(tx) = queues.txs.recv() => Message::new(MessageCode::NewTx, &*tx)?,
            Some(request) = queues.requests.recv() => request.into_message(),
            _ = term.changed() => return Ok(()),
        };

        // Termination may have raced the dequeue.
        if *term.borrow() {
            return Ok(());
        }

        tokio::select! {
            res = writer.write_msg(&msg) => res.map_err(SessionError::Write)?,
            _ = term.changed() => return Ok(()),
        }
        tracing::trace!(peer = %peer_id, code = msg.code, bytes = msg.payload.len(), "sent");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queues::outbound_queues;
    use crate::QueueCapacities;
    use strand_nullables::NullWriter;
    use strand_types::Transaction;

    #[test]
    fn termination_is_one_way() {
        let term = Termination::new();
        assert!(!term.is_triggered());
        assert!(term.trigger());
        assert!(!term.trigger());
        assert!(term.is_triggered());
    }

    #[tokio::test]
    async fn wait_returns_after_trigger() {
        let term = Termination::new();
        let waiter = {
            let term = term.clone();
            tokio::spawn(async move { term.wait().await })
        };
        term.trigger();
        waiter.await.unwrap();
    }

    #[tokio::test]
    async fn drains_queue_in_order_then_stops_on_termination() {
        let (queues, receivers) = outbound_queues(&QueueCapacities::default());
        let termination = Termination::new();
        let broadcaster = Broadcaster::new("peer".into(), receivers, termination.clone());
        let writer = NullWriter::new();

        for nonce in 0..3 {
            let tx = Transaction {
                account_nonce: nonce,
                ..Transaction::default()
            };
            queues.txs.send(Arc::new(tx)).await.unwrap();
        }
        let handle = tokio::spawn(broadcaster.run(writer.clone()));

        while writer.sent_count() < 3 {
            tokio::task::yield_now().await;
        }
        termination.trigger();
        handle.await.unwrap().unwrap();

        let nonces: Vec<u32> = writer
            .sent()
            .iter()
            .map(|m| m.decode::<Transaction>().unwrap().account_nonce)
            .collect();
        assert_eq!(nonces, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn stalled_write_is_abandoned_on_termination() {
        let (queues, receivers) = outbound_queues(&QueueCapacities::default());
        let termination = Termination::new();
        let broadcaster = Broadcaster::new("peer".into(), receivers, termination.clone());

        queues.txs.send(Arc::new(Transaction::default())).await.unwrap();
        let handle = tokio::spawn(broadcaster.run(NullWriter::stalled()));
        tokio::task::yield_now().await;

        termination.trigger();
        assert!(handle.await.unwrap().is_ok());
    }
}
