//! Per-peer session state and the send API used by sync and gossip logic.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use strand_protocol::{
    perform_handshake, BlockRange, GetBlockByHashRequest, GetBlocksRangeRequest, HandshakeData,
    HandshakeError, MessageCode, MsgReader, MsgWriter, ProposeProof,
};
use strand_types::{Block, Hash, Header, PublicKey, Transaction, Vote};
use tokio::sync::mpsc;

use crate::broadcaster::Termination;
use crate::queues::{outbound_queues, OutboundQueues};
use crate::{Broadcaster, KnownCache, Request, SessionConfig, SessionError};

// Handshake progress.
const IDLE: u8 = 0;
const IN_PROGRESS: u8 = 1;
const READY: u8 = 2;

/// One live connection to one remote peer.
///
/// Every `send_*`/`request_*` call marks the item as known to the peer and
/// then waits for room on that kind's queue. The paired [`Broadcaster`] is
/// the only thing that ever writes to the connection.
///
/// Shared across tasks behind an `Arc`; all methods take `&self`.
pub struct PeerSession {
    id: String,
    known_height: AtomicU64,
    state: AtomicU8,
    known_blocks: Mutex<KnownCache>,
    known_txs: Mutex<KnownCache>,
    known_votes: Mutex<KnownCache>,
    known_proofs: Mutex<KnownCache>,
    queues: OutboundQueues,
    termination: Termination,
    handshake_timeout: Duration,
}

impl PeerSession {
    /// Create a session for `peer` and the broadcaster that will drain it.
    pub fn new(peer: &PublicKey, config: &SessionConfig) -> (Self, Broadcaster) {
        let id = peer.short_id();
        let (queues, receivers) = outbound_queues(&config.queues);
        let termination = Termination::new();
        let broadcaster = Broadcaster::new(id.clone(), receivers, termination.clone());

        let session = Self {
            id,
            known_height: AtomicU64::new(0),
            state: AtomicU8::new(IDLE),
            known_blocks: Mutex::new(KnownCache::new(config.known.blocks)),
            known_txs: Mutex::new(KnownCache::new(config.known.txs)),
            known_votes: Mutex::new(KnownCache::new(config.known.votes)),
            known_proofs: Mutex::new(KnownCache::new(config.known.proofs)),
            queues,
            termination,
            handshake_timeout: config.handshake_timeout(),
        };
        (session, broadcaster)
    }

    /// Short display id of the peer (hex of the first 8 key bytes).
    pub fn id(&self) -> &str {
        &self.id
    }

    // ── Handshake ──────────────────────────────────────────────────────

    /// Exchange handshake records with the peer over the given connection
    /// halves.
    ///
    /// On success the peer's announced height becomes the session's known
    /// height and the session is ready. On failure the session must be
    /// discarded.
    ///
    /// Only one call runs the exchange: any call made while another is in
    /// flight, or after one succeeded, fails with
    /// [`HandshakeError::AlreadyCompleted`] without touching the connection.
    pub async fn handshake<W, R>(
        &self,
        writer: &mut W,
        reader: &mut R,
        local: &HandshakeData,
    ) -> Result<(), HandshakeError>
    where
        W: MsgWriter,
        R: MsgReader,
    {
        if self
            .state
            .compare_exchange(IDLE, IN_PROGRESS, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(HandshakeError::AlreadyCompleted);
        }
        // Releases the claim on failure or if this future is dropped.
        let claim = HandshakeClaim(&self.state);
        match perform_handshake(writer, reader, local, self.handshake_timeout).await {
            Ok(remote) => {
                self.set_height(remote.height);
                std::mem::forget(claim);
                self.state.store(READY, Ordering::Release);
                tracing::debug!(peer = %self.id, height = remote.height, "handshake verified");
                Ok(())
            }
            Err(e) => {
                tracing::debug!(peer = %self.id, error = %e, "handshake failed");
                Err(e)
            }
        }
    }

    /// Whether the handshake has completed successfully.
    pub fn is_ready(&self) -> bool {
        self.state.load(Ordering::Acquire) == READY
    }

    // ── Height ─────────────────────────────────────────────────────────

    /// Last chain height the peer announced.
    pub fn known_height(&self) -> u64 {
        self.known_height.load(Ordering::Acquire)
    }

    /// Raise the known height. Lower or equal values are ignored.
    pub fn set_height(&self, height: u64) {
        self.known_height.fetch_max(height, Ordering::AcqRel);
    }

    // ── Known items ────────────────────────────────────────────────────
    //
    // Senders mark what they push; the router marks what it receives.

    /// Record that the peer has the block with this hash.
    pub fn mark_block(&self, hash: Hash) {
        lock(&self.known_blocks).mark(hash);
    }

    /// Record that the peer has the transaction with this hash.
    pub fn mark_tx(&self, hash: Hash) {
        lock(&self.known_txs).mark(hash);
    }

    /// Record that the peer has the vote with this hash.
    pub fn mark_vote(&self, hash: Hash) {
        lock(&self.known_votes).mark(hash);
    }

    /// Record that the peer has the proposer proof with this hash.
    pub fn mark_proof(&self, hash: Hash) {
        lock(&self.known_proofs).mark(hash);
    }

    /// Whether the peer is believed to have this block. Advisory only.
    pub fn knows_block(&self, hash: &Hash) -> bool {
        lock(&self.known_blocks).contains(hash)
    }

    /// Whether the peer is believed to have this transaction.
    pub fn knows_tx(&self, hash: &Hash) -> bool {
        lock(&self.known_txs).contains(hash)
    }

    /// Whether the peer is believed to have this vote.
    pub fn knows_vote(&self, hash: &Hash) -> bool {
        lock(&self.known_votes).contains(hash)
    }

    /// Whether the peer is believed to have this proposer proof.
    pub fn knows_proof(&self, hash: &Hash) -> bool {
        lock(&self.known_proofs).contains(hash)
    }

    // ── Send API ───────────────────────────────────────────────────────

    pub async fn send_tx_async(&self, tx: Arc<Transaction>) -> Result<(), SessionError> {
        self.mark_tx(tx.hash());
        self.enqueue(&self.queues.txs, tx).await
    }

    pub async fn send_vote_async(&self, vote: Arc<Vote>) -> Result<(), SessionError> {
        self.mark_vote(vote.hash());
        self.enqueue(&self.queues.votes, vote).await
    }

    pub async fn send_proof_async(&self, proof: Arc<ProposeProof>) -> Result<(), SessionError> {
        self.mark_proof(proof.hash);
        self.enqueue(&self.queues.proofs, proof).await
    }

    pub async fn propose_block_async(&self, block: Arc<Block>) -> Result<(), SessionError> {
        self.mark_block(block.hash());
        self.enqueue(&self.queues.proposals, block).await
    }

    /// Block ranges answer explicit requests and are not deduplicated.
    pub async fn send_block_range_async(&self, range: Arc<BlockRange>) -> Result<(), SessionError> {
        self.enqueue(&self.queues.block_ranges, range).await
    }

    /// Push a header under `code` (e.g. [`MessageCode::Head`]).
    pub async fn send_header(&self, header: &Header, code: MessageCode) -> Result<(), SessionError> {
        self.send_request(Request::new(code, header)?).await
    }

    pub async fn request_last_block(&self) -> Result<(), SessionError> {
        self.send_request(Request::new(MessageCode::GetHead, &())?).await
    }

    pub async fn request_block_by_hash(&self, hash: Hash) -> Result<(), SessionError> {
        let request = GetBlockByHashRequest { hash };
        self.send_request(Request::new(MessageCode::GetBlockByHash, &request)?)
            .await
    }

    pub async fn request_blocks_range(
        &self,
        batch_id: u32,
        from: u64,
        to: u64,
    ) -> Result<(), SessionError> {
        let request = GetBlocksRangeRequest { batch_id, from, to };
        self.send_request(Request::new(MessageCode::GetBlocksRange, &request)?)
            .await
    }

    /// Queue an arbitrary pre-encoded request on the shared request queue.
    pub async fn send_request(&self, request: Request) -> Result<(), SessionError> {
        self.enqueue(&self.queues.requests, request).await
    }

    async fn enqueue<T>(&self, queue: &mpsc::Sender<T>, item: T) -> Result<(), SessionError> {
        queue.send(item).await.map_err(|_| {
            tracing::trace!(peer = %self.id, "dropping message for closed session");
            SessionError::Closed
        })
    }

    // ── Termination ────────────────────────────────────────────────────

    /// Ask the broadcaster to stop. Queued messages are discarded.
    pub fn terminate(&self) {
        if self.termination.trigger() {
            tracing::debug!(peer = %self.id, "session terminated");
        }
    }

    /// Whether termination was requested or the broadcaster has exited.
    pub fn is_terminated(&self) -> bool {
        self.termination.is_triggered()
    }

    /// Wait until the session terminates.
    pub async fn terminated(&self) {
        self.termination.wait().await
    }
}

impl Drop for PeerSession {
    fn drop(&mut self) {
        self.termination.trigger();
    }
}

struct HandshakeClaim<'a>(&'a AtomicU8);

impl Drop for HandshakeClaim<'_> {
    fn drop(&mut self) {
        self.0.store(IDLE, Ordering::Release);
    }
}

fn lock(cache: &Mutex<KnownCache>) -> MutexGuard<'_, KnownCache> {
    cache.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strand_nullables::{NullReader, NullWriter};
    use strand_protocol::Message;
    use strand_types::{NetworkId, VoteHeader};

    fn session() -> (PeerSession, Broadcaster) {
        PeerSession::new(&PublicKey([7u8; 32]), &SessionConfig::default())
    }

    fn tx(nonce: u32) -> Arc<Transaction> {
        Arc::new(Transaction {
            account_nonce: nonce,
            ..Transaction::default()
        })
    }

    fn local_status() -> HandshakeData {
        HandshakeData {
            network_id: NetworkId::MAIN,
            height: 1,
            genesis_block: Hash::of(b"genesis"),
        }
    }

    fn peer_reply(height: u64) -> NullReader {
        let remote = HandshakeData {
            height,
            ..local_status()
        };
        NullReader::scripted(vec![Message::new(MessageCode::Handshake, &remote).unwrap()])
    }

    #[test]
    fn id_is_short_key() {
        let (session, broadcaster) = session();
        assert_eq!(session.id(), "0707070707070707");
        assert_eq!(broadcaster.peer_id(), session.id());
    }

    #[test]
    fn height_only_increases() {
        let (session, _b) = session();
        assert_eq!(session.known_height(), 0);
        session.set_height(10);
        assert_eq!(session.known_height(), 10);
        session.set_height(4);
        assert_eq!(session.known_height(), 10);
        session.set_height(10);
        assert_eq!(session.known_height(), 10);
        session.set_height(11);
        assert_eq!(session.known_height(), 11);
    }

    #[test]
    fn caches_are_per_kind() {
        let (session, _b) = session();
        let hash = Hash::of(b"item");
        session.mark_vote(hash);
        assert!(session.knows_vote(&hash));
        assert!(!session.knows_block(&hash));
        assert!(!session.knows_tx(&hash));
        assert!(!session.knows_proof(&hash));
    }

    #[test]
    fn configured_limits_apply() {
        let mut config = SessionConfig::default();
        config.known.blocks = 2;
        let (session, _b) = PeerSession::new(&PublicKey::default(), &config);
        let hashes: Vec<Hash> = (0u8..3).map(|i| Hash::of(&[i])).collect();
        for hash in &hashes {
            session.mark_block(*hash);
        }
        assert!(!session.knows_block(&hashes[0]));
        assert!(session.knows_block(&hashes[2]));
    }

    #[tokio::test]
    async fn duplicate_tx_is_marked_and_enqueued_twice() {
        let (session, mut broadcaster) = session();
        let tx = tx(1);
        session.send_tx_async(Arc::clone(&tx)).await.unwrap();
        assert!(session.knows_tx(&tx.hash()));
        session.send_tx_async(Arc::clone(&tx)).await.unwrap();

        assert!(broadcaster.queues.txs.try_recv().is_ok());
        assert!(broadcaster.queues.txs.try_recv().is_ok());
        assert!(broadcaster.queues.txs.try_recv().is_err());
    }

    #[tokio::test]
    async fn each_kind_marks_its_own_cache() {
        let (session, _b) = session();
        let vote = Arc::new(Vote {
            header: VoteHeader {
                round: 3,
                ..VoteHeader::default()
            },
            signature: vec![1, 2],
        });
        let proof = Arc::new(ProposeProof {
            hash: Hash::of(b"proof"),
            proof: vec![9],
            pub_key: PublicKey::default(),
            round: 3,
        });
        let block = Arc::new(Block {
            header: Header {
                parent: Hash::ZERO,
                height: 3,
                time: 0,
                tx_root: Hash::ZERO,
                proposer: PublicKey::default(),
            },
            body: Vec::new(),
        });

        session.send_vote_async(Arc::clone(&vote)).await.unwrap();
        session.send_proof_async(Arc::clone(&proof)).await.unwrap();
        session.propose_block_async(Arc::clone(&block)).await.unwrap();

        assert!(session.knows_vote(&vote.hash()));
        assert!(session.knows_proof(&proof.hash));
        assert!(session.knows_block(&block.hash()));
    }

    #[tokio::test]
    async fn requests_share_one_queue() {
        let (session, mut broadcaster) = session();
        session.request_last_block().await.unwrap();
        session.request_block_by_hash(Hash::of(b"b")).await.unwrap();
        session.request_blocks_range(5, 10, 20).await.unwrap();

        let codes: Vec<MessageCode> = std::iter::from_fn(|| broadcaster.queues.requests.try_recv().ok())
            .map(|r| r.code)
            .collect();
        assert_eq!(
            codes,
            vec![
                MessageCode::GetHead,
                MessageCode::GetBlockByHash,
                MessageCode::GetBlocksRange
            ]
        );
    }

    #[tokio::test]
    async fn send_after_broadcaster_gone_is_closed() {
        let (session, broadcaster) = session();
        drop(broadcaster);
        let err = session.send_tx_async(tx(1)).await.unwrap_err();
        assert!(matches!(err, SessionError::Closed));
        // Marking still happened; it is advisory.
        assert!(session.knows_tx(&tx(1).hash()));
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_handshake_is_rejected_without_io() {
        let (session, _b) = session();
        let local = local_status();
        let (mut first_writer, mut second_writer) = (NullWriter::new(), NullWriter::new());
        let mut first_reader = NullReader::silent();
        let mut second_reader = peer_reply(99);

        let (first, second) = tokio::join!(
            session.handshake(&mut first_writer, &mut first_reader, &local),
            session.handshake(&mut second_writer, &mut second_reader, &local),
        );

        assert!(matches!(second, Err(HandshakeError::AlreadyCompleted)));
        assert!(matches!(first, Err(HandshakeError::Timeout(_))));
        assert_eq!(second_writer.sent_count(), 0);
        assert_eq!(session.known_height(), 0);
        assert!(!session.is_ready());
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_handshake_releases_its_claim() {
        let (session, _b) = session();
        let local = local_status();

        let abandoned = tokio::time::timeout(
            Duration::from_secs(1),
            session.handshake(&mut NullWriter::new(), &mut NullReader::silent(), &local),
        )
        .await;
        assert!(abandoned.is_err());
        assert!(!session.is_ready());

        session
            .handshake(&mut NullWriter::new(), &mut peer_reply(99), &local)
            .await
            .expect("retry after abandoned attempt");
        assert!(session.is_ready());
        assert_eq!(session.known_height(), 99);
    }

    #[test]
    fn terminate_is_irreversible() {
        let (session, _b) = session();
        assert!(!session.is_terminated());
        session.terminate();
        session.terminate();
        assert!(session.is_terminated());
    }

    #[tokio::test]
    async fn dropping_the_session_terminates() {
        let (session, broadcaster) = session();
        let term = broadcaster.termination.clone();
        drop(session);
        assert!(term.is_triggered());
    }
}
