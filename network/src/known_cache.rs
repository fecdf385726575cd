//! Bounded set of content hashes a peer is believed to hold.
//!
//! Used to avoid sending a peer data it already has. Membership is a hint,
//! not a guarantee: once a hash is evicted the item may be sent again, which
//! costs bandwidth but never breaks the protocol.

use std::collections::{HashSet, VecDeque};

use strand_types::Hash;

/// Default limit on remembered blocks per peer.
pub const MAX_KNOWN_BLOCKS: usize = 300;
/// Default limit on remembered transactions per peer.
pub const MAX_KNOWN_TXS: usize = 2_000;
/// Default limit on remembered proposer proofs per peer.
pub const MAX_KNOWN_PROOFS: usize = 1_000;
/// Default limit on remembered votes per peer.
pub const MAX_KNOWN_VOTES: usize = 100_000;

/// Rolling hash set with FIFO eviction.
///
/// Holds at most `capacity` hashes. Marking a new hash while full evicts the
/// oldest one first. Re-marking a present hash does not refresh its age.
pub struct KnownCache {
    capacity: usize,
    hashes: HashSet<Hash>,
    order: VecDeque<Hash>,
}

impl KnownCache {
    /// Create an empty cache. A zero capacity is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        // The vote cache is large; let it grow instead of reserving up front.
        let reserve = capacity.min(4_096);
        Self {
            capacity,
            hashes: HashSet::with_capacity(reserve),
            order: VecDeque::with_capacity(reserve),
        }
    }

    /// Whether `hash` is currently remembered.
    pub fn contains(&self, hash: &Hash) -> bool {
        self.hashes.contains(hash)
    }

    /// Remember `hash`, evicting the oldest entry if the cache is full.
    ///
    /// Returns `true` if the hash was not already present.
    pub fn mark(&mut self, hash: Hash) -> bool {
        if self.hashes.contains(&hash) {
            return false;
        }
        if self.hashes.len() >= self.capacity {
            if let Some(old) = self.order.pop_front() {
                self.hashes.remove(&old);
            }
        }
        self.hashes.insert(hash);
        self.order.push_back(hash);
        true
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }
}
