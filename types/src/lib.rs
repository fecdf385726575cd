//! Fundamental types for the Strand peer layer.
//!
//! Defines the identifiers and chain records that travel over a peer
//! session: content hashes, network ids, node keys, headers, blocks,
//! transactions and votes. Only field shapes live here; validation belongs
//! to the node.

pub mod block;
pub mod hash;
pub mod keys;
pub mod network;
pub mod transaction;
pub mod vote;

pub use block::{Block, Header};
pub use hash::Hash;
pub use keys::PublicKey;
pub use network::NetworkId;
pub use transaction::Transaction;
pub use vote::{Vote, VoteHeader};
