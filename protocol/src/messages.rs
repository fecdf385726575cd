//! Payload records exchanged between peers.
//!
//! Blocks, headers, transactions and votes are defined in `strand-types`;
//! the records here exist only on the wire.

use serde::{Deserialize, Serialize};
use strand_types::{Block, Hash, NetworkId, PublicKey};

/// Exchanged once in each direction when a session starts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandshakeData {
    pub network_id: NetworkId,
    pub height: u64,
    pub genesis_block: Hash,
}

/// Proof that the sender may propose the next block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposeProof {
    /// Content hash; keys the proof cache.
    pub hash: Hash,
    pub proof: Vec<u8>,
    pub pub_key: PublicKey,
    pub round: u64,
}

/// A batch of consecutive blocks answering a `GetBlocksRange` request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRange {
    pub batch_id: u32,
    pub blocks: Vec<Block>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetBlockByHashRequest {
    pub hash: Hash,
}

/// Ask for blocks `from..=to`, tagged so the answer can be matched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetBlocksRangeRequest {
    pub batch_id: u32,
    pub from: u64,
    pub to: u64,
}
