//! Block and header records.

use serde::{Deserialize, Serialize};

use crate::{Hash, PublicKey, Transaction};

/// A block header. Its hash identifies the block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub parent: Hash,
    pub height: u64,
    /// Unix seconds.
    pub time: u64,
    pub tx_root: Hash,
    pub proposer: PublicKey,
}

impl Header {
    pub fn hash(&self) -> Hash {
        Hash::of_record(self)
    }
}

/// A full block: header plus transaction body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub header: Header,
    pub body: Vec<Transaction>,
}

impl Block {
    /// The block hash is the header hash; the body is committed via `tx_root`.
    pub fn hash(&self) -> Hash {
        self.header.hash()
    }

    pub fn height(&self) -> u64 {
        self.header.height
    }
}
