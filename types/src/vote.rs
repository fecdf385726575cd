//! Consensus vote record.

use serde::{Deserialize, Serialize};

use crate::Hash;

/// The signed portion of a vote.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteHeader {
    pub round: u64,
    pub step: u16,
    pub parent_hash: Hash,
    pub voted_hash: Hash,
}

/// A consensus vote for a block at some round and step.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub header: VoteHeader,
    pub signature: Vec<u8>,
}

impl Vote {
    /// Covers the signature too, so equal headers from different voters
    /// stay distinct.
    pub fn hash(&self) -> Hash {
        Hash::of_record(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_changes_hash() {
        let a = Vote {
            header: VoteHeader::default(),
            signature: vec![1],
        };
        let b = Vote {
            header: VoteHeader::default(),
            signature: vec![2],
        };
        assert_ne!(a.hash(), b.hash());
    }
}
