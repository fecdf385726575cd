//! Transaction record.

use serde::{Deserialize, Serialize};

use crate::{Hash, PublicKey};

/// A signed transaction as gossiped between peers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub account_nonce: u32,
    pub epoch: u16,
    pub to: Option<PublicKey>,
    pub amount: u128,
    pub payload: Vec<u8>,
    pub signature: Vec<u8>,
}

impl Transaction {
    pub fn hash(&self) -> Hash {
        Hash::of_record(self)
    }
}
