//! Node identity keys.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 32-byte node public key.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKey(pub [u8; 32]);

impl PublicKey {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Short display id: the first eight key bytes, hex-encoded.
    ///
    /// Used as the log key of a peer session. Never compared for equality.
    pub fn short_id(&self) -> String {
        hex::encode(&self.0[..8])
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.short_id())
    }
}
