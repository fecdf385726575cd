//! Network identifier.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies which chain deployment a node belongs to.
///
/// Peers on different networks refuse each other during the handshake even
/// when their genesis blocks happen to match.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkId(pub u32);

impl NetworkId {
    /// The production network.
    pub const MAIN: Self = Self(1);
    /// The public test network.
    pub const TEST: Self = Self(2);
    /// Local development network.
    pub const DEV: Self = Self(3);

    /// Human-readable name, if this is one of the well-known networks.
    pub fn as_str(&self) -> Option<&'static str> {
        match *self {
            Self::MAIN => Some("main"),
            Self::TEST => Some("test"),
            Self::DEV => Some("dev"),
            _ => None,
        }
    }
}

impl fmt::Debug for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_str() {
            Some(name) => write!(f, "NetworkId({name})"),
            None => write!(f, "NetworkId({})", self.0),
        }
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
