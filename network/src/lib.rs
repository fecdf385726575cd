//! Per-peer session layer for the Strand gossip network.
//!
//! A [`PeerSession`] tracks what one remote peer already knows, queues every
//! outbound message by kind, and hands them to a single [`Broadcaster`] task
//! that owns the connection's write side. The session becomes usable once
//! its handshake has verified that both sides run the same chain.

pub mod broadcaster;
pub mod config;
pub mod error;
pub mod known_cache;
pub mod queues;
pub mod session;

pub use broadcaster::Broadcaster;
pub use config::{KnownLimits, QueueCapacities, SessionConfig};
pub use error::SessionError;
pub use known_cache::KnownCache;
pub use queues::Request;
pub use session::PeerSession;
