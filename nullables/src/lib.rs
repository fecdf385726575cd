//! Nullable infrastructure for deterministic testing.
//!
//! Inspired by the "A-frame architecture" pattern from RsNano.
//! The session layer only touches the outside world through the
//! `MsgWriter`/`MsgReader` transport traits. This crate provides
//! test-friendly implementations that:
//! - Record what was written instead of sending it
//! - Replay scripted inbound messages
//! - Fail or stall on demand
//!
//! Usage: hand these to a session or broadcaster in place of a real
//! connection, keep a clone of the writer, and assert on what it recorded.

pub mod network;

pub use network::{NullReader, NullWriter};
