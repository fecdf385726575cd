//! Session configuration with TOML file support.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::known_cache::{MAX_KNOWN_BLOCKS, MAX_KNOWN_PROOFS, MAX_KNOWN_TXS, MAX_KNOWN_VOTES};
use crate::SessionError;

/// Limits and deadlines for every peer session a node opens.
///
/// Can be loaded from a TOML file via [`SessionConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). Missing keys take the defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Deadline for the whole handshake exchange.
    #[serde(default = "default_handshake_timeout_secs")]
    pub handshake_timeout_secs: u64,

    /// Known-item cache sizes.
    #[serde(default)]
    pub known: KnownLimits,

    /// Outbound queue capacities.
    #[serde(default)]
    pub queues: QueueCapacities,
}

/// Per-kind limits of the known-item caches.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownLimits {
    #[serde(default = "default_known_blocks")]
    pub blocks: usize,
    #[serde(default = "default_known_txs")]
    pub txs: usize,
    #[serde(default = "default_known_proofs")]
    pub proofs: usize,
    #[serde(default = "default_known_votes")]
    pub votes: usize,
}

/// Per-kind capacities of the outbound queues.
///
/// A full queue suspends the sender until the broadcaster drains it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueCapacities {
    #[serde(default = "default_small_queue")]
    pub block_ranges: usize,
    #[serde(default = "default_small_queue")]
    pub proofs: usize,
    #[serde(default = "default_small_queue")]
    pub proposals: usize,
    #[serde(default = "default_large_queue")]
    pub votes: usize,
    #[serde(default = "default_large_queue")]
    pub txs: usize,
    #[serde(default = "default_request_queue")]
    pub requests: usize,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_handshake_timeout_secs() -> u64 {
    strand_protocol::HANDSHAKE_TIMEOUT.as_secs()
}

fn default_known_blocks() -> usize {
    MAX_KNOWN_BLOCKS
}

fn default_known_txs() -> usize {
    MAX_KNOWN_TXS
}

fn default_known_proofs() -> usize {
    MAX_KNOWN_PROOFS
}

fn default_known_votes() -> usize {
    MAX_KNOWN_VOTES
}

fn default_small_queue() -> usize {
    10
}

fn default_large_queue() -> usize {
    100
}

fn default_request_queue() -> usize {
    20
}

// ── Impl ───────────────────────────────────────────────────────────────

impl SessionConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, SessionError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| SessionError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, SessionError> {
        let config: Self = toml::from_str(s).map_err(|e| SessionError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("SessionConfig is always serializable to TOML")
    }

    /// Reject settings a session cannot run with.
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.handshake_timeout_secs == 0 {
            return Err(SessionError::Config(
                "handshake_timeout_secs must be positive".into(),
            ));
        }
        let known = [
            ("known.blocks", self.known.blocks),
            ("known.txs", self.known.txs),
            ("known.proofs", self.known.proofs),
            ("known.votes", self.known.votes),
        ];
        let queues = [
            ("queues.block_ranges", self.queues.block_ranges),
            ("queues.proofs", self.queues.proofs),
            ("queues.proposals", self.queues.proposals),
            ("queues.votes", self.queues.votes),
            ("queues.txs", self.queues.txs),
            ("queues.requests", self.queues.requests),
        ];
        for (name, value) in known.into_iter().chain(queues) {
            if value == 0 {
                return Err(SessionError::Config(format!("{name} must be positive")));
            }
        }
        Ok(())
    }

    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_secs(self.handshake_timeout_secs)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            handshake_timeout_secs: default_handshake_timeout_secs(),
            known: KnownLimits::default(),
            queues: QueueCapacities::default(),
        }
    }
}

impl Default for KnownLimits {
    fn default() -> Self {
        Self {
            blocks: default_known_blocks(),
            txs: default_known_txs(),
            proofs: default_known_proofs(),
            votes: default_known_votes(),
        }
    }
}

impl Default for QueueCapacities {
    fn default() -> Self {
        Self {
            block_ranges: default_small_queue(),
            proofs: default_small_queue(),
            proposals: default_small_queue(),
            votes: default_large_queue(),
            txs: default_large_queue(),
            requests: default_request_queue(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = SessionConfig::default();
        let toml_str = config.to_toml_string();
        let parsed = SessionConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = SessionConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.handshake_timeout(), Duration::from_secs(10));
        assert_eq!(config.known.blocks, 300);
        assert_eq!(config.known.txs, 2000);
        assert_eq!(config.known.proofs, 1000);
        assert_eq!(config.known.votes, 100_000);
        assert_eq!(config.queues.block_ranges, 10);
        assert_eq!(config.queues.votes, 100);
        assert_eq!(config.queues.requests, 20);
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            handshake_timeout_secs = 3

            [queues]
            txs = 500
        "#;
        let config = SessionConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.handshake_timeout_secs, 3);
        assert_eq!(config.queues.txs, 500);
        assert_eq!(config.queues.votes, 100); // default
        assert_eq!(config.known, KnownLimits::default());
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let err = SessionConfig::from_toml_str("[queues]\nrequests = 0\n").unwrap_err();
        assert!(err.to_string().contains("queues.requests"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        assert!(SessionConfig::from_toml_str("handshake_timeout_secs = 0").is_err());
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        assert!(matches!(
            SessionConfig::from_toml_str("handshake_timeout_secs = \"soon\""),
            Err(SessionError::Config(_))
        ));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("session.toml");
        std::fs::write(&path, "[known]\nvotes = 5000\n").expect("write config");
        let config = SessionConfig::from_toml_file(path.to_str().expect("utf-8 path"))
            .expect("should load");
        assert_eq!(config.known.votes, 5000);
    }
}
