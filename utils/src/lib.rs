//! Shared utilities for the Strand peer layer.

pub mod logging;

pub use logging::{init_logging, init_test_logging, LogFormat};
