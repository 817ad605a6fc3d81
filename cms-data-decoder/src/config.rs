//! Decoder configuration types
//!
//! The decode pipeline itself has no tunables: every integrity check is
//! mandatory. The configuration only bounds how much memory a single decode
//! may claim based on what a header declares.

use serde::{Deserialize, Serialize};

/// Default upper bound for inflated payload sizes (256 MiB)
pub const DEFAULT_MAX_PAYLOAD_LEN: u64 = 256 * 1024 * 1024;

/// Configuration for the container decoder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Largest inflated payload a compressed container may declare
    #[serde(default = "default_max_payload_len")]
    pub max_payload_len: u64,
}

fn default_max_payload_len() -> u64 {
    DEFAULT_MAX_PAYLOAD_LEN
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_payload_len: DEFAULT_MAX_PAYLOAD_LEN,
        }
    }
}

impl DecoderConfig {
    /// Create a new decoder configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the payload size limit
    pub fn with_max_payload_len(mut self, limit: u64) -> Self {
        self.max_payload_len = limit;
        self
    }

    /// Check whether a declared payload size is within the limit
    pub fn allows_payload(&self, declared: u64) -> bool {
        declared <= self.max_payload_len
    }
}
