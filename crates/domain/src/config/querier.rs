use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Query execution limits
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QuerierConfig {
    /// Maximum exchanges in flight per destination (default: 8)
    #[serde(default = "default_per_key_capacity")]
    pub per_key_capacity: u16,

    /// Deadline for one lookup in milliseconds (default: 5000)
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,
}

impl QuerierConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }
}

impl Default for QuerierConfig {
    fn default() -> Self {
        Self {
            per_key_capacity: default_per_key_capacity(),
            query_timeout_ms: default_query_timeout_ms(),
        }
    }
}

fn default_per_key_capacity() -> u16 {
    8
}

fn default_query_timeout_ms() -> u64 {
    5000
}
