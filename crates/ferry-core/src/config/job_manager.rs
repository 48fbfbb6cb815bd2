//! Job manager client configuration.

use serde::{Deserialize, Serialize};

/// Connection settings for the external job manager.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobManagerConfig {
    /// Base URL of the job manager REST API.
    pub url: String,
    /// Per-request timeout in milliseconds.
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,
}

fn default_timeout() -> u64 {
    30_000
}
