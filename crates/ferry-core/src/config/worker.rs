//! Worker loop configuration.

use serde::{Deserialize, Serialize};

use super::storage::ProviderKind;

/// Polling and transfer settings for the worker loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Job type this worker claims tasks for.
    pub job_type: String,
    /// Task type this worker claims.
    pub task_type: String,
    /// Milliseconds to sleep after an empty poll.
    #[serde(default = "default_wait_time")]
    pub wait_time_ms: u64,
    /// Maximum number of file transfers in flight for one task.
    #[serde(default = "default_transfer_concurrency")]
    pub transfer_concurrency: usize,
    /// Upper bound for a single file transfer. Unset means no limit.
    #[serde(default)]
    pub transfer_timeout_ms: Option<u64>,
    /// Which backend to read from and which to write to.
    pub provider: ProviderSelection,
}

/// Independent backend selection for both sides of a transfer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProviderSelection {
    pub source: ProviderKind,
    pub destination: ProviderKind,
}

impl ProviderSelection {
    /// Whether either side uses `kind`.
    pub fn uses(&self, kind: ProviderKind) -> bool {
        self.source == kind || self.destination == kind
    }
}

fn default_wait_time() -> u64 {
    1000
}

fn default_transfer_concurrency() -> usize {
    8
}
