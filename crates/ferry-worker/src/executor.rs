//! Task executor: copies every path of a task from source to destination.

use std::time::Duration;

use futures::stream::{self, StreamExt};

use ferry_core::error::AppError;
use ferry_core::result::AppResult;
use ferry_core::types::Task;
use ferry_storage::CrossStorageTransfer;

/// What a successful task execution moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransferSummary {
    pub files: usize,
    pub bytes: u64,
}

/// Runs the file transfers of one task.
///
/// Transfers run concurrently (bounded by `concurrency`) and are always
/// joined: the task only succeeds when every file has been written.
#[derive(Debug, Clone)]
pub struct TaskExecutor {
    transfer: CrossStorageTransfer,
    concurrency: usize,
    timeout: Option<Duration>,
}

impl TaskExecutor {
    pub fn new(transfer: CrossStorageTransfer, concurrency: usize) -> Self {
        Self {
            transfer,
            concurrency: concurrency.max(1),
            timeout: None,
        }
    }

    /// Bound each single file transfer.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Transfer all files of `task`.
    ///
    /// Waits for every transfer to finish, successful or not. If any failed,
    /// returns one error listing each failed path, with the kind and status
    /// of the first failure in task order.
    pub async fn execute(&self, task: &Task) -> AppResult<TransferSummary> {
        let paths = task.paths();

        let mut results: Vec<(usize, AppResult<u64>)> = stream::iter(0..paths.len())
            .map(|index| async move { (index, self.transfer_one(&paths[index]).await) })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;
        results.sort_by_key(|(index, _)| *index);

        let mut summary = TransferSummary::default();
        let mut failures = Vec::new();
        for (index, result) in results {
            let path = &paths[index];
            match result {
                Ok(bytes) => {
                    summary.files += 1;
                    summary.bytes += bytes;
                }
                Err(e) => {
                    tracing::error!(task_id = %task.id, path, error = %e, "File transfer failed");
                    failures.push((path, e));
                }
            }
        }

        match failures.first() {
            None => Ok(summary),
            Some((_, first)) => {
                let detail = failures
                    .iter()
                    .map(|(path, e)| format!("{path} ({e})"))
                    .collect::<Vec<_>>()
                    .join("; ");
                let mut error = AppError::new(
                    first.kind,
                    format!(
                        "Task {}: {} of {} file transfers failed: {detail}",
                        task.id,
                        failures.len(),
                        paths.len()
                    ),
                );
                error.status = first.status;
                Err(error)
            }
        }
    }

    async fn transfer_one(&self, path: &str) -> AppResult<u64> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.transfer.transfer(path))
                .await
                .map_err(|_| {
                    AppError::timeout(format!(
                        "Transfer of {path} did not finish within {}ms",
                        limit.as_millis()
                    ))
                })?,
            None => self.transfer.transfer(path).await,
        }
    }
}
