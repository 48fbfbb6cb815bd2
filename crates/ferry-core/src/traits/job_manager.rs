//! Job manager protocol primitives.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::{Job, Task, UpdateJobBody, UpdateTaskBody};

/// The raw request/response operations exposed by the job manager.
///
/// Implementations perform exactly one remote round trip per call and
/// never retry. Task/job semantics (completion, progress) are layered on
/// top by the worker's `JobQueue`.
#[async_trait]
pub trait JobManagerApi: Send + Sync + std::fmt::Debug + 'static {
    /// Claim the next pending task of the given type. `None` when the
    /// queue has nothing to hand out.
    async fn consume_task(&self, job_type: &str, task_type: &str) -> AppResult<Option<Task>>;

    /// Fetch a job by ID. `None` when the job does not exist.
    async fn get_job(&self, job_id: &str) -> AppResult<Option<Job>>;

    /// Update a task belonging to `job_id`.
    async fn update_task(&self, job_id: &str, task_id: &str, body: &UpdateTaskBody)
    -> AppResult<()>;

    /// Update a job.
    async fn update_job(&self, job_id: &str, body: &UpdateJobBody) -> AppResult<()>;
}
