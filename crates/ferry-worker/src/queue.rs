//! Job queue wrapper adding task completion and job progress semantics.

use std::sync::Arc;

use ferry_core::error::{AppError, ErrorKind};
use ferry_core::result::AppResult;
use ferry_core::traits::job_manager::JobManagerApi;
use ferry_core::types::{Task, UpdateJobBody, UpdateTaskBody};

/// Claims tasks of one job/task type and reports their outcome.
///
/// Every method is a single best-effort round trip; any failure of the
/// underlying primitives surfaces as [`ErrorKind::QueueUnavailable`].
#[derive(Debug, Clone)]
pub struct JobQueue {
    api: Arc<dyn JobManagerApi>,
    job_type: String,
    task_type: String,
}

/// Rewrap a primitive failure as `QueueUnavailable`, keeping its status.
fn unavailable(message: impl Into<String>, err: AppError) -> AppError {
    let status = err.status;
    let mut wrapped = AppError::with_source(ErrorKind::QueueUnavailable, message, err);
    wrapped.status = status;
    wrapped
}

impl JobQueue {
    pub fn new(
        api: Arc<dyn JobManagerApi>,
        job_type: impl Into<String>,
        task_type: impl Into<String>,
    ) -> Self {
        Self {
            api,
            job_type: job_type.into(),
            task_type: task_type.into(),
        }
    }

    /// Claim the next available task. `None` is the normal idle condition.
    pub async fn start_task(&self) -> AppResult<Option<Task>> {
        self.api
            .consume_task(&self.job_type, &self.task_type)
            .await
            .map_err(|e| {
                unavailable(
                    format!(
                        "Problem with job manager, didn't get a {}/{} task to work on",
                        self.job_type, self.task_type
                    ),
                    e,
                )
            })
    }

    /// Mark a task as completed at 100%.
    ///
    /// A task without a job ID is rejected before anything is sent.
    pub async fn complete_task(&self, task: &Task) -> AppResult<()> {
        let job_id = task.job_id.as_deref().ok_or_else(|| {
            AppError::invariant_violation(format!("Task {} doesn't contain a job ID", task.id))
        })?;

        self.api
            .update_task(job_id, &task.id, &UpdateTaskBody::completed())
            .await
            .map_err(|e| {
                unavailable(
                    format!("Problem with job manager, didn't update task {} to completed", task.id),
                    e,
                )
            })?;

        tracing::debug!(task_id = %task.id, job_id, "Task marked completed");
        Ok(())
    }

    /// Recompute a job's percentage and close it once every task is done.
    ///
    /// Returns whether the job is now completed.
    pub async fn progress_job(&self, job_id: Option<&str>) -> AppResult<bool> {
        let job_id =
            job_id.ok_or_else(|| AppError::invariant_violation("Cannot progress a job without ID"))?;

        let job = self
            .api
            .get_job(job_id)
            .await
            .map_err(|e| unavailable(format!("Problem with job manager, didn't get job {job_id}"), e))?
            .ok_or_else(|| {
                AppError::invariant_violation(format!("Job {job_id} doesn't exist anymore"))
            })?;

        let progress = job.progress()?;
        self.api
            .update_job(job_id, &UpdateJobBody::from(progress))
            .await
            .map_err(|e| {
                unavailable(format!("Problem with job manager, didn't update job {job_id}"), e)
            })?;

        tracing::info!(
            job_id,
            percentage = progress.percentage,
            completed = progress.is_completed,
            "Job progress updated"
        );
        Ok(progress.is_completed)
    }
}
