//! Worker runner: main loop that claims tasks, executes them, and reports.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time;

use ferry_core::config::WorkerConfig;
use ferry_core::error::AppError;
use ferry_core::result::AppResult;

use crate::executor::TaskExecutor;
use crate::queue::JobQueue;

/// Outcome of one pass through the loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Iteration {
    /// No task was available.
    Idle,
    /// A task was executed and reported.
    TaskCompleted {
        task_id: String,
        job_id: String,
        /// The task's job reached 100% with this task.
        job_completed: bool,
    },
}

/// Main worker runner: Idle → Executing → Reporting → Idle, forever.
#[derive(Debug)]
pub struct WorkerRunner {
    queue: Arc<JobQueue>,
    executor: Arc<TaskExecutor>,
    /// Sleep after an empty poll or a failed iteration.
    wait_time: Duration,
    worker_id: String,
}

impl WorkerRunner {
    pub fn new(
        queue: Arc<JobQueue>,
        executor: Arc<TaskExecutor>,
        config: &WorkerConfig,
        worker_id: String,
    ) -> Self {
        Self {
            queue,
            executor,
            wait_time: Duration::from_millis(config.wait_time_ms),
            worker_id,
        }
    }

    /// Run one iteration.
    ///
    /// The task is only reported as completed after every transfer has
    /// succeeded; any error leaves it un-completed on the job manager side.
    pub async fn run_once(&self) -> AppResult<Iteration> {
        let Some(task) = self.queue.start_task().await? else {
            return Ok(Iteration::Idle);
        };

        tracing::info!(
            worker_id = %self.worker_id,
            task_id = %task.id,
            job_id = task.job_id.as_deref().unwrap_or("<none>"),
            files = task.paths().len(),
            attempt = task.attempts.unwrap_or(0) + 1,
            "Claimed task"
        );

        let summary = self.executor.execute(&task).await?;
        tracing::info!(
            task_id = %task.id,
            files = summary.files,
            bytes = summary.bytes,
            "Transferred task files"
        );

        self.queue.complete_task(&task).await?;
        let job_completed = self.queue.progress_job(task.job_id.as_deref()).await?;

        let job_id = task.job_id.unwrap_or_default();
        if job_completed {
            tracing::info!(task_id = %task.id, job_id = %job_id, "Job completed");
        }

        Ok(Iteration::TaskCompleted {
            task_id: task.id,
            job_id,
            job_completed,
        })
    }

    /// Run the worker loop until the cancel signal is received.
    ///
    /// A started iteration always runs to its end; the signal is observed
    /// between iterations and during the idle wait.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        tracing::info!(
            "Worker '{}' started with wait_time={}ms",
            self.worker_id,
            self.wait_time.as_millis()
        );

        loop {
            if *cancel.borrow() {
                break;
            }

            let wait = match self.run_once().await {
                Ok(Iteration::TaskCompleted { .. }) => false,
                Ok(Iteration::Idle) => {
                    tracing::trace!("No task available");
                    true
                }
                Err(e) => {
                    tracing::error!(
                        worker_id = %self.worker_id,
                        kind = %e.kind,
                        status = ?e.status,
                        "Task iteration failed: {}",
                        e
                    );
                    true
                }
            };

            if wait {
                tokio::select! {
                    changed = cancel.changed() => {
                        // Sender gone: nobody can stop us any more, keep pacing.
                        if changed.is_err() {
                            time::sleep(self.wait_time).await;
                        }
                    }
                    _ = time::sleep(self.wait_time) => {}
                }
            }
        }

        tracing::info!("Worker '{}' shut down complete", self.worker_id);
    }

    /// Run the loop on its own task until `shutdown` resolves.
    ///
    /// On shutdown the current iteration is allowed to finish. If the loop
    /// task ends first (it panicked), that is returned as an `Internal`
    /// error so the process can exit instead of idling without a worker.
    pub async fn serve<F>(self, shutdown: F) -> AppResult<()>
    where
        F: Future<Output = ()>,
    {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let mut handle = tokio::spawn(async move { self.run(cancel_rx).await });

        tokio::select! {
            _ = shutdown => {
                tracing::info!("Shutdown signal received, finishing current iteration...");
                let _ = cancel_tx.send(true);
                handle
                    .await
                    .map_err(|e| AppError::internal(format!("Worker task panicked: {e}")))
            }
            result = &mut handle => Err(match result {
                Ok(()) => AppError::internal("Worker loop exited unexpectedly"),
                Err(e) => AppError::internal(format!("Worker task panicked: {e}")),
            }),
        }
    }
}
