//! Job model and progress arithmetic.

use serde::{Deserialize, Serialize};

use super::task::OperationStatus;
use crate::error::AppError;

/// The aggregate that owns one or more tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    #[serde(default, rename = "type")]
    pub job_type: Option<String>,
    #[serde(default)]
    pub status: Option<OperationStatus>,
    #[serde(default)]
    pub percentage: Option<u32>,
    /// Total number of tasks belonging to the job.
    pub task_count: u32,
    /// Tasks finished so far, maintained by the job manager.
    pub completed_tasks: u32,
}

/// Progress derived from a job's task counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobProgress {
    /// `floor(completed_tasks / task_count * 100)`.
    pub percentage: u32,
    /// Every task of the job has completed.
    pub is_completed: bool,
}

impl Job {
    /// Compute the job's progress from its counters.
    ///
    /// A job with no tasks or with more completed tasks than it owns cannot
    /// have produced the task being reported, so both are rejected.
    pub fn progress(&self) -> Result<JobProgress, AppError> {
        if self.task_count == 0 {
            return Err(AppError::invariant_violation(format!(
                "Job {} reports zero tasks",
                self.id
            )));
        }
        if self.completed_tasks > self.task_count {
            return Err(AppError::invariant_violation(format!(
                "Job {} reports {} completed tasks out of {}",
                self.id, self.completed_tasks, self.task_count
            )));
        }

        let percentage = (u64::from(self.completed_tasks) * 100 / u64::from(self.task_count)) as u32;
        Ok(JobProgress {
            percentage,
            is_completed: self.completed_tasks == self.task_count,
        })
    }
}

/// Body of a job update request. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateJobBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OperationStatus>,
}

impl From<JobProgress> for UpdateJobBody {
    fn from(progress: JobProgress) -> Self {
        Self {
            percentage: Some(progress.percentage),
            status: progress.is_completed.then_some(OperationStatus::Completed),
        }
    }
}
