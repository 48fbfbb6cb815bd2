//! Task model as returned by the job manager.

use serde::{Deserialize, Serialize};

/// Lifecycle status shared by tasks and jobs on the job manager side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationStatus {
    Pending,
    #[serde(rename = "In-Progress")]
    InProgress,
    Completed,
    Failed,
    Expired,
    Aborted,
}

/// Worker-specific task parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskParameters {
    /// Relative paths to copy from source to destination.
    #[serde(default)]
    pub paths: Vec<String>,
}

/// A unit of work claimed from the job manager.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Task identifier.
    pub id: String,
    /// Owning job. Always present on a well-formed claimed task.
    #[serde(default)]
    pub job_id: Option<String>,
    /// Task type as registered in the job manager.
    #[serde(default, rename = "type")]
    pub task_type: Option<String>,
    #[serde(default)]
    pub status: Option<OperationStatus>,
    /// Number of previous claims of this task.
    #[serde(default)]
    pub attempts: Option<u32>,
    #[serde(default)]
    pub parameters: TaskParameters,
}

impl Task {
    /// The relative paths this task transfers.
    pub fn paths(&self) -> &[String] {
        &self.parameters.paths
    }
}

/// Body of a task update request. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTaskBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OperationStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<u32>,
}

impl UpdateTaskBody {
    /// Mark a task as completed at 100%.
    pub fn completed() -> Self {
        Self {
            status: Some(OperationStatus::Completed),
            percentage: Some(100),
        }
    }
}
