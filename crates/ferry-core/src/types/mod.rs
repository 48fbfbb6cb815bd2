//! Domain types exchanged with the job manager.

pub mod job;
pub mod task;

pub use job::{Job, JobProgress, UpdateJobBody};
pub use task::{OperationStatus, Task, TaskParameters, UpdateTaskBody};
