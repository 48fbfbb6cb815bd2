//! Seams between the worker loop and its external collaborators.

pub mod job_manager;
pub mod storage;

pub use job_manager::JobManagerApi;
pub use storage::{ByteStream, FileData, StorageProvider};
