//! Task processing for Ferry.
//!
//! This crate provides:
//! - An HTTP client for the job manager's task/job endpoints
//! - A job queue wrapper adding task completion and job progress semantics
//! - A task executor that fans file transfers out and joins on all of them
//! - A worker runner that claims, executes, and reports tasks in a loop

pub mod client;
pub mod executor;
pub mod queue;
pub mod runner;


pub use client::HttpJobManager;
pub use executor::{TaskExecutor, TransferSummary};
pub use queue::JobQueue;
pub use runner::{Iteration, WorkerRunner};
