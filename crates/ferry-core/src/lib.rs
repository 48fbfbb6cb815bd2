//! # ferry-core
//!
//! Core crate for Ferry. Contains the storage and job-manager traits,
//! configuration schemas, task/job domain types, and the unified error
//! system.
//!
//! This crate has **no** internal dependencies on other Ferry crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
