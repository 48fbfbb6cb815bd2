//! # ferry-storage
//!
//! Storage provider implementations for Ferry. Supports mounted
//! filesystem volumes and S3-compatible object stores.

pub mod providers;
pub mod resolver;
pub mod transfer;

pub use resolver::{ProviderPair, StorageResolver};
pub use transfer::CrossStorageTransfer;
