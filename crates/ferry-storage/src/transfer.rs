//! Cross-storage file transfer.

use std::sync::Arc;

use ferry_core::result::AppResult;
use ferry_core::traits::storage::StorageProvider;

use crate::resolver::ProviderPair;

/// Copies single files from a source provider to a destination provider.
#[derive(Debug, Clone)]
pub struct CrossStorageTransfer {
    source: Arc<dyn StorageProvider>,
    destination: Arc<dyn StorageProvider>,
}

impl CrossStorageTransfer {
    pub fn new(providers: ProviderPair) -> Self {
        Self {
            source: providers.source,
            destination: providers.destination,
        }
    }

    /// Transfer one file, using `path` verbatim on both sides.
    ///
    /// Streams from source to destination; the destination object is
    /// overwritten if present.
    pub async fn transfer(&self, path: &str) -> AppResult<u64> {
        let data = self.source.fetch(path).await?;
        let bytes_written = self.destination.store(path, data).await?;

        tracing::debug!(
            source = self.source.provider_type(),
            destination = self.destination.provider_type(),
            path,
            bytes = bytes_written,
            "Completed cross-storage transfer"
        );

        Ok(bytes_written)
    }
}
