//! Provider resolver: maps a configured backend kind to a provider instance.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use ferry_core::config::{AppConfig, FsConfig, ProviderKind, ProviderSelection, S3Config};
use ferry_core::error::AppError;
use ferry_core::result::AppResult;
use ferry_core::traits::storage::StorageProvider;

use crate::providers::LocalStorageProvider;

/// The two providers a worker moves data between.
#[derive(Debug, Clone)]
pub struct ProviderPair {
    pub source: Arc<dyn StorageProvider>,
    pub destination: Arc<dyn StorageProvider>,
}

/// Builds providers from backend configuration.
///
/// One instance is built per kind and shared, so an fs→fs or s3→s3 setup
/// holds a single provider (and a single S3 client).
#[derive(Debug, Clone)]
pub struct StorageResolver {
    fs: Option<FsConfig>,
    s3: Option<S3Config>,
    /// Map of kind → built provider.
    providers: Arc<RwLock<HashMap<ProviderKind, Arc<dyn StorageProvider>>>>,
}

impl StorageResolver {
    pub fn new(fs: Option<FsConfig>, s3: Option<S3Config>) -> Self {
        Self {
            fs,
            s3,
            providers: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.fs.clone(), config.s3.clone())
    }

    /// Get (building on first use) the provider for `kind`.
    pub async fn resolve(&self, kind: ProviderKind) -> AppResult<Arc<dyn StorageProvider>> {
        if let Some(provider) = self.providers.read().await.get(&kind) {
            return Ok(Arc::clone(provider));
        }

        let mut providers = self.providers.write().await;
        if let Some(provider) = providers.get(&kind) {
            return Ok(Arc::clone(provider));
        }

        let provider = self.build(kind).await?;
        tracing::info!(provider = %kind, "Storage provider initialized");
        providers.insert(kind, Arc::clone(&provider));
        Ok(provider)
    }

    /// Resolve the source and destination providers for a selection.
    pub async fn resolve_pair(&self, selection: &ProviderSelection) -> AppResult<ProviderPair> {
        Ok(ProviderPair {
            source: self.resolve(selection.source).await?,
            destination: self.resolve(selection.destination).await?,
        })
    }

    async fn build(&self, kind: ProviderKind) -> AppResult<Arc<dyn StorageProvider>> {
        match kind {
            ProviderKind::Fs => {
                let config = self.fs.as_ref().ok_or_else(|| {
                    AppError::configuration("fs provider requested but [fs] is not configured")
                })?;
                Ok(Arc::new(LocalStorageProvider::from_config(config)))
            }
            #[cfg(feature = "s3")]
            ProviderKind::S3 => {
                let config = self.s3.as_ref().ok_or_else(|| {
                    AppError::configuration("s3 provider requested but [s3] is not configured")
                })?;
                let provider = crate::providers::S3StorageProvider::new(config).await?;
                Ok(Arc::new(provider))
            }
            #[cfg(not(feature = "s3"))]
            ProviderKind::S3 => Err(AppError::configuration(
                "s3 provider requested but ferry-storage was built without the `s3` feature",
            )),
        }
    }
}
