//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod job_manager;
pub mod logging;
pub mod storage;
pub mod worker;

use serde::{Deserialize, Serialize};

pub use self::job_manager::JobManagerConfig;
pub use self::logging::LoggingConfig;
pub use self::storage::{FsConfig, FsLocation, ProviderKind, S3Config};
pub use self::worker::{ProviderSelection, WorkerConfig};

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay) and
/// `FERRY__*` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Polling and transfer settings.
    pub worker: WorkerConfig,
    /// Job manager connection settings.
    pub job_manager: JobManagerConfig,
    /// Filesystem backend roots. Required when either side uses `fs`.
    #[serde(default)]
    pub fs: Option<FsConfig>,
    /// Object storage backend settings. Required when either side uses `s3`.
    #[serde(default)]
    pub s3: Option<S3Config>,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files and the environment.
    ///
    /// Merges `config_path` with the `config/{env}` overlay and environment
    /// variables prefixed with `FERRY`, then validates the result.
    pub fn load(config_path: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("FERRY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        app_config.validate()?;
        Ok(app_config)
    }

    /// Check cross-section requirements that serde cannot express.
    ///
    /// Backend sections are only mandatory for the kinds actually selected,
    /// so a fs→fs deployment does not need any S3 credentials.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.worker.job_type.trim().is_empty() {
            return Err(AppError::configuration("worker.job_type must not be empty"));
        }
        if self.worker.task_type.trim().is_empty() {
            return Err(AppError::configuration("worker.task_type must not be empty"));
        }
        if self.worker.transfer_concurrency == 0 {
            return Err(AppError::configuration(
                "worker.transfer_concurrency must be at least 1",
            ));
        }
        if self.job_manager.url.trim().is_empty() {
            return Err(AppError::configuration("job_manager.url must not be empty"));
        }

        let selection = &self.worker.provider;
        if selection.uses(ProviderKind::Fs) {
            let fs = self.fs.as_ref().ok_or_else(|| {
                AppError::configuration("fs provider selected but [fs] section is missing")
            })?;
            fs.validate()?;
        }
        if selection.uses(ProviderKind::S3) {
            let s3 = self.s3.as_ref().ok_or_else(|| {
                AppError::configuration("s3 provider selected but [s3] section is missing")
            })?;
            s3.validate()?;
        }

        Ok(())
    }
}
