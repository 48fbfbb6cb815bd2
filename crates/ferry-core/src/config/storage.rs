//! Storage backend configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// The closed set of storage backends a side of the transfer can use.
///
/// Parsed case-insensitively, so `"FS"` and `"fs"` are equivalent. Any
/// other value fails deserialization, which rejects it at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ProviderKind {
    /// Local or mounted filesystem volume.
    Fs,
    /// S3-compatible object storage.
    S3,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fs => "fs",
            Self::S3 => "s3",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fs" => Ok(Self::Fs),
            "s3" => Ok(Self::S3),
            other => Err(AppError::configuration(format!(
                "Invalid config provider received: {other} - available values: \"fs\" or \"s3\""
            ))),
        }
    }
}

impl TryFrom<String> for ProviderKind {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ProviderKind> for String {
    fn from(kind: ProviderKind) -> Self {
        kind.as_str().to_string()
    }
}

/// A single filesystem location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FsLocation {
    /// Root directory (usually a mounted persistent volume).
    pub pv_path: String,
}

/// Filesystem backend configuration.
///
/// Reads resolve against `source`, writes against `destination`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FsConfig {
    pub source: FsLocation,
    pub destination: FsLocation,
}

impl FsConfig {
    pub(crate) fn validate(&self) -> Result<(), AppError> {
        if self.source.pv_path.trim().is_empty() {
            return Err(AppError::configuration("fs.source.pv_path must not be empty"));
        }
        if self.destination.pv_path.trim().is_empty() {
            return Err(AppError::configuration(
                "fs.destination.pv_path must not be empty",
            ));
        }
        Ok(())
    }
}

/// S3-compatible object storage configuration.
///
/// Reads use `bucket`, writes use `destination_bucket`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Config {
    /// Access key ID.
    pub access_key_id: String,
    /// Secret access key.
    pub secret_access_key: String,
    /// Endpoint URL (for non-AWS services like MinIO).
    pub endpoint_url: String,
    /// Bucket objects are read from.
    pub bucket: String,
    /// Bucket objects are written to.
    pub destination_bucket: String,
    /// Use HTTPS when `endpoint_url` carries no scheme.
    #[serde(default)]
    pub ssl_enabled: bool,
    /// Address buckets as `endpoint/bucket/key` instead of virtual hosts.
    #[serde(default)]
    pub force_path_style: bool,
    /// Signing region.
    #[serde(default = "default_region")]
    pub region: String,
}

impl S3Config {
    /// Endpoint with an explicit scheme.
    pub fn endpoint(&self) -> String {
        let endpoint = self.endpoint_url.trim_end_matches('/');
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_string()
        } else if self.ssl_enabled {
            format!("https://{endpoint}")
        } else {
            format!("http://{endpoint}")
        }
    }

    pub(crate) fn validate(&self) -> Result<(), AppError> {
        let required = [
            ("s3.access_key_id", &self.access_key_id),
            ("s3.secret_access_key", &self.secret_access_key),
            ("s3.endpoint_url", &self.endpoint_url),
            ("s3.bucket", &self.bucket),
            ("s3.destination_bucket", &self.destination_bucket),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(AppError::configuration(format!("{key} must not be empty")));
            }
        }
        Ok(())
    }
}

fn default_region() -> String {
    "us-east-1".to_string()
}
