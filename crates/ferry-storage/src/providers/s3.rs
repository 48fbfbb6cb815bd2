//! S3-compatible object storage provider (requires the `s3` feature).

use std::pin::Pin;
use std::sync::{Mutex, PoisonError};
use std::task::{Context, Poll};

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_config::retry::RetryConfig;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::config::{Credentials, Region, RequestChecksumCalculation};
use aws_sdk_s3::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream as S3ByteStream;
use futures::{Stream, TryStreamExt};
use http_body::Frame;
use http_body_util::StreamBody;
use tokio_util::io::ReaderStream;
use tracing::debug;

use ferry_core::config::S3Config;
use ferry_core::error::{AppError, ErrorKind};
use ferry_core::result::AppResult;
use ferry_core::traits::storage::{FileData, StorageProvider};

/// S3-compatible storage provider.
///
/// Objects are read from `bucket` and written to `destination_bucket`; the
/// transfer path is used verbatim as the object key on both sides.
#[derive(Debug, Clone)]
pub struct S3StorageProvider {
    client: Client,
    bucket: String,
    destination_bucket: String,
}

impl S3StorageProvider {
    /// Create a new S3 storage provider from static credentials.
    ///
    /// SDK-level retries are disabled: a rejected request fails the task
    /// and the job manager decides what happens next.
    pub async fn new(config: &S3Config) -> AppResult<Self> {
        let endpoint = config.endpoint();
        tracing::info!(
            endpoint = %endpoint,
            bucket = %config.bucket,
            destination_bucket = %config.destination_bucket,
            "Initializing S3 storage provider"
        );

        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "ferry-config",
        );

        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .endpoint_url(endpoint)
            .retry_config(RetryConfig::disabled())
            .load()
            .await;

        // Bodies go out as-is; no aws-chunked framing for optional checksums.
        let s3_config = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(config.force_path_style)
            .request_checksum_calculation(RequestChecksumCalculation::WhenRequired)
            .build();

        Ok(Self {
            client: Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
            destination_bucket: config.destination_bucket.clone(),
        })
    }
}

/// Map an SDK failure to an `Upstream` error, keeping the HTTP status when
/// the backend answered at all.
fn upstream_error<E>(err: SdkError<E, HttpResponse>, path: &str, bucket: &str) -> AppError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let status = err.raw_response().map(|r| r.status().as_u16());
    let message = match (err.code(), err.message()) {
        (Some(code), Some(msg)) => format!("{code}, message: {msg}, file: {path}, bucket: {bucket}"),
        (Some(code), None) => format!("{code}, file: {path}, bucket: {bucket}"),
        _ => format!("S3 request failed ({err}), file: {path}, bucket: {bucket}"),
    };

    let error = AppError::with_source(ErrorKind::Upstream, message, err);
    match status {
        Some(status) => error.with_status(status),
        None => error,
    }
}

/// Hand a source stream to the SDK without collecting it first.
fn streaming_body(data: FileData) -> S3ByteStream {
    let frames = data.content.map_ok(Frame::data);
    S3ByteStream::from_body_1_x(StreamBody::new(SyncStream(Mutex::new(frames))))
}

/// The SDK requires `Sync` bodies; the stream is only ever polled through
/// `&mut`, so the mutex is never contended.
struct SyncStream<S>(Mutex<S>);

impl<S: Stream + Unpin> Stream for SyncStream<S> {
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<S::Item>> {
        let inner = self
            .get_mut()
            .0
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        Pin::new(inner).poll_next(cx)
    }
}

#[async_trait]
impl StorageProvider for S3StorageProvider {
    fn provider_type(&self) -> &str {
        "s3"
    }

    async fn fetch(&self, path: &str) -> AppResult<FileData> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
            .map_err(|e| upstream_error(e, path, &self.bucket))?;

        let length = output.content_length().and_then(|l| u64::try_from(l).ok());
        let reader = output.body.into_async_read();

        debug!(path, bytes = ?length, bucket = %self.bucket, "Opened source object");
        Ok(FileData::new(Box::pin(ReaderStream::new(reader)), length))
    }

    async fn store(&self, path: &str, data: FileData) -> AppResult<u64> {
        let (body, size) = match data.length {
            Some(length) => (streaming_body(data), length),
            None => {
                // PutObject needs a content length; without one the body is buffered.
                let bytes = data.into_bytes().await.map_err(|e| {
                    AppError::with_source(
                        ErrorKind::Io,
                        format!("Failed to read content for {path}"),
                        e,
                    )
                })?;
                let size = bytes.len() as u64;
                (S3ByteStream::from(bytes), size)
            }
        };

        self.client
            .put_object()
            .bucket(&self.destination_bucket)
            .key(path)
            .content_length(size as i64)
            .body(body)
            .send()
            .await
            .map_err(|e| upstream_error(e, path, &self.destination_bucket))?;

        debug!(path, bytes = size, bucket = %self.destination_bucket, "Wrote object");
        Ok(size)
    }
}
