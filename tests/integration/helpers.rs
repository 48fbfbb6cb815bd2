//! Shared test helpers for integration tests.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use mockito::{Matcher, Mock, ServerGuard};
use tempfile::TempDir;

use ferry_core::config::{
    AppConfig, FsConfig, FsLocation, JobManagerConfig, LoggingConfig, ProviderKind,
    ProviderSelection, S3Config, WorkerConfig,
};
use ferry_storage::{CrossStorageTransfer, StorageResolver};
use ferry_worker::{HttpJobManager, JobQueue, TaskExecutor, WorkerRunner};

pub const JOB_TYPE: &str = "Ingestion";
pub const TASK_TYPE: &str = "migrate";

/// A worker wired exactly like the binary, against a mocked job manager
/// and (optionally) a mocked object store.
pub struct TestWorker {
    pub runner: WorkerRunner,
    pub job_manager: ServerGuard,
    pub object_store: ServerGuard,
    pub source_dir: TempDir,
    pub destination_dir: TempDir,
}

impl TestWorker {
    pub async fn new(source: ProviderKind, destination: ProviderKind) -> Self {
        let job_manager = mockito::Server::new_async().await;
        let object_store = mockito::Server::new_async().await;
        let source_dir = tempfile::tempdir().expect("Failed to create source dir");
        let destination_dir = tempfile::tempdir().expect("Failed to create destination dir");

        let config = AppConfig {
            worker: WorkerConfig {
                job_type: JOB_TYPE.into(),
                task_type: TASK_TYPE.into(),
                wait_time_ms: 10,
                transfer_concurrency: 4,
                transfer_timeout_ms: Some(5_000),
                provider: ProviderSelection {
                    source,
                    destination,
                },
            },
            job_manager: JobManagerConfig {
                url: job_manager.url(),
                timeout_ms: 5_000,
            },
            fs: Some(FsConfig {
                source: FsLocation {
                    pv_path: path_string(source_dir.path()),
                },
                destination: FsLocation {
                    pv_path: path_string(destination_dir.path()),
                },
            }),
            s3: Some(S3Config {
                access_key_id: "minio".into(),
                secret_access_key: "minio123".into(),
                endpoint_url: object_store.url(),
                bucket: "in".into(),
                destination_bucket: "out".into(),
                ssl_enabled: false,
                force_path_style: true,
                region: "us-east-1".into(),
            }),
            logging: LoggingConfig::default(),
        };
        config.validate().expect("Test config should be valid");

        let providers = StorageResolver::from_config(&config)
            .resolve_pair(&config.worker.provider)
            .await
            .expect("Failed to resolve providers");
        let api = Arc::new(HttpJobManager::new(&config.job_manager).expect("Failed to build client"));
        let queue = Arc::new(JobQueue::new(api, JOB_TYPE, TASK_TYPE));
        let executor = TaskExecutor::new(
            CrossStorageTransfer::new(providers),
            config.worker.transfer_concurrency,
        )
        .with_timeout(config.worker.transfer_timeout_ms.map(Duration::from_millis));
        let runner = WorkerRunner::new(queue, Arc::new(executor), &config.worker, "it-worker".into());

        Self {
            runner,
            job_manager,
            object_store,
            source_dir,
            destination_dir,
        }
    }

    /// Write a file into the source volume.
    pub fn seed(&self, path: &str, content: impl AsRef<[u8]>) {
        let full = self.source_dir.path().join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        std::fs::write(full, content).expect("Failed to seed file");
    }

    /// Read a file back from the destination volume.
    pub fn delivered(&self, path: &str) -> String {
        std::fs::read_to_string(self.destination_dir.path().join(path))
            .expect("File should have been delivered")
    }

    pub fn delivered_bytes(&self, path: &str) -> Vec<u8> {
        std::fs::read(self.destination_dir.path().join(path))
            .expect("File should have been delivered")
    }

    /// Serve one task from `startPending`.
    pub async fn offer_task(&mut self, task_id: &str, job_id: &str, paths: &[&str]) -> Mock {
        let body = serde_json::json!({
            "id": task_id,
            "jobId": job_id,
            "type": TASK_TYPE,
            "status": "In-Progress",
            "attempts": 0,
            "parameters": { "paths": paths },
        });
        self.job_manager
            .mock("POST", format!("/tasks/{JOB_TYPE}/{TASK_TYPE}/startPending").as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .expect(1)
            .create_async()
            .await
    }

    pub async fn expect_task_completed(&mut self, task_id: &str, job_id: &str) -> Mock {
        self.job_manager
            .mock("PUT", format!("/jobs/{job_id}/tasks/{task_id}").as_str())
            .match_body(Matcher::Json(serde_json::json!({
                "status": "Completed",
                "percentage": 100
            })))
            .with_status(200)
            .expect(1)
            .create_async()
            .await
    }

    /// Serve the job's counters as seen after the task was completed.
    pub async fn serve_job(&mut self, job_id: &str, task_count: u32, completed: u32) -> Mock {
        let body = serde_json::json!({
            "id": job_id,
            "type": JOB_TYPE,
            "status": "In-Progress",
            "taskCount": task_count,
            "completedTasks": completed,
        });
        self.job_manager
            .mock("GET", format!("/jobs/{job_id}").as_str())
            .match_query(Matcher::UrlEncoded(
                "shouldReturnTasks".into(),
                "false".into(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .expect(1)
            .create_async()
            .await
    }

    pub async fn expect_job_update(&mut self, job_id: &str, body: serde_json::Value) -> Mock {
        self.job_manager
            .mock("PUT", format!("/jobs/{job_id}").as_str())
            .match_body(Matcher::Json(body))
            .with_status(200)
            .expect(1)
            .create_async()
            .await
    }
}

/// A payload that is not valid UTF-8 and spans every byte value.
pub fn binary_payload() -> Vec<u8> {
    (0..=255u8).rev().chain(0..=255u8).collect()
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
