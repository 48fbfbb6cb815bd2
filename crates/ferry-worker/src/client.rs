//! HTTP implementation of the job manager primitives.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use ferry_core::config::JobManagerConfig;
use ferry_core::error::{AppError, ErrorKind};
use ferry_core::result::AppResult;
use ferry_core::traits::job_manager::JobManagerApi;
use ferry_core::types::{Job, Task, UpdateJobBody, UpdateTaskBody};

/// REST client for the job manager service.
#[derive(Debug, Clone)]
pub struct HttpJobManager {
    client: Client,
    base_url: String,
}

impl HttpJobManager {
    pub fn new(config: &JobManagerConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    "Failed to build job manager HTTP client",
                    e,
                )
            })?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn transport_error(op: &str, err: reqwest::Error) -> AppError {
    AppError::with_source(
        ErrorKind::QueueUnavailable,
        format!("Job manager {op} request failed: {err}"),
        err,
    )
}

/// Turn a non-success response into a `QueueUnavailable` error carrying
/// the status and (truncated) body.
async fn status_error(op: &str, response: Response) -> AppError {
    let status = response.status();
    let body: String = response
        .text()
        .await
        .unwrap_or_default()
        .chars()
        .take(512)
        .collect();
    AppError::queue_unavailable(format!("Job manager {op} returned {status}: {body}"))
        .with_status(status.as_u16())
}

/// Decode a JSON body, treating 404 as "nothing there".
async fn optional_json<T: DeserializeOwned>(op: &str, response: Response) -> AppResult<Option<T>> {
    match response.status() {
        StatusCode::NOT_FOUND => Ok(None),
        status if status.is_success() => {
            let value = response.json::<T>().await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Serialization,
                    format!("Failed to decode job manager {op} response: {e}"),
                    e,
                )
            })?;
            Ok(Some(value))
        }
        _ => Err(status_error(op, response).await),
    }
}

async fn expect_success(op: &str, response: Response) -> AppResult<()> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(status_error(op, response).await)
    }
}

#[async_trait]
impl JobManagerApi for HttpJobManager {
    async fn consume_task(&self, job_type: &str, task_type: &str) -> AppResult<Option<Task>> {
        let response = self
            .client
            .post(self.url(&format!("/tasks/{job_type}/{task_type}/startPending")))
            .send()
            .await
            .map_err(|e| transport_error("consume", e))?;

        optional_json("consume", response).await
    }

    async fn get_job(&self, job_id: &str) -> AppResult<Option<Job>> {
        let response = self
            .client
            .get(self.url(&format!("/jobs/{job_id}?shouldReturnTasks=false")))
            .send()
            .await
            .map_err(|e| transport_error("get job", e))?;

        optional_json("get job", response).await
    }

    async fn update_task(
        &self,
        job_id: &str,
        task_id: &str,
        body: &UpdateTaskBody,
    ) -> AppResult<()> {
        let response = self
            .client
            .put(self.url(&format!("/jobs/{job_id}/tasks/{task_id}")))
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error("update task", e))?;

        expect_success("update task", response).await
    }

    async fn update_job(&self, job_id: &str, body: &UpdateJobBody) -> AppResult<()> {
        let response = self
            .client
            .put(self.url(&format!("/jobs/{job_id}")))
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error("update job", e))?;

        expect_success("update job", response).await
    }
}
