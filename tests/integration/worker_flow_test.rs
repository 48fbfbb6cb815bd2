//! Integration tests for the claim → transfer → report cycle.

mod helpers;

use ferry_core::config::ProviderKind;
use ferry_core::error::ErrorKind;
use ferry_worker::Iteration;
use mockito::Matcher;

use helpers::{JOB_TYPE, TASK_TYPE, TestWorker, binary_payload};

#[tokio::test]
async fn test_fs_to_fs_completes_job() {
    let mut worker = TestWorker::new(ProviderKind::Fs, ProviderKind::Fs).await;
    worker.seed("models/a.b3dm", "tile-a");
    worker.seed("models/nested/b.json", "{\"tileset\":1}");
    worker.seed("models/c.bin", binary_payload());

    let claim = worker
        .offer_task(
            "t3",
            "J1",
            &["models/a.b3dm", "models/nested/b.json", "models/c.bin"],
        )
        .await;
    let task_update = worker.expect_task_completed("t3", "J1").await;
    let job_read = worker.serve_job("J1", 3, 3).await;
    let job_update = worker
        .expect_job_update(
            "J1",
            serde_json::json!({ "percentage": 100, "status": "Completed" }),
        )
        .await;

    let outcome = worker.runner.run_once().await.unwrap();
    assert_eq!(
        outcome,
        Iteration::TaskCompleted {
            task_id: "t3".into(),
            job_id: "J1".into(),
            job_completed: true,
        }
    );

    claim.assert_async().await;
    task_update.assert_async().await;
    job_read.assert_async().await;
    job_update.assert_async().await;
    assert_eq!(worker.delivered("models/a.b3dm"), "tile-a");
    assert_eq!(worker.delivered("models/nested/b.json"), "{\"tileset\":1}");
    assert_eq!(worker.delivered_bytes("models/c.bin"), binary_payload());
}

#[tokio::test]
async fn test_partial_progress_omits_status() {
    let mut worker = TestWorker::new(ProviderKind::Fs, ProviderKind::Fs).await;
    worker.seed("a.txt", "A");

    let _claim = worker.offer_task("t1", "J1", &["a.txt"]).await;
    let _task_update = worker.expect_task_completed("t1", "J1").await;
    let _job_read = worker.serve_job("J1", 3, 1).await;
    let job_update = worker
        .expect_job_update("J1", serde_json::json!({ "percentage": 33 }))
        .await;

    let outcome = worker.runner.run_once().await.unwrap();
    assert!(matches!(
        outcome,
        Iteration::TaskCompleted {
            job_completed: false,
            ..
        }
    ));
    job_update.assert_async().await;
}

#[tokio::test]
async fn test_empty_queue_is_idle() {
    let mut worker = TestWorker::new(ProviderKind::Fs, ProviderKind::Fs).await;
    let claim = worker
        .job_manager
        .mock(
            "POST",
            format!("/tasks/{JOB_TYPE}/{TASK_TYPE}/startPending").as_str(),
        )
        .with_status(404)
        .expect(1)
        .create_async()
        .await;

    assert_eq!(worker.runner.run_once().await.unwrap(), Iteration::Idle);
    claim.assert_async().await;
}

#[tokio::test]
async fn test_missing_source_file_leaves_task_open() {
    let mut worker = TestWorker::new(ProviderKind::Fs, ProviderKind::Fs).await;
    worker.seed("present.txt", "here");

    let _claim = worker
        .offer_task("t1", "J1", &["present.txt", "absent.txt"])
        .await;
    let task_update = worker
        .job_manager
        .mock("PUT", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let err = worker.runner.run_once().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert!(err.message.contains("absent.txt"));
    task_update.assert_async().await;
}

#[tokio::test]
async fn test_fs_to_s3_uploads_to_destination_bucket() {
    let mut worker = TestWorker::new(ProviderKind::Fs, ProviderKind::S3).await;
    let payload = binary_payload();
    worker.seed("models/a.b3dm", &payload);

    let upload = worker
        .object_store
        .mock("PUT", "/out/models/a.b3dm")
        .match_query(Matcher::Any)
        .match_header("content-length", payload.len().to_string().as_str())
        .match_body(payload.clone())
        .with_status(200)
        .expect(1)
        .create_async()
        .await;
    let _claim = worker.offer_task("t1", "J1", &["models/a.b3dm"]).await;
    let task_update = worker.expect_task_completed("t1", "J1").await;
    let _job_read = worker.serve_job("J1", 2, 1).await;
    let _job_update = worker
        .expect_job_update("J1", serde_json::json!({ "percentage": 50 }))
        .await;

    worker.runner.run_once().await.unwrap();
    upload.assert_async().await;
    task_update.assert_async().await;
}

#[tokio::test]
async fn test_s3_to_fs_downloads_from_source_bucket() {
    let mut worker = TestWorker::new(ProviderKind::S3, ProviderKind::Fs).await;
    let payload = binary_payload();

    let download = worker
        .object_store
        .mock("GET", "/in/models/a.b3dm")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(&payload)
        .expect(1)
        .create_async()
        .await;
    let _claim = worker.offer_task("t1", "J1", &["models/a.b3dm"]).await;
    let _task_update = worker.expect_task_completed("t1", "J1").await;
    let _job_read = worker.serve_job("J1", 1, 1).await;
    let _job_update = worker
        .expect_job_update(
            "J1",
            serde_json::json!({ "percentage": 100, "status": "Completed" }),
        )
        .await;

    let outcome = worker.runner.run_once().await.unwrap();
    assert!(matches!(
        outcome,
        Iteration::TaskCompleted {
            job_completed: true,
            ..
        }
    ));
    download.assert_async().await;
    assert_eq!(worker.delivered_bytes("models/a.b3dm"), payload);
}

#[tokio::test]
async fn test_s3_to_s3_copies_between_buckets() {
    let mut worker = TestWorker::new(ProviderKind::S3, ProviderKind::S3).await;
    let payload = binary_payload();

    let download = worker
        .object_store
        .mock("GET", "/in/tiles/0/0.b3dm")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(&payload)
        .expect(1)
        .create_async()
        .await;
    let upload = worker
        .object_store
        .mock("PUT", "/out/tiles/0/0.b3dm")
        .match_query(Matcher::Any)
        .match_header("content-length", payload.len().to_string().as_str())
        .match_body(payload.clone())
        .with_status(200)
        .expect(1)
        .create_async()
        .await;
    let _claim = worker.offer_task("t1", "J1", &["tiles/0/0.b3dm"]).await;
    let _task_update = worker.expect_task_completed("t1", "J1").await;
    let _job_read = worker.serve_job("J1", 4, 2).await;
    let _job_update = worker
        .expect_job_update("J1", serde_json::json!({ "percentage": 50 }))
        .await;

    worker.runner.run_once().await.unwrap();
    download.assert_async().await;
    upload.assert_async().await;
}

#[tokio::test]
async fn test_s3_rejection_keeps_status() {
    let mut worker = TestWorker::new(ProviderKind::S3, ProviderKind::S3).await;

    let _download = worker
        .object_store
        .mock("GET", "/in/secret.b3dm")
        .match_query(Matcher::Any)
        .with_status(403)
        .with_header("content-type", "application/xml")
        .with_body(
            r#"<?xml version="1.0" encoding="UTF-8"?><Error><Code>AccessDenied</Code><Message>Access Denied</Message></Error>"#,
        )
        .create_async()
        .await;
    let _claim = worker.offer_task("t1", "J1", &["secret.b3dm"]).await;

    let err = worker.runner.run_once().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Upstream);
    assert_eq!(err.status, Some(403));
}

#[tokio::test]
async fn test_job_manager_outage_is_queue_unavailable() {
    let mut worker = TestWorker::new(ProviderKind::Fs, ProviderKind::Fs).await;
    let _claim = worker
        .job_manager
        .mock(
            "POST",
            format!("/tasks/{JOB_TYPE}/{TASK_TYPE}/startPending").as_str(),
        )
        .with_status(503)
        .with_body("maintenance")
        .create_async()
        .await;

    let err = worker.runner.run_once().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::QueueUnavailable);
    assert_eq!(err.status, Some(503));
}
