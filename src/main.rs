//! Ferry worker: moves task files between storage backends.
//!
//! Main entry point that wires the crates together and runs the worker loop.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

use ferry_core::config::AppConfig;
use ferry_core::error::AppError;
use ferry_storage::{CrossStorageTransfer, StorageResolver};
use ferry_worker::{HttpJobManager, JobQueue, TaskExecutor, WorkerRunner};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Worker error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let config_path =
        std::env::var("FERRY_CONFIG").unwrap_or_else(|_| "config/default".to_string());
    let env = std::env::var("FERRY_ENV").unwrap_or_else(|_| "development".to_string());

    AppConfig::load(&config_path, &env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Build all collaborators once and run the worker until shutdown
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Ferry worker v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Storage providers ────────────────────────────────
    let selection = config.worker.provider;
    tracing::info!(
        source = %selection.source,
        destination = %selection.destination,
        "Resolving storage providers..."
    );
    let resolver = StorageResolver::from_config(&config);
    let providers = resolver.resolve_pair(&selection).await?;

    // ── Step 2: Job manager client ───────────────────────────────
    tracing::info!(url = %config.job_manager.url, "Connecting to job manager...");
    let api = Arc::new(HttpJobManager::new(&config.job_manager)?);
    let queue = Arc::new(JobQueue::new(
        api,
        config.worker.job_type.clone(),
        config.worker.task_type.clone(),
    ));

    // ── Step 3: Task executor ────────────────────────────────────
    let executor = TaskExecutor::new(
        CrossStorageTransfer::new(providers),
        config.worker.transfer_concurrency,
    )
    .with_timeout(config.worker.transfer_timeout_ms.map(Duration::from_millis));

    // ── Step 4: Worker loop ──────────────────────────────────────
    let worker_id = format!("ferry-{}", &uuid::Uuid::new_v4().to_string()[..8]);
    let runner = WorkerRunner::new(queue, Arc::new(executor), &config.worker, worker_id);

    runner.serve(shutdown_signal()).await?;

    tracing::info!("Ferry worker stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
