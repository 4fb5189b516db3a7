use std::sync::Arc;

use anyhow::Context;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use solanagram::cleanup::CleanupScheduler;
use solanagram::config::Config;
use solanagram::crypto::CredentialStore;
use solanagram::http::{build_router, AppState};
use solanagram::supervisor::runtime::DockerRuntime;
use solanagram::supervisor::WorkerSupervisor;
use solanagram::telegram::bridge::TelegramBridge;
use solanagram::telegram::engine::TelegramEngine;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env().context("configuration")?;
    let crypto =
        CredentialStore::new(&config.encryption_key).context("credential store")?;

    let pool = solanagram::db::connect(&config.database_url)
        .await
        .context("database")?;

    let engine = TelegramEngine::new(&config, pool.clone(), crypto.clone());
    let bridge = TelegramBridge::start(engine);

    let runtime = Arc::new(DockerRuntime::connect().context("container runtime")?);
    let supervisor = Arc::new(WorkerSupervisor::new(
        &config,
        pool.clone(),
        runtime,
        crypto.clone(),
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let cleanup = CleanupScheduler::start(
        pool.clone(),
        bridge.clone(),
        Arc::clone(&supervisor),
        shutdown_rx,
    );

    let state = AppState::new(&config, pool, bridge, supervisor, crypto);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("bind {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, "orchestrator listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown signal received");
        })
        .await
        .context("http server")?;

    let _ = shutdown_tx.send(true);
    cleanup.join().await;
    tracing::info!("orchestrator stopped");
    Ok(())
}
