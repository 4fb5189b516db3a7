//! Retention and cleanup loops, started once at bring-up and stopped via
//! the shutdown signal. Each iteration logs failures and keeps going; a bad
//! sweep must never take the scheduler down.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::interval;

use crate::db::{listeners, sessions};
use crate::supervisor::WorkerSupervisor;
use crate::telegram::bridge::TelegramBridge;

const CLIENT_SWEEP_EVERY: Duration = Duration::from_secs(120);
const SAVED_MESSAGES_EVERY: Duration = Duration::from_secs(600);
const REAP_EVERY: Duration = Duration::from_secs(60);
const ORPHANS_EVERY: Duration = Duration::from_secs(900);

const SAVED_MESSAGES_RETENTION_DAYS: i32 = 30;
const ORPHAN_RETENTION_DAYS: i32 = 7;

pub struct CleanupScheduler {
    tasks: Vec<JoinHandle<()>>,
}

impl CleanupScheduler {
    pub fn start(
        pool: PgPool,
        bridge: TelegramBridge,
        supervisor: Arc<WorkerSupervisor>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        let tasks = vec![
            tokio::spawn(client_sweep_loop(bridge, shutdown.clone())),
            tokio::spawn(saved_messages_loop(pool.clone(), shutdown.clone())),
            tokio::spawn(reap_loop(supervisor, shutdown.clone())),
            tokio::spawn(orphan_loop(pool, shutdown)),
        ];
        Self { tasks }
    }

    pub async fn join(self) {
        for task in self.tasks {
            let _ = task.await;
        }
    }
}

async fn client_sweep_loop(bridge: TelegramBridge, mut shutdown: watch::Receiver<bool>) {
    let mut ticker = interval(CLIENT_SWEEP_EVERY);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match bridge.sweep().await {
                    Ok(evicted) if evicted > 0 => {
                        tracing::info!(evicted, "expired telegram clients evicted");
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!(error = %e, "client sweep failed"),
                }
            }
            _ = shutdown.changed() => break,
        }
    }
}

async fn saved_messages_loop(pool: PgPool, mut shutdown: watch::Receiver<bool>) {
    let mut ticker = interval(SAVED_MESSAGES_EVERY);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match listeners::cleanup_old_saved_messages(&pool, SAVED_MESSAGES_RETENTION_DAYS).await {
                    Ok(deleted) if deleted > 0 => {
                        tracing::info!(deleted, "old saved messages purged");
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!(error = %e, "saved message purge failed"),
                }
            }
            _ = shutdown.changed() => break,
        }
    }
}

async fn reap_loop(supervisor: Arc<WorkerSupervisor>, mut shutdown: watch::Receiver<bool>) {
    let mut ticker = interval(REAP_EVERY);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match supervisor.reap_once().await {
                    Ok(report) if report.reaped > 0 => {
                        tracing::warn!(checked = report.checked, reaped = report.reaped, "dead workers reaped");
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!(error = %e, "worker reap failed"),
                }
            }
            _ = shutdown.changed() => break,
        }
    }
}

async fn orphan_loop(pool: PgPool, mut shutdown: watch::Receiver<bool>) {
    let mut ticker = interval(ORPHANS_EVERY);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match sessions::cleanup_orphaned(&pool, ORPHAN_RETENTION_DAYS).await {
                    Ok(moved) if moved > 0 => {
                        tracing::info!(moved, "orphaned error sessions marked removed");
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!(error = %e, "orphan cleanup failed"),
                }
            }
            _ = shutdown.changed() => break,
        }
    }
}
