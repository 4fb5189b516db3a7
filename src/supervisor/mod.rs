//! Worker fleet control: one isolated container per logging session or
//! listener, tracked in the database, reaped when it dies.

pub mod bundle;
pub mod runtime;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;
use tokio::sync::Mutex;

use crate::config::Config;
use crate::crypto::CredentialStore;
use crate::db::listeners::{self, MessageListener, NewListener};
use crate::db::sessions::{self, LoggingSession, NewSession};
use crate::db::users::{self, User};
use crate::error::{OrchestratorError, Result};
use crate::telegram::sanitize_chat_id;
use crate::workers::{ElaborationSpec, WorkerConfig, WorkerKind};
use bundle::BundleManager;
use runtime::{ContainerRuntime, ContainerSpec, ContainerState};

/// SIGTERM grace before a worker container is force-removed.
const GRACE_STOP: Duration = Duration::from_secs(10);

/// Chat coordinates the HTTP layer passes when starting a worker.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ChatRef {
    pub chat_id: i64,
    pub chat_title: Option<String>,
    pub chat_username: Option<String>,
    pub chat_type: Option<String>,
}

#[derive(Debug, Default, PartialEq)]
pub struct ReapReport {
    pub checked: usize,
    pub reaped: usize,
}

pub struct WorkerSupervisor {
    pool: PgPool,
    runtime: Arc<dyn ContainerRuntime>,
    bundles: BundleManager,
    crypto: CredentialStore,
    project: String,
    logger_image: String,
    listener_image: String,
    worker_dsn: String,
    /// One in-flight start/stop per container name.
    name_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl WorkerSupervisor {
    pub fn new(
        config: &Config,
        pool: PgPool,
        runtime: Arc<dyn ContainerRuntime>,
        crypto: CredentialStore,
    ) -> Self {
        Self {
            pool,
            runtime,
            bundles: BundleManager::new(config.configs_path.clone()),
            crypto,
            project: config.forwarder_project_name.clone(),
            logger_image: config.worker_image("logger"),
            listener_image: config.worker_image("listener"),
            worker_dsn: config.database_url.clone(),
            name_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn logger_container_name(&self, user_id: i32, chat_id: i64) -> String {
        format!("{}-log-{}-{}", self.project, user_id, sanitize_chat_id(chat_id))
    }

    pub fn listener_container_name(&self, user_id: i32, chat_id: i64) -> String {
        format!(
            "{}-listener-{}-{}",
            self.project,
            user_id,
            sanitize_chat_id(chat_id)
        )
    }

    async fn name_lock(&self, name: &str) -> Arc<Mutex<()>> {
        let mut locks = self.name_locks.lock().await;
        locks
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Decrypted worker material for a user; a worker cannot run without an
    /// authorized session blob.
    async fn worker_material(&self, user_id: i32) -> Result<(User, i32, String, Vec<u8>)> {
        let user = users::find_by_id(&self.pool, user_id)
            .await?
            .ok_or(OrchestratorError::UnknownUser)?;
        let api_id = user.api_id.ok_or(OrchestratorError::MissingCredentials)?;
        let api_hash = self.crypto.unwrap_str(
            user.api_hash
                .as_ref()
                .ok_or(OrchestratorError::MissingCredentials)?,
        )?;
        let session_blob = self.crypto.unwrap(
            user.telegram_session
                .as_ref()
                .ok_or(OrchestratorError::AuthorizationLost)?,
        )?;
        Ok((user, api_id, api_hash, session_blob))
    }

    fn labels(&self, worker_type: &str, user_id: i32, session_id: i32) -> HashMap<String, String> {
        HashMap::from([
            ("solanagram.project".to_string(), self.project.clone()),
            ("solanagram.type".to_string(), worker_type.to_string()),
            ("solanagram.user_id".to_string(), user_id.to_string()),
            ("solanagram.session_id".to_string(), session_id.to_string()),
        ])
    }

    // ===== Logging sessions =====

    pub async fn start_logging(&self, user_id: i32, chat: ChatRef) -> Result<LoggingSession> {
        let (user, api_id, api_hash, session_blob) = self.worker_material(user_id).await?;
        let name = self.logger_container_name(user_id, chat.chat_id);
        let lock = self.name_lock(&name).await;
        let _guard = lock.lock().await;

        let reserved = sessions::reserve(
            &self.pool,
            NewSession {
                user_id,
                chat_id: chat.chat_id,
                chat_title: chat.chat_title.as_deref(),
                chat_username: chat.chat_username.as_deref(),
                chat_type: chat.chat_type.as_deref(),
                container_name: &name,
            },
        )
        .await?;

        let worker_config = WorkerConfig {
            worker_kind: WorkerKind::Logger,
            api_id,
            phone: user.phone.clone(),
            chat_id: chat.chat_id,
            chat_title: chat.chat_title.clone(),
            chat_username: chat.chat_username.clone(),
            chat_type: chat.chat_type.clone(),
            database_dsn: self.worker_dsn.clone(),
            user_id,
            session_db_id: reserved.id,
            elaborations: Vec::new(),
        };

        match self
            .launch(&name, &self.logger_image, "logger", user_id, reserved.id, &worker_config, &api_hash, &session_blob)
            .await
        {
            Ok(container_id) => {
                sessions::mark_running(&self.pool, reserved.id, &container_id).await?;
                tracing::info!(session = reserved.id, container = %name, "logging worker started");
                sessions::get(&self.pool, reserved.id)
                    .await?
                    .ok_or(OrchestratorError::NotFound("logging session"))
            }
            Err(e) => {
                // Nothing launched: drop the reservation and the bundle so a
                // retry starts from a clean slate.
                self.bundles.wipe(&name).await;
                sessions::discard_reservation(&self.pool, reserved.id).await?;
                Err(e)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn launch(
        &self,
        name: &str,
        image: &str,
        worker_type: &str,
        user_id: i32,
        session_id: i32,
        worker_config: &WorkerConfig,
        api_hash: &str,
        session_blob: &[u8],
    ) -> Result<String> {
        let bundle_dir = self
            .bundles
            .materialize(name, worker_config, session_blob)
            .await?;

        let spec = ContainerSpec {
            name: name.to_string(),
            image: image.to_string(),
            env: vec![
                ("TELEGRAM_API_HASH".to_string(), api_hash.to_string()),
                ("RUST_LOG".to_string(), "info".to_string()),
            ],
            labels: self.labels(worker_type, user_id, session_id),
            bundle_dir,
        };

        self.runtime.create_and_start(&spec).await
    }

    /// Stop the worker and mark the row inactive. Stopping an already
    /// stopped session is a no-op success.
    pub async fn stop_logging(&self, user_id: i32, session_id: i32) -> Result<LoggingSession> {
        let session = sessions::get_owned(&self.pool, session_id, user_id).await?;
        if !session.is_active {
            return Ok(session);
        }

        if let Some(name) = &session.container_name {
            let lock = self.name_lock(name).await;
            let _guard = lock.lock().await;
            self.runtime.stop_and_remove(name, GRACE_STOP).await?;
            self.bundles.wipe(name).await;
        }
        sessions::mark_stopped(&self.pool, session_id).await?;
        sessions::get(&self.pool, session_id)
            .await?
            .ok_or(OrchestratorError::NotFound("logging session"))
    }

    pub async fn remove_logging(&self, user_id: i32, session_id: i32) -> Result<()> {
        self.stop_logging(user_id, session_id).await?;
        sessions::delete(&self.pool, session_id).await
    }

    // ===== Listeners =====

    pub async fn start_listener(
        &self,
        user_id: i32,
        chat: ChatRef,
    ) -> Result<MessageListener> {
        let (user, api_id, api_hash, session_blob) = self.worker_material(user_id).await?;
        let name = self.listener_container_name(user_id, chat.chat_id);
        let lock = self.name_lock(&name).await;
        let _guard = lock.lock().await;

        let reserved = listeners::reserve(
            &self.pool,
            NewListener {
                user_id,
                source_chat_id: chat.chat_id,
                source_chat_title: chat.chat_title.as_deref(),
                source_chat_username: chat.chat_username.as_deref(),
                source_chat_type: chat.chat_type.as_deref(),
                container_name: &name,
            },
        )
        .await?;

        let elaborations = self.elaboration_specs(reserved.id).await?;
        let worker_config = WorkerConfig {
            worker_kind: WorkerKind::Listener,
            api_id,
            phone: user.phone.clone(),
            chat_id: chat.chat_id,
            chat_title: chat.chat_title.clone(),
            chat_username: chat.chat_username.clone(),
            chat_type: chat.chat_type.clone(),
            database_dsn: self.worker_dsn.clone(),
            user_id,
            session_db_id: reserved.id,
            elaborations,
        };

        match self
            .launch(&name, &self.listener_image, "listener", user_id, reserved.id, &worker_config, &api_hash, &session_blob)
            .await
        {
            Ok(container_id) => {
                listeners::mark_running(&self.pool, reserved.id, &container_id).await?;
                tracing::info!(listener = reserved.id, container = %name, "listener worker started");
                listeners::get(&self.pool, reserved.id)
                    .await?
                    .ok_or(OrchestratorError::NotFound("listener"))
            }
            Err(e) => {
                self.bundles.wipe(&name).await;
                listeners::mark_error(&self.pool, reserved.id, &e.to_string()).await?;
                Err(e)
            }
        }
    }

    async fn elaboration_specs(&self, listener_id: i32) -> Result<Vec<ElaborationSpec>> {
        Ok(listeners::elaborations_for_listener(&self.pool, listener_id)
            .await?
            .into_iter()
            .filter(|e| e.is_active)
            .map(|e| ElaborationSpec {
                id: e.id,
                kind: e.kind,
                name: e.name,
                config: e.config,
                priority: e.priority,
            })
            .collect())
    }

    pub async fn stop_listener(&self, user_id: i32, listener_id: i32) -> Result<MessageListener> {
        let listener = listeners::get_owned(&self.pool, listener_id, user_id).await?;
        if !listener.is_active {
            return Ok(listener);
        }

        if let Some(name) = &listener.container_name {
            let lock = self.name_lock(name).await;
            let _guard = lock.lock().await;
            self.runtime.stop_and_remove(name, GRACE_STOP).await?;
            self.bundles.wipe(name).await;
        }
        listeners::mark_stopped(&self.pool, listener_id).await?;
        listeners::get(&self.pool, listener_id)
            .await?
            .ok_or(OrchestratorError::NotFound("listener"))
    }

    pub async fn remove_listener(&self, user_id: i32, listener_id: i32) -> Result<()> {
        self.stop_listener(user_id, listener_id).await?;
        listeners::delete(&self.pool, listener_id).await
    }

    /// Re-materialize the bundle and restart the container so a running
    /// worker picks up elaboration changes. No-op for inactive listeners.
    pub async fn refresh_listener(&self, user_id: i32, listener_id: i32) -> Result<()> {
        let listener = listeners::get_owned(&self.pool, listener_id, user_id).await?;
        if !listener.is_active {
            return Ok(());
        }
        let chat = ChatRef {
            chat_id: listener.source_chat_id,
            chat_title: listener.source_chat_title.clone(),
            chat_username: listener.source_chat_username.clone(),
            chat_type: listener.source_chat_type.clone(),
        };
        self.stop_listener(user_id, listener_id).await?;
        self.start_listener(user_id, chat).await?;
        Ok(())
    }

    // ===== Reaping =====

    /// Cross-check `running` rows against the actual containers; rows whose
    /// container vanished or exited move to `error` and lose their bundle.
    pub async fn reap_once(&self) -> Result<ReapReport> {
        let mut report = ReapReport::default();

        for session in sessions::list_running(&self.pool).await? {
            report.checked += 1;
            let Some(name) = session.container_name.clone() else {
                continue;
            };
            match self.runtime.inspect(&name).await? {
                Some(ContainerState::Running) => {}
                Some(ContainerState::Exited) => {
                    tracing::warn!(session = session.id, container = %name, "logging container exited");
                    sessions::mark_error(&self.pool, session.id, "container exited").await?;
                    self.runtime.stop_and_remove(&name, GRACE_STOP).await.ok();
                    self.bundles.wipe(&name).await;
                    report.reaped += 1;
                }
                None => {
                    tracing::warn!(session = session.id, container = %name, "logging container vanished");
                    sessions::mark_error(&self.pool, session.id, "container vanished").await?;
                    self.bundles.wipe(&name).await;
                    report.reaped += 1;
                }
            }
        }

        for listener in listeners::list_running(&self.pool).await? {
            report.checked += 1;
            let Some(name) = listener.container_name.clone() else {
                continue;
            };
            match self.runtime.inspect(&name).await? {
                Some(ContainerState::Running) => {}
                Some(ContainerState::Exited) => {
                    tracing::warn!(listener = listener.id, container = %name, "listener container exited");
                    listeners::mark_error(&self.pool, listener.id, "container exited").await?;
                    self.runtime.stop_and_remove(&name, GRACE_STOP).await.ok();
                    self.bundles.wipe(&name).await;
                    report.reaped += 1;
                }
                None => {
                    tracing::warn!(listener = listener.id, container = %name, "listener container vanished");
                    listeners::mark_error(&self.pool, listener.id, "container vanished").await?;
                    self.bundles.wipe(&name).await;
                    report.reaped += 1;
                }
            }
        }

        Ok(report)
    }
}
