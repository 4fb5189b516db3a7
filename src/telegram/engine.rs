use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use super::auth::AuthFlow;
use super::dialogs;
use super::manager::ClientManager;
use super::registry::SessionRegistry;
use super::{ChatInfo, SendCodeOutcome, VerifyOutcome};
use crate::config::Config;
use crate::crypto::CredentialStore;
use crate::db::users;
use crate::error::{OrchestratorError, Result};

/// The scheduling-domain side of the bridge: owns the registry, the client
/// manager and the auth flow. Every method is executed on the bridge's
/// runtime, never on the HTTP runtime.
pub struct TelegramEngine {
    pub registry: Arc<SessionRegistry>,
    pub manager: Arc<ClientManager>,
    pub auth: AuthFlow,
    pool: PgPool,
    request_timeout: Duration,
    client_ttl: Duration,
}

impl TelegramEngine {
    pub fn new(config: &Config, pool: PgPool, crypto: CredentialStore) -> Self {
        let registry = Arc::new(SessionRegistry::new());
        let manager = Arc::new(ClientManager::new(
            Arc::clone(&registry),
            pool.clone(),
            crypto,
            config.connection_timeout,
            config.client_cache_ttl,
        ));
        let auth = AuthFlow::new(Arc::clone(&manager), pool.clone(), config.request_timeout);
        Self {
            registry,
            manager,
            auth,
            pool,
            request_timeout: config.request_timeout,
            client_ttl: config.client_cache_ttl,
        }
    }

    pub async fn send_code(&self, phone: &str, force_new: bool) -> Result<SendCodeOutcome> {
        self.auth.send_code(phone, force_new).await
    }

    pub async fn verify_code(
        &self,
        phone: &str,
        code: &str,
        password: Option<&str>,
    ) -> Result<VerifyOutcome> {
        self.auth.verify_code(phone, code, password).await
    }

    pub async fn reactivate(&self, phone: &str) -> Result<bool> {
        self.auth.reactivate(phone).await
    }

    pub async fn cached_code(&self, phone: &str) -> (bool, Option<String>) {
        self.auth.cached_code(phone).await
    }

    pub async fn clear_cached_code(&self, phone: &str) -> bool {
        self.auth.clear_cached_code(phone).await
    }

    /// Dialogs of an authorized user. A revoked authorization clears the
    /// stored blob so the frontend can route the user back to login.
    pub async fn get_chats(&self, phone: &str) -> Result<Vec<ChatInfo>> {
        let user = users::find_by_phone(&self.pool, phone)
            .await?
            .ok_or(OrchestratorError::UnknownUser)?;
        if user.api_id.is_none() || user.api_hash.is_none() {
            return Err(OrchestratorError::MissingCredentials);
        }
        if user.telegram_session.is_none() {
            return Err(OrchestratorError::AuthorizationLost);
        }

        let lock = self.registry.lock_for(phone).await;
        let _guard = lock.lock().await;

        let handle = self.manager.ensure_client_connected(&user).await?;
        if !handle.authorized() {
            users::clear_telegram_session(&self.pool, user.id).await?;
            self.manager.dispose_client(phone).await;
            return Err(OrchestratorError::AuthorizationLost);
        }

        match dialogs::list_chats(&handle.built.client, self.request_timeout).await {
            Err(OrchestratorError::AuthorizationLost) => {
                tracing::warn!(phone, "authorization revoked while listing chats");
                users::clear_telegram_session(&self.pool, user.id).await?;
                self.manager.dispose_client(phone).await;
                Err(OrchestratorError::AuthorizationLost)
            }
            Err(OrchestratorError::TransportDisconnected) => {
                self.manager.dispose_client(phone).await;
                Err(OrchestratorError::ConnectUnavailable)
            }
            other => other,
        }
    }

    pub async fn disconnect(&self, phone: &str) {
        self.manager.dispose_client(phone).await;
    }

    /// One sweep of the registry and the pending-code cache; called by the
    /// cleanup loop through the bridge.
    pub async fn sweep(&self) -> usize {
        let evicted = self.registry.evict_expired(self.client_ttl).await;
        let codes = self.auth.sweep_expired_codes().await;
        if evicted > 0 || codes > 0 {
            tracing::debug!(evicted, codes, "sweep pass done");
        }
        evicted
    }

    pub async fn shutdown(&self) {
        self.registry.evict_all().await;
    }
}
