use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;
use tokio::time::timeout;

#[allow(deprecated)]
use grammers_session::storages::TlSession;

use super::client::{self, build_client};
use super::errors::classify_invocation;
use super::registry::{ClientHandle, SessionRegistry};
use crate::crypto::CredentialStore;
use crate::db::users::{self, User};
use crate::error::{OrchestratorError, Result};

/// Health-probe budget; the probe is advisory, not a gate.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);
const RETRY_PAUSE: Duration = Duration::from_secs(1);
const MAX_ATTEMPTS: u32 = 3;

/// Creates, connects, probes and disposes clients. The single entry point
/// for "give me a usable client for this phone"; callers hold the phone's
/// single-flight lock from the registry before calling in.
pub struct ClientManager {
    pub registry: Arc<SessionRegistry>,
    pool: PgPool,
    crypto: CredentialStore,
    connect_timeout: Duration,
    client_ttl: Duration,
}

impl ClientManager {
    pub fn new(
        registry: Arc<SessionRegistry>,
        pool: PgPool,
        crypto: CredentialStore,
        connect_timeout: Duration,
        client_ttl: Duration,
    ) -> Self {
        Self {
            registry,
            pool,
            crypto,
            connect_timeout,
            client_ttl,
        }
    }

    /// Decrypted `(api_id, api_hash)` for a user, or the credential errors
    /// the auth flow surfaces verbatim.
    pub fn credentials_of(&self, user: &User) -> Result<(i32, String)> {
        let api_id = user.api_id.ok_or(OrchestratorError::MissingCredentials)?;
        let wrapped = user
            .api_hash
            .as_ref()
            .ok_or(OrchestratorError::MissingCredentials)?;
        let api_hash = self.crypto.unwrap_str(wrapped)?;
        Ok((api_id, api_hash))
    }

    /// Cached-or-new connected client for `phone`. Up to three attempts;
    /// each failed attempt fully disconnects before pausing and retrying.
    pub async fn ensure_client_connected(&self, user: &User) -> Result<Arc<ClientHandle>> {
        if let Some(handle) = self.registry.get_fresh(&user.phone, self.client_ttl).await {
            return Ok(handle);
        }

        let (api_id, _api_hash) = self.credentials_of(user)?;
        let mut session_blob: Option<Vec<u8>> = match &user.telegram_session {
            Some(wrapped) => Some(self.crypto.unwrap(wrapped)?),
            None => None,
        };

        let mut attempt = 0u32;
        while attempt < MAX_ATTEMPTS {
            attempt += 1;

            #[allow(deprecated)]
            let session = match &session_blob {
                Some(blob) => Arc::new(client::load_session(blob)?),
                None => Arc::new(TlSession::new()),
            };
            let built = build_client(session, api_id);

            // First round-trip drives the actual connection; bounded by the
            // configured connect timeout.
            let authorized = match timeout(self.connect_timeout, built.client.is_authorized()).await
            {
                Ok(Ok(authorized)) => authorized,
                Ok(Err(e)) => {
                    let classified = classify_invocation(&e);
                    client::dispose(&built);
                    match classified {
                        OrchestratorError::FloodWait(_)
                        | OrchestratorError::CredentialsInvalid => return Err(classified),
                        _ => {
                            tracing::warn!(phone = %user.phone, attempt, error = %e, "connect attempt failed");
                            tokio::time::sleep(RETRY_PAUSE).await;
                            continue;
                        }
                    }
                }
                Err(_) => {
                    client::dispose(&built);
                    tracing::warn!(phone = %user.phone, attempt, "connect attempt timed out");
                    tokio::time::sleep(RETRY_PAUSE).await;
                    continue;
                }
            };

            if !authorized {
                // Unauthorized is not a failure: send-code still works on
                // this client. A stale blob that no longer authorizes is
                // cleared so reconnects start from a clean session.
                if session_blob.take().is_some() {
                    tracing::info!(phone = %user.phone, "stored session no longer authorizes, clearing blob");
                    users::clear_telegram_session(&self.pool, user.id).await?;
                    client::dispose(&built);
                    continue;
                }
                let handle = ClientHandle::new(built, false);
                return Ok(self.registry.insert(&user.phone, handle).await);
            }

            // Advisory who-am-I probe.
            match timeout(PROBE_TIMEOUT, built.client.get_me()).await {
                Ok(Ok(_me)) => {
                    let handle = ClientHandle::new(built, true);
                    return Ok(self.registry.insert(&user.phone, handle).await);
                }
                Ok(Err(e)) => match classify_invocation(&e) {
                    OrchestratorError::AuthorizationLost => {
                        tracing::warn!(phone = %user.phone, "authorization revoked, clearing stored session");
                        users::clear_telegram_session(&self.pool, user.id).await?;
                        client::dispose(&built);
                        session_blob = None;
                        continue;
                    }
                    OrchestratorError::FloodWait(secs) => {
                        client::dispose(&built);
                        return Err(OrchestratorError::FloodWait(secs));
                    }
                    other => {
                        tracing::warn!(phone = %user.phone, attempt, error = %other, "health probe failed");
                        client::dispose(&built);
                        tokio::time::sleep(RETRY_PAUSE).await;
                        continue;
                    }
                },
                Err(_) => {
                    tracing::warn!(phone = %user.phone, attempt, "health probe timed out");
                    client::dispose(&built);
                    tokio::time::sleep(RETRY_PAUSE).await;
                    continue;
                }
            }
        }

        Err(OrchestratorError::ConnectUnavailable)
    }

    /// Persist the current session blob (wrapped) after authorization.
    pub async fn persist_session(&self, user_id: i32, handle: &ClientHandle) -> Result<()> {
        let blob = client::save_session(&handle.built.session);
        let wrapped = self.crypto.wrap(&blob)?;
        users::store_telegram_session(&self.pool, user_id, &wrapped).await
    }

    /// Evict + dispose, used after unrecoverable error classes and on
    /// explicit disconnect. Idempotent.
    pub async fn dispose_client(&self, phone: &str) {
        self.registry.evict(phone).await;
    }
}
