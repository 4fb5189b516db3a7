use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use grammers_client::types::{LoginToken, PasswordToken};
use grammers_client::SignInError;
use sqlx::PgPool;
use tokio::sync::Mutex;
use tokio::time::timeout;

use super::errors::{classify_invocation, classify_sign_in};
use super::manager::ClientManager;
use super::registry::ClientHandle;
use super::{SendCodeOutcome, VerifyOutcome};
use crate::db::users::{self, User};
use crate::error::{OrchestratorError, Result};

/// Telegram treats a login code as valid for about two minutes; the cache
/// mirrors that window.
const CODE_TTL: Duration = Duration::from_secs(120);

/// Per-phone record that a login code is in flight.
struct PendingCode {
    login_token: Option<LoginToken>,
    password_token: Option<PasswordToken>,
    /// Last code the user submitted, exposed by check-cached-code so the
    /// frontend can offer it for reuse inside the validity window.
    code: Option<String>,
    expires_at: Instant,
    attempts: u32,
}

impl PendingCode {
    fn expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// The send-code / verify-code / 2FA state machine. All transitions for one
/// phone run under the registry's single-flight lock; the cache itself is
/// only touched in short critical sections.
pub struct AuthFlow {
    manager: Arc<ClientManager>,
    pool: PgPool,
    pending: Mutex<HashMap<String, PendingCode>>,
    request_timeout: Duration,
}

impl AuthFlow {
    pub fn new(manager: Arc<ClientManager>, pool: PgPool, request_timeout: Duration) -> Self {
        Self {
            manager,
            pool,
            pending: Mutex::new(HashMap::new()),
            request_timeout,
        }
    }

    async fn user(&self, phone: &str) -> Result<User> {
        users::find_by_phone(&self.pool, phone)
            .await?
            .ok_or(OrchestratorError::UnknownUser)
    }

    /// Ask Telegram for a login code, unless one is already pending and the
    /// caller did not force a fresh one. Transport disconnects get exactly
    /// one retry after evicting the client.
    pub async fn send_code(&self, phone: &str, force_new: bool) -> Result<SendCodeOutcome> {
        let user = self.user(phone).await?;
        let lock = self.manager.registry.lock_for(phone).await;
        let _guard = lock.lock().await;

        {
            let mut pending = self.pending.lock().await;
            match pending.get(phone) {
                Some(entry) if !entry.expired() && !force_new => {
                    return Ok(SendCodeOutcome::CachedCodeAvailable);
                }
                Some(_) => {
                    pending.remove(phone);
                }
                None => {}
            }
        }

        let (_, api_hash) = self.manager.credentials_of(&user)?;

        let mut retried = false;
        let token = loop {
            let handle = self.manager.ensure_client_connected(&user).await?;
            let sent = timeout(
                self.request_timeout,
                handle.built.client.request_login_code(phone, &api_hash),
            )
            .await;

            match sent {
                Ok(Ok(token)) => break token,
                Ok(Err(e)) => {
                    let classified = classify_invocation(&e);
                    match classified {
                        OrchestratorError::FloodWait(secs) => {
                            tracing::warn!(phone, secs, "flood wait on send code");
                            return Err(classified);
                        }
                        OrchestratorError::TransportDisconnected if !retried => {
                            tracing::warn!(phone, "send code hit a disconnect, evicting and retrying once");
                            self.manager.dispose_client(phone).await;
                            retried = true;
                        }
                        OrchestratorError::Validation(_)
                        | OrchestratorError::CredentialsInvalid => return Err(classified),
                        _ => {
                            return Err(OrchestratorError::SendCodeFailed(classified.to_string()))
                        }
                    }
                }
                Err(_) => {
                    // A timed-out request leaves the connection in an
                    // unknown state; evict so nothing reuses it half-open.
                    self.manager.dispose_client(phone).await;
                    return Err(OrchestratorError::Timeout);
                }
            }
        };

        self.pending.lock().await.insert(
            phone.to_string(),
            PendingCode {
                login_token: Some(token),
                password_token: None,
                code: None,
                expires_at: Instant::now() + CODE_TTL,
                attempts: 0,
            },
        );

        tracing::info!(phone, "login code sent");
        Ok(SendCodeOutcome::CodeSent)
    }

    /// Complete sign-in with the SMS code, optionally finishing the 2FA
    /// step in the same call when `password` is given.
    pub async fn verify_code(
        &self,
        phone: &str,
        code: &str,
        password: Option<&str>,
    ) -> Result<VerifyOutcome> {
        let code = code.trim();
        if code.is_empty() {
            return Err(OrchestratorError::Validation("codice mancante".into()));
        }

        let user = self.user(phone).await?;
        let lock = self.manager.registry.lock_for(phone).await;
        let _guard = lock.lock().await;

        // Pull the tokens out so no cache lock is held across awaits; they
        // are restored on retryable failures so the user can try again.
        let (login_token, password_token) = {
            let mut pending = self.pending.lock().await;
            let entry = pending
                .get_mut(phone)
                .filter(|e| !e.expired())
                .ok_or(OrchestratorError::CodeExpired)?;
            entry.code = Some(code.to_string());
            entry.attempts += 1;
            (entry.login_token.take(), entry.password_token.take())
        };

        if let Some(token) = password_token {
            // Already past the code step, only the 2FA password is missing.
            let password = match password {
                Some(p) if !p.trim().is_empty() => p.trim(),
                _ => {
                    self.restore_password_token(phone, token).await;
                    return Err(OrchestratorError::Needs2Fa);
                }
            };
            return self.finish_with_password(&user, phone, token, password).await;
        }

        let Some(token) = login_token else {
            return Err(OrchestratorError::CodeExpired);
        };

        let handle = self.manager.ensure_client_connected(&user).await?;
        let signed_in = timeout(
            self.request_timeout,
            handle.built.client.sign_in(&token, code),
        )
        .await;

        match signed_in {
            Ok(Ok(me)) => {
                tracing::info!(phone, user_id = me.raw.id(), "sign in ok");
                self.complete_authorization(&user, phone, &handle).await?;
                Ok(VerifyOutcome::Authorized)
            }
            Ok(Err(SignInError::PasswordRequired(pwd_token))) => {
                tracing::info!(phone, "2fa required");
                match password {
                    Some(p) if !p.trim().is_empty() => {
                        self.finish_with_password(&user, phone, pwd_token, p.trim()).await
                    }
                    _ => {
                        self.restore_password_token(phone, pwd_token).await;
                        Ok(VerifyOutcome::PasswordRequired)
                    }
                }
            }
            Ok(Err(SignInError::InvalidCode)) => {
                tracing::warn!(phone, code = %mask_code(code), "invalid login code");
                self.restore_login_token(phone, token).await;
                Err(OrchestratorError::CodeInvalid)
            }
            Ok(Err(other)) => {
                let classified = classify_sign_in(other);
                if matches!(classified, OrchestratorError::CodeExpired) {
                    self.pending.lock().await.remove(phone);
                } else {
                    self.restore_login_token(phone, token).await;
                }
                Err(classified)
            }
            Err(_) => {
                self.manager.dispose_client(phone).await;
                self.restore_login_token(phone, token).await;
                Err(OrchestratorError::Timeout)
            }
        }
    }

    async fn finish_with_password(
        &self,
        user: &User,
        phone: &str,
        token: PasswordToken,
        password: &str,
    ) -> Result<VerifyOutcome> {
        let handle = self.manager.ensure_client_connected(user).await?;
        // PasswordToken clones so a failed check can be retried.
        let retry_token = token.clone();
        let checked = timeout(
            self.request_timeout,
            handle.built.client.check_password(token, password.as_bytes()),
        )
        .await;

        match checked {
            Ok(Ok(_me)) => {
                tracing::info!(phone, "2fa password accepted");
                self.complete_authorization(user, phone, &handle).await?;
                Ok(VerifyOutcome::Authorized)
            }
            Ok(Err(SignInError::InvalidPassword)) => {
                self.restore_password_token(phone, retry_token).await;
                Err(OrchestratorError::TwoFaPasswordInvalid)
            }
            Ok(Err(other)) => {
                self.restore_password_token(phone, retry_token).await;
                Err(classify_sign_in(other))
            }
            Err(_) => {
                self.manager.dispose_client(phone).await;
                self.restore_password_token(phone, retry_token).await;
                Err(OrchestratorError::Timeout)
            }
        }
    }

    async fn complete_authorization(
        &self,
        user: &User,
        phone: &str,
        handle: &Arc<ClientHandle>,
    ) -> Result<()> {
        handle.set_authorized(true);
        self.manager.persist_session(user.id, handle).await?;
        users::touch_last_login(&self.pool, user.id).await?;
        self.pending.lock().await.remove(phone);
        Ok(())
    }

    async fn restore_login_token(&self, phone: &str, token: LoginToken) {
        let mut pending = self.pending.lock().await;
        if let Some(entry) = pending.get_mut(phone) {
            entry.login_token = Some(token);
        }
    }

    async fn restore_password_token(&self, phone: &str, token: PasswordToken) {
        let mut pending = self.pending.lock().await;
        if let Some(entry) = pending.get_mut(phone) {
            entry.password_token = Some(token);
        }
    }

    /// Rehydrate a client from the stored blob and report whether the
    /// account is still authorized. Revoked authorizations are cleared by
    /// the manager on the way through.
    pub async fn reactivate(&self, phone: &str) -> Result<bool> {
        let user = self.user(phone).await?;
        if user.telegram_session.is_none() {
            return Ok(false);
        }
        let lock = self.manager.registry.lock_for(phone).await;
        let _guard = lock.lock().await;
        let handle = self.manager.ensure_client_connected(&user).await?;
        Ok(handle.authorized())
    }

    /// `(has_cached_code, cached_code)` for the HTTP layer. The literal code
    /// is only known once the user has submitted it at least once.
    pub async fn cached_code(&self, phone: &str) -> (bool, Option<String>) {
        let mut pending = self.pending.lock().await;
        match pending.get(phone) {
            Some(entry) if !entry.expired() => (true, entry.code.clone()),
            Some(_) => {
                pending.remove(phone);
                (false, None)
            }
            None => (false, None),
        }
    }

    pub async fn clear_cached_code(&self, phone: &str) -> bool {
        self.pending.lock().await.remove(phone).is_some()
    }

    /// Expired-entry sweep for the cleanup loop.
    pub async fn sweep_expired_codes(&self) -> usize {
        let mut pending = self.pending.lock().await;
        let before = pending.len();
        pending.retain(|_, entry| !entry.expired());
        before - pending.len()
    }
}

/// Never log a full login code.
fn mask_code(code: &str) -> String {
    if code.len() <= 2 {
        "**".to_string()
    } else {
        format!("{}***{}", &code[0..1], &code[code.len() - 1..])
    }
}
