//! JSON HTTP surface consumed by the frontend proxy. Handlers never touch a
//! Telegram client directly: anything asynchronous on the Telegram side goes
//! through the bridge, anything container-shaped through the supervisor.

pub mod auth;
pub mod forwarders;
pub mod health;
pub mod jwt;
pub mod logging;
pub mod responses;
pub mod telegram;

use std::sync::Arc;

use axum::routing::{delete, get, post, put};
use axum::Router;
use sqlx::PgPool;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::crypto::CredentialStore;
use crate::metrics::LoginMetrics;
use crate::supervisor::WorkerSupervisor;
use crate::telegram::bridge::TelegramBridge;
use jwt::JwtKeys;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub bridge: TelegramBridge,
    pub supervisor: Arc<WorkerSupervisor>,
    pub metrics: Arc<LoginMetrics>,
    pub crypto: CredentialStore,
    pub jwt: JwtKeys,
    /// Platform defaults for users who register without their own api pair.
    pub default_api_id: Option<i32>,
    pub default_api_hash: Option<String>,
}

impl AppState {
    pub fn new(
        config: &Config,
        pool: PgPool,
        bridge: TelegramBridge,
        supervisor: Arc<WorkerSupervisor>,
        crypto: CredentialStore,
    ) -> Self {
        Self {
            pool,
            bridge,
            supervisor,
            metrics: Arc::new(LoginMetrics::new()),
            crypto,
            jwt: JwtKeys::new(&config.jwt_secret, config.session_timeout),
            default_api_id: config.telegram_api_id,
            default_api_hash: config.telegram_api_hash.clone(),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Auth & session
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/verify-code", post(auth::verify_code))
        .route("/api/auth/check-cached-code", get(auth::check_cached_code))
        .route("/api/auth/clear-cached-code", post(auth::clear_cached_code))
        .route("/api/auth/validate-session", get(auth::validate_session))
        .route("/api/auth/reactivate-session", post(auth::reactivate_session))
        .route("/api/auth/verify-session-code", post(auth::verify_session_code))
        .route("/api/auth/update-credentials", put(auth::update_credentials))
        .route("/api/auth/change-password", post(auth::change_password))
        // Telegram browsing
        .route("/api/telegram/get-chats", get(telegram::get_chats))
        // Logging pipeline
        .route(
            "/api/logging/sessions",
            get(logging::list_sessions).post(logging::start_session),
        )
        .route("/api/logging/sessions/:id/stop", post(logging::stop_session))
        .route("/api/logging/sessions/:id", delete(logging::remove_session))
        .route("/api/logging/messages/:session_id", get(logging::list_messages))
        .route("/api/logging/chat/:chat_id/status", get(logging::chat_status))
        // Listener / elaboration pipeline
        .route(
            "/api/forwarders/listeners",
            get(forwarders::list_listeners).post(forwarders::start_listener),
        )
        .route(
            "/api/forwarders/listeners/:id/stop",
            post(forwarders::stop_listener),
        )
        .route(
            "/api/forwarders/listeners/:id",
            delete(forwarders::remove_listener),
        )
        .route(
            "/api/forwarders/listeners/:id/elaborations",
            get(forwarders::list_elaborations).post(forwarders::add_elaboration),
        )
        .route(
            "/api/forwarders/listeners/:id/elaborations/:eid",
            delete(forwarders::remove_elaboration),
        )
        .route(
            "/api/forwarders/listeners/:id/messages",
            get(forwarders::list_saved_messages),
        )
        // Observability
        .route("/health", get(health::liveness))
        .route(
            "/api/metrics/login-performance",
            get(health::login_performance),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
