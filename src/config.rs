use std::env;
use std::path::PathBuf;
use std::time::Duration;

use base64::Engine;

/// Process configuration, read once at bring-up. Dev builds load `.env`
/// first (dotenv does not override real environment variables).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    /// 32-byte key for the credential store, from base64 `ENCRYPTION_KEY`.
    pub encryption_key: Vec<u8>,
    /// Platform-level Telegram credentials used as defaults at registration
    /// when the user does not bring their own.
    pub telegram_api_id: Option<i32>,
    pub telegram_api_hash: Option<String>,
    /// JWT lifetime.
    pub session_timeout: Duration,
    pub connection_timeout: Duration,
    pub request_timeout: Duration,
    pub client_cache_ttl: Duration,
    pub forwarder_project_name: String,
    /// Host directory under which per-worker bundles are materialized.
    pub configs_path: PathBuf,
    pub docker_host: Option<String>,
    pub bind_addr: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenv::dotenv();

        let database_url = require("DATABASE_URL")?;
        let jwt_secret = require("JWT_SECRET_KEY")?;

        let encryption_key = base64::engine::general_purpose::STANDARD
            .decode(require("ENCRYPTION_KEY")?)
            .map_err(|e| ConfigError::Invalid("ENCRYPTION_KEY", e.to_string()))?;
        if encryption_key.len() != 32 {
            return Err(ConfigError::Invalid(
                "ENCRYPTION_KEY",
                format!("expected 32 bytes after base64 decode, got {}", encryption_key.len()),
            ));
        }

        let telegram_api_id = match env::var("TELEGRAM_API_ID") {
            Ok(raw) => Some(
                raw.parse::<i32>()
                    .map_err(|e| ConfigError::Invalid("TELEGRAM_API_ID", e.to_string()))?,
            ),
            Err(_) => None,
        };
        let telegram_api_hash = env::var("TELEGRAM_API_HASH").ok().filter(|h| !h.is_empty());

        // REDIS_HOST / REDIS_PORT / REDIS_DB are recognized but unused: the
        // orchestrator runs without Redis and keeps all caches in-process.
        if env::var("REDIS_HOST").is_ok() {
            tracing::info!("REDIS_HOST set but ignored, in-process caches are used");
        }

        Ok(Self {
            database_url,
            jwt_secret,
            encryption_key,
            telegram_api_id,
            telegram_api_hash,
            session_timeout: secs_or("SESSION_TIMEOUT", 86_400)?,
            connection_timeout: secs_or("TELEGRAM_CONNECTION_TIMEOUT", 8)?,
            request_timeout: secs_or("TELEGRAM_REQUEST_TIMEOUT", 8)?,
            client_cache_ttl: secs_or("CLIENT_CACHE_TTL", 300)?,
            forwarder_project_name: env::var("FORWARDER_PROJECT_NAME")
                .unwrap_or_else(|_| "solanagram".to_string()),
            configs_path: env::var("SOLANAGRAM_CONFIGS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("/var/lib/solanagram/configs")),
            docker_host: env::var("DOCKER_HOST").ok(),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string()),
        })
    }

    /// Worker image for a given worker type, derived from the project name.
    pub fn worker_image(&self, worker_type: &str) -> String {
        format!("{}-{}-worker:latest", self.forwarder_project_name, worker_type)
    }
}

fn require(key: &'static str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::Missing(key))
}

fn secs_or(key: &'static str, default: u64) -> Result<Duration, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| ConfigError::Invalid(key, e.to_string())),
        Err(_) => Ok(Duration::from_secs(default)),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("{0} is invalid: {1}")]
    Invalid(&'static str, String),
}
