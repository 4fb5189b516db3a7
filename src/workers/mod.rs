//! Worker-side plumbing shared by the logger and listener binaries. Workers
//! run in isolated containers, read their bundle from `/bundle`, connect to
//! Telegram with the supplied session and write straight to Postgres; they
//! never call back into the orchestrator.

pub mod listener;
pub mod logger;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use grammers_client::grammers_tl_types as tl;
use grammers_client::types::{Media, Message, Peer};
use serde::{Deserialize, Serialize};

use crate::error::{OrchestratorError, Result};
use crate::telegram::client::{self, BuiltClient};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerKind {
    Logger,
    Listener,
}

/// Ordered elaboration snapshot shipped to a listener worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElaborationSpec {
    pub id: i32,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub config: serde_json::Value,
    pub priority: i32,
}

/// `config.json` inside a worker bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    pub worker_kind: WorkerKind,
    pub api_id: i32,
    pub phone: String,
    pub chat_id: i64,
    pub chat_title: Option<String>,
    pub chat_username: Option<String>,
    pub chat_type: Option<String>,
    pub database_dsn: String,
    pub user_id: i32,
    /// Row id of the logging session or listener this worker serves.
    pub session_db_id: i32,
    #[serde(default)]
    pub elaborations: Vec<ElaborationSpec>,
}

/// A loaded bundle: parsed config plus the raw session bytes.
pub struct Bundle {
    pub config: WorkerConfig,
    pub session_blob: Vec<u8>,
}

/// Bundle location: explicit argument, `BUNDLE_DIR`, or the mount default.
pub fn bundle_dir_from_env() -> PathBuf {
    std::env::args()
        .nth(1)
        .or_else(|| std::env::var("BUNDLE_DIR").ok())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/bundle"))
}

pub fn load_bundle(dir: &Path) -> Result<Bundle> {
    let config_raw = std::fs::read(dir.join("config.json"))
        .map_err(|e| OrchestratorError::Internal(format!("bundle config unreadable: {e}")))?;
    let config: WorkerConfig = serde_json::from_slice(&config_raw)
        .map_err(|e| OrchestratorError::Internal(format!("bundle config invalid: {e}")))?;
    let session_blob = std::fs::read(dir.join("session.session"))
        .map_err(|e| OrchestratorError::Internal(format!("bundle session unreadable: {e}")))?;
    Ok(Bundle {
        config,
        session_blob,
    })
}

/// Build a client from the bundle session and verify the authorization is
/// still live. A revoked session is fatal: the worker exits non-zero and the
/// reaper marks the row failed; the owner re-authenticates.
pub async fn connect_from_bundle(bundle: &Bundle) -> Result<BuiltClient> {
    let session = Arc::new(client::load_session(&bundle.session_blob)?);
    let built = client::build_client(session, bundle.config.api_id);

    let authorized = built
        .client
        .is_authorized()
        .await
        .map_err(|e| crate::telegram::errors::classify_invocation(&e))?;
    if !authorized {
        client::dispose(&built);
        return Err(OrchestratorError::AuthorizationLost);
    }
    Ok(built)
}

/// `(message_type, media_file_id)` for a captured message.
pub fn classify_media(message: &Message) -> (&'static str, Option<String>) {
    match message.media() {
        None => ("text", None),
        Some(Media::Photo(photo)) => {
            let id = match &photo.raw.photo {
                Some(tl::enums::Photo::Photo(p)) => Some(p.id.to_string()),
                _ => None,
            };
            ("photo", id)
        }
        Some(Media::Document(doc)) => {
            let id = match &doc.raw.document {
                Some(tl::enums::Document::Document(d)) => Some(d.id.to_string()),
                _ => None,
            };
            ("document", id)
        }
        Some(_) => ("other", None),
    }
}

/// Sender metadata `(id, display name, username)`.
pub fn sender_info(message: &Message) -> (Option<i64>, Option<String>, Option<String>) {
    match message.sender() {
        Some(sender) => (
            Some(sender.id().bot_api_dialog_id()),
            sender.name().map(|s| s.to_string()),
            sender.username().map(|s| s.to_string()),
        ),
        None => (None, None, None),
    }
}

/// Bot-API style id of the chat a message belongs to, when resolvable.
pub fn message_chat_id(message: &Message) -> Option<i64> {
    message
        .peer()
        .ok()
        .map(|peer: Peer| peer.id().bot_api_dialog_id())
}
