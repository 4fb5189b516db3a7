//! Telegram client ownership. Everything that touches a live grammers
//! client lives under this module and executes on the bridge's scheduler;
//! the HTTP layer only ever sees `TelegramBridge` and typed results.

pub mod auth;
pub mod bridge;
pub mod client;
pub mod dialogs;
pub mod engine;
pub mod errors;
pub mod manager;
pub mod registry;

use serde::{Deserialize, Serialize};

/// One dialog of the caller, as served by `GET /api/telegram/get-chats`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatInfo {
    pub id: i64,
    pub title: Option<String>,
    pub username: Option<String>,
    pub chat_type: String,
}

/// Outcome of a send-code request.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum SendCodeOutcome {
    /// Telegram was asked for a fresh code.
    CodeSent,
    /// A pending code from a previous send is still valid; no new request
    /// was made to Telegram.
    CachedCodeAvailable,
}

/// Outcome of a verify-code request.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum VerifyOutcome {
    Authorized,
    /// The account has two-step verification enabled and no password was
    /// supplied; the caller must repeat the request with one.
    PasswordRequired,
}

/// Sanitized chat reference used in container names. Telegram supergroup
/// ids carry a `-100` prefix and plain group ids a `-`; the name keeps only
/// the digits so `-1001234567890` becomes `1001234567890`.
pub fn sanitize_chat_id(chat_id: i64) -> String {
    chat_id.unsigned_abs().to_string()
}
