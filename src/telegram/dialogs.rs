use std::time::Duration;

use grammers_client::types::Peer;
use grammers_client::Client;
use tokio::time::timeout;

use super::errors::classify_invocation;
use super::ChatInfo;
use crate::error::{OrchestratorError, Result};

/// Fetch the caller's dialogs: users, bots, groups and channels. Requires an
/// authorized client; the HTTP layer turns `AuthorizationLost` into the
/// `TELEGRAM_SESSION_EXPIRED` error code.
pub async fn list_chats(client: &Client, request_timeout: Duration) -> Result<Vec<ChatInfo>> {
    let mut chats = Vec::new();
    let mut dialogs = client.iter_dialogs();

    loop {
        let next = timeout(request_timeout, dialogs.next())
            .await
            .map_err(|_| OrchestratorError::Timeout)?;
        let dialog = match next {
            Ok(Some(dialog)) => dialog,
            Ok(None) => break,
            Err(e) => return Err(classify_invocation(&e)),
        };

        let peer = dialog.peer();
        chats.push(ChatInfo {
            id: peer.id().bot_api_dialog_id(),
            title: peer.name().map(|s| s.to_string()),
            username: peer.username().map(|s| s.to_string()),
            chat_type: peer_kind(&peer).to_string(),
        });
    }

    Ok(chats)
}

fn peer_kind(peer: &Peer) -> &'static str {
    match peer {
        Peer::User(_) => "user",
        Peer::Group(_) => "group",
        Peer::Channel(_) => "channel",
    }
}
