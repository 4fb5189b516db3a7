use grammers_client::SignInError;
use grammers_mtsender::InvocationError;

use crate::error::OrchestratorError;

/// Map a grammers invocation failure onto the orchestrator taxonomy.
///
/// The classification drives recovery: transport disconnects are the only
/// class retried (once, after evicting the client); flood waits surface the
/// cool-down seconds and are never retried; auth-key errors clear the stored
/// session blob.
pub fn classify_invocation(err: &InvocationError) -> OrchestratorError {
    if let InvocationError::Rpc(rpc) = err {
        if rpc.name.starts_with("FLOOD_WAIT") || rpc.name.starts_with("FLOOD_PREMIUM_WAIT") {
            return OrchestratorError::FloodWait(rpc.value.unwrap_or(0));
        }
        if rpc.name == "AUTH_KEY_UNREGISTERED"
            || rpc.name == "SESSION_REVOKED"
            || rpc.name == "SESSION_EXPIRED"
            || rpc.name == "USER_DEACTIVATED"
        {
            return OrchestratorError::AuthorizationLost;
        }
        if rpc.name == "API_ID_INVALID" || rpc.name == "API_ID_PUBLISHED_FLOOD" {
            return OrchestratorError::CredentialsInvalid;
        }
        if rpc.name == "PHONE_CODE_INVALID" {
            return OrchestratorError::CodeInvalid;
        }
        if rpc.name == "PHONE_CODE_EXPIRED" {
            return OrchestratorError::CodeExpired;
        }
        if rpc.name == "SESSION_PASSWORD_NEEDED" {
            return OrchestratorError::Needs2Fa;
        }
        if rpc.name == "PASSWORD_HASH_INVALID" {
            return OrchestratorError::TwoFaPasswordInvalid;
        }
        if rpc.name == "PHONE_NUMBER_INVALID" || rpc.name == "PHONE_NUMBER_BANNED" {
            return OrchestratorError::Validation("numero di telefono non valido".into());
        }
        return OrchestratorError::Telegram(rpc.name.clone());
    }

    // Below the RPC layer only transport-shaped failures remain. grammers
    // reports them with messages like "connection dropped", "not connected"
    // or "cannot send requests while disconnected".
    let text = err.to_string().to_lowercase();
    if text.contains("dropped")
        || text.contains("disconnect")
        || text.contains("not connected")
        || text.contains("cannot send")
        || text.contains("connection")
        || text.contains("read error")
    {
        OrchestratorError::TransportDisconnected
    } else {
        OrchestratorError::Telegram(err.to_string())
    }
}

/// Map a sign-in failure. `PasswordRequired` is not an error for the caller,
/// so the password token is handed back separately.
pub fn classify_sign_in(err: SignInError) -> OrchestratorError {
    match err {
        SignInError::InvalidCode => OrchestratorError::CodeInvalid,
        SignInError::InvalidPassword => OrchestratorError::TwoFaPasswordInvalid,
        SignInError::SignUpRequired { .. } => {
            OrchestratorError::Validation("numero non registrato su Telegram".into())
        }
        SignInError::PasswordRequired(_) => OrchestratorError::Needs2Fa,
        SignInError::Other(inner) => classify_invocation(&inner),
    }
}
