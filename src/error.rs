use thiserror::Error;

/// Error taxonomy for the orchestrator. Every failure surfaced to an HTTP
/// caller or a worker maps to one of these kinds; the HTTP layer derives the
/// status code, the stable machine `error_code` and the localized message
/// from the variant alone.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    // Validation
    #[error("invalid request: {0}")]
    Validation(String),

    // Authentication
    #[error("unknown user")]
    UnknownUser,
    #[error("invalid password")]
    PasswordRejected,
    #[error("invalid or expired token")]
    JwtInvalid,
    #[error("telegram authorization lost")]
    AuthorizationLost,

    // Credentials
    #[error("telegram api credentials not set")]
    MissingCredentials,
    #[error("telegram api credentials rejected")]
    CredentialsInvalid,
    #[error("credential decrypt failed")]
    CredentialDecrypt,

    // Telegram transport
    #[error("telegram transport disconnected")]
    TransportDisconnected,
    #[error("telegram connection unavailable")]
    ConnectUnavailable,

    // Telegram protocol
    #[error("flood wait for {0}s")]
    FloodWait(u32),
    #[error("login code invalid")]
    CodeInvalid,
    #[error("login code expired")]
    CodeExpired,
    #[error("two-factor password required")]
    Needs2Fa,
    #[error("two-factor password invalid")]
    TwoFaPasswordInvalid,
    #[error("send code failed: {0}")]
    SendCodeFailed(String),
    #[error("telegram error: {0}")]
    Telegram(String),

    // Conflict
    #[error("a worker is already active for this chat")]
    AlreadyActive,
    #[error("a redirect elaboration already exists for this listener")]
    RedirectExists,
    #[error("{0} not found")]
    NotFound(&'static str),

    // Resource
    #[error("system busy")]
    SystemBusy,
    #[error("operation timed out")]
    Timeout,
    #[error("container launch failed: {0}")]
    ContainerLaunchFailed(String),
    #[error("container vanished")]
    ContainerVanished,

    // Internal
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("internal error: {0}")]
    Internal(String),
}

impl OrchestratorError {
    /// HTTP status class for the variant (original taxonomy: 400 validation,
    /// 401 auth, 404 not found, 409 conflict, 429 flood/busy, 5xx the rest).
    pub fn http_status(&self) -> u16 {
        use OrchestratorError::*;
        match self {
            Validation(_) | MissingCredentials | CredentialsInvalid | CodeInvalid
            | CodeExpired | Needs2Fa | TwoFaPasswordInvalid | SendCodeFailed(_) => 400,
            UnknownUser | PasswordRejected | JwtInvalid | AuthorizationLost => 401,
            NotFound(_) => 404,
            AlreadyActive | RedirectExists => 409,
            FloodWait(_) | SystemBusy => 429,
            TransportDisconnected | ConnectUnavailable | Timeout => 503,
            CredentialDecrypt | ContainerLaunchFailed(_) | ContainerVanished
            | Database(_) | Internal(_) | Telegram(_) => 500,
        }
    }

    /// Stable machine-readable code carried in the `error_code` field.
    pub fn error_code(&self) -> &'static str {
        use OrchestratorError::*;
        match self {
            Validation(_) => "VALIDATION_ERROR",
            UnknownUser => "UNKNOWN_USER",
            PasswordRejected => "INVALID_PASSWORD",
            JwtInvalid => "INVALID_TOKEN",
            AuthorizationLost => "TELEGRAM_SESSION_EXPIRED",
            MissingCredentials => "API_CREDENTIALS_NOT_SET",
            CredentialsInvalid => "API_CREDENTIALS_INVALID",
            CredentialDecrypt => "CREDENTIAL_DECRYPT_ERROR",
            TransportDisconnected => "TELEGRAM_DISCONNECTED",
            ConnectUnavailable => "TELEGRAM_UNAVAILABLE",
            FloodWait(_) => "FLOOD_WAIT",
            CodeInvalid => "CODE_INVALID",
            CodeExpired => "CODE_EXPIRED",
            Needs2Fa => "NEEDS_2FA",
            TwoFaPasswordInvalid => "PASSWORD_INVALID",
            SendCodeFailed(_) => "SEND_CODE_FAILED",
            Telegram(_) => "TELEGRAM_ERROR",
            AlreadyActive => "ALREADY_ACTIVE",
            RedirectExists => "REDIRECT_EXISTS",
            NotFound(_) => "NOT_FOUND",
            SystemBusy => "SYSTEM_BUSY",
            Timeout => "TIMEOUT",
            ContainerLaunchFailed(_) => "CONTAINER_LAUNCH_FAILED",
            ContainerVanished => "CONTAINER_VANISHED",
            Database(_) => "DATABASE_ERROR",
            Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// User-facing message. The platform is Italian-localized; these strings
    /// are what the frontend shows, so no stack traces or library internals.
    pub fn user_message(&self) -> String {
        use OrchestratorError::*;
        match self {
            Validation(msg) => format!("Richiesta non valida: {msg}"),
            UnknownUser => "Utente non trovato".into(),
            PasswordRejected => "Password errata".into(),
            JwtInvalid => "Sessione scaduta, effettua di nuovo il login".into(),
            AuthorizationLost => "La sessione Telegram è scaduta, richiedi un nuovo codice".into(),
            MissingCredentials => "Credenziali API Telegram non configurate".into(),
            CredentialsInvalid => "Credenziali API Telegram non valide".into(),
            CredentialDecrypt => "Errore nella lettura delle credenziali".into(),
            TransportDisconnected | ConnectUnavailable => {
                "Impossibile contattare Telegram, riprova tra qualche istante".into()
            }
            FloodWait(secs) => format!("Troppe richieste, riprova tra {secs} secondi"),
            CodeInvalid => "Codice non valido".into(),
            CodeExpired => "Codice scaduto, richiedine uno nuovo".into(),
            Needs2Fa => "È richiesta la password di verifica in due passaggi".into(),
            TwoFaPasswordInvalid => "Password di verifica in due passaggi errata".into(),
            SendCodeFailed(_) => "Invio del codice non riuscito".into(),
            Telegram(_) => "Errore Telegram".into(),
            AlreadyActive => "Esiste già una sessione attiva per questa chat".into(),
            RedirectExists => "Esiste già un inoltro per questo listener".into(),
            NotFound(_) => "Risorsa non trovata".into(),
            SystemBusy => "Sistema occupato, riprova tra qualche istante".into(),
            Timeout => "Operazione scaduta, riprova".into(),
            ContainerLaunchFailed(_) => "Avvio del worker non riuscito".into(),
            ContainerVanished => "Il worker non è più in esecuzione".into(),
            Database(_) | Internal(_) => "Errore interno".into(),
        }
    }

    /// Seconds the caller must wait, for flood-wait responses.
    pub fn retry_after(&self) -> Option<u32> {
        match self {
            OrchestratorError::FloodWait(secs) => Some(*secs),
            _ => None,
        }
    }

    /// Transport disconnects are the only class recovered locally (one
    /// eviction + retry); everything else is surfaced.
    pub fn is_transport_disconnect(&self) -> bool {
        matches!(self, OrchestratorError::TransportDisconnected)
    }
}

pub type Result<T, E = OrchestratorError> = std::result::Result<T, E>;
