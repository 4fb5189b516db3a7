use std::time::Instant;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::jwt::AuthUser;
use super::responses::{ApiError, ApiResult};
use super::AppState;
use crate::db::users;
use crate::error::OrchestratorError;
use crate::telegram::{SendCodeOutcome, VerifyOutcome};

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub phone: String,
    pub password: String,
    pub api_id: Option<i32>,
    pub api_hash: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub phone_number: String,
    pub password: String,
    #[serde(default)]
    pub force_new_code: bool,
}

#[derive(Deserialize)]
pub struct VerifyCodeRequest {
    pub phone_number: String,
    pub code: String,
    pub password: Option<String>,
}

#[derive(Deserialize)]
pub struct PhoneQuery {
    pub phone: String,
}

#[derive(Deserialize)]
pub struct PhoneRequest {
    pub phone_number: String,
}

#[derive(Deserialize)]
pub struct SessionCodeRequest {
    pub code: String,
}

#[derive(Deserialize)]
pub struct UpdateCredentialsRequest {
    pub api_id: i32,
    pub api_hash: String,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

fn validate_phone(phone: &str) -> Result<(), OrchestratorError> {
    let digits = phone.strip_prefix('+').unwrap_or("");
    if digits.len() < 7 || digits.len() > 15 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(OrchestratorError::Validation(
            "numero di telefono in formato E.164 richiesto".into(),
        ));
    }
    Ok(())
}

fn hash_password(password: &str) -> Result<String, OrchestratorError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| OrchestratorError::Internal(format!("password hash: {e}")))
}

fn verify_password(password: &str, hash: &str) -> Result<(), OrchestratorError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| OrchestratorError::Internal(format!("stored hash invalid: {e}")))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| OrchestratorError::PasswordRejected)
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<Value>> {
    validate_phone(&req.phone)?;
    if req.password.len() < 6 {
        return Err(ApiError(OrchestratorError::Validation(
            "la password deve avere almeno 6 caratteri".into(),
        )));
    }

    let api_id = req
        .api_id
        .or(state.default_api_id)
        .ok_or(ApiError(OrchestratorError::MissingCredentials))?;
    let api_hash = req
        .api_hash
        .or_else(|| state.default_api_hash.clone())
        .filter(|hash| !hash.is_empty())
        .ok_or(ApiError(OrchestratorError::MissingCredentials))?;

    let password_hash = hash_password(&req.password)?;
    let wrapped = state.crypto.wrap_str(&api_hash)?;
    let user = users::create(&state.pool, &req.phone, &password_hash, api_id, &wrapped).await?;

    tracing::info!(user_id = user.id, "user registered");
    Ok(Json(json!({ "success": true, "user_id": user.id })))
}

/// Password check, then either direct login over a still-valid Telegram
/// session or a send-code round. Timed for the login metrics either way.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<Value>> {
    validate_phone(&req.phone_number)?;
    let started = Instant::now();
    let result = login_inner(&state, &req).await;
    state.metrics.record(started, &result);
    result.map(Json).map_err(ApiError)
}

async fn login_inner(state: &AppState, req: &LoginRequest) -> Result<Value, OrchestratorError> {
    let user = users::find_by_phone(&state.pool, &req.phone_number)
        .await?
        .ok_or(OrchestratorError::UnknownUser)?;
    if !user.is_active {
        return Err(OrchestratorError::UnknownUser);
    }
    verify_password(&req.password, &user.password_hash)?;

    // A persisted session that still authorizes skips the code round trip.
    if user.telegram_session.is_some() && !req.force_new_code {
        match state.bridge.reactivate(&req.phone_number).await {
            Ok(true) => {
                let token = state.jwt.issue(user.id, &user.phone)?;
                users::touch_last_login(&state.pool, user.id).await?;
                return Ok(json!({
                    "success": true,
                    "message": "already_authorized",
                    "session_token": token,
                }));
            }
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(phone = %req.phone_number, error = %e, "reactivation probe failed, falling back to code login");
            }
        }
    }

    match state
        .bridge
        .send_code(&req.phone_number, req.force_new_code)
        .await?
    {
        SendCodeOutcome::CodeSent => Ok(json!({ "success": true, "message": "code_sent" })),
        SendCodeOutcome::CachedCodeAvailable => Ok(json!({
            "success": true,
            "message": "cached_code_available",
        })),
    }
}

pub async fn verify_code(
    State(state): State<AppState>,
    Json(req): Json<VerifyCodeRequest>,
) -> ApiResult<Json<Value>> {
    validate_phone(&req.phone_number)?;
    let started = Instant::now();
    let result = verify_inner(&state, &req.phone_number, &req.code, req.password.as_deref()).await;
    state.metrics.record(started, &result);
    result.map(Json).map_err(ApiError)
}

async fn verify_inner(
    state: &AppState,
    phone: &str,
    code: &str,
    password: Option<&str>,
) -> Result<Value, OrchestratorError> {
    match state
        .bridge
        .verify_code(phone, code, password.map(|p| p.to_string()))
        .await?
    {
        VerifyOutcome::Authorized => {
            let user = users::find_by_phone(&state.pool, phone)
                .await?
                .ok_or(OrchestratorError::UnknownUser)?;
            let token = state.jwt.issue(user.id, &user.phone)?;
            Ok(json!({ "success": true, "session_token": token }))
        }
        VerifyOutcome::PasswordRequired => Err(OrchestratorError::Needs2Fa),
    }
}

pub async fn check_cached_code(
    State(state): State<AppState>,
    Query(query): Query<PhoneQuery>,
) -> ApiResult<Json<Value>> {
    let (has_cached_code, cached_code) = state.bridge.cached_code(&query.phone).await?;
    Ok(Json(json!({
        "success": true,
        "has_cached_code": has_cached_code,
        "cached_code": cached_code,
    })))
}

pub async fn clear_cached_code(
    State(state): State<AppState>,
    Json(req): Json<PhoneRequest>,
) -> ApiResult<Json<Value>> {
    let cleared = state.bridge.clear_cached_code(&req.phone_number).await?;
    Ok(Json(json!({ "success": true, "cleared": cleared })))
}

pub async fn validate_session(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Value>> {
    let user = users::find_by_id(&state.pool, auth.user_id)
        .await?
        .filter(|u| u.is_active)
        .ok_or(ApiError(OrchestratorError::JwtInvalid))?;
    Ok(Json(json!({
        "success": true,
        "session_valid": true,
        "phone": user.phone,
    })))
}

/// Expired Telegram auth: ask for a fresh code for the JWT's subject.
pub async fn reactivate_session(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Value>> {
    state.bridge.send_code(&auth.phone, true).await?;
    Ok(Json(json!({ "success": true, "message": "code_sent" })))
}

pub async fn verify_session_code(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<SessionCodeRequest>,
) -> ApiResult<Json<Value>> {
    match state.bridge.verify_code(&auth.phone, &req.code, None).await? {
        VerifyOutcome::Authorized => Ok(Json(json!({ "success": true }))),
        VerifyOutcome::PasswordRequired => Err(ApiError(OrchestratorError::Needs2Fa)),
    }
}

/// Replace the api pair. The stored Telegram session was minted under the
/// old credentials, so it is invalidated together with any cached client.
pub async fn update_credentials(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<UpdateCredentialsRequest>,
) -> ApiResult<Json<Value>> {
    if req.api_hash.trim().is_empty() {
        return Err(ApiError(OrchestratorError::Validation(
            "api_hash mancante".into(),
        )));
    }
    let wrapped = state.crypto.wrap_str(req.api_hash.trim())?;
    users::update_credentials(&state.pool, auth.user_id, req.api_id, &wrapped).await?;
    state.bridge.disconnect(&auth.phone).await?;
    Ok(Json(json!({ "success": true })))
}

pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<Json<Value>> {
    if req.new_password.len() < 6 {
        return Err(ApiError(OrchestratorError::Validation(
            "la nuova password deve avere almeno 6 caratteri".into(),
        )));
    }
    let user = users::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or(ApiError(OrchestratorError::UnknownUser))?;
    verify_password(&req.current_password, &user.password_hash)?;

    let new_hash = hash_password(&req.new_password)?;
    users::update_password_hash(&state.pool, auth.user_id, &new_hash).await?;
    Ok(Json(json!({ "success": true })))
}
