//! Authentication endpoints and request-context extractors
//!
//! The bearer credential is resolved per request by the `AuthUser` extractor
//! and passed to handlers as a typed `Identity`; admin-only handlers use
//! `AdminUser`, which rejects a valid non-admin identity with 403 (distinct
//! from the 401 an unauthenticated request gets).

use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::{header, request::Parts},
    Json,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use wortschatz_common::auth::{
    generate_reset_code, generate_salt, hash_password, issue_token, verify_password, verify_token,
    Identity, DEFAULT_TOKEN_TTL_SECONDS,
};
use wortschatz_common::db::init::get_setting_i64;

use crate::db::users;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

// ========================================
// Extractors
// ========================================

/// An authenticated caller
pub struct AuthUser(pub Identity);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing bearer credential".to_string()))?;

        let token = header_value
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthorized("Missing bearer credential".to_string()))?;

        let identity = verify_token(token, state.token_secret)
            .map_err(|e| ApiError::Unauthorized(e.to_string()))?;

        Ok(AuthUser(identity))
    }
}

/// An authenticated caller with the admin flag set
pub struct AdminUser(pub Identity);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(identity) = AuthUser::from_request_parts(parts, state).await?;

        if !identity.is_admin {
            return Err(ApiError::Forbidden("Admin access required".to_string()));
        }

        Ok(AdminUser(identity))
    }
}

// ========================================
// Request / Response Types
// ========================================

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: Option<String>,
    pub reset_code: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub is_admin: bool,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

// ========================================
// Handlers
// ========================================

/// POST /api/auth/signup
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let email = required(req.email, "email")?;
    let password = required(req.password, "password")?;
    let name = required(req.name, "name")?;

    let min_length = get_setting_i64(&state.db, "min_password_length", 6).await?;
    if (password.len() as i64) < min_length {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {} characters",
            min_length
        )));
    }

    let salt = generate_salt();
    let hash = hash_password(&password, &salt);
    let user = users::create_user(&state.db, &email, &name, &hash, &salt).await?;

    let identity = Identity {
        user_id: user.id,
        email: user.email.clone(),
        is_admin: user.is_admin,
    };
    let ttl = get_setting_i64(
        &state.db,
        "auth_token_ttl_seconds",
        DEFAULT_TOKEN_TTL_SECONDS,
    )
    .await?;
    let token = issue_token(&identity, state.token_secret, ttl);

    Ok(Json(AuthResponse {
        token,
        user: UserProfile {
            id: user.id,
            email: user.email,
            name: user.name,
            is_admin: user.is_admin,
        },
    }))
}

/// POST /api/auth/login
///
/// Any mismatch - unknown email or wrong password - gets the same generic
/// rejection.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let email = required(req.email, "email")?;
    let password = required(req.password, "password")?;

    let user = users::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(invalid_credentials)?;

    if !verify_password(&password, &user.password_salt, &user.password_hash) {
        return Err(invalid_credentials());
    }

    let identity = Identity {
        user_id: user.id,
        email: user.email.clone(),
        is_admin: user.is_admin,
    };
    let ttl = get_setting_i64(
        &state.db,
        "auth_token_ttl_seconds",
        DEFAULT_TOKEN_TTL_SECONDS,
    )
    .await?;
    let token = issue_token(&identity, state.token_secret, ttl);

    Ok(Json(AuthResponse {
        token,
        user: UserProfile {
            id: user.id,
            email: user.email,
            name: user.name,
            is_admin: user.is_admin,
        },
    }))
}

/// POST /api/auth/forgot-password
///
/// The response never reveals whether the account exists. When it does, a
/// 6-digit reset code is stored with a 1-hour expiry.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let email = required(req.email, "email")?;

    if let Some(user) = users::find_by_email(&state.db, &email).await? {
        let code = generate_reset_code();
        let ttl = get_setting_i64(&state.db, "reset_code_ttl_seconds", 3600).await?;
        let expires_at = Utc::now() + Duration::seconds(ttl);
        users::set_reset_code(&state.db, user.id, &code, expires_at).await?;

        // TODO: deliver the code through an email service; logged until one exists
        info!(email = %email, "Password reset code issued: {}", code);
    }

    Ok(Json(MessageResponse {
        message: "If an account exists with this email, you will receive a password reset code."
            .to_string(),
    }))
}

/// POST /api/auth/reset-password
///
/// Validates the code and its expiry, enforces the minimum password length,
/// and invalidates the code on success. Wrong code and expired code get the
/// same message.
pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let email = required(req.email, "email")?;
    let reset_code = required(req.reset_code, "reset_code")?;
    let new_password = required(req.new_password, "new_password")?;

    let min_length = get_setting_i64(&state.db, "min_password_length", 6).await?;
    if (new_password.len() as i64) < min_length {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {} characters",
            min_length
        )));
    }

    let user = users::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(invalid_reset_code)?;

    let valid = user.reset_code.as_deref() == Some(reset_code.as_str())
        && user
            .reset_code_expires_at
            .is_some_and(|expiry| expiry > Utc::now());
    if !valid {
        return Err(invalid_reset_code());
    }

    let salt = generate_salt();
    let hash = hash_password(&new_password, &salt);
    users::update_password(&state.db, user.id, &hash, &salt).await?;

    Ok(Json(MessageResponse {
        message: "Password reset successfully".to_string(),
    }))
}

/// GET /api/auth/user
pub async fn get_current_user(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> ApiResult<Json<UserProfile>> {
    let user = users::find_by_id(&state.db, identity.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(UserProfile {
        id: user.id,
        email: user.email,
        name: user.name,
        is_admin: user.is_admin,
    }))
}

// ========================================
// Helpers
// ========================================

fn required(value: Option<String>, field: &str) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApiError::BadRequest(format!("Missing required field: {}", field))),
    }
}

fn invalid_credentials() -> ApiError {
    ApiError::Unauthorized("Invalid credentials".to_string())
}

fn invalid_reset_code() -> ApiError {
    ApiError::BadRequest("Invalid or expired reset code".to_string())
}
