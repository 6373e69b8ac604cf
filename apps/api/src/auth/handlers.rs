//! Axum route handlers for /api/auth.

use axum::{extract::State, http::HeaderMap, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::middleware::{bearer_token, CurrentUser};
use crate::auth::password::{hash_password, verify_against_dummy, verify_password};
use crate::auth::tokens::{TokenKind, TOKEN_TYPE_BEARER};
use crate::auth::validation::{normalize_email, validate_email, validate_password};
use crate::errors::AppError;
use crate::models::user::{Role, User, UserWithProfile};
use crate::state::AppState;
use crate::users::store::{self, NewUser};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: User,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/auth/register
///
/// Creates the account and its blank profile. Admins cannot self-register.
pub async fn handle_register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let mut missing = Vec::new();
    if request.email.as_deref().map_or(true, |e| e.trim().is_empty()) {
        missing.push("email");
    }
    if request.password.as_deref().map_or(true, str::is_empty) {
        missing.push("password");
    }
    if !missing.is_empty() {
        return Err(AppError::UnprocessableEntity(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    let email = normalize_email(request.email.as_deref().unwrap_or_default());
    let password = request.password.unwrap_or_default();

    if !validate_email(&email) {
        return Err(AppError::UnprocessableEntity(
            "Invalid email format".to_string(),
        ));
    }

    if store::find_user_by_email(&state.db, &email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    validate_password(&password).map_err(AppError::UnprocessableEntity)?;

    let role = match request.role.as_deref() {
        None => Role::User,
        Some(raw) => Role::parse(raw)
            .filter(Role::is_self_registrable)
            .ok_or_else(|| {
                AppError::UnprocessableEntity(
                    "Invalid role. Must be one of: user, employer, candidate".to_string(),
                )
            })?,
    };

    let password_hash = hash_password(&password)?;
    let user = store::insert_user_with_profile(
        &state.db,
        NewUser {
            email: &email,
            password_hash: &password_hash,
            first_name: request.first_name.trim(),
            last_name: request.last_name.trim(),
            role: role.as_str(),
        },
    )
    .await?;

    info!("Registered user {} ({})", user.id, user.role);

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user,
            message: "User registered successfully".to_string(),
        }),
    ))
}

/// POST /api/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err(AppError::UnprocessableEntity(
            "Email and password are required".to_string(),
        ));
    }

    let email = normalize_email(&request.email);
    let user = match store::find_user_by_email(&state.db, &email).await? {
        Some(user) if verify_password(&request.password, &user.password_hash) => user,
        Some(_) => return Err(AppError::InvalidCredentials),
        None => {
            // Keep timing similar for unknown emails.
            verify_against_dummy(&request.password);
            return Err(AppError::InvalidCredentials);
        }
    };

    if !user.is_active {
        warn!("Login attempt on deactivated account {}", user.id);
        return Err(AppError::Forbidden);
    }

    let access_token = state.tokens.issue(&user, TokenKind::Access)?;
    let refresh_token = state.tokens.issue(&user, TokenKind::Refresh)?;

    info!("User {} logged in", user.id);

    Ok(Json(LoginResponse {
        user,
        access_token,
        refresh_token,
        token_type: TOKEN_TYPE_BEARER,
        expires_in: state.tokens.access_ttl_seconds(),
    }))
}

/// POST /api/auth/refresh
///
/// Expects the refresh token as the bearer credential.
pub async fn handle_refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<RefreshResponse>, AppError> {
    let token = bearer_token(&headers)?;
    let claims = state.tokens.verify(token, TokenKind::Refresh)?;

    let user = store::find_user_by_id(&state.db, claims.sub)
        .await?
        .filter(|u| u.is_active)
        .ok_or(AppError::Unauthorized)?;

    Ok(Json(RefreshResponse {
        access_token: state.tokens.issue(&user, TokenKind::Access)?,
        token_type: TOKEN_TYPE_BEARER,
        expires_in: state.tokens.access_ttl_seconds(),
    }))
}

/// GET /api/auth/me
pub async fn handle_me(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<UserWithProfile>, AppError> {
    let user = store::load_user_with_profile(&state.db, current.id).await?;
    Ok(Json(user))
}
