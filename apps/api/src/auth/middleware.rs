//! JWT authentication middleware.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::tokens::TokenKind;
use crate::errors::AppError;
use crate::models::user::Role;
use crate::state::AppState;

const BEARER_TOKEN_PREFIX: &str = "Bearer ";

/// Authenticated user extracted from the access token.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub role: String,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin.as_str()
    }
}

/// Pulls the raw token out of `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix(BEARER_TOKEN_PREFIX))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AppError::Unauthorized)
}

/// Validates the access token and injects `CurrentUser` into the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())?;
    let claims = state.tokens.verify(token, TokenKind::Access)?;

    request.extensions_mut().insert(CurrentUser {
        id: claims.sub,
        email: claims.email,
        role: claims.role,
    });

    Ok(next.run(request).await)
}

/// Require admin role, returns Forbidden error if not admin.
pub fn require_admin(user: &CurrentUser) -> Result<(), AppError> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_err());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(bearer_token(&headers).is_err());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(bearer_token(&headers).is_err());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_require_admin() {
        let mut user = CurrentUser {
            id: Uuid::new_v4(),
            email: "a@b.io".into(),
            role: "user".into(),
        };
        assert!(matches!(require_admin(&user), Err(AppError::Forbidden)));
        user.role = "admin".into();
        assert!(require_admin(&user).is_ok());
    }
}
