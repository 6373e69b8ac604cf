//! Axum route handlers for /api/users.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::middleware::{require_admin, CurrentUser};
use crate::errors::AppError;
use crate::models::user::{Role, Theme, User, UserProfile, UserWithProfile};
use crate::state::AppState;
use crate::users::profile::ProfileUpdate;
use crate::users::store;

pub const DEFAULT_PER_PAGE: i64 = 20;
pub const MAX_PER_PAGE: i64 = 100;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ThemeRequest {
    pub theme: String,
}

#[derive(Debug, Serialize)]
pub struct ThemeResponse {
    pub theme: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub users: Vec<User>,
    pub total: i64,
    pub pages: i64,
    pub current_page: i64,
    pub per_page: i64,
}

/// Resolved pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: i64,
    pub per_page: i64,
}

impl Page {
    pub fn from_query(page: Option<i64>, per_page: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
        }
    }

    /// Saturates for absurd page numbers; such a window is simply empty.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }

    pub fn page_count(&self, total: i64) -> i64 {
        total.max(0).saturating_add(self.per_page - 1) / self.per_page
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/users/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<UserWithProfile>, AppError> {
    let user = store::load_user_with_profile(&state.db, current.id).await?;
    Ok(Json(user))
}

/// PUT|PATCH /api/users/profile
///
/// Only fields present in the body are changed.
pub async fn handle_update_profile(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<UserWithProfile>, AppError> {
    let UserWithProfile { mut user, profile } =
        store::load_user_with_profile(&state.db, current.id).await?;
    let mut profile = profile.unwrap_or_else(|| UserProfile::empty(user.id));

    update.apply(&mut user, &mut profile)?;

    let saved = store::save_profile(&state.db, &user, &profile).await?;
    info!("Updated profile for user {}", user.id);

    let user = store::find_user_by_id(&state.db, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(UserWithProfile {
        user,
        profile: Some(saved),
    }))
}

/// PUT /api/users/profile/theme
pub async fn handle_update_theme(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(request): Json<ThemeRequest>,
) -> Result<Json<ThemeResponse>, AppError> {
    let theme = Theme::parse(&request.theme).ok_or_else(|| {
        AppError::UnprocessableEntity("Theme must be 'light' or 'dark'".to_string())
    })?;

    if !store::update_theme(&state.db, current.id, theme.as_str()).await? {
        return Err(AppError::NotFound("Profile not found".to_string()));
    }

    Ok(Json(ThemeResponse {
        theme: theme.as_str().to_string(),
        message: "Theme updated successfully".to_string(),
    }))
}

/// GET /api/users (admin)
pub async fn handle_list_users(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<UserListResponse>, AppError> {
    require_admin(&current)?;

    let role = match query.role.as_deref().filter(|r| !r.is_empty()) {
        Some(raw) => Some(
            Role::parse(raw)
                .ok_or_else(|| AppError::Validation(format!("Unknown role '{raw}'")))?,
        ),
        None => None,
    };

    let page = Page::from_query(query.page, query.per_page);
    let (users, total) = store::list_users(
        &state.db,
        role.map(|r| r.as_str()),
        page.per_page,
        page.offset(),
    )
    .await?;

    Ok(Json(UserListResponse {
        users,
        total,
        pages: page.page_count(total),
        current_page: page.page,
        per_page: page.per_page,
    }))
}

/// GET /api/users/:id (admin)
pub async fn handle_get_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserWithProfile>, AppError> {
    require_admin(&current)?;
    let user = store::load_user_with_profile(&state.db, user_id).await?;
    Ok(Json(user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_defaults_and_clamping() {
        assert_eq!(Page::from_query(None, None), Page { page: 1, per_page: 20 });
        assert_eq!(
            Page::from_query(Some(0), Some(1000)),
            Page { page: 1, per_page: 100 }
        );
        assert_eq!(Page::from_query(Some(3), Some(0)).per_page, 1);
    }

    #[test]
    fn test_page_offset_and_count() {
        let page = Page::from_query(Some(3), Some(10));
        assert_eq!(page.offset(), 20);
        assert_eq!(page.page_count(0), 0);
        assert_eq!(page.page_count(10), 1);
        assert_eq!(page.page_count(21), 3);
    }

    #[test]
    fn test_huge_page_does_not_overflow() {
        let page = Page::from_query(Some(i64::MAX), Some(100));
        assert_eq!(page.offset(), i64::MAX);
        assert_eq!(Page::from_query(Some(1), Some(100)).page_count(i64::MAX), i64::MAX / 100);
    }
}
