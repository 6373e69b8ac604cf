//! SQL access for `users` and `user_profiles`.

use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::{User, UserProfile, UserWithProfile};

const UNIQUE_VIOLATION: &str = "23505";

pub struct NewUser<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub role: &'a str,
}

pub async fn find_user_by_id(pool: &PgPool, user_id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn find_user_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn find_profile(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Option<UserProfile>, sqlx::Error> {
    sqlx::query_as::<_, UserProfile>("SELECT * FROM user_profiles WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Loads a user and their profile; 404 when the user does not exist.
pub async fn load_user_with_profile(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<UserWithProfile, AppError> {
    let user = find_user_by_id(pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    let profile = find_profile(pool, user_id).await?;
    Ok(UserWithProfile { user, profile })
}

/// Inserts the user and a blank profile in one transaction.
/// A duplicate email surfaces as `AppError::Conflict`.
pub async fn insert_user_with_profile(
    pool: &PgPool,
    new_user: NewUser<'_>,
) -> Result<User, AppError> {
    let mut tx = pool.begin().await?;

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, email, password_hash, first_name, last_name, role)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(new_user.email)
    .bind(new_user.password_hash)
    .bind(new_user.first_name)
    .bind(new_user.last_name)
    .bind(new_user.role)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        let duplicate = e
            .as_database_error()
            .and_then(|d| d.code())
            .is_some_and(|code| code == UNIQUE_VIOLATION);
        if duplicate {
            AppError::Conflict("Email already registered".to_string())
        } else {
            AppError::Database(e)
        }
    })?;

    let profile = UserProfile::empty(user.id);
    sqlx::query("INSERT INTO user_profiles (id, user_id, theme_preference) VALUES ($1, $2, $3)")
        .bind(profile.id)
        .bind(user.id)
        .bind(&profile.theme_preference)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(user)
}

/// Writes every mutable profile column and the user's names, bumping `updated_at`.
pub async fn save_profile(
    pool: &PgPool,
    user: &User,
    profile: &UserProfile,
) -> Result<UserProfile, AppError> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "UPDATE users SET first_name = $2, last_name = $3, updated_at = NOW() WHERE id = $1",
    )
    .bind(user.id)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .execute(&mut *tx)
    .await?;

    let saved = sqlx::query_as::<_, UserProfile>(
        r#"
        UPDATE user_profiles SET
            bio = $2, phone = $3, location = $4, avatar_url = $5,
            skills = $6, experience = $7, education = $8, interests = $9,
            linkedin_url = $10, github_url = $11, portfolio_url = $12,
            target_role = $13, theme_preference = $14, updated_at = NOW()
        WHERE user_id = $1
        RETURNING *
        "#,
    )
    .bind(profile.user_id)
    .bind(&profile.bio)
    .bind(&profile.phone)
    .bind(&profile.location)
    .bind(&profile.avatar_url)
    .bind(&profile.skills)
    .bind(&profile.experience)
    .bind(&profile.education)
    .bind(&profile.interests)
    .bind(&profile.linkedin_url)
    .bind(&profile.github_url)
    .bind(&profile.portfolio_url)
    .bind(&profile.target_role)
    .bind(&profile.theme_preference)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(saved)
}

pub async fn update_theme(pool: &PgPool, user_id: Uuid, theme: &str) -> Result<bool, AppError> {
    let result = sqlx::query(
        "UPDATE user_profiles SET theme_preference = $2, updated_at = NOW() WHERE user_id = $1",
    )
    .bind(user_id)
    .bind(theme)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// One page of users, newest first, optionally filtered by role, plus the total count.
pub async fn list_users(
    pool: &PgPool,
    role: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<(Vec<User>, i64), AppError> {
    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT * FROM users
        WHERE ($1::text IS NULL OR role = $1)
        ORDER BY created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(role)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE ($1::text IS NULL OR role = $1)")
            .bind(role)
            .fetch_one(pool)
            .await?;

    Ok((users, total))
}
