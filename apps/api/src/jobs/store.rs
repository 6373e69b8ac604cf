//! SQL access for `job_applications`.

use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::{ApplicationStatus, JobApplicationRow};

pub async fn find_application(
    pool: &PgPool,
    user_id: Uuid,
    job_id: i32,
) -> Result<Option<JobApplicationRow>, sqlx::Error> {
    sqlx::query_as::<_, JobApplicationRow>(
        "SELECT * FROM job_applications WHERE user_id = $1 AND job_id = $2",
    )
    .bind(user_id)
    .bind(job_id)
    .fetch_optional(pool)
    .await
}

/// Inserts a `saved` entry. Returns `None` when the job is already tracked.
pub async fn insert_saved(
    pool: &PgPool,
    user_id: Uuid,
    job_id: i32,
) -> Result<Option<JobApplicationRow>, sqlx::Error> {
    sqlx::query_as::<_, JobApplicationRow>(
        r#"
        INSERT INTO job_applications (id, user_id, job_id, status)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (user_id, job_id) DO NOTHING
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(job_id)
    .bind(ApplicationStatus::Saved.as_str())
    .fetch_optional(pool)
    .await
}

pub struct NewApplication {
    pub resume_id: Option<Uuid>,
    pub cover_letter_id: Option<Uuid>,
    pub notes: Option<String>,
    pub match_score: Option<f64>,
}

/// Records an application, upgrading a saved entry in place.
/// Returns the row and whether it was newly created.
pub async fn upsert_applied(
    pool: &PgPool,
    user_id: Uuid,
    job_id: i32,
    application: NewApplication,
) -> Result<(JobApplicationRow, bool), AppError> {
    let mut tx = pool.begin().await?;

    let existing = sqlx::query_as::<_, JobApplicationRow>(
        "SELECT * FROM job_applications WHERE user_id = $1 AND job_id = $2 FOR UPDATE",
    )
    .bind(user_id)
    .bind(job_id)
    .fetch_optional(&mut *tx)
    .await?;

    let (row, created) = match existing {
        Some(row) if row.status == ApplicationStatus::Applied.as_str() => {
            return Err(AppError::Validation(
                "Already applied to this job".to_string(),
            ));
        }
        Some(row) => {
            let updated = sqlx::query_as::<_, JobApplicationRow>(
                r#"
                UPDATE job_applications SET
                    status = $2, applied_date = NOW(), resume_id = $3,
                    cover_letter_id = $4, notes = COALESCE($5, notes),
                    match_score = $6, updated_at = NOW()
                WHERE id = $1
                RETURNING *
                "#,
            )
            .bind(row.id)
            .bind(ApplicationStatus::Applied.as_str())
            .bind(application.resume_id)
            .bind(application.cover_letter_id)
            .bind(&application.notes)
            .bind(application.match_score)
            .fetch_one(&mut *tx)
            .await?;
            (updated, false)
        }
        None => {
            let inserted = sqlx::query_as::<_, JobApplicationRow>(
                r#"
                INSERT INTO job_applications
                    (id, user_id, job_id, status, applied_date, resume_id,
                     cover_letter_id, notes, match_score)
                VALUES ($1, $2, $3, $4, NOW(), $5, $6, $7, $8)
                RETURNING *
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(job_id)
            .bind(ApplicationStatus::Applied.as_str())
            .bind(application.resume_id)
            .bind(application.cover_letter_id)
            .bind(&application.notes)
            .bind(application.match_score)
            .fetch_one(&mut *tx)
            .await?;
            (inserted, true)
        }
    };

    tx.commit().await?;
    Ok((row, created))
}

pub async fn list_applications(
    pool: &PgPool,
    user_id: Uuid,
    status: Option<ApplicationStatus>,
) -> Result<Vec<JobApplicationRow>, sqlx::Error> {
    sqlx::query_as::<_, JobApplicationRow>(
        r#"
        SELECT * FROM job_applications
        WHERE user_id = $1 AND ($2::text IS NULL OR status = $2)
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .bind(status.map(|s| s.as_str()))
    .fetch_all(pool)
    .await
}

/// Updates status and/or notes of the caller's own application.
/// Moving to `applied` stamps `applied_date` when it is not set yet.
pub async fn update_application(
    pool: &PgPool,
    user_id: Uuid,
    application_id: Uuid,
    status: Option<ApplicationStatus>,
    notes: Option<&str>,
) -> Result<Option<JobApplicationRow>, sqlx::Error> {
    sqlx::query_as::<_, JobApplicationRow>(
        r#"
        UPDATE job_applications SET
            status = COALESCE($3, status),
            notes = COALESCE($4, notes),
            applied_date = CASE
                WHEN $3 = 'applied' AND applied_date IS NULL THEN NOW()
                ELSE applied_date
            END,
            updated_at = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(application_id)
    .bind(user_id)
    .bind(status.map(|s| s.as_str()))
    .bind(notes)
    .fetch_optional(pool)
    .await
}
