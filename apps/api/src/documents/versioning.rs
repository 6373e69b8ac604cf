//! Versioned storage for resumes and cover letters.
//!
//! Versions are append-only rows grouped into lineages. Every change to
//! `is_current` happens inside one transaction that first locks the owner's
//! user row, so concurrent writes for the same user run one after another.
//!
//! Resumes: lineage is `root_id` (the id of version 1). A user has at most one
//! current resume; generating or editing one demotes all the others.
//! Cover letters: lineage is (user_id, company_name, job_title), one current
//! letter per lineage. Letters with neither a company nor a title stand alone.

use serde_json::Value;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::info;
use uuid::Uuid;

use crate::models::document::{CoverLetterRow, ResumeRow};

pub struct NewResume<'a> {
    pub title: &'a str,
    pub target_role: Option<&'a str>,
    pub job_description: Option<&'a str>,
    pub content: &'a Value,
    pub template_name: &'a str,
    pub is_ats_optimized: bool,
    pub keywords_matched: Option<&'a Value>,
}

pub struct NewCoverLetter<'a> {
    pub resume_id: Option<Uuid>,
    pub title: &'a str,
    pub company_name: &'a str,
    pub job_title: &'a str,
    pub content: &'a str,
    pub tone: &'a str,
}

pub fn next_version(existing: &[i32]) -> i32 {
    existing.iter().copied().max().unwrap_or(0) + 1
}

pub fn is_standalone_letter(company_name: &str, job_title: &str) -> bool {
    company_name.trim().is_empty() && job_title.trim().is_empty()
}

/// Serialises a user's document writes so version numbers and the current
/// flag never race.
async fn lock_user(tx: &mut Transaction<'_, Postgres>, user_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
        .bind(user_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

async fn demote_current_resumes(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE resumes SET is_current = FALSE, updated_at = NOW() WHERE user_id = $1 AND is_current",
    )
    .bind(user_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Resumes
// ────────────────────────────────────────────────────────────────────────────

/// Starts a new lineage at version 1 and makes it the user's current resume.
pub async fn insert_resume(
    pool: &PgPool,
    user_id: Uuid,
    resume: NewResume<'_>,
) -> Result<ResumeRow, sqlx::Error> {
    let mut tx = pool.begin().await?;
    lock_user(&mut tx, user_id).await?;
    demote_current_resumes(&mut tx, user_id).await?;

    let id = Uuid::new_v4();
    let row = sqlx::query_as::<_, ResumeRow>(
        r#"
        INSERT INTO resumes
            (id, user_id, root_id, parent_id, title, target_role, job_description,
             content, version, is_current, is_ats_optimized, template_name, keywords_matched)
        VALUES ($1, $2, $1, NULL, $3, $4, $5, $6, 1, TRUE, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(resume.title)
    .bind(resume.target_role)
    .bind(resume.job_description)
    .bind(resume.content)
    .bind(resume.is_ats_optimized)
    .bind(resume.template_name)
    .bind(resume.keywords_matched)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    info!("Created resume {} for user {user_id}", row.id);
    Ok(row)
}

pub async fn list_resumes(
    pool: &PgPool,
    user_id: Uuid,
    current_only: bool,
) -> Result<Vec<ResumeRow>, sqlx::Error> {
    sqlx::query_as::<_, ResumeRow>(
        r#"
        SELECT * FROM resumes
        WHERE user_id = $1 AND (NOT $2 OR is_current)
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .bind(current_only)
    .fetch_all(pool)
    .await
}

pub async fn find_resume(
    pool: &PgPool,
    user_id: Uuid,
    resume_id: Uuid,
) -> Result<Option<ResumeRow>, sqlx::Error> {
    sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE id = $1 AND user_id = $2")
        .bind(resume_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Appends `content` as the newest version of `source`'s lineage and makes it
/// the user's current resume.
pub async fn append_resume_version(
    pool: &PgPool,
    source: &ResumeRow,
    content: &Value,
) -> Result<ResumeRow, sqlx::Error> {
    let mut tx = pool.begin().await?;
    lock_user(&mut tx, source.user_id).await?;

    // Read after the lock: a concurrent edit of this lineage has committed by now.
    let versions: Vec<i32> = sqlx::query_scalar("SELECT version FROM resumes WHERE root_id = $1")
        .bind(source.root_id)
        .fetch_all(&mut *tx)
        .await?;
    let version = next_version(&versions);

    demote_current_resumes(&mut tx, source.user_id).await?;

    let row = sqlx::query_as::<_, ResumeRow>(
        r#"
        INSERT INTO resumes
            (id, user_id, root_id, parent_id, title, target_role, job_description,
             content, version, is_current, is_ats_optimized, template_name, keywords_matched)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, TRUE, $10, $11, $12)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(source.user_id)
    .bind(source.root_id)
    .bind(source.id)
    .bind(&source.title)
    .bind(&source.target_role)
    .bind(&source.job_description)
    .bind(content)
    .bind(version)
    .bind(source.is_ats_optimized)
    .bind(&source.template_name)
    .bind(&source.keywords_matched)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    info!(
        "Resume lineage {} advanced to version {version}",
        source.root_id
    );
    Ok(row)
}

/// Deletes one version. When it was current, the newest remaining version of
/// the lineage takes over. Returns false when nothing matched.
pub async fn delete_resume(
    pool: &PgPool,
    user_id: Uuid,
    resume_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;
    lock_user(&mut tx, user_id).await?;

    let deleted: Option<(Uuid, bool)> = sqlx::query_as(
        "DELETE FROM resumes WHERE id = $1 AND user_id = $2 RETURNING root_id, is_current",
    )
    .bind(resume_id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some((root_id, was_current)) = deleted else {
        return Ok(false);
    };

    if was_current {
        sqlx::query(
            r#"
            UPDATE resumes SET is_current = TRUE, updated_at = NOW()
            WHERE id = (
                SELECT id FROM resumes WHERE root_id = $1
                ORDER BY version DESC, created_at DESC
                LIMIT 1
            )
            "#,
        )
        .bind(root_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(true)
}

// ────────────────────────────────────────────────────────────────────────────
// Cover letters
// ────────────────────────────────────────────────────────────────────────────

/// Stores a letter as the newest version of its lineage.
pub async fn insert_cover_letter(
    pool: &PgPool,
    user_id: Uuid,
    letter: NewCoverLetter<'_>,
) -> Result<CoverLetterRow, sqlx::Error> {
    let mut tx = pool.begin().await?;
    lock_user(&mut tx, user_id).await?;

    let (version, parent_id) = if is_standalone_letter(letter.company_name, letter.job_title) {
        (1, None)
    } else {
        let lineage: Vec<(Uuid, i32, bool)> = sqlx::query_as(
            r#"
            SELECT id, version, is_current FROM cover_letters
            WHERE user_id = $1 AND company_name = $2 AND job_title = $3
            "#,
        )
        .bind(user_id)
        .bind(letter.company_name)
        .bind(letter.job_title)
        .fetch_all(&mut *tx)
        .await?;

        let versions: Vec<i32> = lineage.iter().map(|(_, v, _)| *v).collect();
        let parent_id = lineage
            .iter()
            .find(|(_, _, current)| *current)
            .map(|(id, _, _)| *id);

        sqlx::query(
            r#"
            UPDATE cover_letters SET is_current = FALSE, updated_at = NOW()
            WHERE user_id = $1 AND company_name = $2 AND job_title = $3 AND is_current
            "#,
        )
        .bind(user_id)
        .bind(letter.company_name)
        .bind(letter.job_title)
        .execute(&mut *tx)
        .await?;

        (next_version(&versions), parent_id)
    };

    let row = sqlx::query_as::<_, CoverLetterRow>(
        r#"
        INSERT INTO cover_letters
            (id, user_id, resume_id, parent_id, title, company_name, job_title,
             content, tone, version, is_current)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, TRUE)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(letter.resume_id)
    .bind(parent_id)
    .bind(letter.title)
    .bind(letter.company_name)
    .bind(letter.job_title)
    .bind(letter.content)
    .bind(letter.tone)
    .bind(version)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    info!(
        "Stored cover letter {} (version {version}) for user {user_id}",
        row.id
    );
    Ok(row)
}

pub async fn list_cover_letters(
    pool: &PgPool,
    user_id: Uuid,
    current_only: bool,
) -> Result<Vec<CoverLetterRow>, sqlx::Error> {
    sqlx::query_as::<_, CoverLetterRow>(
        r#"
        SELECT * FROM cover_letters
        WHERE user_id = $1 AND (NOT $2 OR is_current)
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .bind(current_only)
    .fetch_all(pool)
    .await
}

pub async fn find_cover_letter(
    pool: &PgPool,
    user_id: Uuid,
    cover_letter_id: Uuid,
) -> Result<Option<CoverLetterRow>, sqlx::Error> {
    sqlx::query_as::<_, CoverLetterRow>(
        "SELECT * FROM cover_letters WHERE id = $1 AND user_id = $2",
    )
    .bind(cover_letter_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// Deletes one letter, promoting the newest remaining letter of its lineage
/// when the deleted one was current.
pub async fn delete_cover_letter(
    pool: &PgPool,
    user_id: Uuid,
    cover_letter_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;
    lock_user(&mut tx, user_id).await?;

    let deleted: Option<(String, String, bool)> = sqlx::query_as(
        r#"
        DELETE FROM cover_letters WHERE id = $1 AND user_id = $2
        RETURNING company_name, job_title, is_current
        "#,
    )
    .bind(cover_letter_id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some((company_name, job_title, was_current)) = deleted else {
        return Ok(false);
    };

    if was_current && !is_standalone_letter(&company_name, &job_title) {
        sqlx::query(
            r#"
            UPDATE cover_letters SET is_current = TRUE, updated_at = NOW()
            WHERE id = (
                SELECT id FROM cover_letters
                WHERE user_id = $1 AND company_name = $2 AND job_title = $3
                ORDER BY version DESC, created_at DESC
                LIMIT 1
            )
            "#,
        )
        .bind(user_id)
        .bind(&company_name)
        .bind(&job_title)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_next_version() {
        assert_eq!(next_version(&[]), 1);
        assert_eq!(next_version(&[1, 3, 2]), 4);
    }

    #[test]
    fn test_standalone_letters() {
        assert!(is_standalone_letter("", "  "));
        assert!(!is_standalone_letter("Initech", ""));
        assert!(!is_standalone_letter("", "Engineer"));
    }

    // ── Database-backed ────────────────────────────────────────────────────

    async fn create_user(pool: &PgPool) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query("INSERT INTO users (id, email, password_hash) VALUES ($1, $2, 'hash')")
            .bind(id)
            .bind(format!("{id}@example.com"))
            .execute(pool)
            .await
            .unwrap();
        id
    }

    fn new_resume<'a>(title: &'a str, content: &'a Value) -> NewResume<'a> {
        NewResume {
            title,
            target_role: None,
            job_description: None,
            content,
            template_name: "ats_professional",
            is_ats_optimized: true,
            keywords_matched: None,
        }
    }

    fn new_letter<'a>(company_name: &'a str, job_title: &'a str, content: &'a str) -> NewCoverLetter<'a> {
        NewCoverLetter {
            resume_id: None,
            title: "Cover Letter",
            company_name,
            job_title,
            content,
            tone: "professional",
        }
    }

    async fn current_resume_ids(pool: &PgPool, user_id: Uuid) -> Vec<Uuid> {
        list_resumes(pool, user_id, true)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_generating_demotes_earlier_resumes(pool: PgPool) {
        let user = create_user(&pool).await;
        let content = json!({"summary": "v1"});
        let first = insert_resume(&pool, user, new_resume("First", &content)).await.unwrap();
        let second = insert_resume(&pool, user, new_resume("Second", &content)).await.unwrap();

        assert_eq!(second.version, 1);
        assert_eq!(second.root_id, second.id);
        assert_eq!(current_resume_ids(&pool, user).await, vec![second.id]);

        let first = find_resume(&pool, user, first.id).await.unwrap().unwrap();
        assert!(!first.is_current);
        assert_eq!(list_resumes(&pool, user, false).await.unwrap().len(), 2);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_update_appends_version_in_lineage(pool: PgPool) {
        let user = create_user(&pool).await;
        let content = json!({"summary": "v1"});
        let v1 = insert_resume(&pool, user, new_resume("Resume", &content)).await.unwrap();

        let v2 = append_resume_version(&pool, &v1, &json!({"summary": "v2"}))
            .await
            .unwrap();
        assert_eq!(v2.version, 2);
        assert_eq!(v2.root_id, v1.id);
        assert_eq!(v2.parent_id, Some(v1.id));
        assert_eq!(v2.content["summary"], "v2");
        assert_eq!(current_resume_ids(&pool, user).await, vec![v2.id]);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_concurrent_updates_get_distinct_versions(pool: PgPool) {
        let user = create_user(&pool).await;
        let content = json!({"summary": "v1"});
        let v1 = insert_resume(&pool, user, new_resume("Resume", &content)).await.unwrap();

        let edit_a = json!({"summary": "a"});
        let edit_b = json!({"summary": "b"});
        let (a, b) = tokio::join!(
            append_resume_version(&pool, &v1, &edit_a),
            append_resume_version(&pool, &v1, &edit_b),
        );
        let (a, b) = (a.unwrap(), b.unwrap());

        let mut versions = vec![a.version, b.version];
        versions.sort();
        assert_eq!(versions, vec![2, 3]);

        let newest = if a.version == 3 { a.id } else { b.id };
        assert_eq!(current_resume_ids(&pool, user).await, vec![newest]);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_deleting_current_resume_promotes_latest_version(pool: PgPool) {
        let user = create_user(&pool).await;
        let content = json!({"summary": "v1"});
        let v1 = insert_resume(&pool, user, new_resume("Resume", &content)).await.unwrap();
        let v2 = append_resume_version(&pool, &v1, &json!({"summary": "v2"})).await.unwrap();
        let v3 = append_resume_version(&pool, &v2, &json!({"summary": "v3"})).await.unwrap();

        assert!(delete_resume(&pool, user, v3.id).await.unwrap());
        assert_eq!(current_resume_ids(&pool, user).await, vec![v2.id]);

        // Deleting a non-current version leaves the current one alone.
        assert!(delete_resume(&pool, user, v1.id).await.unwrap());
        assert_eq!(current_resume_ids(&pool, user).await, vec![v2.id]);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_resumes_of_other_users_are_invisible(pool: PgPool) {
        let owner = create_user(&pool).await;
        let stranger = create_user(&pool).await;
        let content = json!({"summary": "mine"});
        let resume = insert_resume(&pool, owner, new_resume("Resume", &content)).await.unwrap();

        assert!(find_resume(&pool, stranger, resume.id).await.unwrap().is_none());
        assert!(!delete_resume(&pool, stranger, resume.id).await.unwrap());
        assert!(find_resume(&pool, owner, resume.id).await.unwrap().is_some());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_cover_letter_lineage_by_company_and_title(pool: PgPool) {
        let user = create_user(&pool).await;
        let first = insert_cover_letter(&pool, user, new_letter("Initech", "SRE", "one"))
            .await
            .unwrap();
        let other = insert_cover_letter(&pool, user, new_letter("Initech", "DBA", "other"))
            .await
            .unwrap();
        let second = insert_cover_letter(&pool, user, new_letter("Initech", "SRE", "two"))
            .await
            .unwrap();

        assert_eq!(first.version, 1);
        assert_eq!(other.version, 1);
        assert_eq!(second.version, 2);
        assert_eq!(second.parent_id, Some(first.id));

        let current: Vec<Uuid> = list_cover_letters(&pool, user, true)
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(current.len(), 2);
        assert!(current.contains(&second.id));
        assert!(current.contains(&other.id));

        assert!(delete_cover_letter(&pool, user, second.id).await.unwrap());
        let first = find_cover_letter(&pool, user, first.id).await.unwrap().unwrap();
        assert!(first.is_current);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_standalone_letters_stay_separate(pool: PgPool) {
        let user = create_user(&pool).await;
        let a = insert_cover_letter(&pool, user, new_letter("", "", "a")).await.unwrap();
        let b = insert_cover_letter(&pool, user, new_letter("", "", "b")).await.unwrap();

        assert_eq!((a.version, b.version), (1, 1));
        assert!(b.parent_id.is_none());
        assert_eq!(list_cover_letters(&pool, user, true).await.unwrap().len(), 2);

        let stranger = create_user(&pool).await;
        assert!(find_cover_letter(&pool, stranger, a.id).await.unwrap().is_none());
        assert!(!delete_cover_letter(&pool, stranger, a.id).await.unwrap());
    }
}
