use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// One stored resume version. `root_id` identifies the lineage.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub root_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub title: String,
    pub target_role: Option<String>,
    pub job_description: Option<String>,
    pub content: Value,
    pub version: i32,
    pub is_current: bool,
    pub is_ats_optimized: bool,
    pub template_name: String,
    pub keywords_matched: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One stored cover letter version. Lineage is (user, company_name, job_title).
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CoverLetterRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub resume_id: Option<Uuid>,
    pub parent_id: Option<Uuid>,
    pub title: String,
    pub company_name: String,
    pub job_title: String,
    pub content: String,
    pub tone: String,
    pub version: i32,
    pub is_current: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
