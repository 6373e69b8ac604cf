use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A posting on the in-memory job board.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub company: String,
    pub company_logo: String,
    pub location: String,
    pub work_type: String,
    pub job_type: String,
    pub experience_level: String,
    pub salary_min: i32,
    pub salary_max: i32,
    pub description: String,
    pub requirements: Vec<String>,
    pub responsibilities: Vec<String>,
    pub skills_required: Vec<String>,
    pub benefits: Vec<String>,
    pub source: String,
    pub source_url: String,
    pub posted_date: DateTime<Utc>,
    pub application_deadline: DateTime<Utc>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Saved,
    Applied,
    Interview,
    Rejected,
    Accepted,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 5] = [
        ApplicationStatus::Saved,
        ApplicationStatus::Applied,
        ApplicationStatus::Interview,
        ApplicationStatus::Rejected,
        ApplicationStatus::Accepted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Saved => "saved",
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Interview => "interview",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Accepted => "accepted",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == raw)
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct JobApplicationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub job_id: i32,
    pub status: String,
    pub applied_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub resume_id: Option<Uuid>,
    pub cover_letter_id: Option<Uuid>,
    pub match_score: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_text() {
        for status in ApplicationStatus::ALL {
            assert_eq!(ApplicationStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ApplicationStatus::parse("ghosted"), None);
    }
}
