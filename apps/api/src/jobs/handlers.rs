//! Axum route handlers for /api/jobs.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::auth::middleware::CurrentUser;
use crate::errors::AppError;
use crate::extract::JsonOrEmpty;
use crate::jobs::board::Seeded;
use crate::jobs::matcher::{self, JobFilters, JobMatch, MatchExplanation, MatchProfile};
use crate::jobs::store::{self, NewApplication};
use crate::models::job::{ApplicationStatus, Job, JobApplicationRow};
use crate::state::AppState;
use crate::users::store as user_store;

const DEFAULT_MATCH_LIMIT: usize = 20;
const DEFAULT_SEARCH_LIMIT: usize = 50;
const MAX_LIMIT: usize = 100;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

// Filter fields stay flat: urlencoded numbers fail inside `#[serde(flatten)]`.
#[derive(Debug, Deserialize)]
pub struct MatchQuery {
    pub role: Option<String>,
    pub limit: Option<usize>,
    pub location: Option<String>,
    pub experience_level: Option<String>,
    pub work_type: Option<String>,
    pub job_type: Option<String>,
    pub min_salary: Option<i32>,
}

impl MatchQuery {
    fn filters(&self) -> JobFilters {
        JobFilters {
            location: self.location.clone(),
            experience_level: self.experience_level.clone(),
            work_type: self.work_type.clone(),
            job_type: self.job_type.clone(),
            min_salary: self.min_salary,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub jobs: Vec<JobMatch>,
    pub total: usize,
    pub filters_applied: JobFilters,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub location: Option<String>,
    pub experience_level: Option<String>,
    pub work_type: Option<String>,
    pub job_type: Option<String>,
    pub min_salary: Option<i32>,
}

impl SearchQuery {
    fn filters(&self) -> JobFilters {
        JobFilters {
            location: self.location.clone(),
            experience_level: self.experience_level.clone(),
            work_type: self.work_type.clone(),
            job_type: self.job_type.clone(),
            min_salary: self.min_salary,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub jobs: Vec<Job>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

#[derive(Debug, Serialize)]
pub struct JobDetail {
    #[serde(flatten)]
    pub job: Job,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct JobDetailResponse {
    pub job: JobDetail,
}

#[derive(Debug, Serialize)]
pub struct ApplicationResponse {
    pub message: String,
    pub application: JobApplicationRow,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApplyRequest {
    pub resume_id: Option<Uuid>,
    pub cover_letter_id: Option<Uuid>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApplicationsQuery {
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApplicationListResponse {
    pub applications: Vec<JobApplicationRow>,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
pub struct UpdateApplicationRequest {
    pub status: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExplanationResponse {
    pub explanation: MatchExplanation,
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// Builds the matcher's view of the caller. A missing profile matches on
/// nothing but `target_role`.
async fn match_profile(
    state: &AppState,
    user_id: Uuid,
    target_role: Option<String>,
) -> Result<MatchProfile, AppError> {
    let profile = user_store::find_profile(&state.db, user_id).await?;
    Ok(match profile {
        Some(p) => MatchProfile {
            target_role: target_role.or(p.target_role),
            skills: p.skills,
            bio: p.bio,
            experience: p.experience.0,
            education: p.education.0,
        },
        None => MatchProfile {
            target_role,
            ..Default::default()
        },
    })
}

async fn require_job(state: &AppState, job_id: i32) -> Result<Job, AppError> {
    state
        .jobs
        .get(job_id)
        .await
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))
}

fn parse_status(raw: &str) -> Result<ApplicationStatus, AppError> {
    ApplicationStatus::parse(raw).ok_or_else(|| {
        AppError::Validation(format!(
            "Invalid status '{raw}'. Must be one of: saved, applied, interview, rejected, accepted"
        ))
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/jobs/initialize
pub async fn handle_initialize(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.jobs.initialize().await {
        Seeded::Created(count) => (
            StatusCode::CREATED,
            Json(json!({
                "message": format!("{count} jobs initialized successfully"),
                "count": count,
            })),
        ),
        Seeded::AlreadyPresent(count) => (
            StatusCode::OK,
            Json(json!({
                "message": format!("{count} jobs already exist"),
                "count": count,
            })),
        ),
    }
}

/// GET /api/jobs/match
pub async fn handle_match(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<MatchQuery>,
) -> Result<Json<MatchResponse>, AppError> {
    let filters = query.filters();
    let role = query.role.filter(|r| !r.trim().is_empty());
    let profile = match_profile(&state, current.id, role).await?;
    let limit = query.limit.unwrap_or(DEFAULT_MATCH_LIMIT).clamp(1, MAX_LIMIT);

    let candidates = state.jobs.active(&filters).await;
    let jobs = matcher::match_jobs(&profile, candidates, limit);
    info!("Matched {} jobs for user {}", jobs.len(), current.id);

    Ok(Json(MatchResponse {
        total: jobs.len(),
        jobs,
        filters_applied: filters,
    }))
}

/// GET /api/jobs/search
pub async fn handle_search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Json<SearchResponse> {
    let limit = query.limit.unwrap_or(DEFAULT_SEARCH_LIMIT).clamp(1, MAX_LIMIT);
    let offset = query.offset.unwrap_or(0);
    let (jobs, total) = state
        .jobs
        .search(query.q.as_deref(), &query.filters(), limit, offset)
        .await;

    Json(SearchResponse {
        jobs,
        total,
        limit,
        offset,
    })
}

/// GET /api/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(job_id): Path<i32>,
) -> Result<Json<JobDetailResponse>, AppError> {
    let job = require_job(&state, job_id).await?;
    let application = store::find_application(&state.db, current.id, job_id).await?;

    Ok(Json(JobDetailResponse {
        job: JobDetail {
            job,
            application_status: application.as_ref().map(|a| a.status.clone()),
            applied_date: application.and_then(|a| a.applied_date),
        },
    }))
}

/// POST /api/jobs/:id/save
pub async fn handle_save_job(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(job_id): Path<i32>,
) -> Result<(StatusCode, Json<ApplicationResponse>), AppError> {
    require_job(&state, job_id).await?;

    if let Some(application) = store::insert_saved(&state.db, current.id, job_id).await? {
        return Ok((
            StatusCode::CREATED,
            Json(ApplicationResponse {
                message: "Job saved successfully".to_string(),
                application,
            }),
        ));
    }

    let application = store::find_application(&state.db, current.id, job_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Application not found".to_string()))?;
    Ok((
        StatusCode::OK,
        Json(ApplicationResponse {
            message: "Job already saved".to_string(),
            application,
        }),
    ))
}

/// POST /api/jobs/:id/apply
pub async fn handle_apply(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(job_id): Path<i32>,
    JsonOrEmpty(request): JsonOrEmpty<ApplyRequest>,
) -> Result<(StatusCode, Json<ApplicationResponse>), AppError> {
    let job = require_job(&state, job_id).await?;

    let profile = match_profile(&state, current.id, None).await?;
    let board = state.jobs.active(&JobFilters::default()).await;
    let match_score = matcher::score_job(&profile, board, &job);

    let (application, created) = store::upsert_applied(
        &state.db,
        current.id,
        job_id,
        NewApplication {
            resume_id: request.resume_id,
            cover_letter_id: request.cover_letter_id,
            notes: request.notes.filter(|n| !n.trim().is_empty()),
            match_score: Some(match_score),
        },
    )
    .await?;
    info!("User {} applied to job {job_id}", current.id);

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(ApplicationResponse {
            message: "Application submitted successfully".to_string(),
            application,
        }),
    ))
}

/// GET /api/jobs/applications?status=
pub async fn handle_list_applications(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<ApplicationsQuery>,
) -> Result<Json<ApplicationListResponse>, AppError> {
    let status = query
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(parse_status)
        .transpose()?;

    let applications = store::list_applications(&state.db, current.id, status).await?;
    Ok(Json(ApplicationListResponse {
        total: applications.len(),
        applications,
    }))
}

/// PATCH /api/jobs/applications/:id
pub async fn handle_update_application(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(application_id): Path<Uuid>,
    Json(request): Json<UpdateApplicationRequest>,
) -> Result<Json<ApplicationResponse>, AppError> {
    if request.status.is_none() && request.notes.is_none() {
        return Err(AppError::Validation(
            "Nothing to update: provide status or notes".to_string(),
        ));
    }
    let status = request.status.as_deref().map(parse_status).transpose()?;

    let application = store::update_application(
        &state.db,
        current.id,
        application_id,
        status,
        request.notes.as_deref(),
    )
    .await?
    .ok_or_else(|| AppError::NotFound("Application not found".to_string()))?;

    Ok(Json(ApplicationResponse {
        message: "Application updated successfully".to_string(),
        application,
    }))
}

/// GET /api/jobs/:id/match-explanation
pub async fn handle_match_explanation(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(job_id): Path<i32>,
) -> Result<Json<ExplanationResponse>, AppError> {
    let job = require_job(&state, job_id).await?;
    let profile = match_profile(&state, current.id, None).await?;
    Ok(Json(ExplanationResponse {
        explanation: matcher::explain(&profile, &job),
    }))
}

/// GET /api/jobs/health
pub async fn handle_jobs_health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "job-matching",
        "jobs_loaded": state.jobs.len().await,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status_rejects_unknown_values() {
        assert_eq!(parse_status("interview").unwrap(), ApplicationStatus::Interview);
        assert!(matches!(parse_status("ghosted"), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_match_query_parses_from_a_query_string() {
        let uri: axum::http::Uri = "/api/jobs/match?role=DevOps&location=Remote&min_salary=120000&limit=5"
            .parse()
            .unwrap();
        let Query(query) = Query::<MatchQuery>::try_from_uri(&uri).unwrap();
        let filters = query.filters();
        assert_eq!(query.limit, Some(5));
        assert_eq!(filters.location.as_deref(), Some("Remote"));
        assert_eq!(filters.min_salary, Some(120_000));
        assert!(filters.job_type.is_none());
    }
}
