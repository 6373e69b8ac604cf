//! Axum route handlers for /api/documents.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Multipart, Path, Query, Request, State},
    http::{header, StatusCode},
    Extension, Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::middleware::CurrentUser;
use crate::documents::ats::{self, ResumeSource};
use crate::documents::candidate::CandidateProfile;
use crate::documents::cover_letter::{self, JobDetails, Tone, ToneInfo};
use crate::documents::cv_parser::{self, ParsedCv};
use crate::documents::keywords::{self, JobKeywords, KeywordMatch};
use crate::documents::schema;
use crate::documents::templates::{self, ResumeTemplate, RoleRecommendations, DEFAULT_TEMPLATE};
use crate::documents::versioning::{self, NewCoverLetter, NewResume};
use crate::errors::AppError;
use crate::extract::{decode_optional_json, JsonOrEmpty};
use crate::models::document::{CoverLetterRow, ResumeRow};
use crate::state::AppState;
use crate::users::store as user_store;

const AI_RATE_LIMIT_SCOPE: &str = "ai";
const CV_FIELD: &str = "cv_file";
const PROFILE_REQUIRED: &str = "User profile not found. Please complete your profile first.";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct GenerateResumeRequest {
    pub target_role: Option<String>,
    pub job_description: Option<String>,
    pub template: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AtsResumeRequest {
    pub target_role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResumeResponse {
    pub resume: ResumeRow,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResumeDetail {
    pub resume: ResumeRow,
}

#[derive(Debug, Serialize)]
pub struct ResumeListResponse {
    pub resumes: Vec<ResumeRow>,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
pub struct CurrentOnlyQuery {
    #[serde(default)]
    pub current_only: bool,
}

#[derive(Debug, Deserialize)]
pub struct CoverLetterRequest {
    pub company_name: Option<String>,
    pub job_title: Option<String>,
    #[serde(default)]
    pub job_description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    pub tone: Option<String>,
    pub resume_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct CustomCoverLetterRequest {
    pub custom_prompt: Option<String>,
    pub company_name: Option<String>,
    pub job_title: Option<String>,
    #[serde(default)]
    pub job_description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    pub tone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CoverLetterResponse {
    pub cover_letter: CoverLetterRow,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct CoverLetterDetail {
    pub cover_letter: CoverLetterRow,
}

#[derive(Debug, Serialize)]
pub struct CoverLetterListResponse {
    pub cover_letters: Vec<CoverLetterRow>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct TemplateListResponse {
    pub templates: &'static [ResumeTemplate],
    pub default: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ToneListResponse {
    pub tones: Vec<ToneInfo>,
}

#[derive(Debug, Deserialize)]
pub struct RoleQuery {
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ParsedCvResponse {
    pub data: ParsedCv,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct KeywordsRequest {
    pub job_description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct KeywordsResponse {
    pub keywords: JobKeywords,
    #[serde(rename = "match")]
    pub profile_match: KeywordMatch,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// `POST /resume/generate-ats` accepts either a JSON body or a multipart
/// form with `target_role` and an optional PDF in `cv_file`.
#[derive(Debug, Default)]
pub struct AtsResumeInput {
    pub target_role: Option<String>,
    pub cv_pdf: Option<Bytes>,
}

#[async_trait]
impl<S> FromRequest<S> for AtsResumeInput
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if is_multipart {
            let mut multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| AppError::Validation(e.body_text()))?;
            let mut input = AtsResumeInput::default();
            while let Some(field) = next_field(&mut multipart).await? {
                let name = field.name().map(str::to_string);
                match name.as_deref() {
                    Some("target_role") => {
                        let text = field
                            .text()
                            .await
                            .map_err(|e| AppError::Validation(e.body_text()))?;
                        input.target_role = non_blank(Some(text));
                    }
                    Some(CV_FIELD) if field.file_name().is_some_and(|n| !n.is_empty()) => {
                        input.cv_pdf = Some(read_pdf_field(field).await?);
                    }
                    _ => {}
                }
            }
            return Ok(input);
        }

        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;
        let request: AtsResumeRequest = decode_optional_json(&body)?;
        Ok(AtsResumeInput {
            target_role: non_blank(request.target_role),
            cv_pdf: None,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

async fn next_field(
    multipart: &mut Multipart,
) -> Result<Option<axum::extract::multipart::Field<'_>>, AppError> {
    multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.body_text()))
}

async fn read_pdf_field(field: axum::extract::multipart::Field<'_>) -> Result<Bytes, AppError> {
    let file_name = field.file_name().unwrap_or_default().to_lowercase();
    if file_name.is_empty() {
        return Err(AppError::Validation("No file selected".to_string()));
    }
    if !file_name.ends_with(".pdf") {
        return Err(AppError::Validation(
            "Only PDF files are supported".to_string(),
        ));
    }
    field
        .bytes()
        .await
        .map_err(|e| AppError::Validation(e.body_text()))
}

async fn parse_cv(pdf: Bytes) -> Result<ParsedCv, AppError> {
    cv_parser::parse_pdf(pdf)
        .await
        .map_err(|e| AppError::Validation(format!("Error parsing CV file: {e}")))
}

fn parse_tone(raw: Option<&str>) -> Result<Tone, AppError> {
    match raw.map(str::trim).filter(|t| !t.is_empty()) {
        None => Ok(Tone::default()),
        Some(raw) => Tone::parse(raw).ok_or_else(|| {
            let names: Vec<&str> = Tone::ALL.iter().map(|t| t.as_str()).collect();
            AppError::Validation(format!(
                "Invalid tone. Choose from: {}",
                names.join(", ")
            ))
        }),
    }
}

/// Counts against the caller's AI quota. Call once the request has passed
/// validation so rejected requests stay free.
async fn enforce_ai_limit(state: &AppState, current: &CurrentUser) -> Result<(), AppError> {
    state
        .cache
        .enforce_rate_limit(
            AI_RATE_LIMIT_SCOPE,
            current.id,
            state.config.rate_limit_ai_per_minute,
        )
        .await
}

/// Loads the caller's snapshot. With `require_profile`, a missing profile is a 404.
async fn load_candidate(
    state: &AppState,
    user_id: Uuid,
    require_profile: bool,
) -> Result<CandidateProfile, AppError> {
    let loaded = user_store::load_user_with_profile(&state.db, user_id).await?;
    if require_profile && loaded.profile.is_none() {
        return Err(AppError::NotFound(PROFILE_REQUIRED.to_string()));
    }
    Ok(CandidateProfile::new(&loaded.user, loaded.profile.as_ref()))
}

async fn require_resume(state: &AppState, user_id: Uuid, id: Uuid) -> Result<ResumeRow, AppError> {
    versioning::find_resume(&state.db, user_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Resume not found".to_string()))
}

async fn require_cover_letter(
    state: &AppState,
    user_id: Uuid,
    id: Uuid,
) -> Result<CoverLetterRow, AppError> {
    versioning::find_cover_letter(&state.db, user_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Cover letter not found".to_string()))
}

fn resume_title(prefix: &str, target_role: Option<&str>) -> String {
    match target_role {
        Some(role) => format!("{prefix} - {role}"),
        None => format!("{prefix} - {}", Utc::now().format("%B %Y")),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Resumes
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/documents/resume/generate
pub async fn handle_generate_resume(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    JsonOrEmpty(request): JsonOrEmpty<GenerateResumeRequest>,
) -> Result<(StatusCode, Json<ResumeResponse>), AppError> {
    let template = non_blank(request.template).unwrap_or_else(|| DEFAULT_TEMPLATE.to_string());
    if templates::find_template(&template).is_none() {
        return Err(AppError::Validation(format!(
            "Unknown template '{template}'"
        )));
    }
    let target_role = non_blank(request.target_role);
    let job_description = non_blank(request.job_description);

    let candidate = load_candidate(&state, current.id, true).await?;
    enforce_ai_limit(&state, &current).await?;
    let generated = ats::resume_or_mock(
        &state.llm,
        &candidate,
        job_description.as_deref(),
        target_role.as_deref(),
    )
    .await;

    let keywords_matched = job_description.as_deref().map(|jd| {
        let analysis =
            keywords::match_keywords_with_profile(&keywords::extract_keywords(jd), &candidate.skills);
        json!({
            "matched_skills": analysis.matched_required_skills,
            "match_score": analysis.match_score,
        })
    });

    let title = resume_title("Resume", target_role.as_deref());
    let resume = versioning::insert_resume(
        &state.db,
        current.id,
        NewResume {
            title: &title,
            target_role: target_role.as_deref(),
            job_description: job_description.as_deref(),
            content: &generated.content,
            template_name: &template,
            is_ats_optimized: generated.source == ResumeSource::Llm,
            keywords_matched: keywords_matched.as_ref(),
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ResumeResponse {
            resume,
            message: "ATS-compliant resume generated successfully".to_string(),
            warnings: generated.warnings,
            template: None,
        }),
    ))
}

/// POST /api/documents/resume/generate-ats
pub async fn handle_generate_ats_resume(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    input: AtsResumeInput,
) -> Result<(StatusCode, Json<ResumeResponse>), AppError> {
    let mut candidate = load_candidate(&state, current.id, false).await?;
    if let Some(pdf) = input.cv_pdf {
        let cv = parse_cv(pdf).await?;
        candidate.fill_gaps_from_cv(&cv);
        info!("Merged uploaded CV into profile snapshot for user {}", current.id);
    }

    enforce_ai_limit(&state, &current).await?;
    let target_role = input.target_role;
    let generated = ats::resume_or_mock(&state.llm, &candidate, None, target_role.as_deref()).await;

    let title = resume_title("ATS Resume", target_role.as_deref());
    let resume = versioning::insert_resume(
        &state.db,
        current.id,
        NewResume {
            title: &title,
            target_role: target_role.as_deref(),
            job_description: None,
            content: &generated.content,
            template_name: DEFAULT_TEMPLATE,
            is_ats_optimized: generated.source == ResumeSource::Llm,
            keywords_matched: None,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ResumeResponse {
            resume,
            message: "ATS-optimized resume generated successfully".to_string(),
            warnings: generated.warnings,
            template: Some(DEFAULT_TEMPLATE.to_string()),
        }),
    ))
}

/// GET /api/documents/resume?current_only=
pub async fn handle_list_resumes(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<CurrentOnlyQuery>,
) -> Result<Json<ResumeListResponse>, AppError> {
    let resumes = versioning::list_resumes(&state.db, current.id, query.current_only).await?;
    Ok(Json(ResumeListResponse {
        total: resumes.len(),
        resumes,
    }))
}

/// GET /api/documents/resume/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(resume_id): Path<Uuid>,
) -> Result<Json<ResumeDetail>, AppError> {
    let resume = require_resume(&state, current.id, resume_id).await?;
    Ok(Json(ResumeDetail { resume }))
}

/// PUT /api/documents/resume/:id
///
/// The body is a partial resume; its top-level keys replace the stored ones
/// and the result is saved as a new version.
pub async fn handle_update_resume(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(resume_id): Path<Uuid>,
    Json(updates): Json<Value>,
) -> Result<Json<ResumeResponse>, AppError> {
    if !updates.is_object() {
        return Err(AppError::Validation(
            "Resume updates must be a JSON object".to_string(),
        ));
    }
    let source = require_resume(&state, current.id, resume_id).await?;

    let merged = schema::merge_content(&source.content, &updates);
    let report = schema::validate_resume(&merged);
    if !report.is_valid() {
        return Err(AppError::ValidationFailed(report.errors));
    }

    let resume = versioning::append_resume_version(&state.db, &source, &merged).await?;
    Ok(Json(ResumeResponse {
        message: format!("Resume updated to version {}", resume.version),
        resume,
        warnings: report.warnings,
        template: None,
    }))
}

/// DELETE /api/documents/resume/:id
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(resume_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    if !versioning::delete_resume(&state.db, current.id, resume_id).await? {
        return Err(AppError::NotFound("Resume not found".to_string()));
    }
    Ok(Json(MessageResponse {
        message: "Resume deleted successfully".to_string(),
    }))
}

/// GET /api/documents/resume/versions/:user_id
pub async fn handle_resume_versions(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ResumeListResponse>, AppError> {
    if current.id != user_id {
        return Err(AppError::Forbidden);
    }
    let resumes = versioning::list_resumes(&state.db, user_id, false).await?;
    Ok(Json(ResumeListResponse {
        total: resumes.len(),
        resumes,
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Cover letters
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/documents/cover-letter/generate
pub async fn handle_generate_cover_letter(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(request): Json<CoverLetterRequest>,
) -> Result<(StatusCode, Json<CoverLetterResponse>), AppError> {
    let tone = parse_tone(request.tone.as_deref())?;
    let (Some(company_name), Some(job_title)) =
        (non_blank(request.company_name), non_blank(request.job_title))
    else {
        return Err(AppError::Validation(
            "Company name and job title are required".to_string(),
        ));
    };

    if let Some(resume_id) = request.resume_id {
        require_resume(&state, current.id, resume_id).await?;
    }
    let candidate = load_candidate(&state, current.id, true).await?;
    enforce_ai_limit(&state, &current).await?;

    let job = JobDetails {
        company_name,
        job_title,
        job_description: request.job_description,
        requirements: request.requirements,
    };
    let content = cover_letter::cover_letter_or_mock(&state.llm, &candidate, &job, tone).await;

    let title = cover_letter::letter_title(&job);
    let cover_letter = versioning::insert_cover_letter(
        &state.db,
        current.id,
        NewCoverLetter {
            resume_id: request.resume_id,
            title: &title,
            company_name: &job.company_name,
            job_title: &job.job_title,
            content: &content,
            tone: tone.as_str(),
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(CoverLetterResponse {
            cover_letter,
            message: "Cover letter generated successfully".to_string(),
        }),
    ))
}

/// POST /api/documents/cover-letter/generate-custom
pub async fn handle_generate_custom_cover_letter(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(request): Json<CustomCoverLetterRequest>,
) -> Result<(StatusCode, Json<CoverLetterResponse>), AppError> {
    let custom_prompt = non_blank(request.custom_prompt)
        .ok_or_else(|| AppError::Validation("Custom prompt is required".to_string()))?;
    let tone = parse_tone(request.tone.as_deref())?;

    let job = match (non_blank(request.company_name), non_blank(request.job_title)) {
        (Some(company_name), Some(job_title)) => Some(JobDetails {
            company_name,
            job_title,
            job_description: request.job_description,
            requirements: request.requirements,
        }),
        _ => None,
    };

    let candidate = load_candidate(&state, current.id, true).await?;
    enforce_ai_limit(&state, &current).await?;
    let content = match cover_letter::generate_custom_cover_letter(
        &state.llm,
        &candidate,
        &custom_prompt,
        job.as_ref(),
        tone,
    )
    .await
    {
        Ok(letter) => letter,
        Err(e) => {
            warn!(error = %e, "Custom cover letter generation failed, using template letter");
            let fallback = job.clone().unwrap_or_else(|| JobDetails {
                company_name: "your organization".to_string(),
                job_title: "open".to_string(),
                ..Default::default()
            });
            cover_letter::mock_cover_letter(&candidate, &fallback, tone, Utc::now())
        }
    };

    let title = cover_letter::custom_letter_title(job.as_ref(), Utc::now());
    let (company_name, job_title) = job
        .as_ref()
        .map(|j| (j.company_name.as_str(), j.job_title.as_str()))
        .unwrap_or_default();
    let cover_letter = versioning::insert_cover_letter(
        &state.db,
        current.id,
        NewCoverLetter {
            resume_id: None,
            title: &title,
            company_name,
            job_title,
            content: &content,
            tone: tone.as_str(),
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(CoverLetterResponse {
            cover_letter,
            message: "Custom cover letter generated successfully".to_string(),
        }),
    ))
}

/// GET /api/documents/cover-letter?current_only=
pub async fn handle_list_cover_letters(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<CurrentOnlyQuery>,
) -> Result<Json<CoverLetterListResponse>, AppError> {
    let cover_letters =
        versioning::list_cover_letters(&state.db, current.id, query.current_only).await?;
    Ok(Json(CoverLetterListResponse {
        total: cover_letters.len(),
        cover_letters,
    }))
}

/// GET /api/documents/cover-letter/:id
pub async fn handle_get_cover_letter(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(cover_letter_id): Path<Uuid>,
) -> Result<Json<CoverLetterDetail>, AppError> {
    let cover_letter = require_cover_letter(&state, current.id, cover_letter_id).await?;
    Ok(Json(CoverLetterDetail { cover_letter }))
}

/// DELETE /api/documents/cover-letter/:id
pub async fn handle_delete_cover_letter(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(cover_letter_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    if !versioning::delete_cover_letter(&state.db, current.id, cover_letter_id).await? {
        return Err(AppError::NotFound("Cover letter not found".to_string()));
    }
    Ok(Json(MessageResponse {
        message: "Cover letter deleted successfully".to_string(),
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Utilities
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/documents/templates
pub async fn handle_list_templates() -> Json<TemplateListResponse> {
    Json(TemplateListResponse {
        templates: &templates::TEMPLATES,
        default: DEFAULT_TEMPLATE,
    })
}

/// GET /api/documents/tones
pub async fn handle_list_tones() -> Json<ToneListResponse> {
    Json(ToneListResponse {
        tones: cover_letter::tone_catalogue(),
    })
}

/// GET /api/documents/role-recommendations?role=
pub async fn handle_role_recommendations(
    Query(query): Query<RoleQuery>,
) -> Result<Json<RoleRecommendations>, AppError> {
    let role = non_blank(query.role)
        .ok_or_else(|| AppError::Validation("Role parameter is required".to_string()))?;
    Ok(Json(templates::recommend_for_role(&role)))
}

/// POST /api/documents/parse-cv
pub async fn handle_parse_cv(mut multipart: Multipart) -> Result<Json<ParsedCvResponse>, AppError> {
    while let Some(field) = next_field(&mut multipart).await? {
        if field.name() == Some(CV_FIELD) {
            let pdf = read_pdf_field(field).await?;
            let data = parse_cv(pdf).await?;
            return Ok(Json(ParsedCvResponse {
                data,
                message: "CV parsed successfully".to_string(),
            }));
        }
    }
    Err(AppError::Validation("No CV file uploaded".to_string()))
}

/// POST /api/documents/keywords
pub async fn handle_extract_keywords(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(request): Json<KeywordsRequest>,
) -> Result<Json<KeywordsResponse>, AppError> {
    let job_description = non_blank(request.job_description)
        .ok_or_else(|| AppError::Validation("Job description is required".to_string()))?;

    let skills = user_store::find_profile(&state.db, current.id)
        .await?
        .map(|p| p.skills)
        .unwrap_or_default();
    let keywords = keywords::extract_keywords(&job_description);
    let profile_match = keywords::match_keywords_with_profile(&keywords, &skills);

    Ok(Json(KeywordsResponse {
        keywords,
        profile_match,
    }))
}

/// GET /api/documents/health
pub async fn handle_documents_health() -> Json<Value> {
    Json(json!({
        "service": "ATS Document Generation Service",
        "status": "healthy",
        "features": [
            "ATS-compliant resume generation with LLM",
            "Keyword-optimized resumes from job descriptions",
            "Cover letter generation with LLM",
            "Versioned document storage",
            "JSON schema validation",
            "CV parsing from PDF uploads",
            "Keyword matching analysis",
        ],
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_parse_tone() {
        assert_eq!(parse_tone(None).unwrap(), Tone::Professional);
        assert_eq!(parse_tone(Some("  ")).unwrap(), Tone::Professional);
        assert_eq!(parse_tone(Some("enthusiastic")).unwrap(), Tone::Enthusiastic);
        let err = parse_tone(Some("sarcastic")).unwrap_err();
        assert!(err.to_string().contains("professional, friendly, formal, enthusiastic"));
    }

    #[test]
    fn test_resume_title() {
        assert_eq!(resume_title("Resume", Some("SRE")), "Resume - SRE");
        let dated = resume_title("ATS Resume", None);
        assert!(dated.starts_with("ATS Resume - "));
        assert!(dated.ends_with(&Utc::now().format("%Y").to_string()));
    }

    #[test]
    fn test_current_only_defaults_to_false() {
        let uri: axum::http::Uri = "/api/documents/resume".parse().unwrap();
        let Query(query) = Query::<CurrentOnlyQuery>::try_from_uri(&uri).unwrap();
        assert!(!query.current_only);

        let uri: axum::http::Uri = "/api/documents/resume?current_only=true".parse().unwrap();
        let Query(query) = Query::<CurrentOnlyQuery>::try_from_uri(&uri).unwrap();
        assert!(query.current_only);
    }

    #[tokio::test]
    async fn test_ats_input_from_json_body() {
        let req = Request::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"target_role": "  Data Engineer "}"#))
            .unwrap();
        let input = AtsResumeInput::from_request(req, &()).await.unwrap();
        assert_eq!(input.target_role.as_deref(), Some("Data Engineer"));
        assert!(input.cv_pdf.is_none());
    }

    #[tokio::test]
    async fn test_ats_input_accepts_empty_body() {
        let req = Request::builder()
            .method("POST")
            .body(Body::empty())
            .unwrap();
        let input = AtsResumeInput::from_request(req, &()).await.unwrap();
        assert!(input.target_role.is_none());
    }

    #[tokio::test]
    async fn test_ats_input_from_multipart() {
        let boundary = "X-BOUNDARY";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"target_role\"\r\n\r\n\
             Backend Engineer\r\n\
             --{boundary}\r\n\
             Content-Disposition: form-data; name=\"cv_file\"; filename=\"CV.PDF\"\r\n\
             Content-Type: application/pdf\r\n\r\n\
             %PDF-1.4\r\n\
             --{boundary}--\r\n"
        );
        let req = Request::builder()
            .method("POST")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();
        let input = AtsResumeInput::from_request(req, &()).await.unwrap();
        assert_eq!(input.target_role.as_deref(), Some("Backend Engineer"));
        assert_eq!(input.cv_pdf.as_deref(), Some(&b"%PDF-1.4"[..]));
    }

    #[tokio::test]
    async fn test_ats_input_rejects_non_pdf_upload() {
        let boundary = "X-BOUNDARY";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"cv_file\"; filename=\"cv.docx\"\r\n\r\n\
             binary\r\n\
             --{boundary}--\r\n"
        );
        let req = Request::builder()
            .method("POST")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();
        let err = AtsResumeInput::from_request(req, &()).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg == "Only PDF files are supported"));
    }
}
