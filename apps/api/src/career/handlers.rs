//! Axum route handlers for /api/career.

use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::auth::middleware::CurrentUser;
use crate::career::data::{
    career_roles, careers_by_category, find_career, CareerPath, ALL_SKILLS, CAREER_PATHS,
};
use crate::career::recommender::{CareerRecommendation, SkillPlan, DEFAULT_TOP_N};
use crate::errors::AppError;
use crate::models::user::UserProfile;
use crate::state::AppState;
use crate::users::store;

const RECOMMENDATION_CACHE_TTL: u64 = 300;
const RATE_LIMIT_SCOPE: &str = "career";

#[derive(Debug, Deserialize)]
pub struct RecommendQuery {
    pub top_n: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendResponse {
    pub recommendations: Vec<CareerRecommendation>,
    pub user_skills: Vec<String>,
    pub total_careers_analyzed: usize,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct CareerSummary {
    pub role: &'static str,
    pub category: &'static str,
    pub description: &'static str,
    pub required_skills_count: usize,
    pub average_salary: &'static str,
    pub growth_rate: &'static str,
}

#[derive(Debug, Serialize)]
pub struct CareerListResponse {
    pub careers: Vec<CareerSummary>,
    pub total_careers: usize,
    pub categories: BTreeMap<&'static str, Vec<&'static str>>,
}

#[derive(Debug, Serialize)]
pub struct CareerDetailResponse {
    pub career: &'static CareerPath,
}

#[derive(Debug, Serialize)]
pub struct SkillListResponse {
    pub skills: Vec<&'static str>,
    pub total_skills: usize,
}

async fn load_profile(state: &AppState, current: &CurrentUser) -> Result<UserProfile, AppError> {
    store::find_profile(&state.db, current.id).await?.ok_or_else(|| {
        AppError::NotFound("User profile not found. Please complete your profile first.".to_string())
    })
}

fn profile_stamp(profile: &UserProfile) -> i64 {
    profile.updated_at.timestamp_micros()
}

/// GET /api/career/recommend?top_n=5
pub async fn handle_recommend(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<RecommendQuery>,
) -> Result<Json<RecommendResponse>, AppError> {
    state
        .cache
        .enforce_rate_limit(
            RATE_LIMIT_SCOPE,
            current.id,
            state.config.rate_limit_recommend_per_minute,
        )
        .await?;

    let profile = load_profile(&state, &current).await?;
    if profile.skills.is_empty() && profile.interests.is_empty() {
        return Err(AppError::Validation(
            "Please add skills and interests to your profile to get personalized recommendations"
                .to_string(),
        ));
    }

    let top_n = query
        .top_n
        .unwrap_or(DEFAULT_TOP_N)
        .clamp(1, CAREER_PATHS.len());
    let cache_key = format!(
        "career:recommend:{}:{}:{top_n}",
        current.id,
        profile_stamp(&profile)
    );
    if let Some(cached) = state.cache.get_json::<RecommendResponse>(&cache_key).await {
        return Ok(Json(cached));
    }

    let recommendations = state
        .recommender
        .recommend(&profile.skills, &profile.interests, top_n);
    info!(
        "Generated {} career recommendations for user {}",
        recommendations.len(),
        current.id
    );

    let response = RecommendResponse {
        message: format!(
            "Found {} career matches based on your profile",
            recommendations.len()
        ),
        recommendations,
        user_skills: profile.skills,
        total_careers_analyzed: CAREER_PATHS.len(),
    };
    state
        .cache
        .set_json(&cache_key, &response, RECOMMENDATION_CACHE_TTL)
        .await;

    Ok(Json(response))
}

/// GET /api/career/skill-gap/:role
pub async fn handle_skill_gap(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(role): Path<String>,
) -> Result<Json<SkillPlan>, AppError> {
    state
        .cache
        .enforce_rate_limit(
            RATE_LIMIT_SCOPE,
            current.id,
            state.config.rate_limit_recommend_per_minute,
        )
        .await?;

    let career = find_career(&role).ok_or_else(|| unknown_career(&role))?;
    let profile = load_profile(&state, &current).await?;

    let cache_key = format!(
        "career:skill-gap:{}:{}:{}",
        current.id,
        profile_stamp(&profile),
        career.role.to_lowercase().replace(' ', "-")
    );
    if let Some(cached) = state.cache.get_json::<SkillPlan>(&cache_key).await {
        return Ok(Json(cached));
    }

    let plan = state
        .recommender
        .skill_plan(&profile.skills, career.role)
        .ok_or_else(|| unknown_career(&role))?;
    state
        .cache
        .set_json(&cache_key, &plan, RECOMMENDATION_CACHE_TTL)
        .await;

    Ok(Json(plan))
}

fn unknown_career(role: &str) -> AppError {
    AppError::NotFound(format!(
        "Career '{role}' not found. Available careers: {}",
        career_roles().join(", ")
    ))
}

/// GET /api/career/careers
pub async fn handle_list_careers() -> Json<CareerListResponse> {
    let careers: Vec<CareerSummary> = CAREER_PATHS
        .iter()
        .map(|c| CareerSummary {
            role: c.role,
            category: c.category,
            description: c.description,
            required_skills_count: c.required_skills.len(),
            average_salary: c.average_salary,
            growth_rate: c.growth_rate,
        })
        .collect();

    Json(CareerListResponse {
        total_careers: careers.len(),
        careers,
        categories: careers_by_category(),
    })
}

/// GET /api/career/careers/:role
pub async fn handle_get_career(
    Path(role): Path<String>,
) -> Result<Json<CareerDetailResponse>, AppError> {
    let career = find_career(&role).ok_or_else(|| unknown_career(&role))?;
    Ok(Json(CareerDetailResponse { career }))
}

/// GET /api/career/skills
pub async fn handle_list_skills() -> Json<SkillListResponse> {
    let skills = ALL_SKILLS.clone();
    Json(SkillListResponse {
        total_skills: skills.len(),
        skills,
    })
}

/// GET /api/career/health
pub async fn handle_career_health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "career-recommendations",
        "careers_loaded": CAREER_PATHS.len(),
        "skills_indexed": ALL_SKILLS.len(),
    }))
}
