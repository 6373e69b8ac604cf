pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, patch, post, put},
    Router,
};

use crate::auth::{self, middleware::auth_middleware};
use crate::career::handlers as career;
use crate::documents::handlers as documents;
use crate::jobs::handlers as jobs;
use crate::state::AppState;
use crate::users::handlers as users;

/// Upper bound for request bodies, sized for CV uploads.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Routes reachable without a token.
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/health", get(health::health_handler))
        // Auth
        .route("/api/auth/register", post(auth::handlers::handle_register))
        .route("/api/auth/login", post(auth::handlers::handle_login))
        .route("/api/auth/refresh", post(auth::handlers::handle_refresh))
        // Career catalogue
        .route("/api/career/careers", get(career::handle_list_careers))
        .route("/api/career/careers/:role", get(career::handle_get_career))
        .route("/api/career/skills", get(career::handle_list_skills))
        .route("/api/career/health", get(career::handle_career_health))
        // Jobs
        .route("/api/jobs/health", get(jobs::handle_jobs_health))
        // Documents
        .route("/api/documents/templates", get(documents::handle_list_templates))
        .route("/api/documents/tones", get(documents::handle_list_tones))
        .route(
            "/api/documents/role-recommendations",
            get(documents::handle_role_recommendations),
        )
        .route("/api/documents/health", get(documents::handle_documents_health))
}

/// Routes that need a valid access token; `CurrentUser` is in the extensions.
fn protected_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/auth/me", get(auth::handlers::handle_me))
        // Users
        .route(
            "/api/users/profile",
            get(users::handle_get_profile)
                .put(users::handle_update_profile)
                .patch(users::handle_update_profile),
        )
        .route("/api/users/profile/theme", put(users::handle_update_theme))
        .route("/api/users", get(users::handle_list_users))
        .route("/api/users/:id", get(users::handle_get_user))
        // Career
        .route("/api/career/recommend", get(career::handle_recommend))
        .route("/api/career/skill-gap/:role", get(career::handle_skill_gap))
        // Jobs
        .route("/api/jobs/initialize", post(jobs::handle_initialize))
        .route("/api/jobs/match", get(jobs::handle_match))
        .route("/api/jobs/search", get(jobs::handle_search))
        .route("/api/jobs/applications", get(jobs::handle_list_applications))
        .route(
            "/api/jobs/applications/:id",
            patch(jobs::handle_update_application),
        )
        .route("/api/jobs/:id", get(jobs::handle_get_job))
        .route("/api/jobs/:id/save", post(jobs::handle_save_job))
        .route("/api/jobs/:id/apply", post(jobs::handle_apply))
        .route(
            "/api/jobs/:id/match-explanation",
            get(jobs::handle_match_explanation),
        )
        // Resumes
        .route(
            "/api/documents/resume/generate",
            post(documents::handle_generate_resume),
        )
        .route(
            "/api/documents/resume/generate-ats",
            post(documents::handle_generate_ats_resume),
        )
        .route("/api/documents/resume", get(documents::handle_list_resumes))
        .route(
            "/api/documents/resume/versions/:user_id",
            get(documents::handle_resume_versions),
        )
        .route(
            "/api/documents/resume/:id",
            get(documents::handle_get_resume)
                .put(documents::handle_update_resume)
                .delete(documents::handle_delete_resume),
        )
        // Cover letters
        .route(
            "/api/documents/cover-letter/generate",
            post(documents::handle_generate_cover_letter),
        )
        .route(
            "/api/documents/cover-letter/generate-custom",
            post(documents::handle_generate_custom_cover_letter),
        )
        .route(
            "/api/documents/cover-letter",
            get(documents::handle_list_cover_letters),
        )
        .route(
            "/api/documents/cover-letter/:id",
            get(documents::handle_get_cover_letter).delete(documents::handle_delete_cover_letter),
        )
        // Document utilities
        .route("/api/documents/parse-cv", post(documents::handle_parse_cv))
        .route("/api/documents/keywords", post(documents::handle_extract_keywords))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(public_routes())
        .merge(protected_routes(&state))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}
