use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::tokens::TokenService;
use crate::cache::Cache;
use crate::career::recommender::CareerRecommender;
use crate::config::Config;
use crate::jobs::board::JobBoard;
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Response cache and per-user rate limits. Degrades to a no-op when Redis is down.
    pub cache: Cache,
    pub llm: LlmClient,
    pub tokens: TokenService,
    /// TF-IDF model over the career catalogue, built once at startup.
    pub recommender: Arc<CareerRecommender>,
    /// In-memory mock job board.
    pub jobs: JobBoard,
    pub config: Config,
}
