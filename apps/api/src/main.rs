mod auth;
mod cache;
mod career;
mod config;
mod db;
mod documents;
mod errors;
mod extract;
mod jobs;
mod llm_client;
mod ml;
mod models;
mod routes;
mod state;
mod users;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::tokens::TokenService;
use crate::cache::Cache;
use crate::career::recommender::CareerRecommender;
use crate::config::Config;
use crate::db::{create_pool, run_migrations};
use crate::jobs::board::JobBoard;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Fails fast on missing required env vars
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting HireSkill API v{}", env!("CARGO_PKG_VERSION"));

    let db = create_pool(&config.database_url).await?;
    run_migrations(&db).await?;

    // The client connects lazily; an unreachable Redis only disables caching.
    let redis = redis::Client::open(config.redis_url.clone())?;
    let cache = Cache::new(redis);
    info!("Redis cache initialized");

    let llm = LlmClient::new(&config)?;
    info!(
        "LLM client initialized (model: {}, format: {:?})",
        llm.model(),
        llm.wire_format()
    );

    let tokens = TokenService::new(&config);

    let recommender =
        Arc::new(CareerRecommender::new().context("Failed to build career recommender")?);
    info!("Career recommender model built");

    let jobs = JobBoard::new(config.mock_job_count, config.mock_job_seed);
    jobs.initialize().await;

    let state = AppState {
        db,
        cache,
        llm,
        tokens,
        recommender,
        jobs,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend domain is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
