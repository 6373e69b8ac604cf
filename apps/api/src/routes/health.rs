use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health, GET /api/health
///
/// Always healthy while the process serves requests; `cache` reports whether
/// Redis answered a PING.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let cache = if state.cache.ping().await {
        "connected"
    } else {
        "unavailable"
    };
    Json(json!({
        "status": "healthy",
        "message": "HireSkill API is running",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "hireskill-api",
        "cache": cache,
    }))
}
