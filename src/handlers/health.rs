//! Liveness endpoints

use axum::{extract::State, Json};
use serde::Serialize;

use crate::db::check_health;
use crate::state::AppState;

pub async fn root() -> &'static str {
    "Microloan API Server"
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    database: String,
    version: String,
}

/// GET /health
pub async fn health_check(State(app_state): State<AppState>) -> Json<HealthResponse> {
    let database = match &app_state.db_pool {
        Some(pool) => match check_health(pool).await {
            Ok(()) => "connected".to_string(),
            Err(e) => format!("error: {}", e),
        },
        None => "in-memory".to_string(),
    };

    let status = if database.starts_with("error") {
        "unhealthy"
    } else {
        "healthy"
    };

    Json(HealthResponse {
        status: status.to_string(),
        database,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
