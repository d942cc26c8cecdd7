use axum::{routing::post, Router};

use crate::handlers::preview_schedule;
use crate::state::AppState;

pub fn emi_routes() -> Router<AppState> {
    Router::new().route("/api/emi/schedule", post(preview_schedule))
}
