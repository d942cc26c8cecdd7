//! Session and dashboard routes

use axum::{routing::get, Router};

use crate::handlers::{get_dashboard, get_session};
use crate::state::AppState;

pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/api/me", get(get_session))
        .route("/api/dashboard", get(get_dashboard))
}
