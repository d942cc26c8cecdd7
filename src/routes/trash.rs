//! Trash route definitions

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::handlers::*;
use crate::state::AppState;

pub fn trash_routes() -> Router<AppState> {
    Router::new()
        .route("/api/trash", get(list_trash))
        .route("/api/trash/cleanup", post(cleanup_trash))
        .route("/api/trash/:id", delete(purge_loan))
        .route("/api/trash/:id/restore", post(restore_loan))
}
