//! Route definitions for the microloan API

mod account;
mod emi;
mod loan;
mod trash;

use axum::{routing::get, Router};

use crate::handlers::{health_check, root};
use crate::middleware::request_tracing;
use crate::state::AppState;

pub use account::account_routes;
pub use emi::emi_routes;
pub use loan::loan_routes;
pub use trash::trash_routes;

/// Assemble every route group over the shared state.
///
/// CORS is left to the binary since it depends on deployment config.
pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .merge(emi_routes())
        .merge(loan_routes())
        .merge(trash_routes())
        .merge(account_routes())
        .with_state(app_state)
        .layer(axum::middleware::from_fn(request_tracing))
}
