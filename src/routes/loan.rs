//! Loan route definitions

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::*;
use crate::state::AppState;

pub fn loan_routes() -> Router<AppState> {
    Router::new()
        .route("/api/loans", get(list_loans).post(create_loan))
        .route("/api/loans/:id", get(get_loan).delete(move_to_trash))
        .route("/api/loans/:id/approve", post(approve_loan))
        .route("/api/loans/:id/default", post(mark_defaulted))
        .route("/api/loans/:id/emis/:sequence/pay", post(pay_installment))
}
