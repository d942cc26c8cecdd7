//! EMI calculator handlers

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::emi::{LoanTerms, SchedulePreview};
use crate::error::ApiError;
use crate::loan::LoanService;
use crate::models::ApiResponse;

/// POST /api/emi/schedule - Preview the installment schedule for some terms
pub async fn preview_schedule(
    State(loan_service): State<Arc<LoanService>>,
    Json(terms): Json<LoanTerms>,
) -> Result<Json<ApiResponse<SchedulePreview>>, ApiError> {
    let preview = loan_service.preview_schedule(&terms)?;
    Ok(Json(ApiResponse::ok(preview)))
}
