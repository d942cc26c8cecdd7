//! Loan API handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ApiError;
use crate::loan::{CreateLoanRequest, Loan, LoanDetail, LoanService, LoanSummary, Payment};
use crate::middleware::AuthenticatedUser;
use crate::models::ApiResponse;
use crate::trash::{TrashEntry, TrashService};

/// GET /api/loans - Live loans visible to the caller
pub async fn list_loans(
    State(loan_service): State<Arc<LoanService>>,
    AuthenticatedUser(ctx): AuthenticatedUser,
) -> Result<Json<ApiResponse<Vec<LoanSummary>>>, ApiError> {
    let summaries = loan_service
        .list_summaries(&ctx, Utc::now().date_naive())
        .await?;
    Ok(Json(ApiResponse::ok(summaries)))
}

/// POST /api/loans - Issue a loan with its installment schedule
pub async fn create_loan(
    State(loan_service): State<Arc<LoanService>>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Json(request): Json<CreateLoanRequest>,
) -> Result<(StatusCode, Json<ApiResponse<LoanDetail>>), ApiError> {
    let detail = loan_service.create_loan(&ctx, request, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(detail))))
}

/// GET /api/loans/:id
pub async fn get_loan(
    State(loan_service): State<Arc<LoanService>>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<LoanDetail>>, ApiError> {
    let detail = loan_service
        .get_loan(&ctx, id, Utc::now().date_naive())
        .await?;
    Ok(Json(ApiResponse::ok(detail)))
}

/// POST /api/loans/:id/approve
pub async fn approve_loan(
    State(loan_service): State<Arc<LoanService>>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Loan>>, ApiError> {
    let loan = loan_service.approve_loan(&ctx, id, Utc::now()).await?;
    Ok(Json(ApiResponse::ok(loan)))
}

/// POST /api/loans/:id/default
pub async fn mark_defaulted(
    State(loan_service): State<Arc<LoanService>>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Loan>>, ApiError> {
    let loan = loan_service.mark_defaulted(&ctx, id, Utc::now()).await?;
    Ok(Json(ApiResponse::ok(loan)))
}

/// POST /api/loans/:id/emis/:sequence/pay
pub async fn pay_installment(
    State(loan_service): State<Arc<LoanService>>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Path((id, sequence)): Path<(Uuid, u32)>,
) -> Result<Json<ApiResponse<Payment>>, ApiError> {
    let payment = loan_service
        .record_payment(&ctx, id, sequence, Utc::now())
        .await?;
    Ok(Json(ApiResponse::ok(payment)))
}

/// DELETE /api/loans/:id - Move a loan to the trash
pub async fn move_to_trash(
    State(trash_service): State<Arc<TrashService>>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TrashEntry>>, ApiError> {
    let entry = trash_service.move_to_trash(&ctx, id, Utc::now()).await?;
    Ok(Json(ApiResponse::ok(entry)))
}
