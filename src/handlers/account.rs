//! Caller-centric handlers

use axum::{extract::State, Json};
use chrono::Utc;
use std::sync::Arc;

use crate::error::ApiError;
use crate::loan::{DashboardStats, LoanService};
use crate::middleware::AuthenticatedUser;
use crate::models::{ApiResponse, SessionInfo};

/// GET /api/me
pub async fn get_session(AuthenticatedUser(ctx): AuthenticatedUser) -> Json<ApiResponse<SessionInfo>> {
    Json(ApiResponse::ok(SessionInfo {
        user_id: ctx.user_id,
        role: ctx.role,
        home_path: ctx.role.home_path().to_string(),
    }))
}

/// GET /api/dashboard
pub async fn get_dashboard(
    State(loan_service): State<Arc<LoanService>>,
    AuthenticatedUser(ctx): AuthenticatedUser,
) -> Result<Json<ApiResponse<DashboardStats>>, ApiError> {
    let stats = loan_service.dashboard(&ctx, Utc::now().date_naive()).await?;
    Ok(Json(ApiResponse::ok(stats)))
}
