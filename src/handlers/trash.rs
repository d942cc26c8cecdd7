//! Trash API handlers

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ApiError;
use crate::loan::Loan;
use crate::middleware::AuthenticatedUser;
use crate::models::ApiResponse;
use crate::trash::{SweepReport, TrashEntry, TrashService};

/// GET /api/trash
pub async fn list_trash(
    State(trash_service): State<Arc<TrashService>>,
    AuthenticatedUser(ctx): AuthenticatedUser,
) -> Result<Json<ApiResponse<Vec<TrashEntry>>>, ApiError> {
    let entries = trash_service.list_trash(&ctx, Utc::now()).await?;
    Ok(Json(ApiResponse::ok(entries)))
}

/// POST /api/trash/:id/restore
pub async fn restore_loan(
    State(trash_service): State<Arc<TrashService>>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Loan>>, ApiError> {
    let loan = trash_service.restore(&ctx, id, Utc::now()).await?;
    Ok(Json(ApiResponse::ok(loan)))
}

/// DELETE /api/trash/:id - Permanently delete a trashed loan
pub async fn purge_loan(
    State(trash_service): State<Arc<TrashService>>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    trash_service.purge(&ctx, id).await?;
    Ok(Json(ApiResponse::ok(())))
}

/// POST /api/trash/cleanup - Purge everything past the retention window
pub async fn cleanup_trash(
    State(trash_service): State<Arc<TrashService>>,
    AuthenticatedUser(ctx): AuthenticatedUser,
) -> Result<Json<ApiResponse<SweepReport>>, ApiError> {
    let report = trash_service.cleanup_for(&ctx, Utc::now()).await?;
    Ok(Json(ApiResponse::ok(report)))
}
