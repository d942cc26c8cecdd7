//! Shared API data shapes

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Role;

/// API response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// Who the caller is and where their dashboard lives
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionInfo {
    pub user_id: Uuid,
    pub role: Role,
    pub home_path: String,
}
