//! Application state shared across handlers

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::auth::JwtSecret;
use crate::loan::LoanService;
use crate::store::LoanStore;
use crate::trash::{RetentionPolicy, TrashService};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub loan_service: Arc<LoanService>,
    pub trash_service: Arc<TrashService>,
    pub jwt_secret: JwtSecret,
    /// Present with the postgres backend, used by the health check
    pub db_pool: Option<PgPool>,
}

impl AppState {
    pub fn new(
        loan_service: Arc<LoanService>,
        trash_service: Arc<TrashService>,
        jwt_secret: JwtSecret,
        db_pool: Option<PgPool>,
    ) -> Self {
        Self {
            loan_service,
            trash_service,
            jwt_secret,
            db_pool,
        }
    }

    /// Wire both services over one store
    pub fn from_store(
        store: Arc<dyn LoanStore>,
        policy: RetentionPolicy,
        jwt_secret: JwtSecret,
        db_pool: Option<PgPool>,
    ) -> Self {
        Self::new(
            Arc::new(LoanService::new(store.clone())),
            Arc::new(TrashService::new(store, policy)),
            jwt_secret,
            db_pool,
        )
    }
}

impl FromRef<AppState> for Arc<LoanService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.loan_service.clone()
    }
}

impl FromRef<AppState> for Arc<TrashService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.trash_service.clone()
    }
}

impl FromRef<AppState> for JwtSecret {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.jwt_secret.clone()
    }
}
