//! Persistence collaborator for loans, installments and payments
//!
//! Every mutating call is a single conditional update: it reports `false`
//! instead of overwriting when the guarded precondition no longer holds,
//! so concurrent requests cannot double-restore or double-purge a loan.

mod memory;
mod postgres;

pub use memory::InMemoryLoanStore;
pub use postgres::PgLoanStore;

use axum::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::loan::{EmiInstallment, Loan, LoanFilter, Payment, StatusTransition};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait LoanStore: Send + Sync {
    /// Persist a loan together with its installment schedule
    async fn insert_loan(
        &self,
        loan: &Loan,
        installments: &[EmiInstallment],
    ) -> Result<(), StoreError>;

    async fn get_loan(&self, id: Uuid) -> Result<Option<Loan>, StoreError>;

    async fn list_loans(&self, filter: &LoanFilter) -> Result<Vec<Loan>, StoreError>;

    /// Installments ordered by sequence
    async fn installments(&self, loan_id: Uuid) -> Result<Vec<EmiInstallment>, StoreError>;

    async fn payments(&self, loan_id: Uuid) -> Result<Vec<Payment>, StoreError>;

    /// Mark the payment's installment paid and store the payment.
    /// Returns `false` if the installment was already paid.
    async fn record_payment(&self, payment: &Payment) -> Result<bool, StoreError>;

    /// Apply `transition` only if the loan still has status `transition.from`.
    async fn transition_status(
        &self,
        loan_id: Uuid,
        transition: StatusTransition,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Set `deleted_at` on a live loan. Returns `false` if it is already trashed.
    async fn mark_deleted(&self, loan_id: Uuid, at: DateTime<Utc>) -> Result<bool, StoreError>;

    /// Clear `deleted_at` if it still equals `deleted_at` and is later than `cutoff`.
    async fn restore(
        &self,
        loan_id: Uuid,
        deleted_at: DateTime<Utc>,
        cutoff: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Remove a trashed loan and its dependents. With `deleted_before` set,
    /// only loans trashed at or before that instant are removed.
    async fn purge(
        &self,
        loan_id: Uuid,
        deleted_before: Option<DateTime<Utc>>,
    ) -> Result<bool, StoreError>;

    /// Trashed loans with `deleted_at <= cutoff`, optionally for one owner
    async fn list_expired_trash(
        &self,
        owner: Option<Uuid>,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Loan>, StoreError>;
}
