//! Trash service - soft delete, restore and purge of loans

use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use super::policy::RetentionPolicy;
use crate::auth::{AuthContext, Role};
use crate::error::LoanError;
use crate::loan::{Loan, LoanFilter, LoanScope, LoanService, LoanSummary};
use crate::store::LoanStore;

/// A trashed loan with its retention details
#[derive(Debug, Clone, Serialize)]
pub struct TrashEntry {
    pub loan_id: Uuid,
    pub deleted_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub restorable: bool,
    /// "23 days left" or "Expired"
    pub remaining: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<LoanSummary>,
}

/// One loan the cleanup sweep could not remove
#[derive(Error, Debug, Clone, Serialize)]
#[error("Failed to purge loan {loan_id}: {reason}")]
pub struct PurgeFailure {
    pub loan_id: Uuid,
    pub reason: String,
}

/// Outcome of a cleanup sweep
#[derive(Debug, Clone, Default, Serialize)]
pub struct SweepReport {
    pub purged: usize,
    pub failures: Vec<PurgeFailure>,
}

/// Governs the active → trashed → purged lifecycle
pub struct TrashService {
    store: Arc<dyn LoanStore>,
    loans: LoanService,
    policy: RetentionPolicy,
}

impl TrashService {
    pub fn new(store: Arc<dyn LoanStore>, policy: RetentionPolicy) -> Self {
        Self {
            loans: LoanService::new(store.clone()),
            store,
            policy,
        }
    }

    /// active → trashed
    pub async fn move_to_trash(
        &self,
        ctx: &AuthContext,
        loan_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<TrashEntry, LoanError> {
        let loan = self.load_owned(ctx, loan_id, "delete").await?;
        // Postgres keeps microseconds
        let deleted_at = now.trunc_subsecs(6);
        if loan.is_trashed() || !self.store.mark_deleted(loan_id, deleted_at).await? {
            return Err(LoanError::AlreadyInTrash(loan_id));
        }

        tracing::info!(loan_id = %loan_id, actor = %ctx.user_id, "Loan moved to trash");
        Ok(self.entry(loan_id, deleted_at, now, None))
    }

    /// trashed → active, only inside the retention window
    pub async fn restore(
        &self,
        ctx: &AuthContext,
        loan_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Loan, LoanError> {
        let mut loan = self.load_owned(ctx, loan_id, "restore").await?;
        let deleted_at = loan.deleted_at.ok_or(LoanError::NotInTrash(loan_id))?;

        if !self.policy.can_restore(deleted_at, now) {
            return Err(LoanError::RestoreWindowExpired {
                loan_id,
                deleted_at,
            });
        }

        if !self
            .store
            .restore(loan_id, deleted_at, self.policy.cutoff(now), now)
            .await?
        {
            // Someone else restored or purged it first
            return Err(LoanError::NotInTrash(loan_id));
        }

        tracing::info!(loan_id = %loan_id, actor = %ctx.user_id, "Loan restored from trash");
        loan.deleted_at = None;
        loan.updated_at = now;
        Ok(loan)
    }

    /// trashed → purged, regardless of the window
    pub async fn purge(&self, ctx: &AuthContext, loan_id: Uuid) -> Result<(), LoanError> {
        let loan = self.load_owned(ctx, loan_id, "permanently delete").await?;
        if !loan.is_trashed() {
            return Err(LoanError::NotInTrash(loan_id));
        }
        if !self.store.purge(loan_id, None).await? {
            return Err(LoanError::LoanNotFound(loan_id));
        }

        tracing::info!(loan_id = %loan_id, actor = %ctx.user_id, "Loan permanently deleted");
        Ok(())
    }

    /// Trashed loans owned by the calling lender, newest first
    pub async fn list_trash(
        &self,
        ctx: &AuthContext,
        now: DateTime<Utc>,
    ) -> Result<Vec<TrashEntry>, LoanError> {
        let owner = match ctx.role {
            Role::Lender => ctx.user_id,
            Role::Admin | Role::Borrower => {
                return Err(LoanError::Unauthorized(
                    "only lenders have a trash".to_string(),
                ))
            }
        };

        let loans = self
            .store
            .list_loans(&LoanFilter::trash(LoanScope::Lender(owner)))
            .await?;
        let summaries = self.loans.summarize(&loans, now.date_naive()).await?;

        Ok(loans
            .iter()
            .zip(summaries)
            .filter_map(|(loan, summary)| {
                loan.deleted_at
                    .map(|deleted_at| self.entry(loan.id, deleted_at, now, Some(summary)))
            })
            .collect())
    }

    /// Cleanup sweep requested by an actor: lenders sweep their own trash,
    /// admins sweep everyone's.
    pub async fn cleanup_for(
        &self,
        ctx: &AuthContext,
        now: DateTime<Utc>,
    ) -> Result<SweepReport, LoanError> {
        let owner = match ctx.role {
            Role::Lender => Some(ctx.user_id),
            Role::Admin => None,
            Role::Borrower => {
                return Err(LoanError::Unauthorized(
                    "borrowers cannot run trash cleanup".to_string(),
                ))
            }
        };
        self.cleanup_expired(owner, now).await
    }

    /// Purge every trashed loan past the window. Each purge is attempted on
    /// its own; failures are collected in the report. A loan that is already
    /// gone is skipped, so overlapping sweeps never double count.
    pub async fn cleanup_expired(
        &self,
        owner: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<SweepReport, LoanError> {
        let cutoff = self.policy.cutoff(now);
        let candidates = self.store.list_expired_trash(owner, cutoff).await?;

        let mut report = SweepReport::default();
        for loan in candidates {
            match self.store.purge(loan.id, Some(cutoff)).await {
                Ok(true) => report.purged += 1,
                Ok(false) => {
                    tracing::debug!(loan_id = %loan.id, "Loan already purged or restored");
                }
                Err(e) => {
                    tracing::warn!(loan_id = %loan.id, error = %e, "Failed to purge loan");
                    report.failures.push(PurgeFailure {
                        loan_id: loan.id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            owner = ?owner,
            purged = report.purged,
            failed = report.failures.len(),
            "Trash cleanup finished"
        );
        Ok(report)
    }

    async fn load_owned(
        &self,
        ctx: &AuthContext,
        loan_id: Uuid,
        action: &str,
    ) -> Result<Loan, LoanError> {
        let loan = self
            .store
            .get_loan(loan_id)
            .await?
            .ok_or(LoanError::LoanNotFound(loan_id))?;
        authorize(ctx, &loan, action)?;
        Ok(loan)
    }

    fn entry(
        &self,
        loan_id: Uuid,
        deleted_at: DateTime<Utc>,
        now: DateTime<Utc>,
        summary: Option<LoanSummary>,
    ) -> TrashEntry {
        TrashEntry {
            loan_id,
            deleted_at,
            expires_at: self.policy.expires_at(deleted_at),
            restorable: self.policy.can_restore(deleted_at, now),
            remaining: self.policy.remaining(deleted_at, now).to_string(),
            summary,
        }
    }
}

/// Only the owning lender may move a loan through the trash lifecycle.
pub fn authorize(ctx: &AuthContext, loan: &Loan, action: &str) -> Result<(), LoanError> {
    match ctx.role {
        Role::Lender if ctx.user_id == loan.lender_id => Ok(()),
        Role::Lender | Role::Admin | Role::Borrower => Err(LoanError::Unauthorized(format!(
            "only the owning lender may {} loan {}",
            action, loan.id
        ))),
    }
}
