//! Domain errors raised by the EMI, status and trash components

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::loan::LoanStatus;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum LoanError {
    #[error("Invalid loan terms: {0}")]
    InvalidTerms(String),

    #[error("Inconsistent loan state: {paid} installments paid but only {total} scheduled")]
    InconsistentLoanState { paid: u32, total: u32 },

    #[error("Restore window expired for loan {loan_id} (moved to trash at {deleted_at})")]
    RestoreWindowExpired {
        loan_id: Uuid,
        deleted_at: DateTime<Utc>,
    },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Loan not found: {0}")]
    LoanNotFound(Uuid),

    #[error("Installment {sequence} not found on loan {loan_id}")]
    InstallmentNotFound { loan_id: Uuid, sequence: u32 },

    #[error("Installment {sequence} on loan {loan_id} is already paid")]
    InstallmentAlreadyPaid { loan_id: Uuid, sequence: u32 },

    #[error("Cannot {action} a loan that is {from:?}")]
    InvalidTransition {
        from: LoanStatus,
        action: &'static str,
    },

    #[error("Loan {0} is not in the trash")]
    NotInTrash(Uuid),

    #[error("Loan {0} is already in the trash")]
    AlreadyInTrash(Uuid),

    #[error(transparent)]
    Store(#[from] StoreError),
}
