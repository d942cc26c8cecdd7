//! Loan models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::auth::{AuthContext, Role};

/// Status flag stored on the loan record
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "loan_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    PendingApproval,
    Active,
    Completed,
    Defaulted,
}

/// Loan model
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone, PartialEq)]
pub struct Loan {
    pub id: Uuid,
    /// Owning lender
    pub lender_id: Uuid,
    pub borrower_id: Uuid,
    pub principal: Decimal,
    pub annual_rate: Decimal,
    pub tenure_months: i32,
    pub start_date: NaiveDate,
    pub purpose: Option<String>,
    pub status: LoanStatus,
    pub disbursed_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Loan {
    pub fn is_trashed(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// One scheduled installment as persisted
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone, PartialEq)]
pub struct EmiInstallment {
    pub id: Uuid,
    pub loan_id: Uuid,
    pub sequence: i32,
    pub due_date: NaiveDate,
    pub amount: Decimal,
    pub principal_component: Decimal,
    pub interest_component: Decimal,
    pub remaining_balance: Decimal,
    pub paid_at: Option<DateTime<Utc>>,
}

impl EmiInstallment {
    pub fn is_paid(&self) -> bool {
        self.paid_at.is_some()
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.is_paid() && self.due_date < today
    }
}

/// Payment recorded against an installment
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone, PartialEq)]
pub struct Payment {
    pub id: Uuid,
    pub loan_id: Uuid,
    pub emi_id: Uuid,
    pub amount: Decimal,
    pub paid_at: DateTime<Utc>,
}

/// Request to create a new loan
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLoanRequest {
    pub borrower_id: Uuid,
    pub principal: Decimal,
    pub annual_rate: Decimal,
    #[validate(range(min = 1, max = 600))]
    pub tenure_months: u32,
    pub start_date: NaiveDate,
    #[validate(length(max = 500))]
    pub purpose: Option<String>,
}

/// Which loans an actor may see
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanScope {
    All,
    Lender(Uuid),
    Borrower(Uuid),
}

impl LoanScope {
    pub fn for_actor(ctx: &AuthContext) -> Self {
        match ctx.role {
            Role::Admin => LoanScope::All,
            Role::Lender => LoanScope::Lender(ctx.user_id),
            Role::Borrower => LoanScope::Borrower(ctx.user_id),
        }
    }

    pub fn permits(&self, loan: &Loan) -> bool {
        match self {
            LoanScope::All => true,
            LoanScope::Lender(id) => loan.lender_id == *id,
            LoanScope::Borrower(id) => loan.borrower_id == *id,
        }
    }
}

/// Store query filter
#[derive(Debug, Clone, Copy)]
pub struct LoanFilter {
    pub scope: LoanScope,
    /// `true` lists only trashed loans, `false` only live ones
    pub trashed: bool,
}

impl LoanFilter {
    pub fn active(scope: LoanScope) -> Self {
        Self {
            scope,
            trashed: false,
        }
    }

    pub fn trash(scope: LoanScope) -> Self {
        Self {
            scope,
            trashed: true,
        }
    }

    pub fn matches(&self, loan: &Loan) -> bool {
        self.scope.permits(loan) && loan.is_trashed() == self.trashed
    }
}

/// Guarded status change
#[derive(Debug, Clone, Copy)]
pub struct StatusTransition {
    pub from: LoanStatus,
    pub to: LoanStatus,
    /// Set on approval
    pub disbursed_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_loan(lender_id: Uuid, borrower_id: Uuid) -> Loan {
        Loan {
            id: Uuid::new_v4(),
            lender_id,
            borrower_id,
            principal: dec!(5000),
            annual_rate: dec!(10),
            tenure_months: 6,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            purpose: None,
            status: LoanStatus::Active,
            disbursed_at: None,
            deleted_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_scope_per_role() {
        let lender = Uuid::new_v4();
        let borrower = Uuid::new_v4();
        let loan = sample_loan(lender, borrower);

        assert!(LoanScope::for_actor(&AuthContext::admin(Uuid::new_v4())).permits(&loan));
        assert!(LoanScope::for_actor(&AuthContext::lender(lender)).permits(&loan));
        assert!(LoanScope::for_actor(&AuthContext::borrower(borrower)).permits(&loan));
        assert!(!LoanScope::for_actor(&AuthContext::lender(borrower)).permits(&loan));
        assert!(!LoanScope::for_actor(&AuthContext::borrower(lender)).permits(&loan));
    }

    #[test]
    fn test_filter_separates_trash() {
        let mut loan = sample_loan(Uuid::new_v4(), Uuid::new_v4());
        assert!(LoanFilter::active(LoanScope::All).matches(&loan));
        assert!(!LoanFilter::trash(LoanScope::All).matches(&loan));

        loan.deleted_at = Some(Utc::now());
        assert!(!LoanFilter::active(LoanScope::All).matches(&loan));
        assert!(LoanFilter::trash(LoanScope::All).matches(&loan));
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&LoanStatus::PendingApproval).unwrap();
        assert_eq!(json, "\"pending_approval\"");
    }
}
