//! Loan service layer - business logic for the loan lifecycle

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;
use validator::Validate;

use super::model::{
    CreateLoanRequest, EmiInstallment, Loan, LoanFilter, LoanScope, LoanStatus, Payment,
    StatusTransition,
};
use super::summary::{DashboardStats, LoanDetail, LoanSummary};
use crate::auth::{AuthContext, Role};
use crate::emi::{generate_schedule, preview, LoanTerms, SchedulePreview};
use crate::error::LoanError;
use crate::store::LoanStore;

/// Loan service for managing loan lifecycle
#[derive(Clone)]
pub struct LoanService {
    store: Arc<dyn LoanStore>,
}

impl LoanService {
    pub fn new(store: Arc<dyn LoanStore>) -> Self {
        Self { store }
    }

    /// Schedule preview without persisting anything
    pub fn preview_schedule(&self, terms: &LoanTerms) -> Result<SchedulePreview, LoanError> {
        preview(terms)
    }

    /// Create a loan owned by the calling lender, with its full schedule
    pub async fn create_loan(
        &self,
        ctx: &AuthContext,
        request: CreateLoanRequest,
        now: DateTime<Utc>,
    ) -> Result<LoanDetail, LoanError> {
        match ctx.role {
            Role::Lender => {}
            Role::Admin | Role::Borrower => {
                return Err(LoanError::Unauthorized(format!(
                    "{} accounts cannot issue loans",
                    ctx.role
                )))
            }
        }
        request
            .validate()
            .map_err(|e| LoanError::InvalidTerms(e.to_string()))?;
        if request.borrower_id == ctx.user_id {
            return Err(LoanError::InvalidTerms(
                "Lender and borrower must be different".to_string(),
            ));
        }

        let terms = LoanTerms::new(
            request.principal,
            request.annual_rate,
            request.tenure_months,
            request.start_date,
        )?;
        let schedule = generate_schedule(&terms)?;

        let loan = Loan {
            id: Uuid::new_v4(),
            lender_id: ctx.user_id,
            borrower_id: request.borrower_id,
            principal: terms.principal,
            annual_rate: terms.annual_rate,
            tenure_months: terms.tenure_months as i32,
            start_date: terms.start_date,
            purpose: request.purpose,
            status: LoanStatus::PendingApproval,
            disbursed_at: None,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };

        let installments: Vec<EmiInstallment> = schedule
            .into_iter()
            .map(|item| EmiInstallment {
                id: Uuid::new_v4(),
                loan_id: loan.id,
                sequence: item.sequence as i32,
                due_date: item.due_date,
                amount: item.amount,
                principal_component: item.principal_component,
                interest_component: item.interest_component,
                remaining_balance: item.remaining_balance,
                paid_at: None,
            })
            .collect();

        self.store.insert_loan(&loan, &installments).await?;

        tracing::info!(
            loan_id = %loan.id,
            lender_id = %loan.lender_id,
            borrower_id = %loan.borrower_id,
            principal = %loan.principal,
            tenure_months = loan.tenure_months,
            "Loan created"
        );

        let summary = LoanSummary::build(&loan, &installments, &[], now.date_naive());
        Ok(LoanDetail {
            loan,
            summary,
            installments,
            payments: Vec::new(),
        })
    }

    /// Approve a pending loan and stamp its disbursement
    pub async fn approve_loan(
        &self,
        ctx: &AuthContext,
        loan_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Loan, LoanError> {
        let loan = self.owned_live_loan(ctx, loan_id, "approve").await?;
        let transition = StatusTransition {
            from: LoanStatus::PendingApproval,
            to: LoanStatus::Active,
            disbursed_at: Some(now),
        };
        self.apply_transition(loan, transition, "approve", now).await
    }

    /// Flag an active loan as defaulted
    pub async fn mark_defaulted(
        &self,
        ctx: &AuthContext,
        loan_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Loan, LoanError> {
        let loan = self.owned_live_loan(ctx, loan_id, "default").await?;
        let transition = StatusTransition {
            from: LoanStatus::Active,
            to: LoanStatus::Defaulted,
            disbursed_at: None,
        };
        self.apply_transition(loan, transition, "default", now).await
    }

    /// Mark installment `sequence` paid. Completes the loan when it was the last one.
    pub async fn record_payment(
        &self,
        ctx: &AuthContext,
        loan_id: Uuid,
        sequence: u32,
        now: DateTime<Utc>,
    ) -> Result<Payment, LoanError> {
        let loan = self.owned_live_loan(ctx, loan_id, "record payments on").await?;
        if loan.status != LoanStatus::Active {
            return Err(LoanError::InvalidTransition {
                from: loan.status,
                action: "record a payment on",
            });
        }

        let installments = self.store.installments(loan_id).await?;
        let emi = installments
            .iter()
            .find(|emi| emi.sequence == sequence as i32)
            .ok_or(LoanError::InstallmentNotFound { loan_id, sequence })?;
        if emi.is_paid() {
            return Err(LoanError::InstallmentAlreadyPaid { loan_id, sequence });
        }

        let payment = Payment {
            id: Uuid::new_v4(),
            loan_id,
            emi_id: emi.id,
            amount: emi.amount,
            paid_at: now,
        };
        if !self.store.record_payment(&payment).await? {
            return Err(LoanError::InstallmentAlreadyPaid { loan_id, sequence });
        }

        tracing::info!(
            loan_id = %loan_id,
            sequence,
            amount = %payment.amount,
            "Installment paid"
        );

        let all_paid = installments
            .iter()
            .all(|other| other.id == emi.id || other.is_paid());
        if all_paid {
            let completed = StatusTransition {
                from: LoanStatus::Active,
                to: LoanStatus::Completed,
                disbursed_at: None,
            };
            if self.store.transition_status(loan_id, completed, now).await? {
                tracing::info!(loan_id = %loan_id, "Loan fully repaid");
            }
        }

        Ok(payment)
    }

    /// Loan detail, if visible to the actor and not in the trash
    pub async fn get_loan(
        &self,
        ctx: &AuthContext,
        loan_id: Uuid,
        today: NaiveDate,
    ) -> Result<LoanDetail, LoanError> {
        let loan = self
            .store
            .get_loan(loan_id)
            .await?
            .filter(|loan| !loan.is_trashed() && LoanScope::for_actor(ctx).permits(loan))
            .ok_or(LoanError::LoanNotFound(loan_id))?;

        let installments = self.store.installments(loan_id).await?;
        let payments = self.store.payments(loan_id).await?;
        let summary = LoanSummary::build(&loan, &installments, &payments, today);

        Ok(LoanDetail {
            loan,
            summary,
            installments,
            payments,
        })
    }

    /// Summaries of the actor's live loans
    pub async fn list_summaries(
        &self,
        ctx: &AuthContext,
        today: NaiveDate,
    ) -> Result<Vec<LoanSummary>, LoanError> {
        let filter = LoanFilter::active(LoanScope::for_actor(ctx));
        let loans = self.store.list_loans(&filter).await?;
        self.summarize(&loans, today).await
    }

    pub async fn dashboard(
        &self,
        ctx: &AuthContext,
        today: NaiveDate,
    ) -> Result<DashboardStats, LoanError> {
        let summaries = self.list_summaries(ctx, today).await?;
        Ok(DashboardStats::from_summaries(&summaries))
    }

    pub(crate) async fn summarize(
        &self,
        loans: &[Loan],
        today: NaiveDate,
    ) -> Result<Vec<LoanSummary>, LoanError> {
        let mut summaries = Vec::with_capacity(loans.len());
        for loan in loans {
            let installments = self.store.installments(loan.id).await?;
            let payments = self.store.payments(loan.id).await?;
            summaries.push(LoanSummary::build(loan, &installments, &payments, today));
        }
        Ok(summaries)
    }

    async fn owned_live_loan(
        &self,
        ctx: &AuthContext,
        loan_id: Uuid,
        action: &str,
    ) -> Result<Loan, LoanError> {
        let loan = self
            .store
            .get_loan(loan_id)
            .await?
            .filter(|loan| !loan.is_trashed())
            .ok_or(LoanError::LoanNotFound(loan_id))?;

        match ctx.role {
            Role::Lender if loan.lender_id == ctx.user_id => Ok(loan),
            Role::Lender | Role::Admin | Role::Borrower => Err(LoanError::Unauthorized(format!(
                "only the owning lender may {} loan {}",
                action, loan_id
            ))),
        }
    }

    async fn apply_transition(
        &self,
        loan: Loan,
        transition: StatusTransition,
        action: &'static str,
        now: DateTime<Utc>,
    ) -> Result<Loan, LoanError> {
        if loan.status != transition.from
            || !self
                .store
                .transition_status(loan.id, transition, now)
                .await?
        {
            return Err(LoanError::InvalidTransition {
                from: loan.status,
                action,
            });
        }

        tracing::info!(
            loan_id = %loan.id,
            from = ?transition.from,
            to = ?transition.to,
            "Loan status changed"
        );

        self.store
            .get_loan(loan.id)
            .await?
            .ok_or(LoanError::LoanNotFound(loan.id))
    }
}
