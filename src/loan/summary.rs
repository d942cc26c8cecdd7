//! Derived views: loan summaries, details and dashboard counters

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::model::{EmiInstallment, Loan, Payment};
use super::status::{classify, LoanSnapshot, LoanState};

/// Aggregate shown in list views. Recomputed from the records every time.
#[derive(Debug, Clone, Serialize)]
pub struct LoanSummary {
    pub loan_id: Uuid,
    pub lender_id: Uuid,
    pub borrower_id: Uuid,
    pub principal: Decimal,
    pub annual_rate: Decimal,
    pub tenure_months: i32,
    pub paid_emis: u32,
    pub total_emis: u32,
    pub next_due_date: Option<NaiveDate>,
    pub next_due_amount: Option<Decimal>,
    pub amount_paid: Decimal,
    pub amount_outstanding: Decimal,
    /// `None` when the records are inconsistent
    pub state: Option<LoanState>,
    pub status_label: &'static str,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl LoanSummary {
    pub fn build(
        loan: &Loan,
        installments: &[EmiInstallment],
        payments: &[Payment],
        today: NaiveDate,
    ) -> Self {
        let snapshot = LoanSnapshot::from_records(loan, installments, payments);
        let classified = classify(&snapshot, today);
        if let Err(e) = &classified {
            tracing::warn!(loan_id = %loan.id, error = %e, "Could not classify loan");
        }

        let next_due = installments
            .iter()
            .filter(|emi| !emi.is_paid())
            .min_by_key(|emi| emi.sequence);

        let amount_outstanding = installments
            .iter()
            .filter(|emi| !emi.is_paid())
            .map(|emi| emi.amount)
            .sum();

        Self {
            loan_id: loan.id,
            lender_id: loan.lender_id,
            borrower_id: loan.borrower_id,
            principal: loan.principal,
            annual_rate: loan.annual_rate,
            tenure_months: loan.tenure_months,
            paid_emis: snapshot.paid_emis,
            total_emis: snapshot.total_emis,
            next_due_date: next_due.map(|emi| emi.due_date),
            next_due_amount: next_due.map(|emi| emi.amount),
            amount_paid: payments.iter().map(|p| p.amount).sum(),
            amount_outstanding,
            state: classified.as_ref().ok().copied(),
            status_label: LoanState::display_or_unknown(&classified),
            deleted_at: loan.deleted_at,
        }
    }
}

/// Full view of a single loan
#[derive(Debug, Clone, Serialize)]
pub struct LoanDetail {
    pub loan: Loan,
    pub summary: LoanSummary,
    pub installments: Vec<EmiInstallment>,
    pub payments: Vec<Payment>,
}

/// Per-actor counters for the dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_loans: usize,
    pub pending: usize,
    pub disbursed: usize,
    pub active: usize,
    pub overdue: usize,
    pub completed: usize,
    pub defaulted: usize,
    pub unknown: usize,
    pub total_principal: Decimal,
    pub total_collected: Decimal,
    pub total_outstanding: Decimal,
}

impl DashboardStats {
    pub fn from_summaries(summaries: &[LoanSummary]) -> Self {
        let mut stats = DashboardStats {
            total_loans: summaries.len(),
            ..Default::default()
        };

        for summary in summaries {
            match summary.state {
                Some(LoanState::Pending) => stats.pending += 1,
                Some(LoanState::Disbursed) => stats.disbursed += 1,
                Some(LoanState::Active) => stats.active += 1,
                Some(LoanState::Overdue) => stats.overdue += 1,
                Some(LoanState::Completed) => stats.completed += 1,
                Some(LoanState::Defaulted) => stats.defaulted += 1,
                None => stats.unknown += 1,
            }
            stats.total_principal += summary.principal;
            stats.total_collected += summary.amount_paid;
            stats.total_outstanding += summary.amount_outstanding;
        }

        stats
    }
}
