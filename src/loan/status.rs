//! Loan status classification
//!
//! Derives the presentation state of a loan from its stored status flag,
//! its installments and its payments. Pure: the snapshot is read-only and
//! `today` is supplied by the caller.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::model::{EmiInstallment, Loan, LoanStatus, Payment};
use crate::error::LoanError;

/// Derived lifecycle state shown to users
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanState {
    Pending,
    Disbursed,
    Active,
    Overdue,
    Completed,
    Defaulted,
}

impl LoanState {
    pub fn label(&self) -> &'static str {
        match self {
            LoanState::Pending => "pending",
            LoanState::Disbursed => "disbursed",
            LoanState::Active => "active",
            LoanState::Overdue => "overdue",
            LoanState::Completed => "completed",
            LoanState::Defaulted => "defaulted",
        }
    }

    /// Display label that degrades to "unknown" for inconsistent records
    pub fn display_or_unknown(result: &Result<LoanState, LoanError>) -> &'static str {
        match result {
            Ok(state) => state.label(),
            Err(_) => "unknown",
        }
    }
}

/// Read-only view of everything the classifier looks at
#[derive(Debug, Clone, Copy)]
pub struct LoanSnapshot<'a> {
    pub stored_status: LoanStatus,
    pub disbursed_at: Option<DateTime<Utc>>,
    pub paid_emis: u32,
    pub total_emis: u32,
    pub installments: &'a [EmiInstallment],
    pub payment_count: usize,
}

impl<'a> LoanSnapshot<'a> {
    pub fn from_records(
        loan: &Loan,
        installments: &'a [EmiInstallment],
        payments: &[Payment],
    ) -> Self {
        let paid_emis = installments.iter().filter(|emi| emi.is_paid()).count();
        Self {
            stored_status: loan.status,
            disbursed_at: loan.disbursed_at,
            paid_emis: paid_emis as u32,
            total_emis: installments.len() as u32,
            installments,
            payment_count: payments.len(),
        }
    }
}

/// Classify a loan. First matching rule wins:
///
/// 1. stored `defaulted` stays defaulted
/// 2. every installment paid means completed
/// 3. an unpaid installment past its due date means overdue
/// 4. disbursed with no payments yet means disbursed
/// 5. otherwise the stored flag decides between active and pending
pub fn classify(snapshot: &LoanSnapshot<'_>, today: NaiveDate) -> Result<LoanState, LoanError> {
    if snapshot.paid_emis > snapshot.total_emis {
        return Err(LoanError::InconsistentLoanState {
            paid: snapshot.paid_emis,
            total: snapshot.total_emis,
        });
    }

    if snapshot.stored_status == LoanStatus::Defaulted {
        return Ok(LoanState::Defaulted);
    }

    if snapshot.total_emis > 0 && snapshot.paid_emis == snapshot.total_emis {
        return Ok(LoanState::Completed);
    }

    if snapshot
        .installments
        .iter()
        .any(|emi| emi.is_overdue(today))
    {
        return Ok(LoanState::Overdue);
    }

    if snapshot.disbursed_at.is_some() && snapshot.payment_count == 0 {
        return Ok(LoanState::Disbursed);
    }

    Ok(match snapshot.stored_status {
        LoanStatus::PendingApproval => LoanState::Pending,
        LoanStatus::Active => LoanState::Active,
        LoanStatus::Completed => LoanState::Completed,
        LoanStatus::Defaulted => LoanState::Defaulted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn installment(sequence: i32, due: NaiveDate, paid: bool) -> EmiInstallment {
        EmiInstallment {
            id: Uuid::new_v4(),
            loan_id: Uuid::nil(),
            sequence,
            due_date: due,
            amount: dec!(100),
            principal_component: dec!(90),
            interest_component: dec!(10),
            remaining_balance: dec!(0),
            paid_at: paid.then(Utc::now),
        }
    }

    fn snapshot(
        status: LoanStatus,
        installments: &[EmiInstallment],
        disbursed: bool,
        payments: usize,
    ) -> LoanSnapshot<'_> {
        let paid = installments.iter().filter(|i| i.is_paid()).count() as u32;
        LoanSnapshot {
            stored_status: status,
            disbursed_at: disbursed.then(Utc::now),
            paid_emis: paid,
            total_emis: installments.len() as u32,
            installments,
            payment_count: payments,
        }
    }

    fn future(days: u64) -> NaiveDate {
        today() + chrono::Days::new(days)
    }

    fn past(days: u64) -> NaiveDate {
        today() - chrono::Days::new(days)
    }

    #[test]
    fn test_all_paid_is_completed() {
        let emis: Vec<_> = (1..=5).map(|i| installment(i, past(10), true)).collect();
        let snap = snapshot(LoanStatus::Active, &emis, true, 5);
        assert_eq!(classify(&snap, today()).unwrap(), LoanState::Completed);
    }

    #[test]
    fn test_unpaid_past_due_is_overdue() {
        let emis = vec![installment(1, past(40), true), installment(2, past(10), false)];
        let snap = snapshot(LoanStatus::Active, &emis, true, 1);
        assert_eq!(classify(&snap, today()).unwrap(), LoanState::Overdue);
    }

    #[test]
    fn test_due_today_is_not_overdue() {
        let emis = vec![installment(1, today(), false)];
        let snap = snapshot(LoanStatus::Active, &emis, true, 0);
        assert_eq!(classify(&snap, today()).unwrap(), LoanState::Disbursed);
    }

    #[test]
    fn test_defaulted_overrides_everything() {
        let emis: Vec<_> = (1..=3).map(|i| installment(i, past(5), true)).collect();
        let snap = snapshot(LoanStatus::Defaulted, &emis, true, 3);
        assert_eq!(classify(&snap, today()).unwrap(), LoanState::Defaulted);
    }

    #[test]
    fn test_disbursed_without_payments() {
        let emis = vec![installment(1, future(20), false)];
        let snap = snapshot(LoanStatus::Active, &emis, true, 0);
        assert_eq!(classify(&snap, today()).unwrap(), LoanState::Disbursed);
    }

    #[test]
    fn test_active_with_payments() {
        let emis = vec![installment(1, past(5), true), installment(2, future(25), false)];
        let snap = snapshot(LoanStatus::Active, &emis, true, 1);
        assert_eq!(classify(&snap, today()).unwrap(), LoanState::Active);
    }

    #[test]
    fn test_pending_approval() {
        let emis = vec![installment(1, future(30), false)];
        let snap = snapshot(LoanStatus::PendingApproval, &emis, false, 0);
        assert_eq!(classify(&snap, today()).unwrap(), LoanState::Pending);
    }

    #[test]
    fn test_no_installments_is_not_completed() {
        let snap = snapshot(LoanStatus::Active, &[], false, 0);
        assert_eq!(classify(&snap, today()).unwrap(), LoanState::Active);
    }

    #[test]
    fn test_more_paid_than_total_is_inconsistent() {
        let emis = vec![installment(1, past(5), true)];
        let mut snap = snapshot(LoanStatus::Active, &emis, true, 1);
        snap.paid_emis = 6;
        snap.total_emis = 5;

        let result = classify(&snap, today());
        assert!(matches!(
            result,
            Err(LoanError::InconsistentLoanState { paid: 6, total: 5 })
        ));
        assert_eq!(LoanState::display_or_unknown(&result), "unknown");
    }
}
