//! Loan lifecycle and status classification tests
//!
//! Drives loans through the service layer over the in-memory store and
//! checks the derived state at each step.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use microloan_server::auth::AuthContext;
use microloan_server::error::LoanError;
use microloan_server::loan::{
    classify, CreateLoanRequest, LoanService, LoanSnapshot, LoanState, LoanStatus,
};
use microloan_server::store::InMemoryLoanStore;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
}

fn service() -> LoanService {
    LoanService::new(Arc::new(InMemoryLoanStore::new()))
}

fn request(borrower_id: Uuid) -> CreateLoanRequest {
    CreateLoanRequest {
        borrower_id,
        principal: dec!(30000),
        annual_rate: dec!(12),
        tenure_months: 3,
        start_date: date(2024, 1, 15),
        purpose: Some("Inventory for a tailoring shop".to_string()),
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

#[tokio::test]
async fn test_full_repayment_lifecycle() {
    let service = service();
    let lender = AuthContext::lender(Uuid::new_v4());
    let borrower_id = Uuid::new_v4();

    let detail = service
        .create_loan(&lender, request(borrower_id), at(2024, 1, 10))
        .await
        .unwrap();
    let loan_id = detail.loan.id;
    assert_eq!(detail.installments.len(), 3);
    assert_eq!(detail.summary.state, Some(LoanState::Pending));

    service
        .approve_loan(&lender, loan_id, at(2024, 1, 15))
        .await
        .unwrap();
    let detail = service.get_loan(&lender, loan_id, date(2024, 1, 20)).await.unwrap();
    assert_eq!(detail.summary.state, Some(LoanState::Disbursed));

    service
        .record_payment(&lender, loan_id, 1, at(2024, 2, 14))
        .await
        .unwrap();
    let detail = service.get_loan(&lender, loan_id, date(2024, 2, 20)).await.unwrap();
    assert_eq!(detail.summary.state, Some(LoanState::Active));
    assert_eq!(detail.summary.paid_emis, 1);
    assert_eq!(detail.summary.next_due_date, Some(date(2024, 3, 15)));

    // Second installment slips past its due date
    let detail = service.get_loan(&lender, loan_id, date(2024, 3, 16)).await.unwrap();
    assert_eq!(detail.summary.state, Some(LoanState::Overdue));

    for sequence in 2..=3 {
        service
            .record_payment(&lender, loan_id, sequence, at(2024, 3, 20))
            .await
            .unwrap();
    }
    let detail = service.get_loan(&lender, loan_id, date(2024, 5, 1)).await.unwrap();
    assert_eq!(detail.loan.status, LoanStatus::Completed);
    assert_eq!(detail.summary.state, Some(LoanState::Completed));
    assert_eq!(detail.summary.amount_outstanding, dec!(0));
    assert_eq!(
        detail.summary.amount_paid,
        detail.payments.iter().map(|p| p.amount).sum::<Decimal>()
    );
}

#[tokio::test]
async fn test_defaulted_wins_over_overdue() {
    let service = service();
    let lender = AuthContext::lender(Uuid::new_v4());

    let loan_id = service
        .create_loan(&lender, request(Uuid::new_v4()), at(2024, 1, 10))
        .await
        .unwrap()
        .loan
        .id;
    service.approve_loan(&lender, loan_id, at(2024, 1, 15)).await.unwrap();
    service.mark_defaulted(&lender, loan_id, at(2024, 6, 1)).await.unwrap();

    let detail = service.get_loan(&lender, loan_id, date(2024, 6, 1)).await.unwrap();
    assert_eq!(detail.summary.state, Some(LoanState::Defaulted));
    assert_eq!(detail.summary.status_label, "defaulted");
}

#[tokio::test]
async fn test_payment_requires_active_loan() {
    let service = service();
    let lender = AuthContext::lender(Uuid::new_v4());
    let loan_id = service
        .create_loan(&lender, request(Uuid::new_v4()), at(2024, 1, 10))
        .await
        .unwrap()
        .loan
        .id;

    let result = service.record_payment(&lender, loan_id, 1, at(2024, 2, 1)).await;
    assert!(matches!(
        result,
        Err(LoanError::InvalidTransition {
            from: LoanStatus::PendingApproval,
            ..
        })
    ));
}

#[tokio::test]
async fn test_double_payment_is_rejected() {
    let service = service();
    let lender = AuthContext::lender(Uuid::new_v4());
    let loan_id = service
        .create_loan(&lender, request(Uuid::new_v4()), at(2024, 1, 10))
        .await
        .unwrap()
        .loan
        .id;
    service.approve_loan(&lender, loan_id, at(2024, 1, 15)).await.unwrap();
    service.record_payment(&lender, loan_id, 1, at(2024, 2, 1)).await.unwrap();

    let again = service.record_payment(&lender, loan_id, 1, at(2024, 2, 2)).await;
    assert!(matches!(
        again,
        Err(LoanError::InstallmentAlreadyPaid { sequence: 1, .. })
    ));

    let missing = service.record_payment(&lender, loan_id, 9, at(2024, 2, 2)).await;
    assert!(matches!(
        missing,
        Err(LoanError::InstallmentNotFound { sequence: 9, .. })
    ));
}

// ============================================================================
// Visibility
// ============================================================================

#[tokio::test]
async fn test_borrower_cannot_issue_loans() {
    let service = service();
    let borrower = AuthContext::borrower(Uuid::new_v4());

    let result = service
        .create_loan(&borrower, request(Uuid::new_v4()), at(2024, 1, 10))
        .await;
    assert!(matches!(result, Err(LoanError::Unauthorized(_))));
}

#[tokio::test]
async fn test_scoped_visibility() {
    let service = service();
    let lender = AuthContext::lender(Uuid::new_v4());
    let borrower = AuthContext::borrower(Uuid::new_v4());
    let stranger = AuthContext::lender(Uuid::new_v4());
    let admin = AuthContext::admin(Uuid::new_v4());

    let loan_id = service
        .create_loan(&lender, request(borrower.user_id), at(2024, 1, 10))
        .await
        .unwrap()
        .loan
        .id;
    let today = date(2024, 1, 11);

    assert!(service.get_loan(&borrower, loan_id, today).await.is_ok());
    assert!(service.get_loan(&admin, loan_id, today).await.is_ok());
    assert!(matches!(
        service.get_loan(&stranger, loan_id, today).await,
        Err(LoanError::LoanNotFound(_))
    ));

    assert_eq!(service.list_summaries(&borrower, today).await.unwrap().len(), 1);
    assert!(service.list_summaries(&stranger, today).await.unwrap().is_empty());

    let stats = service.dashboard(&lender, today).await.unwrap();
    assert_eq!(stats.total_loans, 1);
    assert_eq!(stats.pending, 1);
    assert_eq!(stats.total_principal, dec!(30000));
}

// ============================================================================
// Classifier Edge Cases
// ============================================================================

#[test]
fn test_more_paid_than_scheduled_is_inconsistent() {
    let snapshot = LoanSnapshot {
        stored_status: LoanStatus::Active,
        disbursed_at: Some(at(2024, 1, 15)),
        paid_emis: 4,
        total_emis: 3,
        installments: &[],
        payment_count: 4,
    };

    let result = classify(&snapshot, date(2024, 5, 1));
    assert!(matches!(
        result,
        Err(LoanError::InconsistentLoanState { paid: 4, total: 3 })
    ));
    assert_eq!(LoanState::display_or_unknown(&result), "unknown");
}

#[test]
fn test_pending_without_installments() {
    let snapshot = LoanSnapshot {
        stored_status: LoanStatus::PendingApproval,
        disbursed_at: None,
        paid_emis: 0,
        total_emis: 0,
        installments: &[],
        payment_count: 0,
    };

    assert_eq!(classify(&snapshot, date(2024, 1, 1)).unwrap(), LoanState::Pending);
}
