//! In-process store backed by hash maps

use std::collections::HashMap;

use axum::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{LoanStore, StoreError};
use crate::loan::{EmiInstallment, Loan, LoanFilter, Payment, StatusTransition};

#[derive(Default)]
struct Tables {
    loans: HashMap<Uuid, Loan>,
    installments: HashMap<Uuid, Vec<EmiInstallment>>,
    payments: HashMap<Uuid, Vec<Payment>>,
}

/// Store used by tests and `STORE_BACKEND=memory`
#[derive(Default)]
pub struct InMemoryLoanStore {
    tables: RwLock<Tables>,
}

impl InMemoryLoanStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn loan_count(&self) -> usize {
        self.tables.read().await.loans.len()
    }
}

#[async_trait]
impl LoanStore for InMemoryLoanStore {
    async fn insert_loan(
        &self,
        loan: &Loan,
        installments: &[EmiInstallment],
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let mut schedule = installments.to_vec();
        schedule.sort_by_key(|emi| emi.sequence);
        tables.loans.insert(loan.id, loan.clone());
        tables.installments.insert(loan.id, schedule);
        tables.payments.insert(loan.id, Vec::new());
        Ok(())
    }

    async fn get_loan(&self, id: Uuid) -> Result<Option<Loan>, StoreError> {
        Ok(self.tables.read().await.loans.get(&id).cloned())
    }

    async fn list_loans(&self, filter: &LoanFilter) -> Result<Vec<Loan>, StoreError> {
        let tables = self.tables.read().await;
        let mut loans: Vec<Loan> = tables
            .loans
            .values()
            .filter(|loan| filter.matches(loan))
            .cloned()
            .collect();
        loans.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(loans)
    }

    async fn installments(&self, loan_id: Uuid) -> Result<Vec<EmiInstallment>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.installments.get(&loan_id).cloned().unwrap_or_default())
    }

    async fn payments(&self, loan_id: Uuid) -> Result<Vec<Payment>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.payments.get(&loan_id).cloned().unwrap_or_default())
    }

    async fn record_payment(&self, payment: &Payment) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;

        let Some(emi) = tables
            .installments
            .get_mut(&payment.loan_id)
            .and_then(|emis| emis.iter_mut().find(|emi| emi.id == payment.emi_id))
        else {
            return Ok(false);
        };
        if emi.is_paid() {
            return Ok(false);
        }
        emi.paid_at = Some(payment.paid_at);

        tables
            .payments
            .entry(payment.loan_id)
            .or_default()
            .push(payment.clone());
        Ok(true)
    }

    async fn transition_status(
        &self,
        loan_id: Uuid,
        transition: StatusTransition,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        match tables.loans.get_mut(&loan_id) {
            Some(loan) if loan.status == transition.from => {
                loan.status = transition.to;
                if transition.disbursed_at.is_some() {
                    loan.disbursed_at = transition.disbursed_at;
                }
                loan.updated_at = now;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn mark_deleted(&self, loan_id: Uuid, at: DateTime<Utc>) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        match tables.loans.get_mut(&loan_id) {
            Some(loan) if loan.deleted_at.is_none() => {
                loan.deleted_at = Some(at);
                loan.updated_at = at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn restore(
        &self,
        loan_id: Uuid,
        deleted_at: DateTime<Utc>,
        cutoff: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        match tables.loans.get_mut(&loan_id) {
            Some(loan) if loan.deleted_at == Some(deleted_at) && deleted_at > cutoff => {
                loan.deleted_at = None;
                loan.updated_at = now;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn purge(
        &self,
        loan_id: Uuid,
        deleted_before: Option<DateTime<Utc>>,
    ) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let eligible = match tables.loans.get(&loan_id).and_then(|l| l.deleted_at) {
            Some(deleted_at) => deleted_before.map_or(true, |cutoff| deleted_at <= cutoff),
            None => false,
        };
        if !eligible {
            return Ok(false);
        }

        tables.loans.remove(&loan_id);
        tables.installments.remove(&loan_id);
        tables.payments.remove(&loan_id);
        Ok(true)
    }

    async fn list_expired_trash(
        &self,
        owner: Option<Uuid>,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Loan>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .loans
            .values()
            .filter(|loan| owner.map_or(true, |id| loan.lender_id == id))
            .filter(|loan| loan.deleted_at.is_some_and(|at| at <= cutoff))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::LoanStatus;
    use chrono::{Duration, NaiveDate};
    use rust_decimal_macros::dec;

    fn loan() -> Loan {
        Loan {
            id: Uuid::new_v4(),
            lender_id: Uuid::new_v4(),
            borrower_id: Uuid::new_v4(),
            principal: dec!(1000),
            annual_rate: dec!(12),
            tenure_months: 1,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            purpose: None,
            status: LoanStatus::PendingApproval,
            disbursed_at: None,
            deleted_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn installment(loan: &Loan) -> EmiInstallment {
        EmiInstallment {
            id: Uuid::new_v4(),
            loan_id: loan.id,
            sequence: 1,
            due_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            amount: dec!(1010),
            principal_component: dec!(1000),
            interest_component: dec!(10),
            remaining_balance: dec!(0),
            paid_at: None,
        }
    }

    #[tokio::test]
    async fn test_record_payment_only_once() {
        let store = InMemoryLoanStore::new();
        let loan = loan();
        let emi = installment(&loan);
        store.insert_loan(&loan, &[emi.clone()]).await.unwrap();

        let payment = Payment {
            id: Uuid::new_v4(),
            loan_id: loan.id,
            emi_id: emi.id,
            amount: emi.amount,
            paid_at: Utc::now(),
        };
        assert!(store.record_payment(&payment).await.unwrap());
        assert!(!store.record_payment(&payment).await.unwrap());
        assert_eq!(store.payments(loan.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_transition_is_guarded() {
        let store = InMemoryLoanStore::new();
        let loan = loan();
        store.insert_loan(&loan, &[]).await.unwrap();

        let approve = StatusTransition {
            from: LoanStatus::PendingApproval,
            to: LoanStatus::Active,
            disbursed_at: Some(Utc::now()),
        };
        assert!(store.transition_status(loan.id, approve, Utc::now()).await.unwrap());
        assert!(!store.transition_status(loan.id, approve, Utc::now()).await.unwrap());

        let stored = store.get_loan(loan.id).await.unwrap().unwrap();
        assert_eq!(stored.status, LoanStatus::Active);
        assert!(stored.disbursed_at.is_some());
    }

    #[tokio::test]
    async fn test_trash_guards() {
        let store = InMemoryLoanStore::new();
        let loan = loan();
        store.insert_loan(&loan, &[installment(&loan)]).await.unwrap();

        // Purging a live loan is refused
        assert!(!store.purge(loan.id, None).await.unwrap());

        let now = Utc::now();
        let deleted_at = now - Duration::days(40);
        assert!(store.mark_deleted(loan.id, deleted_at).await.unwrap());
        assert!(!store.mark_deleted(loan.id, now).await.unwrap());

        // Past the cutoff, restore is refused
        let cutoff = now - Duration::days(30);
        assert!(!store.restore(loan.id, deleted_at, cutoff, now).await.unwrap());

        let expired = store.list_expired_trash(None, cutoff).await.unwrap();
        assert_eq!(expired.len(), 1);

        assert!(store.purge(loan.id, Some(cutoff)).await.unwrap());
        assert!(!store.purge(loan.id, Some(cutoff)).await.unwrap());
        assert_eq!(store.loan_count().await, 0);
        assert!(store.installments(loan.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_restore_stamps_callers_clock() {
        let store = InMemoryLoanStore::new();
        let loan = loan();
        store.insert_loan(&loan, &[]).await.unwrap();

        let deleted_at = loan.created_at + Duration::days(1);
        let restored_at = deleted_at + Duration::days(3);
        assert!(store.mark_deleted(loan.id, deleted_at).await.unwrap());
        assert!(store
            .restore(loan.id, deleted_at, deleted_at - Duration::days(30), restored_at)
            .await
            .unwrap());

        let stored = store.get_loan(loan.id).await.unwrap().unwrap();
        assert_eq!(stored.deleted_at, None);
        assert_eq!(stored.updated_at, restored_at);
    }
}
