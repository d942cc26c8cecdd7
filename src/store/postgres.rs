//! PostgreSQL store
//!
//! Guards are expressed in the `WHERE` clause of each statement so the
//! database decides atomically whether a transition still applies.

use axum::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{LoanStore, StoreError};
use crate::loan::{EmiInstallment, Loan, LoanFilter, LoanScope, Payment, StatusTransition};

#[derive(Clone)]
pub struct PgLoanStore {
    db_pool: PgPool,
}

impl PgLoanStore {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl LoanStore for PgLoanStore {
    async fn insert_loan(
        &self,
        loan: &Loan,
        installments: &[EmiInstallment],
    ) -> Result<(), StoreError> {
        let mut tx = self.db_pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO loans (
                id, lender_id, borrower_id, principal, annual_rate, tenure_months,
                start_date, purpose, status, disbursed_at, deleted_at, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(loan.id)
        .bind(loan.lender_id)
        .bind(loan.borrower_id)
        .bind(loan.principal)
        .bind(loan.annual_rate)
        .bind(loan.tenure_months)
        .bind(loan.start_date)
        .bind(&loan.purpose)
        .bind(loan.status)
        .bind(loan.disbursed_at)
        .bind(loan.deleted_at)
        .bind(loan.created_at)
        .bind(loan.updated_at)
        .execute(&mut *tx)
        .await?;

        if !installments.is_empty() {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO emi_installments (id, loan_id, sequence, due_date, amount, \
                 principal_component, interest_component, remaining_balance, paid_at) ",
            );
            builder.push_values(installments, |mut row, emi| {
                row.push_bind(emi.id)
                    .push_bind(emi.loan_id)
                    .push_bind(emi.sequence)
                    .push_bind(emi.due_date)
                    .push_bind(emi.amount)
                    .push_bind(emi.principal_component)
                    .push_bind(emi.interest_component)
                    .push_bind(emi.remaining_balance)
                    .push_bind(emi.paid_at);
            });
            builder.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn get_loan(&self, id: Uuid) -> Result<Option<Loan>, StoreError> {
        let loan = sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?;
        Ok(loan)
    }

    async fn list_loans(&self, filter: &LoanFilter) -> Result<Vec<Loan>, StoreError> {
        let mut query_builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT * FROM loans WHERE 1=1");

        match filter.scope {
            LoanScope::All => {}
            LoanScope::Lender(id) => {
                query_builder.push(" AND lender_id = ");
                query_builder.push_bind(id);
            }
            LoanScope::Borrower(id) => {
                query_builder.push(" AND borrower_id = ");
                query_builder.push_bind(id);
            }
        }

        if filter.trashed {
            query_builder.push(" AND deleted_at IS NOT NULL ORDER BY deleted_at DESC");
        } else {
            query_builder.push(" AND deleted_at IS NULL ORDER BY created_at DESC");
        }

        let loans = query_builder
            .build_query_as::<Loan>()
            .fetch_all(&self.db_pool)
            .await?;
        Ok(loans)
    }

    async fn installments(&self, loan_id: Uuid) -> Result<Vec<EmiInstallment>, StoreError> {
        let installments = sqlx::query_as::<_, EmiInstallment>(
            "SELECT * FROM emi_installments WHERE loan_id = $1 ORDER BY sequence",
        )
        .bind(loan_id)
        .fetch_all(&self.db_pool)
        .await?;
        Ok(installments)
    }

    async fn payments(&self, loan_id: Uuid) -> Result<Vec<Payment>, StoreError> {
        let payments = sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE loan_id = $1 ORDER BY paid_at",
        )
        .bind(loan_id)
        .fetch_all(&self.db_pool)
        .await?;
        Ok(payments)
    }

    async fn record_payment(&self, payment: &Payment) -> Result<bool, StoreError> {
        let mut tx = self.db_pool.begin().await?;

        let marked = sqlx::query(
            r#"
            UPDATE emi_installments
            SET paid_at = $1
            WHERE id = $2 AND loan_id = $3 AND paid_at IS NULL
            "#,
        )
        .bind(payment.paid_at)
        .bind(payment.emi_id)
        .bind(payment.loan_id)
        .execute(&mut *tx)
        .await?;

        if marked.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO payments (id, loan_id, emi_id, amount, paid_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(payment.id)
        .bind(payment.loan_id)
        .bind(payment.emi_id)
        .bind(payment.amount)
        .bind(payment.paid_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn transition_status(
        &self,
        loan_id: Uuid,
        transition: StatusTransition,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE loans
            SET status = $1, disbursed_at = COALESCE($2, disbursed_at), updated_at = $3
            WHERE id = $4 AND status = $5
            "#,
        )
        .bind(transition.to)
        .bind(transition.disbursed_at)
        .bind(now)
        .bind(loan_id)
        .bind(transition.from)
        .execute(&self.db_pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn mark_deleted(&self, loan_id: Uuid, at: DateTime<Utc>) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE loans SET deleted_at = $1, updated_at = $1 WHERE id = $2 AND deleted_at IS NULL",
        )
        .bind(at)
        .bind(loan_id)
        .execute(&self.db_pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn restore(
        &self,
        loan_id: Uuid,
        deleted_at: DateTime<Utc>,
        cutoff: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE loans
            SET deleted_at = NULL, updated_at = $4
            WHERE id = $1 AND deleted_at = $2 AND deleted_at > $3
            "#,
        )
        .bind(loan_id)
        .bind(deleted_at)
        .bind(cutoff)
        .bind(now)
        .execute(&self.db_pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn purge(
        &self,
        loan_id: Uuid,
        deleted_before: Option<DateTime<Utc>>,
    ) -> Result<bool, StoreError> {
        // Installments and payments go with the loan (ON DELETE CASCADE)
        let result = sqlx::query(
            r#"
            DELETE FROM loans
            WHERE id = $1
              AND deleted_at IS NOT NULL
              AND ($2::timestamptz IS NULL OR deleted_at <= $2)
            "#,
        )
        .bind(loan_id)
        .bind(deleted_before)
        .execute(&self.db_pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn list_expired_trash(
        &self,
        owner: Option<Uuid>,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Loan>, StoreError> {
        let loans = sqlx::query_as::<_, Loan>(
            r#"
            SELECT * FROM loans
            WHERE deleted_at IS NOT NULL
              AND deleted_at <= $1
              AND ($2::uuid IS NULL OR lender_id = $2)
            ORDER BY deleted_at
            "#,
        )
        .bind(cutoff)
        .bind(owner)
        .fetch_all(&self.db_pool)
        .await?;
        Ok(loans)
    }
}
