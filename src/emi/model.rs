//! EMI data structures

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::calculator::validate_terms;
use crate::error::LoanError;

/// Terms a schedule is generated from. Immutable once a schedule exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Decimal,
    /// Annual interest rate as a percentage (12 means 12 %)
    pub annual_rate: Decimal,
    pub tenure_months: u32,
    pub start_date: NaiveDate,
}

impl LoanTerms {
    pub fn new(
        principal: Decimal,
        annual_rate: Decimal,
        tenure_months: u32,
        start_date: NaiveDate,
    ) -> Result<Self, LoanError> {
        validate_terms(principal, annual_rate, tenure_months)?;
        Ok(Self {
            principal,
            annual_rate,
            tenure_months,
            start_date,
        })
    }
}

/// One installment of an amortization schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmiScheduleItem {
    /// 1-based installment number
    pub sequence: u32,
    pub due_date: NaiveDate,
    pub amount: Decimal,
    pub principal_component: Decimal,
    pub interest_component: Decimal,
    /// Outstanding principal after this installment is paid
    pub remaining_balance: Decimal,
}

/// Schedule plus headline figures, returned by the preview endpoint
#[derive(Debug, Clone, Serialize)]
pub struct SchedulePreview {
    pub emi: Decimal,
    pub total_interest: Decimal,
    pub total_payable: Decimal,
    pub schedule: Vec<EmiScheduleItem>,
}
