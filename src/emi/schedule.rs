//! Amortization schedule generation

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;

use super::calculator::{calculate_emi, monthly_rate, round_currency};
use super::model::{EmiScheduleItem, LoanTerms, SchedulePreview};
use crate::error::LoanError;

/// Build the full installment schedule for `terms`.
///
/// Interest is rounded per period before it is taken out of the fixed EMI.
/// The last installment absorbs whatever principal remains, so principal
/// components always sum to the original principal and the final balance
/// is zero.
pub fn generate_schedule(terms: &LoanTerms) -> Result<Vec<EmiScheduleItem>, LoanError> {
    let emi = calculate_emi(terms.principal, terms.annual_rate, terms.tenure_months)?;
    let rate = monthly_rate(terms.annual_rate);

    let mut balance = terms.principal;
    let mut items = Vec::with_capacity(terms.tenure_months as usize);

    for sequence in 1..=terms.tenure_months {
        let interest = balance
            .checked_mul(rate)
            .map(round_currency)
            .ok_or_else(|| LoanError::InvalidTerms("interest out of range".to_string()))?;

        let principal_component = if sequence == terms.tenure_months {
            balance
        } else {
            (emi - interest).max(Decimal::ZERO).min(balance)
        };
        balance -= principal_component;

        items.push(EmiScheduleItem {
            sequence,
            due_date: due_date(terms.start_date, sequence)?,
            amount: principal_component + interest,
            principal_component,
            interest_component: interest,
            remaining_balance: balance,
        });
    }

    Ok(items)
}

/// Schedule with its headline totals.
pub fn preview(terms: &LoanTerms) -> Result<SchedulePreview, LoanError> {
    let emi = calculate_emi(terms.principal, terms.annual_rate, terms.tenure_months)?;
    let schedule = generate_schedule(terms)?;

    let total_interest = schedule.iter().map(|i| i.interest_component).sum();
    let total_payable = schedule.iter().map(|i| i.amount).sum();

    Ok(SchedulePreview {
        emi,
        total_interest,
        total_payable,
        schedule,
    })
}

fn due_date(start: NaiveDate, sequence: u32) -> Result<NaiveDate, LoanError> {
    start
        .checked_add_months(Months::new(sequence))
        .ok_or_else(|| LoanError::InvalidTerms(format!("due date {} out of range", sequence)))
}
