//! EMI (equated monthly installment) math
//!
//! Pure functions over immutable loan terms: the periodic payment amount
//! and the full amortization schedule derived from it.

mod calculator;
mod model;
mod schedule;

pub use calculator::{
    calculate_emi, monthly_rate, round_currency, validate_terms, MAX_ANNUAL_RATE,
    MAX_TENURE_MONTHS,
};
pub use model::{EmiScheduleItem, LoanTerms, SchedulePreview};
pub use schedule::{generate_schedule, preview};
