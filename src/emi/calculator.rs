//! Reducing-balance annuity payment

use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::error::LoanError;

/// Longest tenure accepted, in months
pub const MAX_TENURE_MONTHS: u32 = 600;

/// Highest annual rate accepted, in percent
pub const MAX_ANNUAL_RATE: Decimal = dec!(100);

/// Principal must stay below this so every stored amount fits `NUMERIC(20, 2)`
pub const MAX_PRINCIPAL: Decimal = dec!(100000000000000000);

/// Decimal places kept for principal and rate columns
pub const PRINCIPAL_SCALE: u32 = 2;
pub const RATE_SCALE: u32 = 4;

const PERCENT_PER_YEAR_TO_MONTHLY: Decimal = dec!(1200);

/// Round to whole currency units, halves away from zero.
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Monthly rate as a fraction: `R / (12 * 100)`.
pub fn monthly_rate(annual_rate: Decimal) -> Decimal {
    annual_rate / PERCENT_PER_YEAR_TO_MONTHLY
}

pub fn validate_terms(
    principal: Decimal,
    annual_rate: Decimal,
    tenure_months: u32,
) -> Result<(), LoanError> {
    if principal <= Decimal::ZERO {
        return Err(LoanError::InvalidTerms(format!(
            "principal must be positive, got {}",
            principal
        )));
    }
    if principal >= MAX_PRINCIPAL {
        return Err(LoanError::InvalidTerms(format!(
            "principal must be below {}, got {}",
            MAX_PRINCIPAL, principal
        )));
    }
    if principal.normalize().scale() > PRINCIPAL_SCALE {
        return Err(LoanError::InvalidTerms(format!(
            "principal allows at most {} decimal places, got {}",
            PRINCIPAL_SCALE, principal
        )));
    }
    if annual_rate < Decimal::ZERO {
        return Err(LoanError::InvalidTerms(format!(
            "annual rate must not be negative, got {}",
            annual_rate
        )));
    }
    if annual_rate > MAX_ANNUAL_RATE {
        return Err(LoanError::InvalidTerms(format!(
            "annual rate must not exceed {}%, got {}",
            MAX_ANNUAL_RATE, annual_rate
        )));
    }
    if annual_rate.normalize().scale() > RATE_SCALE {
        return Err(LoanError::InvalidTerms(format!(
            "annual rate allows at most {} decimal places, got {}",
            RATE_SCALE, annual_rate
        )));
    }
    if tenure_months == 0 || tenure_months > MAX_TENURE_MONTHS {
        return Err(LoanError::InvalidTerms(format!(
            "tenure must be between 1 and {} months, got {}",
            MAX_TENURE_MONTHS, tenure_months
        )));
    }
    Ok(())
}

/// Fixed monthly installment for the given terms.
///
/// Uses `E = P * r * (1 + r)^N / ((1 + r)^N - 1)` with `r` the monthly rate,
/// or `P / N` for zero-interest loans. The result is rounded to whole units
/// and never drops below one unit.
pub fn calculate_emi(
    principal: Decimal,
    annual_rate: Decimal,
    tenure_months: u32,
) -> Result<Decimal, LoanError> {
    validate_terms(principal, annual_rate, tenure_months)?;

    let rate = monthly_rate(annual_rate);
    let periods = Decimal::from(tenure_months);

    let raw = if rate.is_zero() {
        principal / periods
    } else {
        let growth = (Decimal::ONE + rate)
            .checked_powi(i64::from(tenure_months))
            .ok_or_else(|| out_of_range(principal))?;
        principal
            .checked_mul(rate)
            .and_then(|v| v.checked_mul(growth))
            .and_then(|v| v.checked_div(growth - Decimal::ONE))
            .ok_or_else(|| out_of_range(principal))?
    };

    Ok(round_currency(raw).max(Decimal::ONE))
}

fn out_of_range(principal: Decimal) -> LoanError {
    LoanError::InvalidTerms(format!(
        "installment for principal {} is out of range",
        principal
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_emi() {
        let emi = calculate_emi(dec!(100000), dec!(12), 12).unwrap();
        assert_eq!(emi, dec!(8885));
    }

    #[test]
    fn test_zero_rate_emi() {
        assert_eq!(calculate_emi(dec!(1200), dec!(0), 12).unwrap(), dec!(100));
    }

    #[test]
    fn test_zero_rate_rounds_to_whole_units() {
        // 1000 / 3 = 333.33...
        assert_eq!(calculate_emi(dec!(1000), Decimal::ZERO, 3).unwrap(), dec!(333));
        // 1001 / 2 = 500.5 rounds away from zero
        assert_eq!(calculate_emi(dec!(1001), Decimal::ZERO, 2).unwrap(), dec!(501));
    }

    #[test]
    fn test_emi_floor_is_one_unit() {
        assert_eq!(calculate_emi(dec!(1), dec!(12), 12).unwrap(), Decimal::ONE);
    }

    #[test]
    fn test_fractional_rate() {
        // 50,000 at 10% over 24 months
        assert_eq!(calculate_emi(dec!(50000), dec!(10), 24).unwrap(), dec!(2307));
    }

    #[test]
    fn test_invalid_terms() {
        assert!(matches!(
            calculate_emi(Decimal::ZERO, dec!(12), 12),
            Err(LoanError::InvalidTerms(_))
        ));
        assert!(matches!(
            calculate_emi(dec!(-5), dec!(12), 12),
            Err(LoanError::InvalidTerms(_))
        ));
        assert!(matches!(
            calculate_emi(dec!(1000), dec!(-0.5), 12),
            Err(LoanError::InvalidTerms(_))
        ));
        assert!(matches!(
            calculate_emi(dec!(1000), dec!(12), 0),
            Err(LoanError::InvalidTerms(_))
        ));
        assert!(matches!(
            calculate_emi(dec!(1000), dec!(101), 12),
            Err(LoanError::InvalidTerms(_))
        ));
        assert!(matches!(
            calculate_emi(dec!(1000), dec!(12), MAX_TENURE_MONTHS + 1),
            Err(LoanError::InvalidTerms(_))
        ));
    }

    #[test]
    fn test_principal_beyond_stored_precision() {
        assert!(matches!(
            validate_terms(dec!(1000.505), dec!(12), 12),
            Err(LoanError::InvalidTerms(_))
        ));
        // Trailing zeros carry no extra precision
        assert!(validate_terms(dec!(1000.500), dec!(12), 12).is_ok());
        assert!(validate_terms(dec!(1000.55), dec!(12), 12).is_ok());
    }

    #[test]
    fn test_principal_too_large_to_store() {
        assert!(matches!(
            validate_terms(dec!(1000000000000000000), dec!(12), 12),
            Err(LoanError::InvalidTerms(_))
        ));
        assert!(matches!(
            validate_terms(MAX_PRINCIPAL, dec!(12), 12),
            Err(LoanError::InvalidTerms(_))
        ));
        assert!(validate_terms(MAX_PRINCIPAL - Decimal::ONE, dec!(12), 12).is_ok());
    }

    #[test]
    fn test_rate_beyond_stored_precision() {
        assert!(matches!(
            validate_terms(dec!(1000), dec!(12.34567), 12),
            Err(LoanError::InvalidTerms(_))
        ));
        assert!(validate_terms(dec!(1000), dec!(12.3457), 12).is_ok());
    }

    #[test]
    fn test_monthly_rate() {
        assert_eq!(monthly_rate(dec!(12)), dec!(0.01));
        assert_eq!(monthly_rate(Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_emi_is_deterministic() {
        let a = calculate_emi(dec!(250000), dec!(9.5), 60).unwrap();
        let b = calculate_emi(dec!(250000), dec!(9.5), 60).unwrap();
        assert_eq!(a, b);
    }
}
