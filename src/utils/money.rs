/// Money helpers shared by the materials ledger and the payment pool.
///
/// Amounts are `BigDecimal` naira kept to kobo precision (two decimal
/// places), so pool arithmetic is exact. Negative amounts and amounts at or
/// above `MAX_AMOUNT_NAIRA` are rejected before they reach a stored total.
use bigdecimal::BigDecimal;
use num_traits::Zero;

use crate::service::error::ServiceError;

/// Decimal places kept for money (1 naira = 100 kobo).
pub const MONEY_SCALE: i64 = 2;

/// Decimal places kept for material quantities.
pub const QUANTITY_SCALE: i64 = 4;

/// Exclusive upper bound for any amount or total; fits `NUMERIC(18, 2)`.
pub const MAX_AMOUNT_NAIRA: i64 = 1_000_000_000_000_000;

pub fn max_amount() -> BigDecimal {
    BigDecimal::from(MAX_AMOUNT_NAIRA)
}

/// Rounds to kobo.
pub fn round_money(value: &BigDecimal) -> BigDecimal {
    value.round(MONEY_SCALE)
}

/// Zero or more, below the ceiling. The value itself is not rounded.
pub fn ensure_non_negative(label: &str, value: BigDecimal) -> Result<BigDecimal, ServiceError> {
    if value < BigDecimal::zero() {
        return Err(ServiceError::Validation(format!("{} cannot be negative", label)));
    }
    if value >= max_amount() {
        return Err(ServiceError::Validation(format!(
            "{} must be less than {}",
            label, MAX_AMOUNT_NAIRA
        )));
    }
    Ok(value)
}

/// A non-negative amount of money, rounded to kobo.
pub fn non_negative_amount(label: &str, value: BigDecimal) -> Result<BigDecimal, ServiceError> {
    let value = ensure_non_negative(label, value)?;
    Ok(round_money(&value))
}

/// A strictly positive amount of money, rounded to kobo.
pub fn positive_amount(label: &str, value: BigDecimal) -> Result<BigDecimal, ServiceError> {
    let value = non_negative_amount(label, value)?;
    if value.is_zero() {
        return Err(ServiceError::Validation(format!("{} must be greater than zero", label)));
    }
    Ok(value)
}
