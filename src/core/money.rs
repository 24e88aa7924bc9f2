use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places carried by every monetary amount (currency minor units).
pub const MONEY_SCALE: u32 = 2;

/// Rounds a monetary amount to 2 decimal places using round-half-up.
///
/// All derived amounts (extended prices, tax, totals) go through this before
/// they are stored or compared.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Validates that an amount is a well-formed monetary quantity:
/// non-negative, with at most 2 decimal places.
pub fn validate_amount(amount: Decimal, field: &str) -> Result<(), String> {
    if amount < Decimal::ZERO {
        return Err(format!("{} cannot be negative, got {}", field, amount));
    }

    if amount.scale() > MONEY_SCALE {
        return Err(format!(
            "{} must have at most {} decimal places, got {}",
            field, MONEY_SCALE, amount
        ));
    }

    Ok(())
}

/// Validates that an amount is strictly positive (payment amounts).
pub fn validate_positive_amount(amount: Decimal, field: &str) -> Result<(), String> {
    if amount <= Decimal::ZERO {
        return Err(format!("{} must be positive, got {}", field, amount));
    }

    if amount.scale() > MONEY_SCALE {
        return Err(format!(
            "{} must have at most {} decimal places, got {}",
            field, MONEY_SCALE, amount
        ));
    }

    Ok(())
}

/// Validates a tax rate expressed in percent, allowed range 0-100.
pub fn validate_tax_rate(rate: Decimal) -> Result<(), String> {
    if rate < Decimal::ZERO {
        return Err(format!("Tax rate cannot be negative, got {}", rate));
    }

    if rate > Decimal::ONE_HUNDRED {
        return Err(format!("Tax rate cannot exceed 100, got {}", rate));
    }

    Ok(())
}
