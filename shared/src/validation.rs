//! Validation utilities for the Distribution Back Office Platform

use rust_decimal::Decimal;

// ============================================================================
// Quantity and money validations
// ============================================================================

/// Validate a quantity is strictly positive
pub fn validate_positive_quantity(quantity: Decimal) -> Result<(), &'static str> {
    if quantity <= Decimal::ZERO {
        return Err("Quantity must be positive");
    }
    Ok(())
}

/// Validate a money amount is strictly positive
pub fn validate_positive_amount(amount: Decimal) -> Result<(), &'static str> {
    if amount <= Decimal::ZERO {
        return Err("Amount must be positive");
    }
    Ok(())
}

/// Validate a money amount is not negative
pub fn validate_non_negative_amount(amount: Decimal) -> Result<(), &'static str> {
    if amount < Decimal::ZERO {
        return Err("Amount cannot be negative");
    }
    Ok(())
}

/// Validate the paid portion of an order does not exceed its total
pub fn validate_paid_within_total(paid: Decimal, total: Decimal) -> Result<(), &'static str> {
    if paid < Decimal::ZERO {
        return Err("Paid amount cannot be negative");
    }
    if paid > total {
        return Err("Paid amount cannot exceed the order total");
    }
    Ok(())
}

/// Validate a unit price is not negative (free samples are allowed)
pub fn validate_unit_price(price: Decimal) -> Result<(), &'static str> {
    if price < Decimal::ZERO {
        return Err("Unit price cannot be negative");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn positive_quantity_rejects_zero_and_negative() {
        assert!(validate_positive_quantity(Decimal::ZERO).is_err());
        assert!(validate_positive_quantity(dec("-1")).is_err());
        assert!(validate_positive_quantity(dec("0.001")).is_ok());
    }

    #[test]
    fn paid_within_total() {
        assert!(validate_paid_within_total(dec("40"), dec("100")).is_ok());
        assert!(validate_paid_within_total(dec("100"), dec("100")).is_ok());
        assert!(validate_paid_within_total(dec("101"), dec("100")).is_err());
        assert!(validate_paid_within_total(dec("-1"), dec("100")).is_err());
    }
}
