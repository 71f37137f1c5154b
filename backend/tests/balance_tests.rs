//! Tests for customer balance rules and payment validation

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::{
    collection_entry_lines, order_entry_lines, validate_non_negative_amount,
    validate_paid_within_total, validate_positive_amount, Account, CollectionMethod, OrderStatus,
};

/// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// Net receivable movement across a sequence of entries
fn net_receivable(entries: &[Vec<shared::LineSpec>]) -> Decimal {
    entries
        .iter()
        .flatten()
        .filter(|l| l.account == Account::AccountsReceivable)
        .map(|l| l.debit - l.credit)
        .sum()
}

mod debt_movement {
    use super::*;

    #[test]
    fn order_then_partial_collection() {
        // New customer, 100.00 credit order, then a 40.00 payment: 60.00 owed
        let entries = vec![
            order_entry_lines(dec("100"), dec("0"), dec("70")),
            collection_entry_lines(dec("40"), CollectionMethod::Cash),
        ];
        assert_eq!(net_receivable(&entries), dec("60"));
    }

    #[test]
    fn partial_payment_at_order_time_reduces_the_debt_raised() {
        let entries = vec![order_entry_lines(dec("100"), dec("30"), dec("70"))];
        assert_eq!(net_receivable(&entries), dec("70"));
    }

    #[test]
    fn full_settlement_returns_to_zero() {
        let entries = vec![
            order_entry_lines(dec("80"), dec("0"), dec("50")),
            collection_entry_lines(dec("50"), CollectionMethod::Cash),
            collection_entry_lines(dec("30"), CollectionMethod::BankTransfer),
        ];
        assert_eq!(net_receivable(&entries), Decimal::ZERO);
    }
}

mod payment_validation {
    use super::*;

    #[test]
    fn paid_may_not_exceed_total() {
        assert!(validate_paid_within_total(dec("101"), dec("100")).is_err());
    }

    #[test]
    fn paid_equal_to_total_is_allowed() {
        assert!(validate_paid_within_total(dec("100"), dec("100")).is_ok());
    }

    #[test]
    fn zero_upfront_payment_is_allowed() {
        assert!(validate_paid_within_total(dec("0"), dec("100")).is_ok());
        assert!(validate_non_negative_amount(dec("0")).is_ok());
    }

    #[test]
    fn collection_amounts_must_be_positive() {
        assert!(validate_positive_amount(dec("0")).is_err());
        assert!(validate_positive_amount(dec("-5")).is_err());
        assert!(validate_positive_amount(dec("0.01")).is_ok());
    }
}

mod order_status {
    use super::*;

    #[test]
    fn status_strings_round_trip() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
    }

    #[test]
    fn unknown_status_strings_are_rejected() {
        assert!("shipped".parse::<OrderStatus>().is_err());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Debt raised by an order is always total minus paid
    #[test]
    fn order_debt_is_the_unpaid_portion(
        total_cents in 1u64..100_000_000,
        paid_ratio in 0u32..=100,
    ) {
        let total = Decimal::new(total_cents as i64, 2);
        let paid = (total * Decimal::from(paid_ratio) / Decimal::from(100)).round_dp(2);

        let entries = vec![order_entry_lines(total, paid, dec("1"))];

        prop_assert_eq!(net_receivable(&entries), total - paid);
    }

    /// Any sequence of orders and collections nets to orders minus payments
    #[test]
    fn debt_reconstruction_matches_the_event_log(
        orders in prop::collection::vec(1u64..1_000_000, 1..10),
        payments in prop::collection::vec(1u64..1_000_000, 0..10),
    ) {
        let mut entries = Vec::new();
        let mut expected = Decimal::ZERO;

        for cents in &orders {
            let total = Decimal::new(*cents as i64, 2);
            entries.push(order_entry_lines(total, Decimal::ZERO, Decimal::ONE));
            expected += total;
        }
        for cents in &payments {
            let amount = Decimal::new(*cents as i64, 2);
            entries.push(collection_entry_lines(amount, CollectionMethod::Cash));
            expected -= amount;
        }

        prop_assert_eq!(net_receivable(&entries), expected);
    }
}
