//! Tests for production costing: output unit cost and absorption entries

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::{
    lines_balance, output_unit_cost, production_entry_lines, production_extra_cost_lines,
    reversal_lines, total_credits, total_debits, Account, CostingError,
};

/// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

mod output_costing {
    use super::*;

    #[test]
    fn materials_plus_extras_over_output() {
        // 10.00 of materials and 4.00 of extra costs across 2 units is 7.00
        let cost = output_unit_cost(dec("10"), dec("4"), dec("2")).unwrap();
        assert_eq!(cost, dec("7"));
    }

    #[test]
    fn no_extra_costs() {
        let cost = output_unit_cost(dec("30"), dec("0"), dec("10")).unwrap();
        assert_eq!(cost, dec("3"));
    }

    #[test]
    fn zero_output_quantity_is_rejected() {
        let err = output_unit_cost(dec("10"), dec("4"), dec("0")).unwrap_err();
        assert_eq!(err, CostingError::NonPositiveOutput(dec("0")));
    }

    #[test]
    fn negative_output_quantity_is_rejected() {
        assert!(output_unit_cost(dec("10"), dec("4"), dec("-1")).is_err());
    }
}

mod absorption_entries {
    use super::*;

    #[test]
    fn completion_entry_balances() {
        let lines = production_entry_lines(dec("10"), dec("4"));
        assert!(lines_balance(&lines));
        // Finished goods absorb the full 14.00
        assert_eq!(lines[0].account, Account::Inventory);
        assert_eq!(lines[0].debit, dec("14"));
    }

    #[test]
    fn completion_without_extras_omits_the_overhead_line() {
        let lines = production_entry_lines(dec("10"), dec("0"));
        assert!(lines_balance(&lines));
        assert!(lines.iter().all(|l| l.account != Account::ProductionOverhead));
    }

    #[test]
    fn extra_cost_entry_moves_cash_to_overhead() {
        let lines = production_extra_cost_lines(dec("4"));
        assert!(lines_balance(&lines));
        assert_eq!(lines[0].account, Account::ProductionOverhead);
        assert_eq!(lines[0].debit, dec("4"));
        assert_eq!(lines[1].account, Account::Cash);
        assert_eq!(lines[1].credit, dec("4"));
    }

    #[test]
    fn draft_deletion_reversal_nets_to_zero() {
        let original = production_extra_cost_lines(dec("4"));
        let reversal = reversal_lines(&original);

        assert!(lines_balance(&reversal));

        // Per account, original plus reversal cancels out
        for (orig, rev) in original.iter().zip(reversal.iter()) {
            assert_eq!(orig.account, rev.account);
            assert_eq!(orig.debit - rev.credit, Decimal::ZERO);
            assert_eq!(orig.credit - rev.debit, Decimal::ZERO);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Output cost times output quantity recovers the total cost put in
    #[test]
    fn output_valuation_conserves_input_cost(
        material_cents in 0u64..10_000_000,
        extra_cents in 0u64..1_000_000,
        output in 1u64..10_000,
    ) {
        let material = Decimal::new(material_cents as i64, 2);
        let extra = Decimal::new(extra_cents as i64, 2);
        let quantity = Decimal::from(output);

        let unit = output_unit_cost(material, extra, quantity).unwrap();

        // Reconstructed total must match the inputs exactly at this scale
        let reconstructed = (unit * quantity).round_dp(2);
        let expected = (material + extra).round_dp(2);
        prop_assert_eq!(reconstructed, expected);
    }

    /// Completion entries balance for any cost split
    #[test]
    fn completion_entries_always_balance(
        material_cents in 1u64..10_000_000,
        extra_cents in 0u64..1_000_000,
    ) {
        let lines = production_entry_lines(
            Decimal::new(material_cents as i64, 2),
            Decimal::new(extra_cents as i64, 2),
        );
        prop_assert!(lines_balance(&lines));
        prop_assert_eq!(total_debits(&lines), total_credits(&lines));
    }
}
