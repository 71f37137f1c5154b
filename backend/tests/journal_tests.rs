//! Tests for journal line templates and posting validation

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::{
    collection_entry_lines, deposit_entry_lines, expense_entry_lines, lines_balance,
    order_entry_lines, return_entry_lines, reversal_lines, salary_entry_lines, total_credits,
    total_debits, validate_lines, Account, CollectionMethod, LineSpec,
};

/// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

mod order_entries {
    use super::*;

    #[test]
    fn credit_sale_splits_cash_and_receivable() {
        // 100.00 order, 30.00 paid up front, 60.00 cost of goods
        let lines = order_entry_lines(dec("100"), dec("30"), dec("60"));

        assert!(validate_lines(&lines).is_ok());

        let cash = lines.iter().find(|l| l.account == Account::Cash).unwrap();
        assert_eq!(cash.debit, dec("30"));

        let receivable = lines
            .iter()
            .find(|l| l.account == Account::AccountsReceivable)
            .unwrap();
        assert_eq!(receivable.debit, dec("70"));

        let revenue = lines.iter().find(|l| l.account == Account::Revenue).unwrap();
        assert_eq!(revenue.credit, dec("100"));
    }

    #[test]
    fn fully_paid_sale_has_no_receivable_line() {
        let lines = order_entry_lines(dec("50"), dec("50"), dec("20"));
        assert!(validate_lines(&lines).is_ok());
        assert!(lines
            .iter()
            .all(|l| l.account != Account::AccountsReceivable));
    }

    #[test]
    fn cost_of_goods_moves_inventory_to_cogs() {
        let lines = order_entry_lines(dec("100"), dec("100"), dec("60"));

        let cogs = lines
            .iter()
            .find(|l| l.account == Account::CostOfGoodsSold)
            .unwrap();
        assert_eq!(cogs.debit, dec("60"));

        let inventory = lines
            .iter()
            .find(|l| l.account == Account::Inventory)
            .unwrap();
        assert_eq!(inventory.credit, dec("60"));
    }
}

mod other_entries {
    use super::*;

    #[test]
    fn cash_collection_credits_the_receivable() {
        let lines = collection_entry_lines(dec("40"), CollectionMethod::Cash);
        assert!(validate_lines(&lines).is_ok());
        assert_eq!(lines[0].account, Account::Cash);
        assert_eq!(lines[1].account, Account::AccountsReceivable);
        assert_eq!(lines[1].credit, dec("40"));
    }

    #[test]
    fn cheque_collection_lands_in_the_bank() {
        let lines = collection_entry_lines(dec("40"), CollectionMethod::Cheque);
        assert_eq!(lines[0].account, Account::Bank);
    }

    #[test]
    fn deposit_moves_cash_to_bank() {
        let lines = deposit_entry_lines(dec("25"));
        assert!(validate_lines(&lines).is_ok());
        assert_eq!(lines[0].account, Account::Bank);
        assert_eq!(lines[1].account, Account::Cash);
    }

    #[test]
    fn credited_return_reduces_the_receivable() {
        let lines = return_entry_lines(dec("15"), dec("9"), true);
        assert!(validate_lines(&lines).is_ok());

        let contra = lines
            .iter()
            .find(|l| l.account == Account::SalesReturns)
            .unwrap();
        assert_eq!(contra.debit, dec("15"));

        let receivable = lines
            .iter()
            .find(|l| l.account == Account::AccountsReceivable)
            .unwrap();
        assert_eq!(receivable.credit, dec("15"));

        // Restocked goods come back at cost
        let inventory = lines
            .iter()
            .find(|l| l.account == Account::Inventory)
            .unwrap();
        assert_eq!(inventory.debit, dec("9"));
    }

    #[test]
    fn refunded_return_credits_cash_instead() {
        let lines = return_entry_lines(dec("15"), dec("0"), false);
        let refund = lines.iter().find(|l| l.account == Account::Cash).unwrap();
        assert_eq!(refund.credit, dec("15"));
    }

    #[test]
    fn expense_and_salary_entries_balance() {
        assert!(validate_lines(&expense_entry_lines(dec("12.50"))).is_ok());
        assert!(validate_lines(&salary_entry_lines(dec("900"))).is_ok());
    }
}

mod posting_validation {
    use super::*;

    #[test]
    fn empty_line_sets_are_rejected() {
        assert!(validate_lines(&[]).is_err());
    }

    #[test]
    fn unbalanced_line_sets_are_rejected() {
        let lines = vec![
            LineSpec {
                account: Account::Cash,
                debit: dec("10"),
                credit: Decimal::ZERO,
            },
            LineSpec {
                account: Account::Revenue,
                debit: Decimal::ZERO,
                credit: dec("9"),
            },
        ];
        assert!(validate_lines(&lines).is_err());
    }

    #[test]
    fn negative_amounts_are_rejected() {
        let lines = vec![
            LineSpec {
                account: Account::Cash,
                debit: dec("-10"),
                credit: Decimal::ZERO,
            },
            LineSpec {
                account: Account::Revenue,
                debit: Decimal::ZERO,
                credit: dec("-10"),
            },
        ];
        assert!(validate_lines(&lines).is_err());
    }

    #[test]
    fn two_sided_lines_are_rejected() {
        let lines = vec![LineSpec {
            account: Account::Cash,
            debit: dec("10"),
            credit: dec("10"),
        }];
        assert!(validate_lines(&lines).is_err());
    }

    #[test]
    fn reversals_of_valid_entries_are_valid() {
        let original = order_entry_lines(dec("100"), dec("30"), dec("60"));
        let reversal = reversal_lines(&original);
        assert!(validate_lines(&reversal).is_ok());
    }
}

mod balance_flow {
    use super::*;

    #[test]
    fn receivable_tracks_debt_across_order_and_collection() {
        // A 100.00 credit order followed by a 40.00 collection leaves a
        // 60.00 receivable
        let order = order_entry_lines(dec("100"), dec("0"), dec("55"));
        let collection = collection_entry_lines(dec("40"), CollectionMethod::Cash);

        let net_receivable: Decimal = order
            .iter()
            .chain(collection.iter())
            .filter(|l| l.account == Account::AccountsReceivable)
            .map(|l| l.debit - l.credit)
            .sum();

        assert_eq!(net_receivable, dec("60"));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Order entries balance for any split of paid within total
    #[test]
    fn order_entries_always_balance(
        total_cents in 1u64..100_000_000,
        paid_ratio in 0u32..=100,
        cogs_cents in 0u64..50_000_000,
    ) {
        let total = Decimal::new(total_cents as i64, 2);
        let paid = (total * Decimal::from(paid_ratio) / Decimal::from(100)).round_dp(2);
        let cogs = Decimal::new(cogs_cents as i64, 2);

        let lines = order_entry_lines(total, paid, cogs);

        prop_assert!(validate_lines(&lines).is_ok());
        prop_assert_eq!(total_debits(&lines), total_credits(&lines));
    }

    /// Return entries balance whether credited or refunded, with or
    /// without restock
    #[test]
    fn return_entries_always_balance(
        amount_cents in 1u64..10_000_000,
        restock_cents in 0u64..10_000_000,
        credited in any::<bool>(),
    ) {
        let lines = return_entry_lines(
            Decimal::new(amount_cents as i64, 2),
            Decimal::new(restock_cents as i64, 2),
            credited,
        );
        prop_assert!(validate_lines(&lines).is_ok());
    }

    /// Reversing any balanced set yields a balanced set with swapped totals
    #[test]
    fn reversal_swaps_totals(
        amount_cents in 1u64..10_000_000,
    ) {
        let lines = expense_entry_lines(Decimal::new(amount_cents as i64, 2));
        let reversed = reversal_lines(&lines);

        prop_assert!(lines_balance(&reversed));
        prop_assert_eq!(total_debits(&reversed), total_credits(&lines));
        prop_assert_eq!(total_credits(&reversed), total_debits(&lines));
    }
}
