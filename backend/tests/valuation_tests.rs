//! Tests for valuation math: weighted averages and lot consumption plans

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use shared::{plan_consumption, weighted_average_cost, CostingError, LotOrder, LotSnapshot};

/// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn lot(qty: &str, cost: &str) -> LotSnapshot {
    LotSnapshot {
        lot_id: Uuid::new_v4(),
        quantity_remaining: dec(qty),
        unit_cost: dec(cost),
    }
}

mod weighted_average {
    use super::*;

    #[test]
    fn two_receipts_blend_to_the_middle() {
        // 10 units at 5.00 then 10 units at 7.00 carries at 6.00
        let after_first = weighted_average_cost(dec("0"), dec("0"), dec("10"), dec("5"));
        assert_eq!(after_first, dec("5"));

        let after_second = weighted_average_cost(dec("10"), after_first, dec("10"), dec("7"));
        assert_eq!(after_second, dec("6"));
    }

    #[test]
    fn uneven_quantities_weight_the_blend() {
        // 30 at 4.00 plus 10 at 8.00 gives (120 + 80) / 40 = 5.00
        let cost = weighted_average_cost(dec("30"), dec("4"), dec("10"), dec("8"));
        assert_eq!(cost, dec("5"));
    }

    #[test]
    fn first_receipt_takes_incoming_cost() {
        let cost = weighted_average_cost(dec("0"), dec("0"), dec("25"), dec("3.50"));
        assert_eq!(cost, dec("3.50"));
    }

    #[test]
    fn zero_total_quantity_falls_back_to_incoming_cost() {
        let cost = weighted_average_cost(dec("0"), dec("9.99"), dec("0"), dec("2.75"));
        assert_eq!(cost, dec("2.75"));
    }
}

mod fifo_lifo_plans {
    use super::*;

    #[test]
    fn fifo_consumes_oldest_lots_first() {
        let lots = vec![lot("10", "5"), lot("10", "7")];

        let plan = plan_consumption(&lots, dec("12"), LotOrder::OldestFirst).unwrap();

        assert_eq!(plan.takes.len(), 2);
        assert_eq!(plan.takes[0].quantity, dec("10"));
        assert_eq!(plan.takes[0].unit_cost, dec("5"));
        assert_eq!(plan.takes[1].quantity, dec("2"));
        assert_eq!(plan.takes[1].unit_cost, dec("7"));
        // 10*5 + 2*7 = 64
        assert_eq!(plan.total_cost, dec("64"));
    }

    #[test]
    fn lifo_consumes_newest_lots_first() {
        let lots = vec![lot("10", "5"), lot("10", "7")];

        let plan = plan_consumption(&lots, dec("12"), LotOrder::NewestFirst).unwrap();

        assert_eq!(plan.takes[0].quantity, dec("10"));
        assert_eq!(plan.takes[0].unit_cost, dec("7"));
        assert_eq!(plan.takes[1].quantity, dec("2"));
        assert_eq!(plan.takes[1].unit_cost, dec("5"));
        // 10*7 + 2*5 = 80
        assert_eq!(plan.total_cost, dec("80"));
    }

    #[test]
    fn partial_lot_consumption_takes_only_what_is_needed() {
        let lots = vec![lot("100", "2.50")];

        let plan = plan_consumption(&lots, dec("40"), LotOrder::OldestFirst).unwrap();

        assert_eq!(plan.takes.len(), 1);
        assert_eq!(plan.takes[0].quantity, dec("40"));
        assert_eq!(plan.total_cost, dec("100"));
    }

    #[test]
    fn exhausted_lots_are_skipped() {
        let lots = vec![lot("0", "5"), lot("10", "7")];

        let plan = plan_consumption(&lots, dec("5"), LotOrder::OldestFirst).unwrap();

        assert_eq!(plan.takes.len(), 1);
        assert_eq!(plan.takes[0].unit_cost, dec("7"));
    }

    #[test]
    fn shortfall_fails_before_any_take() {
        let lots = vec![lot("10", "5"), lot("5", "7")];

        let err = plan_consumption(&lots, dec("20"), LotOrder::OldestFirst).unwrap_err();

        assert_eq!(
            err,
            CostingError::InsufficientLots {
                requested: dec("20"),
                available: dec("15"),
            }
        );
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let lots = vec![lot("10", "5")];
        let err = plan_consumption(&lots, dec("0"), LotOrder::OldestFirst).unwrap_err();
        assert_eq!(err, CostingError::NonPositiveQuantity(dec("0")));
    }

    #[test]
    fn blended_unit_cost_matches_total_over_quantity() {
        let lots = vec![lot("10", "5"), lot("10", "7")];
        let plan = plan_consumption(&lots, dec("20"), LotOrder::OldestFirst).unwrap();
        assert_eq!(plan.blended_unit_cost(), dec("6"));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The blended average always lies between the cheapest and the most
    /// expensive contributing cost
    #[test]
    fn average_stays_within_contributing_costs(
        q0 in 1u32..10000,
        c0 in 1u32..1000,
        q1 in 1u32..10000,
        c1 in 1u32..1000,
    ) {
        let cost = weighted_average_cost(
            Decimal::from(q0),
            Decimal::from(c0),
            Decimal::from(q1),
            Decimal::from(c1),
        );
        let lo = Decimal::from(c0.min(c1));
        let hi = Decimal::from(c0.max(c1));
        prop_assert!(cost >= lo && cost <= hi, "average {} outside [{}, {}]", cost, lo, hi);
    }

    /// A plan always takes exactly the requested quantity and never more
    /// from a lot than it holds
    #[test]
    fn plan_conserves_quantity(
        quantities in prop::collection::vec(1u32..500, 1..8),
        costs in prop::collection::vec(1u32..100, 8),
        take_ratio in 1u32..100,
    ) {
        let lots: Vec<LotSnapshot> = quantities
            .iter()
            .zip(costs.iter())
            .map(|(q, c)| LotSnapshot {
                lot_id: Uuid::new_v4(),
                quantity_remaining: Decimal::from(*q),
                unit_cost: Decimal::from(*c),
            })
            .collect();

        let available: Decimal = lots.iter().map(|l| l.quantity_remaining).sum();
        let requested = (available * Decimal::from(take_ratio) / Decimal::from(100))
            .round_dp(0)
            .max(Decimal::ONE);

        let plan = plan_consumption(&lots, requested, LotOrder::OldestFirst).unwrap();

        let taken: Decimal = plan.takes.iter().map(|t| t.quantity).sum();
        prop_assert_eq!(taken, requested);

        for take in &plan.takes {
            let source = lots.iter().find(|l| l.lot_id == take.lot_id).unwrap();
            prop_assert!(take.quantity <= source.quantity_remaining);
        }
    }

    /// FIFO and LIFO agree on total quantity and disagree only on cost
    #[test]
    fn fifo_and_lifo_consume_the_same_quantity(
        q0 in 1u32..1000,
        q1 in 1u32..1000,
        c0 in 1u32..100,
        c1 in 1u32..100,
    ) {
        let lots = vec![
            LotSnapshot {
                lot_id: Uuid::new_v4(),
                quantity_remaining: Decimal::from(q0),
                unit_cost: Decimal::from(c0),
            },
            LotSnapshot {
                lot_id: Uuid::new_v4(),
                quantity_remaining: Decimal::from(q1),
                unit_cost: Decimal::from(c1),
            },
        ];
        let requested = Decimal::from(q0) + Decimal::from(q1);

        let fifo = plan_consumption(&lots, requested, LotOrder::OldestFirst).unwrap();
        let lifo = plan_consumption(&lots, requested, LotOrder::NewestFirst).unwrap();

        prop_assert_eq!(fifo.quantity, lifo.quantity);
        // Consuming everything costs the same from either end
        prop_assert_eq!(fifo.total_cost, lifo.total_cost);
    }

    /// Requests beyond availability always fail
    #[test]
    fn over_request_always_fails(
        available in 1u32..1000,
        excess in 1u32..1000,
    ) {
        let lots = vec![LotSnapshot {
            lot_id: Uuid::new_v4(),
            quantity_remaining: Decimal::from(available),
            unit_cost: dec("3"),
        }];
        let requested = Decimal::from(available) + Decimal::from(excess);

        let result = plan_consumption(&lots, requested, LotOrder::OldestFirst);
        prop_assert!(result.is_err());
    }
}
