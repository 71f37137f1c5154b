//! Pure cost math: weighted averages, lot consumption plans, output costing
//!
//! Everything here operates on in-memory snapshots so the valuation rules can
//! be tested without a database. The backend services apply the resulting
//! plans inside their transactions.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CostingError {
    #[error("insufficient lot quantity: requested {requested}, available {available}")]
    InsufficientLots {
        requested: Decimal,
        available: Decimal,
    },

    #[error("consumption quantity must be positive, got {0}")]
    NonPositiveQuantity(Decimal),

    #[error("output quantity must be positive, got {0}")]
    NonPositiveOutput(Decimal),
}

/// Which end of the receipt history a consumption draws from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LotOrder {
    /// FIFO: consume the oldest unconsumed lots first
    OldestFirst,
    /// LIFO: consume the newest lots first
    NewestFirst,
}

/// Snapshot of an unconsumed (or partially consumed) cost lot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LotSnapshot {
    pub lot_id: Uuid,
    pub quantity_remaining: Decimal,
    pub unit_cost: Decimal,
}

/// Quantity to take from one lot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LotTake {
    pub lot_id: Uuid,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
}

/// The lots a deduction will consume and the blended cost across them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumptionPlan {
    pub takes: Vec<LotTake>,
    pub quantity: Decimal,
    pub total_cost: Decimal,
}

impl ConsumptionPlan {
    /// Blended unit cost across the lots actually consumed.
    pub fn blended_unit_cost(&self) -> Decimal {
        if self.quantity.is_zero() {
            Decimal::ZERO
        } else {
            self.total_cost / self.quantity
        }
    }
}

/// Moving weighted-average cost after receiving new stock.
///
/// `new_cost = (q0*c0 + q1*c1) / (q0 + q1)`, with the incoming cost taken
/// as-is when both quantities are zero.
pub fn weighted_average_cost(
    existing_qty: Decimal,
    existing_cost: Decimal,
    incoming_qty: Decimal,
    incoming_cost: Decimal,
) -> Decimal {
    let total_qty = existing_qty + incoming_qty;
    if total_qty.is_zero() {
        incoming_cost
    } else {
        (existing_qty * existing_cost + incoming_qty * incoming_cost) / total_qty
    }
}

/// Plan a FIFO/LIFO consumption across lot snapshots.
///
/// `lots` must be ordered oldest receipt first; `order` selects which end the
/// walk starts from. Each take decrements the lot it draws on, and the plan
/// fails before any mutation when the lots cannot cover the request.
pub fn plan_consumption(
    lots: &[LotSnapshot],
    quantity: Decimal,
    order: LotOrder,
) -> Result<ConsumptionPlan, CostingError> {
    if quantity <= Decimal::ZERO {
        return Err(CostingError::NonPositiveQuantity(quantity));
    }

    let available: Decimal = lots.iter().map(|l| l.quantity_remaining).sum();
    if available < quantity {
        return Err(CostingError::InsufficientLots {
            requested: quantity,
            available,
        });
    }

    let ordered: Vec<&LotSnapshot> = match order {
        LotOrder::OldestFirst => lots.iter().collect(),
        LotOrder::NewestFirst => lots.iter().rev().collect(),
    };

    let mut takes = Vec::new();
    let mut total_cost = Decimal::ZERO;
    let mut remaining = quantity;

    for lot in ordered {
        if remaining.is_zero() {
            break;
        }
        if lot.quantity_remaining <= Decimal::ZERO {
            continue;
        }

        let take_qty = remaining.min(lot.quantity_remaining);
        total_cost += take_qty * lot.unit_cost;
        takes.push(LotTake {
            lot_id: lot.lot_id,
            quantity: take_qty,
            unit_cost: lot.unit_cost,
        });
        remaining -= take_qty;
    }

    Ok(ConsumptionPlan {
        takes,
        quantity,
        total_cost,
    })
}

/// Unit cost of a production run's output.
///
/// `(raw material cost + extra cost) / output quantity`
pub fn output_unit_cost(
    material_cost: Decimal,
    extra_cost: Decimal,
    output_quantity: Decimal,
) -> Result<Decimal, CostingError> {
    if output_quantity <= Decimal::ZERO {
        return Err(CostingError::NonPositiveOutput(output_quantity));
    }
    Ok((material_cost + extra_cost) / output_quantity)
}
