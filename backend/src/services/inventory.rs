//! Inventory ledger: the single write path for stock quantities and costs
//!
//! Every receive/deduct appends an immutable stock movement and adjusts the
//! (item, warehouse) quantity in the same transaction. Non-negativity is
//! enforced with a conditional atomic decrement checked via affected rows, so
//! two racing deductions can never jointly overdraw a stock row.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::{
    plan_consumption, validate_non_negative_amount, validate_positive_quantity,
    weighted_average_cost, CostingError, LotOrder, LotSnapshot, LotTake, MovementType,
    ValuationMethod,
};

/// Inventory service owning stock quantities, cost lots and movements
#[derive(Clone)]
pub struct InventoryService {
    db: PgPool,
}

/// Input for receiving stock (purchase or production output)
#[derive(Debug, Deserialize)]
pub struct ReceiveStockInput {
    pub item_id: Uuid,
    pub warehouse_id: Uuid,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
    pub reference_id: Option<Uuid>,
}

/// A received cost lot
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CostLotRecord {
    pub id: Uuid,
    pub company_id: Uuid,
    pub item_id: Uuid,
    pub warehouse_id: Uuid,
    pub quantity_received: Decimal,
    pub quantity_remaining: Decimal,
    pub unit_cost: Decimal,
    pub received_at: DateTime<Utc>,
}

/// An immutable stock movement row
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StockMovementRecord {
    pub id: Uuid,
    pub company_id: Uuid,
    pub item_id: Uuid,
    pub warehouse_id: Uuid,
    pub delta: Decimal,
    pub movement_type: String,
    pub reference_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Result of a deduction: the cost basis of what was consumed
#[derive(Debug, Clone, Serialize)]
pub struct DeductionOutcome {
    pub quantity: Decimal,
    pub unit_cost: Decimal,
    pub total_cost: Decimal,
    pub consumed_lots: Vec<LotTake>,
}

#[derive(Debug, FromRow)]
struct ItemCostRow {
    unit_cost: Decimal,
    standard_cost: Decimal,
    has_history: bool,
}

impl InventoryService {
    /// Create a new InventoryService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Receive stock as a standalone operation (raw-material purchase)
    pub async fn receive_stock(
        &self,
        company_id: Uuid,
        input: ReceiveStockInput,
    ) -> AppResult<CostLotRecord> {
        let mut tx = self.db.begin().await?;
        let lot = Self::receive_in_tx(
            &mut tx,
            company_id,
            input.item_id,
            input.warehouse_id,
            input.quantity,
            input.unit_cost,
            MovementType::Purchase,
            input.reference_id,
        )
        .await?;
        tx.commit().await?;
        Ok(lot)
    }

    /// Receive stock inside the caller's transaction.
    ///
    /// Appends a cost lot and a movement, bumps the stock quantity, and
    /// moves the item's weighted-average cost, all in one transaction.
    #[allow(clippy::too_many_arguments)]
    pub async fn receive_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        company_id: Uuid,
        item_id: Uuid,
        warehouse_id: Uuid,
        quantity: Decimal,
        unit_cost: Decimal,
        movement_type: MovementType,
        reference_id: Option<Uuid>,
    ) -> AppResult<CostLotRecord> {
        validate_positive_quantity(quantity).map_err(|msg| AppError::Validation {
            field: "quantity".to_string(),
            message: msg.to_string(),
        })?;
        validate_non_negative_amount(unit_cost).map_err(|msg| AppError::Validation {
            field: "unit_cost".to_string(),
            message: msg.to_string(),
        })?;

        // Lock the item row: the weighted-average update is a read-then-write
        // on a shared scalar and must be serialized across writers.
        let item = sqlx::query_as::<_, ItemCostRow>(
            r#"
            SELECT unit_cost, standard_cost,
                   EXISTS(SELECT 1 FROM cost_lots WHERE item_id = items.id) AS has_history
            FROM items
            WHERE id = $1 AND company_id = $2
            FOR UPDATE OF items
            "#,
        )
        .bind(item_id)
        .bind(company_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Item".to_string()))?;

        let existing_qty: Decimal = sqlx::query_scalar(
            "SELECT COALESCE(SUM(quantity), 0) FROM item_stocks WHERE item_id = $1",
        )
        .bind(item_id)
        .fetch_one(&mut **tx)
        .await?;

        let lot = sqlx::query_as::<_, CostLotRecord>(
            r#"
            INSERT INTO cost_lots (company_id, item_id, warehouse_id, quantity_received, quantity_remaining, unit_cost)
            VALUES ($1, $2, $3, $4, $4, $5)
            RETURNING id, company_id, item_id, warehouse_id, quantity_received, quantity_remaining, unit_cost, received_at
            "#,
        )
        .bind(company_id)
        .bind(item_id)
        .bind(warehouse_id)
        .bind(quantity)
        .bind(unit_cost)
        .fetch_one(&mut **tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO item_stocks (item_id, warehouse_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (item_id, warehouse_id) DO UPDATE SET quantity = item_stocks.quantity + $3
            "#,
        )
        .bind(item_id)
        .bind(warehouse_id)
        .bind(quantity)
        .execute(&mut **tx)
        .await?;

        Self::append_movement(
            tx,
            company_id,
            item_id,
            warehouse_id,
            quantity,
            movement_type,
            reference_id,
        )
        .await?;

        // Cost aggregator: first receipt takes the incoming cost as-is
        let existing_cost = if item.has_history {
            item.unit_cost
        } else {
            Decimal::ZERO
        };
        let base_qty = if item.has_history {
            existing_qty
        } else {
            Decimal::ZERO
        };
        let new_cost = weighted_average_cost(base_qty, existing_cost, quantity, unit_cost);

        sqlx::query("UPDATE items SET unit_cost = $1, updated_at = NOW() WHERE id = $2")
            .bind(new_cost)
            .bind(item_id)
            .execute(&mut **tx)
            .await?;

        tracing::debug!(
            company_id = %company_id,
            item_id = %item_id,
            quantity = %quantity,
            unit_cost = %unit_cost,
            new_average = %new_cost,
            "stock received"
        );

        Ok(lot)
    }

    /// Deduct stock inside the caller's transaction.
    ///
    /// The conditional decrement is the sufficiency check: zero affected rows
    /// means the quantity on hand cannot cover the request (or another writer
    /// got there first), and the whole enclosing transaction aborts.
    #[allow(clippy::too_many_arguments)]
    pub async fn deduct_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        company_id: Uuid,
        item_id: Uuid,
        warehouse_id: Uuid,
        quantity: Decimal,
        method: ValuationMethod,
        movement_type: MovementType,
        reference_id: Option<Uuid>,
    ) -> AppResult<DeductionOutcome> {
        validate_positive_quantity(quantity).map_err(|msg| AppError::Validation {
            field: "quantity".to_string(),
            message: msg.to_string(),
        })?;

        let item = sqlx::query_as::<_, ItemCostRow>(
            r#"
            SELECT unit_cost, standard_cost,
                   EXISTS(SELECT 1 FROM cost_lots WHERE item_id = items.id) AS has_history
            FROM items
            WHERE id = $1 AND company_id = $2
            "#,
        )
        .bind(item_id)
        .bind(company_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Item".to_string()))?;

        let affected = sqlx::query(
            r#"
            UPDATE item_stocks
            SET quantity = quantity - $1
            WHERE item_id = $2 AND warehouse_id = $3 AND quantity >= $1
            "#,
        )
        .bind(quantity)
        .bind(item_id)
        .bind(warehouse_id)
        .execute(&mut **tx)
        .await?
        .rows_affected();

        if affected == 0 {
            let on_hand: Decimal = sqlx::query_scalar(
                "SELECT COALESCE(quantity, 0) FROM item_stocks WHERE item_id = $1 AND warehouse_id = $2",
            )
            .bind(item_id)
            .bind(warehouse_id)
            .fetch_optional(&mut **tx)
            .await?
            .unwrap_or(Decimal::ZERO);
            return Err(AppError::InsufficientStock(format!(
                "requested {} but only {} on hand",
                quantity, on_hand
            )));
        }

        let (unit_cost, total_cost, consumed_lots) = match method {
            ValuationMethod::WeightedAverage => {
                let cost = if item.has_history {
                    item.unit_cost
                } else {
                    item.standard_cost
                };
                Self::consume_lots(tx, item_id, warehouse_id, quantity, LotOrder::OldestFirst)
                    .await?;
                (cost, cost * quantity, Vec::new())
            }
            ValuationMethod::Standard => {
                Self::consume_lots(tx, item_id, warehouse_id, quantity, LotOrder::OldestFirst)
                    .await?;
                (
                    item.standard_cost,
                    item.standard_cost * quantity,
                    Vec::new(),
                )
            }
            ValuationMethod::Fifo => {
                let takes =
                    Self::consume_lots(tx, item_id, warehouse_id, quantity, LotOrder::OldestFirst)
                        .await?;
                let total: Decimal = takes.iter().map(|t| t.quantity * t.unit_cost).sum();
                (total / quantity, total, takes)
            }
            ValuationMethod::Lifo => {
                let takes =
                    Self::consume_lots(tx, item_id, warehouse_id, quantity, LotOrder::NewestFirst)
                        .await?;
                let total: Decimal = takes.iter().map(|t| t.quantity * t.unit_cost).sum();
                (total / quantity, total, takes)
            }
        };

        Self::append_movement(
            tx,
            company_id,
            item_id,
            warehouse_id,
            -quantity,
            movement_type,
            reference_id,
        )
        .await?;

        Ok(DeductionOutcome {
            quantity,
            unit_cost,
            total_cost,
            consumed_lots,
        })
    }

    /// Consume lots oldest- or newest-first, decrementing each lot touched.
    ///
    /// Lot remainders and the stock quantity move together in every code
    /// path, so a plan shortfall after a successful decrement means a lost
    /// race on the lot rows.
    async fn consume_lots(
        tx: &mut Transaction<'_, Postgres>,
        item_id: Uuid,
        warehouse_id: Uuid,
        quantity: Decimal,
        order: LotOrder,
    ) -> AppResult<Vec<LotTake>> {
        let lots = sqlx::query_as::<_, (Uuid, Decimal, Decimal)>(
            r#"
            SELECT id, quantity_remaining, unit_cost
            FROM cost_lots
            WHERE item_id = $1 AND warehouse_id = $2 AND quantity_remaining > 0
            ORDER BY received_at ASC, id ASC
            FOR UPDATE
            "#,
        )
        .bind(item_id)
        .bind(warehouse_id)
        .fetch_all(&mut **tx)
        .await?;

        let snapshots: Vec<LotSnapshot> = lots
            .into_iter()
            .map(|(lot_id, quantity_remaining, unit_cost)| LotSnapshot {
                lot_id,
                quantity_remaining,
                unit_cost,
            })
            .collect();

        let plan = plan_consumption(&snapshots, quantity, order).map_err(|e| match e {
            CostingError::InsufficientLots { .. } => {
                AppError::ConcurrencyConflict(format!("lot consumption lost a race: {}", e))
            }
            other => AppError::Validation {
                field: "quantity".to_string(),
                message: other.to_string(),
            },
        })?;

        for take in &plan.takes {
            let affected = sqlx::query(
                r#"
                UPDATE cost_lots
                SET quantity_remaining = quantity_remaining - $1
                WHERE id = $2 AND quantity_remaining >= $1
                "#,
            )
            .bind(take.quantity)
            .bind(take.lot_id)
            .execute(&mut **tx)
            .await?
            .rows_affected();

            if affected == 0 {
                return Err(AppError::ConcurrencyConflict(format!(
                    "cost lot {} was consumed concurrently",
                    take.lot_id
                )));
            }
        }

        Ok(plan.takes)
    }

    async fn append_movement(
        tx: &mut Transaction<'_, Postgres>,
        company_id: Uuid,
        item_id: Uuid,
        warehouse_id: Uuid,
        delta: Decimal,
        movement_type: MovementType,
        reference_id: Option<Uuid>,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO stock_movements (company_id, item_id, warehouse_id, delta, movement_type, reference_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(company_id)
        .bind(item_id)
        .bind(warehouse_id)
        .bind(delta)
        .bind(movement_type.as_str())
        .bind(reference_id)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Current quantity on hand for an (item, warehouse) pair
    pub async fn quantity_on_hand(
        &self,
        company_id: Uuid,
        item_id: Uuid,
        warehouse_id: Uuid,
    ) -> AppResult<Decimal> {
        let quantity: Option<Decimal> = sqlx::query_scalar(
            r#"
            SELECT s.quantity
            FROM item_stocks s
            JOIN items i ON i.id = s.item_id
            WHERE s.item_id = $1 AND s.warehouse_id = $2 AND i.company_id = $3
            "#,
        )
        .bind(item_id)
        .bind(warehouse_id)
        .bind(company_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(quantity.unwrap_or(Decimal::ZERO))
    }

    /// Audit read: quantity reconstructed from the movement log.
    ///
    /// Must always agree with `quantity_on_hand`.
    pub async fn reconstructed_quantity(
        &self,
        company_id: Uuid,
        item_id: Uuid,
        warehouse_id: Uuid,
    ) -> AppResult<Decimal> {
        let total: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(delta), 0)
            FROM stock_movements
            WHERE company_id = $1 AND item_id = $2 AND warehouse_id = $3
            "#,
        )
        .bind(company_id)
        .bind(item_id)
        .bind(warehouse_id)
        .fetch_one(&self.db)
        .await?;

        Ok(total)
    }

    /// Movement history for an item, newest first
    pub async fn list_movements(
        &self,
        company_id: Uuid,
        item_id: Uuid,
    ) -> AppResult<Vec<StockMovementRecord>> {
        let movements = sqlx::query_as::<_, StockMovementRecord>(
            r#"
            SELECT id, company_id, item_id, warehouse_id, delta, movement_type, reference_id, created_at
            FROM stock_movements
            WHERE company_id = $1 AND item_id = $2
            ORDER BY created_at DESC
            "#,
        )
        .bind(company_id)
        .bind(item_id)
        .fetch_all(&self.db)
        .await?;

        Ok(movements)
    }
}
