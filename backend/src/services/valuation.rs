//! Valuation engine: read-only cost quotes per the tenant's costing method
//!
//! Quotes never mutate lots or averages. The authoritative cost of a movement
//! is whatever the inventory ledger records when the movement commits; a quote
//! taken here can go stale between read and write.

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::{plan_consumption, LotOrder, LotSnapshot, ValuationMethod};

#[derive(Clone)]
pub struct ValuationService {
    db: PgPool,
}

/// A cost quote for consuming a given quantity of an item
#[derive(Debug, Clone, Serialize)]
pub struct CostQuote {
    pub item_id: Uuid,
    pub quantity: Decimal,
    pub method: ValuationMethod,
    pub unit_cost: Decimal,
    pub total_cost: Decimal,
}

#[derive(Debug, FromRow)]
struct ItemCostRow {
    unit_cost: Decimal,
    standard_cost: Decimal,
    has_history: bool,
}

/// Resolve the tenant's configured valuation method.
///
/// An unknown or missing method is a tenant misconfiguration, not a caller
/// error.
pub async fn company_method_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    company_id: Uuid,
) -> AppResult<ValuationMethod> {
    let raw: Option<String> =
        sqlx::query_scalar("SELECT valuation_method FROM companies WHERE id = $1")
            .bind(company_id)
            .fetch_optional(&mut **tx)
            .await?;

    let raw = raw.ok_or_else(|| {
        AppError::Configuration(format!("company {} has no valuation method", company_id))
    })?;

    raw.parse::<ValuationMethod>().map_err(|_| {
        AppError::Configuration(format!("unrecognized valuation method '{}'", raw))
    })
}

impl ValuationService {
    /// Create a new ValuationService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn company_method(&self, company_id: Uuid) -> AppResult<ValuationMethod> {
        let raw: Option<String> =
            sqlx::query_scalar("SELECT valuation_method FROM companies WHERE id = $1")
                .bind(company_id)
                .fetch_optional(&self.db)
                .await?;

        let raw = raw.ok_or_else(|| {
            AppError::Configuration(format!("company {} has no valuation method", company_id))
        })?;

        raw.parse::<ValuationMethod>().map_err(|_| {
            AppError::Configuration(format!("unrecognized valuation method '{}'", raw))
        })
    }

    /// Quote the cost of consuming `quantity` of an item from a warehouse
    pub async fn quote(
        &self,
        company_id: Uuid,
        item_id: Uuid,
        warehouse_id: Uuid,
        quantity: Decimal,
    ) -> AppResult<CostQuote> {
        if quantity <= Decimal::ZERO {
            return Err(AppError::Validation {
                field: "quantity".to_string(),
                message: "Quantity must be greater than zero".to_string(),
            });
        }

        let method = self.company_method(company_id).await?;

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
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Item".to_string()))?;

        let unit_cost = match method {
            ValuationMethod::Standard => item.standard_cost,
            // Items with no receipt history fall back to the standard cost
            ValuationMethod::WeightedAverage => {
                if item.has_history {
                    item.unit_cost
                } else {
                    item.standard_cost
                }
            }
            ValuationMethod::Fifo => {
                self.lot_quote(item_id, warehouse_id, quantity, LotOrder::OldestFirst)
                    .await?
            }
            ValuationMethod::Lifo => {
                self.lot_quote(item_id, warehouse_id, quantity, LotOrder::NewestFirst)
                    .await?
            }
        };

        Ok(CostQuote {
            item_id,
            quantity,
            method,
            unit_cost,
            total_cost: unit_cost * quantity,
        })
    }

    /// Blended per-unit cost from a non-mutating walk over open lots
    async fn lot_quote(
        &self,
        item_id: Uuid,
        warehouse_id: Uuid,
        quantity: Decimal,
        order: LotOrder,
    ) -> AppResult<Decimal> {
        let lots = sqlx::query_as::<_, (Uuid, Decimal, Decimal)>(
            r#"
            SELECT id, quantity_remaining, unit_cost
            FROM cost_lots
            WHERE item_id = $1 AND warehouse_id = $2 AND quantity_remaining > 0
            ORDER BY received_at ASC, id ASC
            "#,
        )
        .bind(item_id)
        .bind(warehouse_id)
        .fetch_all(&self.db)
        .await?;

        let snapshots: Vec<LotSnapshot> = lots
            .into_iter()
            .map(|(lot_id, quantity_remaining, unit_cost)| LotSnapshot {
                lot_id,
                quantity_remaining,
                unit_cost,
            })
            .collect();

        let plan = plan_consumption(&snapshots, quantity, order).map_err(|e| {
            AppError::InsufficientStock(format!("cannot quote {} units: {}", quantity, e))
        })?;

        Ok(plan.blended_unit_cost())
    }
}
