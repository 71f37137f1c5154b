//! Sale returns
//!
//! A return may restock goods, credit the customer's debt, both or neither.
//! Restocked goods come back at the item's current carrying cost, not the
//! price the customer paid.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::balance;
use crate::services::inventory::InventoryService;
use crate::services::journal::JournalService;
use shared::{validate_positive_amount, validate_positive_quantity, MovementType};

#[derive(Clone)]
pub struct ReturnService {
    db: PgPool,
}

#[derive(Debug, Deserialize)]
pub struct RestockInput {
    pub item_id: Uuid,
    pub warehouse_id: Uuid,
    pub quantity: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct ProcessReturnInput {
    pub order_id: Uuid,
    pub customer_id: Uuid,
    pub amount: Decimal,
    pub credited: bool,
    pub return_date: NaiveDate,
    pub restock: Option<RestockInput>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SaleReturnRecord {
    pub id: Uuid,
    pub company_id: Uuid,
    pub order_id: Uuid,
    pub customer_id: Uuid,
    pub amount: Decimal,
    pub restock_cost: Decimal,
    pub credited: bool,
    pub return_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct CarryingCostRow {
    unit_cost: Decimal,
    standard_cost: Decimal,
    has_history: bool,
}

impl ReturnService {
    /// Create a new ReturnService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Process a return in one transaction: restock if requested, credit the
    /// customer if requested, post the journal entry either way.
    pub async fn process_return(
        &self,
        company_id: Uuid,
        actor_id: Uuid,
        input: ProcessReturnInput,
    ) -> AppResult<SaleReturnRecord> {
        validate_positive_amount(input.amount).map_err(|msg| AppError::Validation {
            field: "amount".to_string(),
            message: msg.to_string(),
        })?;
        if let Some(restock) = &input.restock {
            validate_positive_quantity(restock.quantity).map_err(|msg| AppError::Validation {
                field: "quantity".to_string(),
                message: msg.to_string(),
            })?;
        }

        let mut tx = self.db.begin().await?;

        let order_exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM orders WHERE id = $1 AND company_id = $2)",
        )
        .bind(input.order_id)
        .bind(company_id)
        .fetch_one(&mut *tx)
        .await?;
        if !order_exists {
            return Err(AppError::NotFound("Order".to_string()));
        }

        let restock_cost = if let Some(restock) = &input.restock {
            let item = sqlx::query_as::<_, CarryingCostRow>(
                r#"
                SELECT unit_cost, standard_cost,
                       EXISTS(SELECT 1 FROM cost_lots WHERE item_id = items.id) AS has_history
                FROM items
                WHERE id = $1 AND company_id = $2
                "#,
            )
            .bind(restock.item_id)
            .bind(company_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Item".to_string()))?;

            let carrying_cost = if item.has_history {
                item.unit_cost
            } else {
                item.standard_cost
            };

            InventoryService::receive_in_tx(
                &mut tx,
                company_id,
                restock.item_id,
                restock.warehouse_id,
                restock.quantity,
                carrying_cost,
                MovementType::SaleReturn,
                Some(input.order_id),
            )
            .await?;

            carrying_cost * restock.quantity
        } else {
            Decimal::ZERO
        };

        let record = sqlx::query_as::<_, SaleReturnRecord>(
            r#"
            INSERT INTO sale_returns (company_id, order_id, customer_id, amount, restock_cost, credited, return_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, company_id, order_id, customer_id, amount, restock_cost, credited, return_date, created_at
            "#,
        )
        .bind(company_id)
        .bind(input.order_id)
        .bind(input.customer_id)
        .bind(input.amount)
        .bind(restock_cost)
        .bind(input.credited)
        .bind(input.return_date)
        .fetch_one(&mut *tx)
        .await?;

        if input.credited {
            balance::adjust_in_tx(&mut tx, company_id, input.customer_id, -input.amount).await?;
        }

        JournalService::post_return_entry(
            &mut tx,
            company_id,
            record.id,
            input.amount,
            restock_cost,
            input.credited,
            input.return_date,
            actor_id,
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            company_id = %company_id,
            return_id = %record.id,
            order_id = %input.order_id,
            amount = %input.amount,
            restock_cost = %restock_cost,
            credited = input.credited,
            "sale return processed"
        );

        Ok(record)
    }
}
