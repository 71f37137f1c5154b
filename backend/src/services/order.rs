//! Order orchestration: stock, debt and journal move together or not at all
//!
//! A sale deducts every line, freezes per-line unit costs, raises customer
//! debt by the unpaid portion and posts the journal entry inside one
//! transaction. A deduction that loses a race to another writer is retried
//! once before surfacing a conflict.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::balance;
use crate::services::inventory::InventoryService;
use crate::services::journal::JournalService;
use crate::services::valuation;
use shared::{
    validate_non_negative_amount, validate_paid_within_total, validate_positive_quantity,
    validate_unit_price, MovementType, OrderStatus,
};

#[derive(Clone)]
pub struct OrderService {
    db: PgPool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderLineInput {
    pub item_id: Uuid,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderInput {
    pub customer_id: Uuid,
    pub driver_id: Option<Uuid>,
    pub warehouse_id: Uuid,
    pub is_pos: bool,
    pub order_date: NaiveDate,
    pub paid: Decimal,
    pub items: Vec<OrderLineInput>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderRecord {
    pub id: Uuid,
    pub company_id: Uuid,
    pub customer_id: Uuid,
    pub driver_id: Option<Uuid>,
    pub warehouse_id: Uuid,
    pub is_pos: bool,
    pub status: String,
    pub total: Decimal,
    pub paid: Decimal,
    pub cost_of_goods: Decimal,
    pub order_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderItemRecord {
    pub id: Uuid,
    pub order_id: Uuid,
    pub item_id: Uuid,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub unit_cost: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: OrderRecord,
    pub items: Vec<OrderItemRecord>,
}

impl OrderService {
    /// Create a new OrderService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create an order. One lost race on a stock row earns a single retry;
    /// a second loss surfaces as a conflict.
    pub async fn create_order(
        &self,
        company_id: Uuid,
        actor_id: Uuid,
        input: CreateOrderInput,
    ) -> AppResult<OrderDetail> {
        Self::validate_input(&input)?;

        match self.try_create(company_id, actor_id, &input).await {
            Err(AppError::ConcurrencyConflict(reason)) => {
                tracing::warn!(
                    company_id = %company_id,
                    customer_id = %input.customer_id,
                    %reason,
                    "order creation lost a race, retrying once"
                );
                self.try_create(company_id, actor_id, &input).await
            }
            other => other,
        }
    }

    async fn try_create(
        &self,
        company_id: Uuid,
        actor_id: Uuid,
        input: &CreateOrderInput,
    ) -> AppResult<OrderDetail> {
        let total: Decimal = input
            .items
            .iter()
            .map(|line| line.quantity * line.unit_price)
            .sum();

        let mut tx = self.db.begin().await?;

        let method = valuation::company_method_in_tx(&mut tx, company_id).await?;

        let status = if input.is_pos {
            OrderStatus::Delivered
        } else {
            OrderStatus::Pending
        };

        let order = sqlx::query_as::<_, OrderRecord>(
            r#"
            INSERT INTO orders (company_id, customer_id, driver_id, warehouse_id, is_pos, status, total, paid, cost_of_goods, order_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 0, $9)
            RETURNING id, company_id, customer_id, driver_id, warehouse_id, is_pos, status, total, paid, cost_of_goods, order_date, created_at
            "#,
        )
        .bind(company_id)
        .bind(input.customer_id)
        .bind(input.driver_id)
        .bind(input.warehouse_id)
        .bind(input.is_pos)
        .bind(status.as_str())
        .bind(total)
        .bind(input.paid)
        .bind(input.order_date)
        .fetch_one(&mut *tx)
        .await?;

        let mut cost_of_goods = Decimal::ZERO;
        let mut items = Vec::with_capacity(input.items.len());

        for line in &input.items {
            let outcome = InventoryService::deduct_in_tx(
                &mut tx,
                company_id,
                line.item_id,
                input.warehouse_id,
                line.quantity,
                method,
                MovementType::Sale,
                Some(order.id),
            )
            .await?;

            cost_of_goods += outcome.total_cost;

            let item = sqlx::query_as::<_, OrderItemRecord>(
                r#"
                INSERT INTO order_items (order_id, item_id, quantity, unit_price, unit_cost)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, order_id, item_id, quantity, unit_price, unit_cost
                "#,
            )
            .bind(order.id)
            .bind(line.item_id)
            .bind(line.quantity)
            .bind(line.unit_price)
            .bind(outcome.unit_cost)
            .fetch_one(&mut *tx)
            .await?;

            items.push(item);
        }

        let order = sqlx::query_as::<_, OrderRecord>(
            r#"
            UPDATE orders SET cost_of_goods = $1 WHERE id = $2
            RETURNING id, company_id, customer_id, driver_id, warehouse_id, is_pos, status, total, paid, cost_of_goods, order_date, created_at
            "#,
        )
        .bind(cost_of_goods)
        .bind(order.id)
        .fetch_one(&mut *tx)
        .await?;

        let outstanding = total - input.paid;
        if outstanding > Decimal::ZERO {
            balance::adjust_in_tx(&mut tx, company_id, input.customer_id, outstanding).await?;
        }

        JournalService::post_order_entry(
            &mut tx,
            company_id,
            order.id,
            total,
            input.paid,
            cost_of_goods,
            input.order_date,
            actor_id,
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            company_id = %company_id,
            order_id = %order.id,
            customer_id = %input.customer_id,
            total = %total,
            paid = %input.paid,
            cost_of_goods = %cost_of_goods,
            "order created"
        );

        Ok(OrderDetail { order, items })
    }

    fn validate_input(input: &CreateOrderInput) -> AppResult<()> {
        if input.items.is_empty() {
            return Err(AppError::Validation {
                field: "items".to_string(),
                message: "An order must have at least one line".to_string(),
            });
        }

        for line in &input.items {
            validate_positive_quantity(line.quantity).map_err(|msg| AppError::Validation {
                field: "quantity".to_string(),
                message: msg.to_string(),
            })?;
            validate_unit_price(line.unit_price).map_err(|msg| AppError::Validation {
                field: "unit_price".to_string(),
                message: msg.to_string(),
            })?;
        }

        validate_non_negative_amount(input.paid).map_err(|msg| AppError::Validation {
            field: "paid".to_string(),
            message: msg.to_string(),
        })?;

        let total: Decimal = input
            .items
            .iter()
            .map(|line| line.quantity * line.unit_price)
            .sum();

        validate_paid_within_total(input.paid, total).map_err(|msg| AppError::Validation {
            field: "paid".to_string(),
            message: msg.to_string(),
        })?;

        Ok(())
    }

    pub async fn get_order(&self, company_id: Uuid, order_id: Uuid) -> AppResult<OrderDetail> {
        let order = sqlx::query_as::<_, OrderRecord>(
            r#"
            SELECT id, company_id, customer_id, driver_id, warehouse_id, is_pos, status, total, paid, cost_of_goods, order_date, created_at
            FROM orders
            WHERE id = $1 AND company_id = $2
            "#,
        )
        .bind(order_id)
        .bind(company_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Order".to_string()))?;

        let items = sqlx::query_as::<_, OrderItemRecord>(
            r#"
            SELECT id, order_id, item_id, quantity, unit_price, unit_cost
            FROM order_items
            WHERE order_id = $1
            ORDER BY id
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.db)
        .await?;

        Ok(OrderDetail { order, items })
    }

    /// Orders for a customer, newest first
    pub async fn list_for_customer(
        &self,
        company_id: Uuid,
        customer_id: Uuid,
    ) -> AppResult<Vec<OrderRecord>> {
        let orders = sqlx::query_as::<_, OrderRecord>(
            r#"
            SELECT id, company_id, customer_id, driver_id, warehouse_id, is_pos, status, total, paid, cost_of_goods, order_date, created_at
            FROM orders
            WHERE company_id = $1 AND customer_id = $2
            ORDER BY order_date DESC, created_at DESC
            "#,
        )
        .bind(company_id)
        .bind(customer_id)
        .fetch_all(&self.db)
        .await?;

        Ok(orders)
    }
}
