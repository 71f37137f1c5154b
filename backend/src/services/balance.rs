//! Customer balance ledger
//!
//! The stored balance only ever moves by relative deltas applied in a single
//! UPDATE, inside the transaction of the business event that caused them.
//! Reconstruction from source documents exists as an audit read.

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::OrderStatus;

#[derive(Clone)]
pub struct BalanceService {
    db: PgPool,
}

/// Stored balance versus the balance implied by source documents
#[derive(Debug, Clone, Serialize)]
pub struct BalanceAudit {
    pub customer_id: Uuid,
    pub stored_balance: Decimal,
    pub derived_balance: Decimal,
    pub outstanding_orders: Decimal,
    pub collections: Decimal,
    pub return_credits: Decimal,
}

impl BalanceAudit {
    pub fn is_consistent(&self) -> bool {
        self.stored_balance == self.derived_balance
    }
}

/// Apply a relative delta to a customer's balance inside the caller's
/// transaction. Positive deltas are new debt, negative deltas are payments
/// or credits. Returns the balance after the adjustment.
pub async fn adjust_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    company_id: Uuid,
    customer_id: Uuid,
    delta: Decimal,
) -> AppResult<Decimal> {
    let balance: Option<Decimal> = sqlx::query_scalar(
        r#"
        UPDATE customers
        SET balance = balance + $1, updated_at = NOW()
        WHERE id = $2 AND company_id = $3
        RETURNING balance
        "#,
    )
    .bind(delta)
    .bind(customer_id)
    .bind(company_id)
    .fetch_optional(&mut **tx)
    .await?;

    balance.ok_or_else(|| AppError::NotFound("Customer".to_string()))
}

impl BalanceService {
    /// Create a new BalanceService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Current stored balance for a customer
    pub async fn balance(&self, company_id: Uuid, customer_id: Uuid) -> AppResult<Decimal> {
        let balance: Option<Decimal> =
            sqlx::query_scalar("SELECT balance FROM customers WHERE id = $1 AND company_id = $2")
                .bind(customer_id)
                .bind(company_id)
                .fetch_optional(&self.db)
                .await?;

        balance.ok_or_else(|| AppError::NotFound("Customer".to_string()))
    }

    /// Rebuild the balance from orders, collections and return credits and
    /// compare it with the stored value. Cancelled orders carry no debt.
    pub async fn audit(&self, company_id: Uuid, customer_id: Uuid) -> AppResult<BalanceAudit> {
        let stored_balance = self.balance(company_id, customer_id).await?;

        let outstanding_orders: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(total - paid), 0)
            FROM orders
            WHERE company_id = $1 AND customer_id = $2 AND status <> $3
            "#,
        )
        .bind(company_id)
        .bind(customer_id)
        .bind(OrderStatus::Cancelled.as_str())
        .fetch_one(&self.db)
        .await?;

        let collections: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(amount), 0)
            FROM collections
            WHERE company_id = $1 AND customer_id = $2
            "#,
        )
        .bind(company_id)
        .bind(customer_id)
        .fetch_one(&self.db)
        .await?;

        let return_credits: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(amount), 0)
            FROM sale_returns
            WHERE company_id = $1 AND customer_id = $2 AND credited = TRUE
            "#,
        )
        .bind(company_id)
        .bind(customer_id)
        .fetch_one(&self.db)
        .await?;

        let derived_balance = outstanding_orders - collections - return_credits;

        Ok(BalanceAudit {
            customer_id,
            stored_balance,
            derived_balance,
            outstanding_orders,
            collections,
            return_credits,
        })
    }
}
