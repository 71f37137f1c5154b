//! Cash reconciliation: driver cash is derived, never stored
//!
//! Cash on hand for a driver is computed from the four contributing streams
//! in one statement, so the figure is a consistent snapshot. There is no
//! stored running cash field anywhere to drift out of agreement.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::balance;
use crate::services::journal::JournalService;
use shared::{
    validate_positive_amount, CashStreams, CollectionMethod, DepositStatus, OrderStatus,
    TaskStatus,
};

#[derive(Clone)]
pub struct CashService {
    db: PgPool,
}

/// Derived cash position for one driver
#[derive(Debug, Clone, Serialize)]
pub struct CashPosition {
    pub driver_id: Uuid,
    pub task_payments: Decimal,
    pub pos_payments: Decimal,
    pub cash_collections: Decimal,
    pub deposits: Decimal,
    pub cash_on_hand: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct CollectionInput {
    pub customer_id: Uuid,
    pub amount: Decimal,
    pub method: CollectionMethod,
    pub collection_date: NaiveDate,
    pub collected_by: Uuid,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CollectionRecord {
    pub id: Uuid,
    pub company_id: Uuid,
    pub customer_id: Uuid,
    pub amount: Decimal,
    pub method: String,
    pub collection_date: NaiveDate,
    pub collected_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct DepositInput {
    pub driver_id: Uuid,
    pub amount: Decimal,
    pub deposit_date: NaiveDate,
    pub reference: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DepositRecord {
    pub id: Uuid,
    pub company_id: Uuid,
    pub driver_id: Uuid,
    pub amount: Decimal,
    pub status: String,
    pub deposit_date: NaiveDate,
    pub reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Read all four cash streams for a driver in one statement.
///
/// Deposits subtract as soon as they are recorded; only rejected ones are
/// excluded. Runs against a pool or an open transaction.
async fn streams_for_driver<'e, E>(
    executor: E,
    company_id: Uuid,
    driver_id: Uuid,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> AppResult<CashStreams>
where
    E: PgExecutor<'e>,
{
    let countable_tasks = vec![
        TaskStatus::Completed.as_str(),
        TaskStatus::Delivered.as_str(),
    ];

    let (task_payments, pos_payments, cash_collections, deposits) =
        sqlx::query_as::<_, (Decimal, Decimal, Decimal, Decimal)>(
            r#"
            SELECT
                COALESCE((
                    SELECT SUM(t.paid_amount)
                    FROM delivery_tasks t
                    WHERE t.company_id = $1 AND t.driver_id = $2
                      AND t.status = ANY($3)
                      AND ($4::date IS NULL OR t.task_date >= $4)
                      AND ($5::date IS NULL OR t.task_date <= $5)
                ), 0),
                COALESCE((
                    SELECT SUM(o.paid)
                    FROM orders o
                    WHERE o.company_id = $1 AND o.driver_id = $2
                      AND o.is_pos = TRUE AND o.status <> $6
                      AND ($4::date IS NULL OR o.order_date >= $4)
                      AND ($5::date IS NULL OR o.order_date <= $5)
                ), 0),
                COALESCE((
                    SELECT SUM(c.amount)
                    FROM collections c
                    WHERE c.company_id = $1 AND c.collected_by = $2
                      AND c.method = $7
                      AND ($4::date IS NULL OR c.collection_date >= $4)
                      AND ($5::date IS NULL OR c.collection_date <= $5)
                ), 0),
                COALESCE((
                    SELECT SUM(d.amount)
                    FROM deposits d
                    WHERE d.company_id = $1 AND d.driver_id = $2
                      AND d.status <> $8
                      AND ($4::date IS NULL OR d.deposit_date >= $4)
                      AND ($5::date IS NULL OR d.deposit_date <= $5)
                ), 0)
            "#,
        )
        .bind(company_id)
        .bind(driver_id)
        .bind(&countable_tasks)
        .bind(from)
        .bind(to)
        .bind(OrderStatus::Cancelled.as_str())
        .bind(CollectionMethod::Cash.as_str())
        .bind(DepositStatus::Rejected.as_str())
        .fetch_one(executor)
        .await?;

    Ok(CashStreams {
        task_payments,
        pos_payments,
        cash_collections,
        deposits,
    })
}

impl CashService {
    /// Create a new CashService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Derive a driver's cash position, optionally windowed by date.
    ///
    /// All four streams are read in one statement so they reflect a single
    /// snapshot.
    pub async fn cash_on_hand(
        &self,
        company_id: Uuid,
        driver_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> AppResult<CashPosition> {
        let streams = streams_for_driver(&self.db, company_id, driver_id, from, to).await?;

        Ok(CashPosition {
            driver_id,
            task_payments: streams.task_payments,
            pos_payments: streams.pos_payments,
            cash_collections: streams.cash_collections,
            deposits: streams.deposits,
            cash_on_hand: streams.cash_on_hand(),
        })
    }

    /// Record a customer payment: insert, reduce the customer's debt and
    /// post the journal entry in one transaction
    pub async fn record_collection(
        &self,
        company_id: Uuid,
        actor_id: Uuid,
        input: CollectionInput,
    ) -> AppResult<CollectionRecord> {
        validate_positive_amount(input.amount).map_err(|msg| AppError::Validation {
            field: "amount".to_string(),
            message: msg.to_string(),
        })?;

        let mut tx = self.db.begin().await?;

        let collection = sqlx::query_as::<_, CollectionRecord>(
            r#"
            INSERT INTO collections (company_id, customer_id, amount, method, collection_date, collected_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, company_id, customer_id, amount, method, collection_date, collected_by, created_at
            "#,
        )
        .bind(company_id)
        .bind(input.customer_id)
        .bind(input.amount)
        .bind(input.method.as_str())
        .bind(input.collection_date)
        .bind(input.collected_by)
        .fetch_one(&mut *tx)
        .await?;

        balance::adjust_in_tx(&mut tx, company_id, input.customer_id, -input.amount).await?;

        JournalService::post_collection_entry(
            &mut tx,
            company_id,
            collection.id,
            input.amount,
            input.method,
            input.collection_date,
            actor_id,
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            company_id = %company_id,
            collection_id = %collection.id,
            customer_id = %input.customer_id,
            amount = %input.amount,
            "collection recorded"
        );

        Ok(collection)
    }

    /// Create a pending deposit.
    ///
    /// A pending deposit already reduces the driver's derived cash, so the
    /// overdraw check happens here. The per-driver advisory lock serializes
    /// concurrent deposits that would each pass the check in isolation.
    pub async fn create_deposit(
        &self,
        company_id: Uuid,
        input: DepositInput,
    ) -> AppResult<DepositRecord> {
        validate_positive_amount(input.amount).map_err(|msg| AppError::Validation {
            field: "amount".to_string(),
            message: msg.to_string(),
        })?;

        let mut tx = self.db.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1::text || $2::text, 0))")
            .bind(company_id)
            .bind(input.driver_id)
            .execute(&mut *tx)
            .await?;

        let streams =
            streams_for_driver(&mut *tx, company_id, input.driver_id, None, None).await?;
        if input.amount > streams.cash_on_hand() {
            return Err(AppError::Validation {
                field: "amount".to_string(),
                message: format!(
                    "deposit of {} exceeds cash on hand of {}",
                    input.amount,
                    streams.cash_on_hand()
                ),
            });
        }

        let deposit = sqlx::query_as::<_, DepositRecord>(
            r#"
            INSERT INTO deposits (company_id, driver_id, amount, status, deposit_date, reference)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, company_id, driver_id, amount, status, deposit_date, reference, created_at
            "#,
        )
        .bind(company_id)
        .bind(input.driver_id)
        .bind(input.amount)
        .bind(DepositStatus::Pending.as_str())
        .bind(input.deposit_date)
        .bind(input.reference)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(deposit)
    }

    /// Confirm a pending deposit and post its journal entry.
    ///
    /// The deposit was already counted against the driver's cash when it was
    /// created, so confirmation only settles the status and posts the entry.
    pub async fn confirm_deposit(
        &self,
        company_id: Uuid,
        actor_id: Uuid,
        deposit_id: Uuid,
    ) -> AppResult<DepositRecord> {
        let mut tx = self.db.begin().await?;

        let deposit = sqlx::query_as::<_, DepositRecord>(
            r#"
            SELECT id, company_id, driver_id, amount, status, deposit_date, reference, created_at
            FROM deposits
            WHERE id = $1 AND company_id = $2
            FOR UPDATE
            "#,
        )
        .bind(deposit_id)
        .bind(company_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Deposit".to_string()))?;

        let status = deposit
            .status
            .parse::<DepositStatus>()
            .map_err(AppError::Configuration)?;

        if !status.can_transition_to(DepositStatus::Confirmed) {
            return Err(AppError::InvalidStateTransition(format!(
                "deposit cannot move from {} to confirmed",
                status.as_str()
            )));
        }

        let confirmed = sqlx::query_as::<_, DepositRecord>(
            r#"
            UPDATE deposits
            SET status = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING id, company_id, driver_id, amount, status, deposit_date, reference, created_at
            "#,
        )
        .bind(DepositStatus::Confirmed.as_str())
        .bind(deposit_id)
        .fetch_one(&mut *tx)
        .await?;

        JournalService::post_deposit_entry(
            &mut tx,
            company_id,
            deposit_id,
            deposit.amount,
            deposit.deposit_date,
            actor_id,
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            company_id = %company_id,
            deposit_id = %deposit_id,
            driver_id = %deposit.driver_id,
            amount = %deposit.amount,
            "deposit confirmed"
        );

        Ok(confirmed)
    }

    /// Reject a pending deposit. The amount returns to the driver's derived
    /// cash; no journal entry is posted.
    pub async fn reject_deposit(
        &self,
        company_id: Uuid,
        deposit_id: Uuid,
    ) -> AppResult<DepositRecord> {
        let mut tx = self.db.begin().await?;

        let deposit = sqlx::query_as::<_, DepositRecord>(
            r#"
            SELECT id, company_id, driver_id, amount, status, deposit_date, reference, created_at
            FROM deposits
            WHERE id = $1 AND company_id = $2
            FOR UPDATE
            "#,
        )
        .bind(deposit_id)
        .bind(company_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Deposit".to_string()))?;

        let status = deposit
            .status
            .parse::<DepositStatus>()
            .map_err(AppError::Configuration)?;

        if !status.can_transition_to(DepositStatus::Rejected) {
            return Err(AppError::InvalidStateTransition(format!(
                "deposit cannot move from {} to rejected",
                status.as_str()
            )));
        }

        let rejected = sqlx::query_as::<_, DepositRecord>(
            r#"
            UPDATE deposits
            SET status = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING id, company_id, driver_id, amount, status, deposit_date, reference, created_at
            "#,
        )
        .bind(DepositStatus::Rejected.as_str())
        .bind(deposit_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(rejected)
    }
}
