//! Journal posting engine
//!
//! Synthesizes a balanced double-entry record for every money-moving event.
//! Postings run inside the same transaction as the domain mutation that
//! triggered them, so money state and the journal can never diverge.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::{validate_lines, CollectionMethod, JournalEventType, LineSpec};

/// Unique constraint enforcing one posting per (company, event type, event)
const EVENT_KEY_CONSTRAINT: &str = "journal_entries_event_key";

/// Journal service for posting and reading double-entry records
#[derive(Clone)]
pub struct JournalService {
    db: PgPool,
}

/// A posted entry with its lines, as returned to callers
#[derive(Debug, Clone, Serialize)]
pub struct PostedEntry {
    pub id: Uuid,
    pub event_type: JournalEventType,
    pub event_id: Uuid,
    pub description: String,
    pub entry_date: NaiveDate,
    pub posted_at: DateTime<Utc>,
    pub lines: Vec<PostedLine>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostedLine {
    pub account_code: String,
    pub debit: Decimal,
    pub credit: Decimal,
}

#[derive(Debug, sqlx::FromRow)]
struct EntryRow {
    id: Uuid,
    event_type: String,
    event_id: Uuid,
    description: String,
    entry_date: NaiveDate,
    posted_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct LineRow {
    entry_id: Uuid,
    account_code: String,
    debit: Decimal,
    credit: Decimal,
}

impl JournalService {
    /// Create a new JournalService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Post a balanced entry inside the caller's transaction.
    ///
    /// Rejects unbalanced line sets loudly and maps the unique event key to a
    /// duplicate error so the same business event can never post twice.
    pub async fn post_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        company_id: Uuid,
        event_type: JournalEventType,
        event_id: Uuid,
        entry_date: NaiveDate,
        description: &str,
        posted_by: Uuid,
        lines: &[LineSpec],
    ) -> AppResult<Uuid> {
        if let Err(defect) = validate_lines(lines) {
            return Err(AppError::UnbalancedPosting(format!(
                "{} entry for event {}: {}",
                event_type.as_str(),
                event_id,
                defect
            )));
        }

        let entry_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO journal_entries (company_id, event_type, event_id, description, entry_date, posted_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(company_id)
        .bind(event_type.as_str())
        .bind(event_id)
        .bind(description)
        .bind(entry_date)
        .bind(posted_by)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.constraint() == Some(EVENT_KEY_CONSTRAINT) {
                    return AppError::DuplicateEntry(format!(
                        "journal posting for {} event {}",
                        event_type.as_str(),
                        event_id
                    ));
                }
            }
            AppError::Database(e)
        })?;

        for line in lines {
            sqlx::query(
                r#"
                INSERT INTO journal_lines (entry_id, account_code, debit, credit)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(entry_id)
            .bind(line.account.code())
            .bind(line.debit)
            .bind(line.credit)
            .execute(&mut **tx)
            .await?;
        }

        tracing::info!(
            company_id = %company_id,
            entry_id = %entry_id,
            event_type = event_type.as_str(),
            event_id = %event_id,
            "journal entry posted"
        );

        Ok(entry_id)
    }

    /// Sale: receivable/cash vs revenue plus cost of goods vs inventory
    pub async fn post_order_entry(
        tx: &mut Transaction<'_, Postgres>,
        company_id: Uuid,
        order_id: Uuid,
        total: Decimal,
        paid: Decimal,
        cost_of_goods: Decimal,
        date: NaiveDate,
        actor_id: Uuid,
    ) -> AppResult<Uuid> {
        let lines = shared::order_entry_lines(total, paid, cost_of_goods);
        Self::post_in_tx(
            tx,
            company_id,
            JournalEventType::Order,
            order_id,
            date,
            "Sales order",
            actor_id,
            &lines,
        )
        .await
    }

    /// Collection against customer debt
    pub async fn post_collection_entry(
        tx: &mut Transaction<'_, Postgres>,
        company_id: Uuid,
        collection_id: Uuid,
        amount: Decimal,
        method: CollectionMethod,
        date: NaiveDate,
        actor_id: Uuid,
    ) -> AppResult<Uuid> {
        let lines = shared::collection_entry_lines(amount, method);
        Self::post_in_tx(
            tx,
            company_id,
            JournalEventType::Collection,
            collection_id,
            date,
            "Customer collection",
            actor_id,
            &lines,
        )
        .await
    }

    /// Confirmed bank deposit
    pub async fn post_deposit_entry(
        tx: &mut Transaction<'_, Postgres>,
        company_id: Uuid,
        deposit_id: Uuid,
        amount: Decimal,
        date: NaiveDate,
        actor_id: Uuid,
    ) -> AppResult<Uuid> {
        let lines = shared::deposit_entry_lines(amount);
        Self::post_in_tx(
            tx,
            company_id,
            JournalEventType::Deposit,
            deposit_id,
            date,
            "Bank deposit",
            actor_id,
            &lines,
        )
        .await
    }

    /// Operating expense
    pub async fn post_expense_entry(
        tx: &mut Transaction<'_, Postgres>,
        company_id: Uuid,
        expense_id: Uuid,
        amount: Decimal,
        date: NaiveDate,
        actor_id: Uuid,
    ) -> AppResult<Uuid> {
        let lines = shared::expense_entry_lines(amount);
        Self::post_in_tx(
            tx,
            company_id,
            JournalEventType::Expense,
            expense_id,
            date,
            "Operating expense",
            actor_id,
            &lines,
        )
        .await
    }

    /// Completed production run
    pub async fn post_production_entry(
        tx: &mut Transaction<'_, Postgres>,
        company_id: Uuid,
        run_id: Uuid,
        material_cost: Decimal,
        extra_cost: Decimal,
        date: NaiveDate,
        actor_id: Uuid,
    ) -> AppResult<Uuid> {
        let lines = shared::production_entry_lines(material_cost, extra_cost);
        Self::post_in_tx(
            tx,
            company_id,
            JournalEventType::Production,
            run_id,
            date,
            "Production run completed",
            actor_id,
            &lines,
        )
        .await
    }

    /// Customer return (credit and/or restock)
    #[allow(clippy::too_many_arguments)]
    pub async fn post_return_entry(
        tx: &mut Transaction<'_, Postgres>,
        company_id: Uuid,
        return_id: Uuid,
        amount: Decimal,
        restock_cost: Decimal,
        credited: bool,
        date: NaiveDate,
        actor_id: Uuid,
    ) -> AppResult<Uuid> {
        let lines = shared::return_entry_lines(amount, restock_cost, credited);
        Self::post_in_tx(
            tx,
            company_id,
            JournalEventType::Return,
            return_id,
            date,
            "Customer return",
            actor_id,
            &lines,
        )
        .await
    }

    /// Salary payment
    pub async fn post_salary_entry(
        tx: &mut Transaction<'_, Postgres>,
        company_id: Uuid,
        payment_id: Uuid,
        amount: Decimal,
        date: NaiveDate,
        actor_id: Uuid,
    ) -> AppResult<Uuid> {
        let lines = shared::salary_entry_lines(amount);
        Self::post_in_tx(
            tx,
            company_id,
            JournalEventType::Salary,
            payment_id,
            date,
            "Salary payment",
            actor_id,
            &lines,
        )
        .await
    }

    /// List posted entries with their lines for a date range
    pub async fn list_entries(
        &self,
        company_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<PostedEntry>> {
        let entries = sqlx::query_as::<_, EntryRow>(
            r#"
            SELECT id, event_type, event_id, description, entry_date, posted_at
            FROM journal_entries
            WHERE company_id = $1 AND entry_date BETWEEN $2 AND $3
            ORDER BY entry_date, posted_at
            "#,
        )
        .bind(company_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.db)
        .await?;

        if entries.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = entries.iter().map(|e| e.id).collect();
        let lines = sqlx::query_as::<_, LineRow>(
            r#"
            SELECT entry_id, account_code, debit, credit
            FROM journal_lines
            WHERE entry_id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.db)
        .await?;

        let mut result = Vec::with_capacity(entries.len());
        for entry in entries {
            let event_type = entry
                .event_type
                .parse::<JournalEventType>()
                .map_err(AppError::Configuration)?;
            let entry_lines: Vec<PostedLine> = lines
                .iter()
                .filter(|l| l.entry_id == entry.id)
                .map(|l| PostedLine {
                    account_code: l.account_code.clone(),
                    debit: l.debit,
                    credit: l.credit,
                })
                .collect();
            result.push(PostedEntry {
                id: entry.id,
                event_type,
                event_id: entry.event_id,
                description: entry.description,
                entry_date: entry.entry_date,
                posted_at: entry.posted_at,
                lines: entry_lines,
            });
        }

        Ok(result)
    }

    /// Audit read: every persisted entry must still balance
    pub async fn find_unbalanced_entries(&self, company_id: Uuid) -> AppResult<Vec<Uuid>> {
        let rows = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT e.id
            FROM journal_entries e
            JOIN journal_lines l ON l.entry_id = e.id
            WHERE e.company_id = $1
            GROUP BY e.id
            HAVING SUM(l.debit) <> SUM(l.credit)
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }
}
