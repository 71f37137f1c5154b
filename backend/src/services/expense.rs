//! Operating expenses and salary payments
//!
//! Each record posts its journal entry in the same transaction as the insert.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::journal::JournalService;
use shared::validate_positive_amount;

#[derive(Clone)]
pub struct ExpenseService {
    db: PgPool,
}

#[derive(Debug, Deserialize)]
pub struct RecordExpenseInput {
    pub label: String,
    pub amount: Decimal,
    pub expense_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ExpenseRecord {
    pub id: Uuid,
    pub company_id: Uuid,
    pub label: String,
    pub amount: Decimal,
    pub expense_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct PaySalaryInput {
    pub employee_id: Uuid,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SalaryPaymentRecord {
    pub id: Uuid,
    pub company_id: Uuid,
    pub employee_id: Uuid,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl ExpenseService {
    /// Create a new ExpenseService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn record_expense(
        &self,
        company_id: Uuid,
        actor_id: Uuid,
        input: RecordExpenseInput,
    ) -> AppResult<ExpenseRecord> {
        validate_positive_amount(input.amount).map_err(|msg| AppError::Validation {
            field: "amount".to_string(),
            message: msg.to_string(),
        })?;
        if input.label.trim().is_empty() {
            return Err(AppError::Validation {
                field: "label".to_string(),
                message: "Label must not be empty".to_string(),
            });
        }

        let mut tx = self.db.begin().await?;

        let expense = sqlx::query_as::<_, ExpenseRecord>(
            r#"
            INSERT INTO expenses (company_id, label, amount, expense_date)
            VALUES ($1, $2, $3, $4)
            RETURNING id, company_id, label, amount, expense_date, created_at
            "#,
        )
        .bind(company_id)
        .bind(input.label.trim())
        .bind(input.amount)
        .bind(input.expense_date)
        .fetch_one(&mut *tx)
        .await?;

        JournalService::post_expense_entry(
            &mut tx,
            company_id,
            expense.id,
            expense.amount,
            expense.expense_date,
            actor_id,
        )
        .await?;

        tx.commit().await?;
        Ok(expense)
    }

    pub async fn pay_salary(
        &self,
        company_id: Uuid,
        actor_id: Uuid,
        input: PaySalaryInput,
    ) -> AppResult<SalaryPaymentRecord> {
        validate_positive_amount(input.amount).map_err(|msg| AppError::Validation {
            field: "amount".to_string(),
            message: msg.to_string(),
        })?;

        let mut tx = self.db.begin().await?;

        let payment = sqlx::query_as::<_, SalaryPaymentRecord>(
            r#"
            INSERT INTO salary_payments (company_id, employee_id, amount, payment_date)
            VALUES ($1, $2, $3, $4)
            RETURNING id, company_id, employee_id, amount, payment_date, created_at
            "#,
        )
        .bind(company_id)
        .bind(input.employee_id)
        .bind(input.amount)
        .bind(input.payment_date)
        .fetch_one(&mut *tx)
        .await?;

        JournalService::post_salary_entry(
            &mut tx,
            company_id,
            payment.id,
            payment.amount,
            payment.payment_date,
            actor_id,
        )
        .await?;

        tx.commit().await?;
        Ok(payment)
    }
}
