//! HTTP handlers for expenses and salary payments

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::middleware::TenantCtx;
use crate::services::expense::{
    ExpenseRecord, ExpenseService, PaySalaryInput, RecordExpenseInput, SalaryPaymentRecord,
};
use crate::AppState;

/// Record an operating expense
pub async fn record_expense(
    State(state): State<AppState>,
    tenant: TenantCtx,
    Json(input): Json<RecordExpenseInput>,
) -> AppResult<Json<ExpenseRecord>> {
    let service = ExpenseService::new(state.db);
    let expense = service
        .record_expense(tenant.0.company_id, tenant.0.actor_id, input)
        .await?;
    Ok(Json(expense))
}

/// Pay a salary
pub async fn pay_salary(
    State(state): State<AppState>,
    tenant: TenantCtx,
    Json(input): Json<PaySalaryInput>,
) -> AppResult<Json<SalaryPaymentRecord>> {
    let service = ExpenseService::new(state.db);
    let payment = service
        .pay_salary(tenant.0.company_id, tenant.0.actor_id, input)
        .await?;
    Ok(Json(payment))
}
