//! HTTP handlers for orders, returns and customer balances

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::TenantCtx;
use crate::services::balance::{BalanceAudit, BalanceService};
use crate::services::order::{CreateOrderInput, OrderDetail, OrderRecord, OrderService};
use crate::services::returns::{ProcessReturnInput, ReturnService, SaleReturnRecord};
use crate::AppState;

/// Create an order
pub async fn create_order(
    State(state): State<AppState>,
    tenant: TenantCtx,
    Json(input): Json<CreateOrderInput>,
) -> AppResult<Json<OrderDetail>> {
    let service = OrderService::new(state.db);
    let order = service
        .create_order(tenant.0.company_id, tenant.0.actor_id, input)
        .await?;
    Ok(Json(order))
}

/// Get an order with its lines
pub async fn get_order(
    State(state): State<AppState>,
    tenant: TenantCtx,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<OrderDetail>> {
    let service = OrderService::new(state.db);
    let order = service.get_order(tenant.0.company_id, order_id).await?;
    Ok(Json(order))
}

/// Orders for a customer
pub async fn list_customer_orders(
    State(state): State<AppState>,
    tenant: TenantCtx,
    Path(customer_id): Path<Uuid>,
) -> AppResult<Json<Vec<OrderRecord>>> {
    let service = OrderService::new(state.db);
    let orders = service
        .list_for_customer(tenant.0.company_id, customer_id)
        .await?;
    Ok(Json(orders))
}

/// Process a sale return
pub async fn process_return(
    State(state): State<AppState>,
    tenant: TenantCtx,
    Json(input): Json<ProcessReturnInput>,
) -> AppResult<Json<SaleReturnRecord>> {
    let service = ReturnService::new(state.db);
    let record = service
        .process_return(tenant.0.company_id, tenant.0.actor_id, input)
        .await?;
    Ok(Json(record))
}

/// Audit a customer's stored balance against source documents
pub async fn audit_balance(
    State(state): State<AppState>,
    tenant: TenantCtx,
    Path(customer_id): Path<Uuid>,
) -> AppResult<Json<BalanceAudit>> {
    let service = BalanceService::new(state.db);
    let audit = service.audit(tenant.0.company_id, customer_id).await?;
    Ok(Json(audit))
}
