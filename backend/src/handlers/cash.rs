//! HTTP handlers for collections, deposits and driver cash positions

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::TenantCtx;
use crate::services::cash::{
    CashPosition, CashService, CollectionInput, CollectionRecord, DepositInput, DepositRecord,
};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CashWindowQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Derived cash position for a driver
pub async fn get_cash_position(
    State(state): State<AppState>,
    tenant: TenantCtx,
    Path(driver_id): Path<Uuid>,
    Query(window): Query<CashWindowQuery>,
) -> AppResult<Json<CashPosition>> {
    let service = CashService::new(state.db);
    let position = service
        .cash_on_hand(tenant.0.company_id, driver_id, window.from, window.to)
        .await?;
    Ok(Json(position))
}

/// Record a customer payment
pub async fn record_collection(
    State(state): State<AppState>,
    tenant: TenantCtx,
    Json(input): Json<CollectionInput>,
) -> AppResult<Json<CollectionRecord>> {
    let service = CashService::new(state.db);
    let collection = service
        .record_collection(tenant.0.company_id, tenant.0.actor_id, input)
        .await?;
    Ok(Json(collection))
}

/// Create a pending deposit
pub async fn create_deposit(
    State(state): State<AppState>,
    tenant: TenantCtx,
    Json(input): Json<DepositInput>,
) -> AppResult<Json<DepositRecord>> {
    let service = CashService::new(state.db);
    let deposit = service.create_deposit(tenant.0.company_id, input).await?;
    Ok(Json(deposit))
}

/// Confirm a pending deposit
pub async fn confirm_deposit(
    State(state): State<AppState>,
    tenant: TenantCtx,
    Path(deposit_id): Path<Uuid>,
) -> AppResult<Json<DepositRecord>> {
    let service = CashService::new(state.db);
    let deposit = service
        .confirm_deposit(tenant.0.company_id, tenant.0.actor_id, deposit_id)
        .await?;
    Ok(Json(deposit))
}

/// Reject a pending deposit
pub async fn reject_deposit(
    State(state): State<AppState>,
    tenant: TenantCtx,
    Path(deposit_id): Path<Uuid>,
) -> AppResult<Json<DepositRecord>> {
    let service = CashService::new(state.db);
    let deposit = service
        .reject_deposit(tenant.0.company_id, deposit_id)
        .await?;
    Ok(Json(deposit))
}
