//! HTTP handlers for stock and valuation endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::TenantCtx;
use crate::services::inventory::{
    CostLotRecord, InventoryService, ReceiveStockInput, StockMovementRecord,
};
use crate::services::valuation::{CostQuote, ValuationService};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct QuoteQuery {
    pub warehouse_id: Uuid,
    pub quantity: Decimal,
}

/// Receive purchased stock into a warehouse
pub async fn receive_stock(
    State(state): State<AppState>,
    tenant: TenantCtx,
    Json(input): Json<ReceiveStockInput>,
) -> AppResult<Json<CostLotRecord>> {
    let service = InventoryService::new(state.db);
    let lot = service.receive_stock(tenant.0.company_id, input).await?;
    Ok(Json(lot))
}

/// Quantity on hand for an item in a warehouse
pub async fn get_stock(
    State(state): State<AppState>,
    tenant: TenantCtx,
    Path((item_id, warehouse_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<Decimal>> {
    let service = InventoryService::new(state.db);
    let quantity = service
        .quantity_on_hand(tenant.0.company_id, item_id, warehouse_id)
        .await?;
    Ok(Json(quantity))
}

/// Movement history for an item
pub async fn list_movements(
    State(state): State<AppState>,
    tenant: TenantCtx,
    Path(item_id): Path<Uuid>,
) -> AppResult<Json<Vec<StockMovementRecord>>> {
    let service = InventoryService::new(state.db);
    let movements = service.list_movements(tenant.0.company_id, item_id).await?;
    Ok(Json(movements))
}

/// Cost quote for consuming a quantity of an item
pub async fn quote_cost(
    State(state): State<AppState>,
    tenant: TenantCtx,
    Path(item_id): Path<Uuid>,
    Query(query): Query<QuoteQuery>,
) -> AppResult<Json<CostQuote>> {
    let service = ValuationService::new(state.db);
    let quote = service
        .quote(
            tenant.0.company_id,
            item_id,
            query.warehouse_id,
            query.quantity,
        )
        .await?;
    Ok(Json(quote))
}
