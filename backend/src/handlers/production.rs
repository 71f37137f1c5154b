//! HTTP handlers for production runs

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::TenantCtx;
use crate::services::production::{
    AddCostInput, AddMaterialInput, CreateRunInput, ProductionCostRecord,
    ProductionMaterialRecord, ProductionRunRecord, ProductionService, RunDetail,
};
use crate::AppState;

/// Create a draft production run
pub async fn create_run(
    State(state): State<AppState>,
    tenant: TenantCtx,
    Json(input): Json<CreateRunInput>,
) -> AppResult<Json<ProductionRunRecord>> {
    let service = ProductionService::new(state.db);
    let run = service.create_run(tenant.0.company_id, input).await?;
    Ok(Json(run))
}

/// Get a run with its materials and extra costs
pub async fn get_run(
    State(state): State<AppState>,
    tenant: TenantCtx,
    Path(run_id): Path<Uuid>,
) -> AppResult<Json<RunDetail>> {
    let service = ProductionService::new(state.db);
    let run = service.get_run(tenant.0.company_id, run_id).await?;
    Ok(Json(run))
}

/// Add a planned material to a draft run
pub async fn add_material(
    State(state): State<AppState>,
    tenant: TenantCtx,
    Path(run_id): Path<Uuid>,
    Json(input): Json<AddMaterialInput>,
) -> AppResult<Json<ProductionMaterialRecord>> {
    let service = ProductionService::new(state.db);
    let material = service
        .add_material(tenant.0.company_id, run_id, input)
        .await?;
    Ok(Json(material))
}

/// Remove a planned material from a draft run
pub async fn remove_material(
    State(state): State<AppState>,
    tenant: TenantCtx,
    Path((run_id, material_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<()>> {
    let service = ProductionService::new(state.db);
    service
        .remove_material(tenant.0.company_id, run_id, material_id)
        .await?;
    Ok(Json(()))
}

/// Add an extra cost to a draft run
pub async fn add_cost(
    State(state): State<AppState>,
    tenant: TenantCtx,
    Path(run_id): Path<Uuid>,
    Json(input): Json<AddCostInput>,
) -> AppResult<Json<ProductionCostRecord>> {
    let service = ProductionService::new(state.db);
    let cost = service
        .add_cost(tenant.0.company_id, tenant.0.actor_id, run_id, input)
        .await?;
    Ok(Json(cost))
}

/// Complete a draft run
pub async fn complete_run(
    State(state): State<AppState>,
    tenant: TenantCtx,
    Path(run_id): Path<Uuid>,
) -> AppResult<Json<ProductionRunRecord>> {
    let service = ProductionService::new(state.db);
    let run = service
        .complete_run(tenant.0.company_id, tenant.0.actor_id, run_id)
        .await?;
    Ok(Json(run))
}

/// Delete a draft run
pub async fn delete_run(
    State(state): State<AppState>,
    tenant: TenantCtx,
    Path(run_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = ProductionService::new(state.db);
    service
        .delete_run(tenant.0.company_id, tenant.0.actor_id, run_id)
        .await?;
    Ok(Json(()))
}
