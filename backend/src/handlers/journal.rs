//! HTTP handlers for journal reads

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::TenantCtx;
use crate::services::journal::{JournalService, PostedEntry};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct EntryRangeQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// Journal entries posted in a date range
pub async fn list_entries(
    State(state): State<AppState>,
    tenant: TenantCtx,
    Query(range): Query<EntryRangeQuery>,
) -> AppResult<Json<Vec<PostedEntry>>> {
    let service = JournalService::new(state.db);
    let entries = service
        .list_entries(tenant.0.company_id, range.from, range.to)
        .await?;
    Ok(Json(entries))
}

/// Audit read: entries whose lines do not balance
pub async fn list_unbalanced_entries(
    State(state): State<AppState>,
    tenant: TenantCtx,
) -> AppResult<Json<Vec<Uuid>>> {
    let service = JournalService::new(state.db);
    let entries = service.find_unbalanced_entries(tenant.0.company_id).await?;
    Ok(Json(entries))
}
