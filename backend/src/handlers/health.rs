//! Liveness probe

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthStatus {
    pub service: &'static str,
    pub version: &'static str,
    pub database: &'static str,
}

/// Report service liveness and database reachability.
///
/// Always answers 200; a broken pool shows up in the `database` field so a
/// probe can tell a dead connection from a dead process.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthStatus> {
    let database = match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => "reachable",
        Err(_) => "unreachable",
    };

    Json(HealthStatus {
        service: "distribution-backoffice",
        version: env!("CARGO_PKG_VERSION"),
        database,
    })
}
