//! Route definitions for the distribution back office

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use crate::{handlers, middleware::tenant_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Tenant-scoped routes
        .nest("/stock", stock_routes())
        .nest("/orders", order_routes())
        .nest("/customers", customer_routes())
        .nest("/production", production_routes())
        .nest("/cash", cash_routes())
        .nest("/journal", journal_routes())
        .nest("/expenses", expense_routes())
}

/// Stock and valuation routes
fn stock_routes() -> Router<AppState> {
    Router::new()
        .route("/receive", post(handlers::receive_stock))
        .route("/:item_id/:warehouse_id", get(handlers::get_stock))
        .route("/:item_id/movements", get(handlers::list_movements))
        .route("/:item_id/quote", get(handlers::quote_cost))
        .route_layer(middleware::from_fn(tenant_middleware))
}

/// Order and return routes
fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::create_order))
        .route("/:order_id", get(handlers::get_order))
        .route("/returns", post(handlers::process_return))
        .route_layer(middleware::from_fn(tenant_middleware))
}

/// Customer balance routes
fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/:customer_id/orders", get(handlers::list_customer_orders))
        .route("/:customer_id/balance/audit", get(handlers::audit_balance))
        .route_layer(middleware::from_fn(tenant_middleware))
}

/// Production run routes
fn production_routes() -> Router<AppState> {
    Router::new()
        .route("/runs", post(handlers::create_run))
        .route(
            "/runs/:run_id",
            get(handlers::get_run).delete(handlers::delete_run),
        )
        .route("/runs/:run_id/materials", post(handlers::add_material))
        .route(
            "/runs/:run_id/materials/:material_id",
            delete(handlers::remove_material),
        )
        .route("/runs/:run_id/costs", post(handlers::add_cost))
        .route("/runs/:run_id/complete", post(handlers::complete_run))
        .route_layer(middleware::from_fn(tenant_middleware))
}

/// Collection, deposit and cash position routes
fn cash_routes() -> Router<AppState> {
    Router::new()
        .route("/collections", post(handlers::record_collection))
        .route("/deposits", post(handlers::create_deposit))
        .route(
            "/deposits/:deposit_id/confirm",
            post(handlers::confirm_deposit),
        )
        .route(
            "/deposits/:deposit_id/reject",
            post(handlers::reject_deposit),
        )
        .route("/drivers/:driver_id", get(handlers::get_cash_position))
        .route_layer(middleware::from_fn(tenant_middleware))
}

/// Journal read routes
fn journal_routes() -> Router<AppState> {
    Router::new()
        .route("/entries", get(handlers::list_entries))
        .route("/entries/unbalanced", get(handlers::list_unbalanced_entries))
        .route_layer(middleware::from_fn(tenant_middleware))
}

/// Expense and salary routes
fn expense_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::record_expense))
        .route("/salaries", post(handlers::pay_salary))
        .route_layer(middleware::from_fn(tenant_middleware))
}
