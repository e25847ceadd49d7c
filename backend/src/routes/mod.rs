//! Route definitions for the Material Cart API

use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes. Every route sees the caller's session; services decide
/// what needs a signed-in or admin caller.
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/orders", order_routes())
        .nest("/purchase-batches", batch_routes())
        .route("/inventory-ledger", get(handlers::get_inventory_ledger))
        .route("/inventory/deplete", post(handlers::deplete_stock))
        .route(
            "/ledger",
            get(handlers::list_ledger).post(handlers::create_ledger_entry),
        )
        .nest("/products", product_routes())
        .nest("/vendors", vendor_routes())
        .route("/categories", get(handlers::list_categories))
        .route("/supplier-allocation", post(handlers::allocate_suppliers))
        .route("/logistics/quote", post(handlers::quote_logistics))
        .route("/accounting/margin", post(handlers::calculate_margin))
        .route("/audit-logs", get(handlers::list_audit_logs))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Order routes
fn order_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_orders).post(handlers::create_order),
        )
        .route("/mine", get(handlers::my_orders))
        .route("/track", get(handlers::track_orders))
        .route("/:order_id", get(handlers::get_order))
        .route("/:order_id/status", patch(handlers::update_order_status))
        .route("/:order_id/items", patch(handlers::update_order_items))
}

/// Purchase batch routes
fn batch_routes() -> Router<AppState> {
    Router::new().route(
        "/",
        get(handlers::list_purchase_batches).post(handlers::create_purchase_batch),
    )
}

/// Product catalog routes
fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_products).post(handlers::save_product))
        .route(
            "/:product_id",
            get(handlers::get_product).delete(handlers::delete_product),
        )
}

/// Vendor routes
fn vendor_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_vendors).post(handlers::save_vendor))
        .route("/:vendor_id", delete(handlers::delete_vendor))
}
