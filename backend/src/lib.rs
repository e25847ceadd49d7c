//! Material Cart backend
//!
//! Order lifecycle, purchase-batch stock ledger, accounting and supplier
//! allocation for a regional building-materials marketplace, served over HTTP.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod session;
pub mod store;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use session::{Role, Session};
pub use store::Stores;

use services::{
    AuditService, CatalogService, InventoryService, LedgerService, OrderService, SupplyService,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub stores: Stores,
}

impl AppState {
    pub fn new(config: Config, stores: Stores) -> Self {
        Self {
            config: Arc::new(config),
            stores,
        }
    }

    pub fn audit_service(&self) -> AuditService {
        AuditService::new(self.stores.audit.clone(), self.config.audit.recent_limit)
    }

    pub fn inventory_service(&self) -> InventoryService {
        InventoryService::new(
            self.stores.clone(),
            self.audit_service(),
            self.config.inventory.low_stock_threshold,
        )
    }

    pub fn order_service(&self) -> OrderService {
        OrderService::new(
            self.stores.clone(),
            self.inventory_service(),
            self.audit_service(),
            self.config.pricing.clone(),
            self.config.orders.clone(),
        )
    }

    pub fn ledger_service(&self) -> LedgerService {
        LedgerService::new(self.stores.clone(), self.audit_service())
    }

    pub fn catalog_service(&self) -> CatalogService {
        CatalogService::new(self.stores.clone(), self.audit_service())
    }

    pub fn supply_service(&self) -> SupplyService {
        SupplyService::new(
            self.stores.clone(),
            self.config.pricing.clone(),
            self.config.logistics.clone(),
        )
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Material Cart API v1"
}
