//! HTTP handlers for purchase batches and the stock ledger

use axum::{extract::State, http::StatusCode, Json};
use shared::{BatchDepletion, PurchaseBatch};

use crate::error::AppResult;
use crate::services::inventory::{DepleteInput, ProductStockReport, StockInInput};
use crate::session::Session;
use crate::store::BatchWithVendor;
use crate::AppState;

/// Record a stock-in
pub async fn create_purchase_batch(
    State(state): State<AppState>,
    session: Session,
    Json(input): Json<StockInInput>,
) -> AppResult<(StatusCode, Json<PurchaseBatch>)> {
    let batch = state.inventory_service().record_batch(&session, input).await?;
    Ok((StatusCode::CREATED, Json(batch)))
}

/// Batches with vendor names, newest first
pub async fn list_purchase_batches(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<Vec<BatchWithVendor>>> {
    let batches = state.inventory_service().list_batches(&session).await?;
    Ok(Json(batches))
}

/// Per-product stock position
pub async fn get_inventory_ledger(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<Vec<ProductStockReport>>> {
    let report = state.inventory_service().ledger_report(&session).await?;
    Ok(Json(report))
}

/// Deplete one product FIFO
pub async fn deplete_stock(
    State(state): State<AppState>,
    session: Session,
    Json(input): Json<DepleteInput>,
) -> AppResult<Json<Vec<BatchDepletion>>> {
    let plan = state.inventory_service().deplete_stock(&session, input).await?;
    Ok(Json(plan))
}
