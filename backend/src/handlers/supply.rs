//! HTTP handlers for compute-only supply tooling

use axum::{extract::State, Json};
use shared::{AllocationResult, MarginBreakdown};

use crate::error::AppResult;
use crate::services::supply::{AllocationInput, LogisticsQuote, LogisticsQuoteInput, MarginInput};
use crate::AppState;

/// Split a requirement across suppliers
pub async fn allocate_suppliers(
    State(state): State<AppState>,
    Json(input): Json<AllocationInput>,
) -> AppResult<Json<AllocationResult>> {
    let result = state.supply_service().allocate(input).await?;
    Ok(Json(result))
}

/// Pick a vehicle and price a delivery
pub async fn quote_logistics(
    State(state): State<AppState>,
    Json(input): Json<LogisticsQuoteInput>,
) -> AppResult<Json<LogisticsQuote>> {
    let quote = state.supply_service().quote_logistics(&input)?;
    Ok(Json(quote))
}

pub async fn calculate_margin(
    State(state): State<AppState>,
    Json(input): Json<MarginInput>,
) -> Json<MarginBreakdown> {
    Json(state.supply_service().margin(&input))
}
