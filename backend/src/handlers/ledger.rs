//! HTTP handlers for the financial ledger

use axum::{extract::State, http::StatusCode, Json};
use shared::LedgerEntry;

use crate::error::AppResult;
use crate::services::ledger::ManualEntryInput;
use crate::session::Session;
use crate::AppState;

pub async fn list_ledger(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<Vec<LedgerEntry>>> {
    let entries = state.ledger_service().list(&session).await?;
    Ok(Json(entries))
}

/// Record a logistics or GST entry by hand
pub async fn create_ledger_entry(
    State(state): State<AppState>,
    session: Session,
    Json(input): Json<ManualEntryInput>,
) -> AppResult<(StatusCode, Json<LedgerEntry>)> {
    let entry = state.ledger_service().record_manual(&session, input).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}
