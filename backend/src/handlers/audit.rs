//! HTTP handlers for the audit trail

use axum::{extract::State, Json};
use shared::AuditLog;

use crate::error::AppResult;
use crate::session::Session;
use crate::AppState;

/// Most recent audit entries
pub async fn list_audit_logs(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<Vec<AuditLog>>> {
    let logs = state.audit_service().recent(&session).await?;
    Ok(Json(logs))
}
