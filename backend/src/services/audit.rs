//! Audit trail service
//!
//! Audit writes follow a mutation that already succeeded, so a failing write
//! is logged and swallowed rather than undoing the mutation.

use std::sync::Arc;

use serde_json::Value;
use shared::{AuditAction, AuditLog, AuditResource, NewAuditLog};

use crate::error::AppResult;
use crate::session::Session;
use crate::store::AuditStore;

#[derive(Clone)]
pub struct AuditService {
    store: Arc<dyn AuditStore>,
    recent_limit: i64,
}

impl AuditService {
    pub fn new(store: Arc<dyn AuditStore>, recent_limit: i64) -> Self {
        Self {
            store,
            recent_limit,
        }
    }

    /// Append one entry; returns `None` when the write failed
    pub async fn record(
        &self,
        session: &Session,
        action: AuditAction,
        resource: AuditResource,
        metadata: Value,
    ) -> Option<AuditLog> {
        let entry = NewAuditLog::new(session.actor, action, resource, metadata);
        match self.store.append(entry).await {
            Ok(log) => Some(log),
            Err(e) => {
                tracing::warn!(
                    action = action.as_str(),
                    resource = resource.as_str(),
                    "Audit write failed: {}",
                    e
                );
                None
            }
        }
    }

    /// Most recent entries, newest first (admin)
    pub async fn recent(&self, session: &Session) -> AppResult<Vec<AuditLog>> {
        session.require_admin()?;
        Ok(self.store.recent(self.recent_limit).await?)
    }
}
