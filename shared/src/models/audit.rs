//! Append-only audit trail of administrative mutations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Verbs recorded in the audit trail
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Upsert,
    Delete,
    StatusUpdate,
    ItemsUpdate,
    StockIn,
    StockDepletion,
    LedgerEntry,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Upsert => "UPSERT",
            AuditAction::Delete => "DELETE",
            AuditAction::StatusUpdate => "STATUS_UPDATE",
            AuditAction::ItemsUpdate => "ITEMS_UPDATE",
            AuditAction::StockIn => "STOCK_IN",
            AuditAction::StockDepletion => "STOCK_DEPLETION",
            AuditAction::LedgerEntry => "LEDGER_ENTRY",
        }
    }
}

/// Nouns recorded in the audit trail
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditResource {
    Order,
    Product,
    Vendor,
    PurchaseBatch,
    Ledger,
}

impl AuditResource {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditResource::Order => "ORDER",
            AuditResource::Product => "PRODUCT",
            AuditResource::Vendor => "VENDOR",
            AuditResource::PurchaseBatch => "PURCHASE_BATCH",
            AuditResource::Ledger => "LEDGER",
        }
    }
}

/// A stored audit record. `action` and `resource` are free text so entries
/// written by older tooling still load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLog {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub action: String,
    pub resource: String,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Audit record before the store assigns id and timestamp
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAuditLog {
    pub user_id: Option<Uuid>,
    pub action: String,
    pub resource: String,
    pub metadata: serde_json::Value,
}

impl NewAuditLog {
    pub fn new(
        user_id: Option<Uuid>,
        action: AuditAction,
        resource: AuditResource,
        metadata: serde_json::Value,
    ) -> Self {
        Self {
            user_id,
            action: action.as_str().to_string(),
            resource: resource.as_str().to_string(),
            metadata,
        }
    }
}
