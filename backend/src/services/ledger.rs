//! Financial ledger service

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use shared::{round_currency, AuditAction, AuditResource, LedgerEntry, LedgerEntryType, NewLedgerEntry};

use crate::error::{AppError, AppResult};
use crate::services::AuditService;
use crate::session::Session;
use crate::store::Stores;

/// Input for a hand-recorded ledger entry
#[derive(Debug, Deserialize)]
pub struct ManualEntryInput {
    #[serde(rename = "type")]
    pub entry_type: LedgerEntryType,
    pub order_id: Option<String>,
    pub amount: Decimal,
    #[serde(default)]
    pub gst_amount: Decimal,
    pub notes: Option<String>,
}

#[derive(Clone)]
pub struct LedgerService {
    stores: Stores,
    audit: AuditService,
}

impl LedgerService {
    pub fn new(stores: Stores, audit: AuditService) -> Self {
        Self { stores, audit }
    }

    /// All entries, newest first (admin)
    pub async fn list(&self, session: &Session) -> AppResult<Vec<LedgerEntry>> {
        session.require_admin()?;
        Ok(self.stores.ledger.list_entries().await?)
    }

    /// Record a logistics or GST movement by hand (admin)
    pub async fn record_manual(
        &self,
        session: &Session,
        input: ManualEntryInput,
    ) -> AppResult<LedgerEntry> {
        session.require_admin()?;

        if !input.entry_type.is_manual() {
            return Err(AppError::validation(
                "type",
                "Only LOGISTICS and GST entries can be recorded by hand",
            ));
        }
        if input.amount < Decimal::ZERO {
            return Err(AppError::validation("amount", "Amount cannot be negative"));
        }
        if input.gst_amount < Decimal::ZERO {
            return Err(AppError::validation("gst_amount", "GST amount cannot be negative"));
        }
        if let Some(order_id) = &input.order_id {
            if self.stores.orders.get_order(order_id).await?.is_none() {
                return Err(AppError::NotFound(format!("Order {}", order_id)));
            }
        }

        let entry = self
            .stores
            .ledger
            .append_entry(NewLedgerEntry {
                order_id: input.order_id,
                entry_type: input.entry_type,
                amount: round_currency(input.amount),
                gst_amount: round_currency(input.gst_amount),
                margin: Decimal::ZERO,
                notes: input.notes,
            })
            .await?;

        tracing::info!(entry_id = %entry.id, "Recorded {} ledger entry", entry.entry_type.as_str());

        self.audit
            .record(
                session,
                AuditAction::LedgerEntry,
                AuditResource::Ledger,
                json!({ "id": entry.id, "type": entry.entry_type, "amount": entry.amount }),
            )
            .await;

        Ok(entry)
    }
}
