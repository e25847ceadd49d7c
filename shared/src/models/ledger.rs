//! Financial ledger entries

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of money movement a ledger entry records
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerEntryType {
    Purchase,
    Sale,
    Logistics,
    Gst,
}

impl LedgerEntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerEntryType::Purchase => "PURCHASE",
            LedgerEntryType::Sale => "SALE",
            LedgerEntryType::Logistics => "LOGISTICS",
            LedgerEntryType::Gst => "GST",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "PURCHASE" => Some(LedgerEntryType::Purchase),
            "SALE" => Some(LedgerEntryType::Sale),
            "LOGISTICS" => Some(LedgerEntryType::Logistics),
            "GST" => Some(LedgerEntryType::Gst),
            _ => None,
        }
    }

    /// Types an admin may record by hand; sales and purchases are derived.
    pub fn is_manual(&self) -> bool {
        matches!(self, LedgerEntryType::Logistics | LedgerEntryType::Gst)
    }
}

/// An append-only accounting record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub order_id: Option<String>,
    #[serde(rename = "type")]
    pub entry_type: LedgerEntryType,
    pub amount: Decimal,
    pub gst_amount: Decimal,
    pub margin: Decimal,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Ledger entry before the store assigns id and timestamp
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLedgerEntry {
    pub order_id: Option<String>,
    #[serde(rename = "type")]
    pub entry_type: LedgerEntryType,
    pub amount: Decimal,
    pub gst_amount: Decimal,
    pub margin: Decimal,
    pub notes: Option<String>,
}
