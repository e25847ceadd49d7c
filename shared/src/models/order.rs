//! Order manifest, totals and the status machine

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{City, EnquiryItem, ProjectType};
use crate::types::{percent_of, round_currency};
use crate::validation::non_blank;

/// Number of random digits after the order id prefix
pub const ORDER_ID_DIGITS: u32 = 6;

/// Status of an order in the fulfilment pipeline
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Pending,
    Called,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Called,
        OrderStatus::Confirmed,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Called => "Called",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
    }

    /// Position along the forward pipeline; `None` for Cancelled
    fn rank(&self) -> Option<u8> {
        match self {
            OrderStatus::Pending => Some(0),
            OrderStatus::Called => Some(1),
            OrderStatus::Confirmed => Some(2),
            OrderStatus::Shipped => Some(3),
            OrderStatus::Delivered => Some(4),
            OrderStatus::Cancelled => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Whether stock has been committed to an order in this status
    pub fn commits_stock(&self) -> bool {
        self.rank().is_some_and(|rank| rank >= 2)
    }

    /// Transition table.
    ///
    /// Forward moves may skip intermediate states, Cancelled is reachable
    /// from any non-terminal state, terminal states are frozen. Re-setting
    /// the current status is always allowed so notes can be amended.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        if *self == next {
            return true;
        }
        if self.is_terminal() {
            return false;
        }
        match (self.rank(), next.rank()) {
            (_, None) => true,
            (Some(from), Some(to)) => to > from,
            (None, Some(_)) => false,
        }
    }

    /// States reachable from this one, excluding itself
    pub fn allowed_next(&self) -> Vec<OrderStatus> {
        Self::ALL
            .into_iter()
            .filter(|next| next != self && self.can_transition_to(*next))
            .collect()
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Contact and delivery details captured at submission
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CustomerDetails {
    #[validate(length(max = 120), custom = "non_blank")]
    pub customer_name: String,
    #[validate(length(max = 20), custom = "non_blank")]
    pub phone: String,
    pub city: City,
    #[validate(length(max = 500), custom = "non_blank")]
    pub location: String,
    pub project_type: ProjectType,
}

/// An order manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Human-readable manifest id, e.g. "MCART-482913"
    pub id: String,
    pub user_id: Option<Uuid>,
    pub customer_name: String,
    pub phone: String,
    pub city: City,
    pub location: String,
    pub project_type: ProjectType,
    pub items: Vec<EnquiryItem>,
    pub status: OrderStatus,
    pub admin_notes: Option<String>,
    pub total_amount: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

/// Monetary totals of a manifest
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub gst_amount: Decimal,
    pub total: Decimal,
}

/// Σ(quantity × reference rate), GST at `gst_rate_percent`, total = subtotal + GST
pub fn compute_order_totals(
    items: &[EnquiryItem],
    reference_unit_rate: Decimal,
    gst_rate_percent: Decimal,
) -> OrderTotals {
    let subtotal: Decimal = items
        .iter()
        .map(|item| Decimal::from(item.quantity) * reference_unit_rate)
        .sum();
    let subtotal = round_currency(subtotal);
    let gst_amount = round_currency(percent_of(subtotal, gst_rate_percent));

    OrderTotals {
        subtotal,
        gst_amount,
        total: subtotal + gst_amount,
    }
}

/// Format an order id from its prefix and numeric suffix
pub fn format_order_id(prefix: &str, suffix: u32) -> String {
    format!("{}-{:0width$}", prefix, suffix, width = ORDER_ID_DIGITS as usize)
}

/// Check that an id has the `PREFIX-NNNNNN` shape
pub fn is_order_id(candidate: &str, prefix: &str) -> bool {
    candidate
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('-'))
        .is_some_and(|digits| {
            digits.len() == ORDER_ID_DIGITS as usize && digits.chars().all(|c| c.is_ascii_digit())
        })
}
