//! Margin and GST accounting for a single sale

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{percent_of, round_currency};

/// Margin and GST figures of one sale
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MarginBreakdown {
    pub margin: Decimal,
    pub gst_payable: Decimal,
    pub gst_input: Decimal,
    pub gst_output: Decimal,
}

/// Compute margin and GST payable.
///
/// GST input is charged on the purchase price, GST output on the sale price;
/// the difference is payable. All outputs are rounded half-even to paise.
pub fn calculate_margin(
    sale_price: Decimal,
    purchase_price: Decimal,
    logistics_price: Decimal,
    gst_rate_percent: Decimal,
) -> MarginBreakdown {
    let gst_input = round_currency(percent_of(purchase_price, gst_rate_percent));
    let gst_output = round_currency(percent_of(sale_price, gst_rate_percent));

    MarginBreakdown {
        margin: round_currency(sale_price - purchase_price - logistics_price),
        gst_payable: gst_output - gst_input,
        gst_input,
        gst_output,
    }
}
