//! Validation utilities for Material Cart

use rust_decimal::Decimal;
use validator::ValidationError;

use crate::error::{CoreError, CoreResult};
use crate::models::EnquiryItem;
use crate::types::PriceRange;

/// Highest GST slab applied to building materials
pub const MAX_GST_PERCENTAGE: u32 = 28;

/// Largest quantity a single manifest line or purchase batch may carry
pub const MAX_LINE_QUANTITY: i64 = 1_000_000;

// ============================================================================
// Field Validators
// ============================================================================

/// Reject empty or whitespace-only strings (used with `#[validate(custom)]`)
pub fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Validate a line-item or batch quantity
pub fn validate_quantity(quantity: i64) -> CoreResult<()> {
    if quantity < 1 {
        return Err(CoreError::InvalidQuantity(quantity));
    }
    if quantity > MAX_LINE_QUANTITY {
        return Err(CoreError::QuantityTooLarge(quantity));
    }
    Ok(())
}

/// Validate every line of a manifest
pub fn validate_items(items: &[EnquiryItem]) -> CoreResult<()> {
    for item in items {
        validate_quantity(item.quantity as i64)?;
        if item.product_name.trim().is_empty() {
            return Err(CoreError::MissingField("product_name"));
        }
        if item.uom.trim().is_empty() {
            return Err(CoreError::MissingField("uom"));
        }
    }
    Ok(())
}

// ============================================================================
// Catalog Validations
// ============================================================================

/// Validate a GST percentage (0 to 28)
pub fn validate_gst_percentage(rate: Decimal) -> Result<(), &'static str> {
    if rate < Decimal::ZERO || rate > Decimal::from(MAX_GST_PERCENTAGE) {
        return Err("GST percentage must be between 0 and 28");
    }
    Ok(())
}

/// Validate a string-encoded price range
pub fn validate_price_range(raw: &str) -> Result<(), &'static str> {
    PriceRange::parse(raw)
        .map(|_| ())
        .ok_or("Price range must look like \"₹350 - ₹420\"")
}

/// Validate a supplier performance record
pub fn validate_performance(
    delivery_success_rate: Decimal,
    quality_rating: Decimal,
) -> Result<(), &'static str> {
    if delivery_success_rate < Decimal::ZERO || delivery_success_rate > Decimal::ONE {
        return Err("Delivery success rate must be between 0 and 1");
    }
    if quality_rating < Decimal::ZERO || quality_rating > Decimal::from(5) {
        return Err("Quality rating must be between 0 and 5");
    }
    Ok(())
}
