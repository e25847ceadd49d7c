//! WebAssembly module for the Material Cart storefront
//!
//! Provides client-side computation for:
//! - The enquiry cart (add, merge, edit, remove)
//! - Order total previews
//! - Margin and GST previews
//! - Logistics partner sizing and supplier scoring

use std::str::FromStr;

use rust_decimal::Decimal;
use uuid::Uuid;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

fn js_error(context: &str, err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&format!("{}: {}", context, err))
}

fn parse_decimal(field: &str, raw: &str) -> Result<Decimal, JsValue> {
    Decimal::from_str(raw.trim()).map_err(|e| js_error(field, e))
}

fn parse_product_id(raw: &str) -> Result<Uuid, JsValue> {
    Uuid::parse_str(raw.trim()).map_err(|e| js_error("product_id", e))
}

/// Browser-side enquiry cart; lines for the same product merge
#[wasm_bindgen]
#[derive(Default)]
pub struct WasmCart {
    inner: Cart,
}

#[wasm_bindgen]
impl WasmCart {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmCart {
        WasmCart::default()
    }

    /// Restore a cart saved with `items_json`
    pub fn from_json(items_json: &str) -> Result<WasmCart, JsValue> {
        let items: Vec<EnquiryItem> =
            serde_json::from_str(items_json).map_err(|e| js_error("Invalid cart JSON", e))?;
        let inner = Cart::from_items(items).map_err(|e| js_error("Invalid cart", e))?;
        Ok(WasmCart { inner })
    }

    pub fn add(
        &mut self,
        product_id: &str,
        product_name: &str,
        quantity: i32,
        uom: &str,
    ) -> Result<(), JsValue> {
        let item = EnquiryItem::new(parse_product_id(product_id)?, product_name, quantity, uom);
        self.inner.add(item).map_err(|e| js_error("Cannot add", e))
    }

    /// Zero or less removes the line
    pub fn set_quantity(
        &mut self,
        product_id: &str,
        quantity: i32,
        product_name: Option<String>,
        uom: Option<String>,
    ) -> Result<(), JsValue> {
        self.inner.set_quantity(
            parse_product_id(product_id)?,
            quantity,
            product_name.as_deref(),
            uom.as_deref(),
        );
        Ok(())
    }

    pub fn remove(&mut self, product_id: &str) -> Result<(), JsValue> {
        self.inner.remove(parse_product_id(product_id)?);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    pub fn items_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.inner.items()).map_err(|e| js_error("Serialize", e))
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Total units across all lines
    pub fn total_quantity(&self) -> f64 {
        self.inner.total_quantity() as f64
    }
}

/// Preview subtotal, GST and total of a list of cart lines as JSON
#[wasm_bindgen]
pub fn preview_order_totals(
    items_json: &str,
    reference_unit_rate: &str,
    gst_rate_percent: &str,
) -> Result<String, JsValue> {
    let items: Vec<EnquiryItem> =
        serde_json::from_str(items_json).map_err(|e| js_error("Invalid items JSON", e))?;
    let totals = compute_order_totals(
        &items,
        parse_decimal("reference_unit_rate", reference_unit_rate)?,
        parse_decimal("gst_rate_percent", gst_rate_percent)?,
    );
    serde_json::to_string(&totals).map_err(|e| js_error("Serialize", e))
}

/// Margin and GST breakdown of a sale as JSON
#[wasm_bindgen]
pub fn calculate_margin(
    sale_price: &str,
    purchase_price: &str,
    logistics_price: &str,
    gst_rate_percent: &str,
) -> Result<String, JsValue> {
    let breakdown = shared::calculate_margin(
        parse_decimal("sale_price", sale_price)?,
        parse_decimal("purchase_price", purchase_price)?,
        parse_decimal("logistics_price", logistics_price)?,
        parse_decimal("gst_rate_percent", gst_rate_percent)?,
    );
    serde_json::to_string(&breakdown).map_err(|e| js_error("Serialize", e))
}

/// Vehicle class for a load: "BIKE", "TEMPO" or "TRUCK"
#[wasm_bindgen]
pub fn recommend_partner_type(total_weight_kg: f64) -> String {
    let weight = Decimal::try_from(total_weight_kg).unwrap_or(Decimal::ZERO);
    recommended_partner_type(weight).to_string()
}

/// Delivery cost from a partner's rate card, as a decimal string
#[wasm_bindgen]
pub fn logistics_cost(
    base_rate: &str,
    per_km_rate: &str,
    distance_km: &str,
) -> Result<String, JsValue> {
    let partner = LogisticsPartner {
        partner_type: PartnerType::Tempo,
        base_rate: parse_decimal("base_rate", base_rate)?,
        per_km_rate: parse_decimal("per_km_rate", per_km_rate)?,
    };
    let cost = shared::logistics_cost(&partner, parse_decimal("distance_km", distance_km)?);
    Ok(cost.to_string())
}

/// Supplier performance score; invalid inputs score as a fresh supplier
#[wasm_bindgen]
pub fn supplier_score(delivery_success_rate: f64, quality_rating: f64, speed_rank: f64) -> f64 {
    let fallback = SupplierPerformance::optimistic();
    let performance = SupplierPerformance {
        delivery_success_rate: Decimal::try_from(delivery_success_rate)
            .unwrap_or(fallback.delivery_success_rate),
        quality_rating: Decimal::try_from(quality_rating).unwrap_or(fallback.quality_rating),
        speed_rank: Decimal::try_from(speed_rank).unwrap_or(fallback.speed_rank),
    };
    shared::supplier_score(&performance)
        .to_string()
        .parse()
        .unwrap_or(0.0)
}
