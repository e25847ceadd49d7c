//! Supplier allocation, logistics quotes and margin previews
//!
//! All operations here are compute-only; nothing is persisted.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{
    allocate_across_suppliers, calculate_margin, logistics_cost, recommended_partner_type,
    AllocationResult, MarginBreakdown, PartnerType, SupplyCandidate,
};
use uuid::Uuid;

use crate::config::{LogisticsConfig, PricingConfig};
use crate::error::{AppError, AppResult};
use crate::store::Stores;

/// One explicit supplier offer
#[derive(Debug, Deserialize)]
pub struct CandidateInput {
    pub vendor_id: Uuid,
    pub available: i64,
}

/// Allocation request: explicit candidates, or a product whose batch stock
/// defines them
#[derive(Debug, Deserialize)]
pub struct AllocationInput {
    pub required: i64,
    pub product_id: Option<Uuid>,
    #[serde(default)]
    pub candidates: Vec<CandidateInput>,
}

#[derive(Debug, Deserialize)]
pub struct LogisticsQuoteInput {
    pub weight_kg: Decimal,
    pub distance_km: Decimal,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct LogisticsQuote {
    pub partner_type: PartnerType,
    pub cost: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct MarginInput {
    pub sale_price: Decimal,
    pub purchase_price: Decimal,
    #[serde(default)]
    pub logistics_price: Decimal,
    /// Defaults to the configured GST rate
    pub gst_rate_percent: Option<Decimal>,
}

#[derive(Clone)]
pub struct SupplyService {
    stores: Stores,
    pricing: PricingConfig,
    logistics: LogisticsConfig,
}

impl SupplyService {
    pub fn new(stores: Stores, pricing: PricingConfig, logistics: LogisticsConfig) -> Self {
        Self {
            stores,
            pricing,
            logistics,
        }
    }

    /// Split a required quantity across suppliers, best performers first
    pub async fn allocate(&self, input: AllocationInput) -> AppResult<AllocationResult> {
        if input.required < 0 {
            return Err(AppError::validation("required", "Required quantity cannot be negative"));
        }
        if input.candidates.iter().any(|c| c.available < 0) {
            return Err(AppError::validation("available", "Available quantity cannot be negative"));
        }

        let candidates = match (input.product_id, input.candidates.is_empty()) {
            (Some(product_id), true) => self.candidates_from_stock(product_id).await?,
            (None, false) => self.candidates_from_input(&input.candidates).await?,
            (Some(_), false) => {
                return Err(AppError::validation(
                    "candidates",
                    "Give either a product_id or explicit candidates, not both",
                ))
            }
            (None, true) => {
                return Err(AppError::validation(
                    "candidates",
                    "Give a product_id or at least one candidate",
                ))
            }
        };

        let result = allocate_across_suppliers(input.required, &candidates);
        tracing::debug!(
            required = input.required,
            fulfilled = result.fulfilled,
            shortage = result.shortage,
            "Allocated across {} suppliers",
            result.allocations.len()
        );
        Ok(result)
    }

    /// Active vendors' remaining batch stock of one product, in vendor-name order
    async fn candidates_from_stock(&self, product_id: Uuid) -> AppResult<Vec<SupplyCandidate>> {
        if self.stores.catalog.get_product(product_id).await?.is_none() {
            return Err(AppError::NotFound("Product".to_string()));
        }

        let mut available: HashMap<Uuid, i64> = HashMap::new();
        for batch in self.stores.batches.batches_for_product(product_id).await? {
            *available.entry(batch.vendor_id).or_default() += batch.quantity_remaining as i64;
        }

        Ok(self
            .stores
            .catalog
            .list_vendors()
            .await?
            .into_iter()
            .filter(|vendor| vendor.is_active)
            .filter_map(|vendor| {
                available.get(&vendor.id).map(|qty| SupplyCandidate {
                    vendor_id: vendor.id,
                    performance: vendor.performance,
                    available: *qty,
                })
            })
            .collect())
    }

    /// Explicit offers, in input order; unknown vendors keep no performance record
    async fn candidates_from_input(
        &self,
        offers: &[CandidateInput],
    ) -> AppResult<Vec<SupplyCandidate>> {
        let mut candidates = Vec::with_capacity(offers.len());
        for offer in offers {
            let performance = self
                .stores
                .catalog
                .get_vendor(offer.vendor_id)
                .await?
                .and_then(|vendor| vendor.performance);
            candidates.push(SupplyCandidate {
                vendor_id: offer.vendor_id,
                performance,
                available: offer.available,
            });
        }
        Ok(candidates)
    }

    /// Size a delivery and price it with the configured rate card
    pub fn quote_logistics(&self, input: &LogisticsQuoteInput) -> AppResult<LogisticsQuote> {
        if input.weight_kg < Decimal::ZERO {
            return Err(AppError::validation("weight_kg", "Weight cannot be negative"));
        }
        if input.distance_km < Decimal::ZERO {
            return Err(AppError::validation("distance_km", "Distance cannot be negative"));
        }

        let partner_type = recommended_partner_type(input.weight_kg);
        let partner = self.logistics.partner(partner_type);
        Ok(LogisticsQuote {
            partner_type,
            cost: logistics_cost(&partner, input.distance_km),
        })
    }

    /// Margin and GST of a prospective sale
    pub fn margin(&self, input: &MarginInput) -> MarginBreakdown {
        calculate_margin(
            input.sale_price,
            input.purchase_price,
            input.logistics_price,
            input
                .gst_rate_percent
                .unwrap_or(self.pricing.gst_rate_percent),
        )
    }
}
