//! Supplier allocation and logistics partner sizing

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::SupplierPerformance;
use crate::types::round_currency;

/// Weight up to which a bike delivery is used, in kg
pub const BIKE_MAX_WEIGHT_KG: Decimal = Decimal::from_parts(20, 0, 0, false, 0);
/// Weight up to which a tempo delivery is used, in kg
pub const TEMPO_MAX_WEIGHT_KG: Decimal = Decimal::from_parts(500, 0, 0, false, 0);

/// `delivery × 0.5 + (quality / 5) × 0.3 + speed × 0.2`
pub fn supplier_score(performance: &SupplierPerformance) -> Decimal {
    let delivery_weight = Decimal::new(5, 1);
    let quality_weight = Decimal::new(3, 1);
    let speed_weight = Decimal::new(2, 1);

    performance.delivery_success_rate * delivery_weight
        + (performance.quality_rating / Decimal::from(5)) * quality_weight
        + performance.speed_rank * speed_weight
}

/// A vendor able to supply part of a requirement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplyCandidate {
    pub vendor_id: Uuid,
    /// Missing records are scored as [`SupplierPerformance::optimistic`]
    pub performance: Option<SupplierPerformance>,
    pub available: i64,
}

impl SupplyCandidate {
    pub fn score(&self) -> Decimal {
        supplier_score(&self.performance.unwrap_or_else(SupplierPerformance::optimistic))
    }
}

/// Quantity assigned to one vendor
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Allocation {
    pub vendor_id: Uuid,
    pub quantity: i64,
}

/// Outcome of splitting a requirement across vendors
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AllocationResult {
    pub allocations: Vec<Allocation>,
    pub fulfilled: bool,
    pub shortage: i64,
}

/// Split `required` units across candidates, best score first.
///
/// Equal scores keep their input order. Each vendor gives
/// `min(remaining, available)`; vendors that give nothing are left out.
pub fn allocate_across_suppliers(required: i64, candidates: &[SupplyCandidate]) -> AllocationResult {
    let mut ranked: Vec<(Decimal, &SupplyCandidate)> =
        candidates.iter().map(|c| (c.score(), c)).collect();
    // stable: ties keep input order
    ranked.sort_by(|a, b| b.0.cmp(&a.0));

    let mut remaining = required;
    let mut allocations = Vec::new();
    for (_, candidate) in ranked {
        if remaining <= 0 {
            break;
        }
        let take = remaining.min(candidate.available);
        if take > 0 {
            allocations.push(Allocation {
                vendor_id: candidate.vendor_id,
                quantity: take,
            });
            remaining -= take;
        }
    }

    AllocationResult {
        allocations,
        fulfilled: remaining <= 0,
        shortage: remaining.max(0),
    }
}

/// Vehicle class used for a delivery
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum PartnerType {
    Bike,
    Tempo,
    Truck,
}

impl PartnerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartnerType::Bike => "BIKE",
            PartnerType::Tempo => "TEMPO",
            PartnerType::Truck => "TRUCK",
        }
    }
}

impl std::fmt::Display for PartnerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pick a vehicle class for a total load: ≤20 kg bike, ≤500 kg tempo, else truck
pub fn recommended_partner_type(total_weight_kg: Decimal) -> PartnerType {
    if total_weight_kg <= BIKE_MAX_WEIGHT_KG {
        PartnerType::Bike
    } else if total_weight_kg <= TEMPO_MAX_WEIGHT_KG {
        PartnerType::Tempo
    } else {
        PartnerType::Truck
    }
}

/// Rate card of a logistics partner
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogisticsPartner {
    pub partner_type: PartnerType,
    pub base_rate: Decimal,
    pub per_km_rate: Decimal,
}

/// `base_rate + distance × per_km_rate`, rounded to paise
pub fn logistics_cost(partner: &LogisticsPartner, distance_km: Decimal) -> Decimal {
    round_currency(partner.base_rate + distance_km * partner.per_km_rate)
}
