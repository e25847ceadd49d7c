//! Catalog models: products, categories, vendors and the service area

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A product category (Cement, Steel (TMT), Sand & Aggregates, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
}

/// A building material offered in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    /// Unit of measure (bag, piece, tonne, brass)
    pub uom: String,
    /// String-encoded lower/upper bound, e.g. "₹350 - ₹420"
    pub price_range: String,
    pub gst_percentage: Decimal,
    pub sku: Option<String>,
    /// Denormalized count of units left across all purchase batches
    pub stock_quantity: i64,
    pub vendor_id: Option<Uuid>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Delivery and quality record of a supplier
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SupplierPerformance {
    /// Share of deliveries completed on time, in [0, 1]
    pub delivery_success_rate: Decimal,
    /// Average quality rating, in [0, 5]
    pub quality_rating: Decimal,
    /// Smaller is faster; unbounded
    pub speed_rank: Decimal,
}

impl SupplierPerformance {
    /// Record assumed for vendors without history; unknown vendors are not penalized.
    pub fn optimistic() -> Self {
        Self {
            delivery_success_rate: Decimal::ONE,
            quality_rating: Decimal::from(5),
            speed_rank: Decimal::ONE,
        }
    }
}

/// A supplier of building materials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vendor {
    pub id: Uuid,
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub is_active: bool,
    pub performance: Option<SupplierPerformance>,
    pub created_at: DateTime<Utc>,
}

/// Cities of the Sangli-Miraj-Kupwad service belt
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum City {
    Sangli,
    Miraj,
    Kupwad,
}

impl City {
    pub const ALL: [City; 3] = [City::Sangli, City::Miraj, City::Kupwad];

    pub fn as_str(&self) -> &'static str {
        match self {
            City::Sangli => "Sangli",
            City::Miraj => "Miraj",
            City::Kupwad => "Kupwad",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|city| city.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl std::fmt::Display for City {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of construction project an order is for
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    Residential,
    Commercial,
    Industrial,
    Government,
}

impl ProjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectType::Residential => "residential",
            ProjectType::Commercial => "commercial",
            ProjectType::Industrial => "industrial",
            ProjectType::Government => "government",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "residential" => Some(ProjectType::Residential),
            "commercial" => Some(ProjectType::Commercial),
            "industrial" => Some(ProjectType::Industrial),
            "government" => Some(ProjectType::Government),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectType::Residential => write!(f, "Residential (Indiv.)"),
            ProjectType::Commercial => write!(f, "Commercial Complex"),
            ProjectType::Industrial => write!(f, "Industrial Site"),
            ProjectType::Government => write!(f, "Govt. Infrastructure"),
        }
    }
}
