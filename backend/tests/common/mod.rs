//! Shared fixtures for backend integration tests

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use shared::{
    Category, City, CustomerDetails, EnquiryItem, Product, ProjectType, PurchaseBatch,
    SupplierPerformance, Vendor,
};
use uuid::Uuid;

use materialcart_backend::store::{BatchStore, CatalogStore, MemoryStore, Stores};
use materialcart_backend::{AppState, Config, Session};

pub struct Fixture {
    pub memory: Arc<MemoryStore>,
    pub state: AppState,
    pub category_id: Uuid,
    pub admin: Session,
    pub customer: Session,
}

/// In-memory app with one seeded category
pub async fn fixture() -> Fixture {
    fixture_with(|stores| stores).await
}

/// Like [`fixture`], letting the test swap individual stores
pub async fn fixture_with(wrap: impl FnOnce(Stores) -> Stores) -> Fixture {
    let memory = Arc::new(MemoryStore::new());
    let category_id = Uuid::new_v4();
    memory
        .add_category(Category {
            id: category_id,
            name: "Cement".to_string(),
            slug: "cement".to_string(),
            description: None,
        })
        .await;

    let stores = wrap(Stores::from_store(memory.clone()));
    let config = Config::defaults().expect("default config");

    Fixture {
        memory,
        state: AppState::new(config, stores),
        category_id,
        admin: Session::admin(Uuid::new_v4()),
        customer: Session::customer(Uuid::new_v4()),
    }
}

impl Fixture {
    pub async fn add_product(&self, name: &str, uom: &str) -> Product {
        let product = Product {
            id: Uuid::new_v4(),
            category_id: self.category_id,
            name: name.to_string(),
            uom: uom.to_string(),
            price_range: "₹350 - ₹420".to_string(),
            gst_percentage: Decimal::from(18),
            sku: None,
            stock_quantity: 0,
            vendor_id: None,
            description: None,
            created_at: Utc::now(),
        };
        self.memory.upsert_product(&product).await.expect("seed product")
    }

    pub async fn add_vendor(&self, name: &str, performance: Option<SupplierPerformance>) -> Vendor {
        let vendor = Vendor {
            id: Uuid::new_v4(),
            name: name.to_string(),
            contact_person: None,
            phone: None,
            email: None,
            is_active: true,
            performance,
            created_at: Utc::now(),
        };
        self.memory.upsert_vendor(&vendor).await.expect("seed vendor")
    }

    /// Insert a batch purchased `days_ago` days back
    pub async fn add_batch(
        &self,
        product_id: Uuid,
        vendor_id: Uuid,
        quantity: i32,
        unit_price: Decimal,
        days_ago: i64,
    ) -> PurchaseBatch {
        let batch = PurchaseBatch::stock_in(
            product_id,
            vendor_id,
            quantity,
            unit_price,
            Utc::now() - Duration::days(days_ago),
        );
        self.memory.insert_batch(&batch).await.expect("seed batch");
        batch
    }
}

pub fn line(product: &Product, quantity: i32) -> EnquiryItem {
    EnquiryItem::new(product.id, product.name.clone(), quantity, product.uom.clone())
}

pub fn customer_details() -> CustomerDetails {
    CustomerDetails {
        customer_name: "Suresh Patil".to_string(),
        phone: "9876543210".to_string(),
        city: City::Sangli,
        location: "Vishrambag, near the water tank".to_string(),
        project_type: ProjectType::Residential,
    }
}

pub fn performance(delivery: &str, quality: &str, speed: &str) -> SupplierPerformance {
    SupplierPerformance {
        delivery_success_rate: delivery.parse().expect("decimal"),
        quality_rating: quality.parse().expect("decimal"),
        speed_rank: speed.parse().expect("decimal"),
    }
}
