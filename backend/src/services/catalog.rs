//! Catalog service for products, vendors and categories

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use shared::{
    validate_gst_percentage, validate_performance, validate_price_range, AuditAction,
    AuditResource, Category, Product, SupplierPerformance, Vendor,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::services::AuditService;
use crate::session::Session;
use crate::store::Stores;

/// Input for creating or replacing a product
#[derive(Debug, Deserialize, Validate)]
pub struct ProductInput {
    /// Omit to create a new product
    pub id: Option<Uuid>,
    pub category_id: Uuid,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 20))]
    pub uom: String,
    pub price_range: String,
    pub gst_percentage: Decimal,
    #[validate(length(max = 64))]
    pub sku: Option<String>,
    pub vendor_id: Option<Uuid>,
    pub description: Option<String>,
}

/// Input for creating or replacing a vendor
#[derive(Debug, Deserialize, Validate)]
pub struct VendorInput {
    pub id: Option<Uuid>,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub contact_person: Option<String>,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub performance: Option<SupplierPerformance>,
}

fn default_active() -> bool {
    true
}

#[derive(Clone)]
pub struct CatalogService {
    stores: Stores,
    audit: AuditService,
}

impl CatalogService {
    pub fn new(stores: Stores, audit: AuditService) -> Self {
        Self { stores, audit }
    }

    pub async fn list_categories(&self) -> AppResult<Vec<Category>> {
        Ok(self.stores.catalog.list_categories().await?)
    }

    pub async fn list_products(&self) -> AppResult<Vec<Product>> {
        Ok(self.stores.catalog.list_products().await?)
    }

    pub async fn get_product(&self, id: Uuid) -> AppResult<Product> {
        self.stores
            .catalog
            .get_product(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))
    }

    pub async fn list_vendors(&self) -> AppResult<Vec<Vendor>> {
        Ok(self.stores.catalog.list_vendors().await?)
    }

    pub async fn get_vendor(&self, id: Uuid) -> AppResult<Vendor> {
        self.stores
            .catalog
            .get_vendor(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vendor".to_string()))
    }

    /// Create or replace a product (admin)
    pub async fn upsert_product(&self, session: &Session, input: ProductInput) -> AppResult<Product> {
        session.require_admin()?;
        input.validate()?;
        validate_gst_percentage(input.gst_percentage)
            .map_err(|msg| AppError::validation("gst_percentage", msg))?;
        validate_price_range(&input.price_range)
            .map_err(|msg| AppError::validation("price_range", msg))?;

        let categories = self.stores.catalog.list_categories().await?;
        if !categories.iter().any(|c| c.id == input.category_id) {
            return Err(AppError::validation("category_id", "Unknown category"));
        }
        if let Some(vendor_id) = input.vendor_id {
            self.get_vendor(vendor_id).await?;
        }

        let existing = match input.id {
            Some(id) => self.stores.catalog.get_product(id).await?,
            None => None,
        };

        let product = Product {
            id: input.id.unwrap_or_else(Uuid::new_v4),
            category_id: input.category_id,
            name: input.name.trim().to_string(),
            uom: input.uom.trim().to_string(),
            price_range: input.price_range,
            gst_percentage: input.gst_percentage,
            sku: input.sku.filter(|s| !s.trim().is_empty()),
            stock_quantity: existing.as_ref().map(|p| p.stock_quantity).unwrap_or(0),
            vendor_id: input.vendor_id,
            description: input.description,
            created_at: existing.map(|p| p.created_at).unwrap_or_else(Utc::now),
        };

        let saved = self.stores.catalog.upsert_product(&product).await?;
        tracing::info!(product_id = %saved.id, "Saved product {}", saved.name);

        self.audit
            .record(
                session,
                AuditAction::Upsert,
                AuditResource::Product,
                json!({ "id": saved.id, "name": saved.name }),
            )
            .await;

        Ok(saved)
    }

    /// Delete a product (admin)
    pub async fn delete_product(&self, session: &Session, id: Uuid) -> AppResult<()> {
        session.require_admin()?;
        self.stores.catalog.delete_product(id).await?;
        tracing::info!(product_id = %id, "Deleted product");

        self.audit
            .record(session, AuditAction::Delete, AuditResource::Product, json!({ "id": id }))
            .await;

        Ok(())
    }

    /// Create or replace a vendor (admin)
    pub async fn upsert_vendor(&self, session: &Session, input: VendorInput) -> AppResult<Vendor> {
        session.require_admin()?;
        input.validate()?;
        if let Some(performance) = &input.performance {
            validate_performance(performance.delivery_success_rate, performance.quality_rating)
                .map_err(|msg| AppError::validation("performance", msg))?;
        }

        let created_at = match input.id {
            Some(id) => self
                .stores
                .catalog
                .get_vendor(id)
                .await?
                .map(|v| v.created_at),
            None => None,
        };

        let vendor = Vendor {
            id: input.id.unwrap_or_else(Uuid::new_v4),
            name: input.name.trim().to_string(),
            contact_person: input.contact_person,
            phone: input.phone,
            email: input.email,
            is_active: input.is_active,
            performance: input.performance,
            created_at: created_at.unwrap_or_else(Utc::now),
        };

        let saved = self.stores.catalog.upsert_vendor(&vendor).await?;
        tracing::info!(vendor_id = %saved.id, "Saved vendor {}", saved.name);

        self.audit
            .record(
                session,
                AuditAction::Upsert,
                AuditResource::Vendor,
                json!({ "id": saved.id, "name": saved.name }),
            )
            .await;

        Ok(saved)
    }

    /// Delete a vendor (admin)
    pub async fn delete_vendor(&self, session: &Session, id: Uuid) -> AppResult<()> {
        session.require_admin()?;
        self.stores.catalog.delete_vendor(id).await?;
        tracing::info!(vendor_id = %id, "Deleted vendor");

        self.audit
            .record(session, AuditAction::Delete, AuditResource::Vendor, json!({ "id": id }))
            .await;

        Ok(())
    }
}
