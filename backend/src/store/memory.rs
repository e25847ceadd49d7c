//! In-process stores for tests and database-less runs

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use shared::{
    AuditLog, BatchDepletion, Category, EnquiryItem, LedgerEntry, NewAuditLog, NewLedgerEntry,
    Order, OrderStatus, Product, PurchaseBatch, Vendor,
};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    AuditStore, BatchStore, BatchWithVendor, CatalogStore, LedgerStore, OrderStore, StoreError,
    StoreResult,
};

/// Every collection kept in insertion order behind its own lock
#[derive(Default)]
pub struct MemoryStore {
    orders: RwLock<Vec<Order>>,
    ledger: RwLock<Vec<LedgerEntry>>,
    batches: RwLock<Vec<PurchaseBatch>>,
    audit: RwLock<Vec<AuditLog>>,
    categories: RwLock<Vec<Category>>,
    products: RwLock<Vec<Product>>,
    vendors: RwLock<Vec<Vendor>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a category; the catalog has no write path for them
    pub async fn add_category(&self, category: Category) {
        self.categories.write().await.push(category);
    }
}

/// Newest first; later insertions win ties
fn newest_first<T: Clone>(items: &[T], key: impl Fn(&T) -> chrono::DateTime<Utc>) -> Vec<T> {
    let mut out: Vec<T> = items.iter().rev().cloned().collect();
    out.sort_by(|a, b| key(b).cmp(&key(a)));
    out
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn insert_order(&self, order: &Order) -> StoreResult<()> {
        let mut orders = self.orders.write().await;
        if orders.iter().any(|o| o.id == order.id) {
            return Err(StoreError::Conflict(format!("Order {} already exists", order.id)));
        }
        orders.push(order.clone());
        Ok(())
    }

    async fn get_order(&self, id: &str) -> StoreResult<Option<Order>> {
        Ok(self.orders.read().await.iter().find(|o| o.id == id).cloned())
    }

    async fn list_orders(&self) -> StoreResult<Vec<Order>> {
        Ok(newest_first(&self.orders.read().await, |o| o.created_at))
    }

    async fn list_orders_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Order>> {
        let orders = self.orders.read().await;
        let mine: Vec<Order> = orders
            .iter()
            .filter(|o| o.user_id == Some(user_id))
            .cloned()
            .collect();
        Ok(newest_first(&mine, |o| o.created_at))
    }

    async fn find_orders(&self, query: &str) -> StoreResult<Vec<Order>> {
        let orders = self.orders.read().await;
        let hits: Vec<Order> = orders
            .iter()
            .filter(|o| o.id == query || o.phone == query)
            .cloned()
            .collect();
        Ok(newest_first(&hits, |o| o.created_at))
    }

    async fn update_status(
        &self,
        id: &str,
        expected: OrderStatus,
        status: OrderStatus,
        admin_notes: Option<&str>,
    ) -> StoreResult<Order> {
        let mut orders = self.orders.write().await;
        let order = orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("Order {}", id)))?;
        if order.status != expected {
            return Err(StoreError::Conflict(format!(
                "Order {} is {}, not {}",
                id, order.status, expected
            )));
        }
        order.status = status;
        if let Some(notes) = admin_notes {
            order.admin_notes = Some(notes.to_string());
        }
        Ok(order.clone())
    }

    async fn update_items(
        &self,
        id: &str,
        items: &[EnquiryItem],
        total_amount: Decimal,
    ) -> StoreResult<Order> {
        let mut orders = self.orders.write().await;
        let order = orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("Order {}", id)))?;
        order.items = items.to_vec();
        order.total_amount = Some(total_amount);
        Ok(order.clone())
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn append_entry(&self, entry: NewLedgerEntry) -> StoreResult<LedgerEntry> {
        let stored = LedgerEntry {
            id: Uuid::new_v4(),
            order_id: entry.order_id,
            entry_type: entry.entry_type,
            amount: entry.amount,
            gst_amount: entry.gst_amount,
            margin: entry.margin,
            notes: entry.notes,
            created_at: Utc::now(),
        };
        self.ledger.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn list_entries(&self) -> StoreResult<Vec<LedgerEntry>> {
        Ok(newest_first(&self.ledger.read().await, |e| e.created_at))
    }
}

#[async_trait]
impl BatchStore for MemoryStore {
    async fn insert_batch(&self, batch: &PurchaseBatch) -> StoreResult<()> {
        let mut batches = self.batches.write().await;
        if batches.iter().any(|b| b.id == batch.id) {
            return Err(StoreError::Conflict(format!("Batch {} already exists", batch.id)));
        }
        batches.push(batch.clone());
        Ok(())
    }

    async fn batches_for_product(&self, product_id: Uuid) -> StoreResult<Vec<PurchaseBatch>> {
        let mut out: Vec<PurchaseBatch> = self
            .batches
            .read()
            .await
            .iter()
            .filter(|b| b.product_id == product_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.purchased_at.cmp(&b.purchased_at).then(a.id.cmp(&b.id)));
        Ok(out)
    }

    async fn all_batches(&self) -> StoreResult<Vec<PurchaseBatch>> {
        let mut out = self.batches.read().await.clone();
        out.sort_by(|a, b| a.purchased_at.cmp(&b.purchased_at).then(a.id.cmp(&b.id)));
        Ok(out)
    }

    async fn list_batches_with_vendor(&self) -> StoreResult<Vec<BatchWithVendor>> {
        let vendors: HashMap<Uuid, String> = self
            .vendors
            .read()
            .await
            .iter()
            .map(|v| (v.id, v.name.clone()))
            .collect();
        let batches = newest_first(&self.batches.read().await, |b| b.purchased_at);
        Ok(batches
            .into_iter()
            .map(|batch| BatchWithVendor {
                vendor_name: vendors.get(&batch.vendor_id).cloned(),
                batch,
            })
            .collect())
    }

    async fn apply_depletion(&self, plan: &[BatchDepletion]) -> StoreResult<()> {
        let mut batches = self.batches.write().await;
        // Work on a copy so a failing step leaves nothing applied
        let mut staged = batches.clone();
        shared::apply_depletion(&mut staged, plan)
            .map_err(|e| StoreError::Conflict(e.to_string()))?;
        *batches = staged;
        Ok(())
    }

    async fn restock(&self, plan: &[BatchDepletion]) -> StoreResult<()> {
        let mut batches = self.batches.write().await;
        for step in plan {
            if let Some(batch) = batches.iter_mut().find(|b| b.id == step.batch_id) {
                batch.restock(step.quantity);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl AuditStore for MemoryStore {
    async fn append(&self, entry: NewAuditLog) -> StoreResult<AuditLog> {
        let stored = AuditLog {
            id: Uuid::new_v4(),
            user_id: entry.user_id,
            action: entry.action,
            resource: entry.resource,
            metadata: entry.metadata,
            created_at: Utc::now(),
        };
        self.audit.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn recent(&self, limit: i64) -> StoreResult<Vec<AuditLog>> {
        let mut out = newest_first(&self.audit.read().await, |a| a.created_at);
        out.truncate(limit.max(0) as usize);
        Ok(out)
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        let mut out = self.categories.read().await.clone();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }

    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        let mut out = self.products.read().await.clone();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }

    async fn get_product(&self, id: Uuid) -> StoreResult<Option<Product>> {
        Ok(self.products.read().await.iter().find(|p| p.id == id).cloned())
    }

    async fn upsert_product(&self, product: &Product) -> StoreResult<Product> {
        let mut products = self.products.write().await;
        if let Some(existing) = products.iter_mut().find(|p| p.id == product.id) {
            let stock_quantity = existing.stock_quantity;
            let created_at = existing.created_at;
            *existing = Product {
                stock_quantity,
                created_at,
                ..product.clone()
            };
            return Ok(existing.clone());
        }
        products.push(product.clone());
        Ok(product.clone())
    }

    async fn delete_product(&self, id: Uuid) -> StoreResult<()> {
        let mut products = self.products.write().await;
        let before = products.len();
        products.retain(|p| p.id != id);
        if products.len() == before {
            return Err(StoreError::NotFound("Product".to_string()));
        }
        Ok(())
    }

    async fn set_stock_quantity(&self, id: Uuid, quantity: i64) -> StoreResult<()> {
        if let Some(product) = self.products.write().await.iter_mut().find(|p| p.id == id) {
            product.stock_quantity = quantity;
        }
        Ok(())
    }

    async fn list_vendors(&self) -> StoreResult<Vec<Vendor>> {
        let mut out = self.vendors.read().await.clone();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }

    async fn get_vendor(&self, id: Uuid) -> StoreResult<Option<Vendor>> {
        Ok(self.vendors.read().await.iter().find(|v| v.id == id).cloned())
    }

    async fn upsert_vendor(&self, vendor: &Vendor) -> StoreResult<Vendor> {
        let mut vendors = self.vendors.write().await;
        if let Some(existing) = vendors.iter_mut().find(|v| v.id == vendor.id) {
            let created_at = existing.created_at;
            *existing = Vendor {
                created_at,
                ..vendor.clone()
            };
            return Ok(existing.clone());
        }
        vendors.push(vendor.clone());
        Ok(vendor.clone())
    }

    async fn delete_vendor(&self, id: Uuid) -> StoreResult<()> {
        let mut vendors = self.vendors.write().await;
        let before = vendors.len();
        vendors.retain(|v| v.id != id);
        if vendors.len() == before {
            return Err(StoreError::NotFound("Vendor".to_string()));
        }
        Ok(())
    }
}
