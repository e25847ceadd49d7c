//! Persistence seam for orders, purchase batches, ledger, audit and catalog
//!
//! Services talk to these traits only. `PgStore` backs them with PostgreSQL;
//! `MemoryStore` keeps everything in process for tests and local demos.

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use shared::{
    AuditLog, BatchDepletion, Category, EnquiryItem, LedgerEntry, NewAuditLog, NewLedgerEntry,
    Order, OrderStatus, Product, PurchaseBatch, Vendor,
};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

mod memory;
mod pg;

pub use memory::MemoryStore;
pub use pg::PgStore;

/// Errors raised by a backing store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{0}")]
    NotFound(String),

    /// Unique key or guard violation
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("{0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => StoreError::NotFound("Row".to_string()),
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
                StoreError::Conflict(db_err.message().to_string())
            }
            _ => StoreError::Backend(err.to_string()),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Purchase batch joined with its vendor's name for display
#[derive(Debug, Clone, Serialize)]
pub struct BatchWithVendor {
    #[serde(flatten)]
    pub batch: PurchaseBatch,
    pub vendor_name: Option<String>,
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Insert a new order; a duplicate id is a `Conflict`
    async fn insert_order(&self, order: &Order) -> StoreResult<()>;

    async fn get_order(&self, id: &str) -> StoreResult<Option<Order>>;

    /// All orders, newest first
    async fn list_orders(&self) -> StoreResult<Vec<Order>>;

    /// Orders placed by one actor, newest first
    async fn list_orders_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Order>>;

    /// Orders whose id or phone equals `query`, newest first
    async fn find_orders(&self, query: &str) -> StoreResult<Vec<Order>>;

    /// Move an order from `expected` to `status`. An order no longer in
    /// `expected` is left untouched and reported as a `Conflict`.
    async fn update_status(
        &self,
        id: &str,
        expected: OrderStatus,
        status: OrderStatus,
        admin_notes: Option<&str>,
    ) -> StoreResult<Order>;

    async fn update_items(
        &self,
        id: &str,
        items: &[EnquiryItem],
        total_amount: Decimal,
    ) -> StoreResult<Order>;
}

#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn append_entry(&self, entry: NewLedgerEntry) -> StoreResult<LedgerEntry>;

    /// All entries, newest first
    async fn list_entries(&self) -> StoreResult<Vec<LedgerEntry>>;
}

#[async_trait]
pub trait BatchStore: Send + Sync {
    async fn insert_batch(&self, batch: &PurchaseBatch) -> StoreResult<()>;

    /// Batches of one product, oldest purchase first
    async fn batches_for_product(&self, product_id: Uuid) -> StoreResult<Vec<PurchaseBatch>>;

    /// Every batch, oldest purchase first
    async fn all_batches(&self) -> StoreResult<Vec<PurchaseBatch>>;

    /// Every batch with vendor name, newest purchase first
    async fn list_batches_with_vendor(&self) -> StoreResult<Vec<BatchWithVendor>>;

    /// Apply a depletion plan atomically; a step that would drive a batch
    /// below zero fails the whole plan with `Conflict`
    async fn apply_depletion(&self, plan: &[BatchDepletion]) -> StoreResult<()>;

    /// Reverse a previously applied plan
    async fn restock(&self, plan: &[BatchDepletion]) -> StoreResult<()>;
}

#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn append(&self, entry: NewAuditLog) -> StoreResult<AuditLog>;

    /// Most recent entries, newest first
    async fn recent(&self, limit: i64) -> StoreResult<Vec<AuditLog>>;
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn list_categories(&self) -> StoreResult<Vec<Category>>;

    /// Products ordered by name
    async fn list_products(&self) -> StoreResult<Vec<Product>>;

    async fn get_product(&self, id: Uuid) -> StoreResult<Option<Product>>;

    async fn upsert_product(&self, product: &Product) -> StoreResult<Product>;

    async fn delete_product(&self, id: Uuid) -> StoreResult<()>;

    /// Refresh the denormalized stock count of a product
    async fn set_stock_quantity(&self, id: Uuid, quantity: i64) -> StoreResult<()>;

    /// Vendors ordered by name
    async fn list_vendors(&self) -> StoreResult<Vec<Vendor>>;

    async fn get_vendor(&self, id: Uuid) -> StoreResult<Option<Vendor>>;

    async fn upsert_vendor(&self, vendor: &Vendor) -> StoreResult<Vendor>;

    async fn delete_vendor(&self, id: Uuid) -> StoreResult<()>;
}

/// Handles to every store the services need
#[derive(Clone)]
pub struct Stores {
    pub orders: Arc<dyn OrderStore>,
    pub ledger: Arc<dyn LedgerStore>,
    pub batches: Arc<dyn BatchStore>,
    pub audit: Arc<dyn AuditStore>,
    pub catalog: Arc<dyn CatalogStore>,
}

impl Stores {
    /// All stores backed by one PostgreSQL pool
    pub fn postgres(db: PgPool) -> Self {
        Self::from_store(Arc::new(PgStore::new(db)))
    }

    /// All stores backed by one in-process store
    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(MemoryStore::new()))
    }

    /// Every handle pointing at one store value
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: OrderStore + LedgerStore + BatchStore + AuditStore + CatalogStore + 'static,
    {
        Self {
            orders: store.clone(),
            ledger: store.clone(),
            batches: store.clone(),
            audit: store.clone(),
            catalog: store,
        }
    }
}
