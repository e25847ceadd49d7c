//! PostgreSQL-backed stores

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::{
    AuditLog, BatchDepletion, Category, City, EnquiryItem, LedgerEntry, LedgerEntryType,
    NewAuditLog, NewLedgerEntry, Order, OrderStatus, Product, ProjectType, PurchaseBatch,
    SupplierPerformance, Vendor,
};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    AuditStore, BatchStore, BatchWithVendor, CatalogStore, LedgerStore, OrderStore, StoreError,
    StoreResult,
};

/// Store implementation over a PostgreSQL pool
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn corrupt(column: &str, value: &str) -> StoreError {
    StoreError::Backend(format!("Unrecognized {} value '{}'", column, value))
}

// ============================================================================
// Row Types
// ============================================================================

const ORDER_COLUMNS: &str = "order_id, user_id, customer_name, phone, city, location, \
     project_type, items, status, admin_notes, total_amount, created_at";

#[derive(sqlx::FromRow)]
struct OrderRow {
    order_id: String,
    user_id: Option<Uuid>,
    customer_name: String,
    phone: String,
    city: String,
    location: String,
    project_type: String,
    items: Json<Vec<EnquiryItem>>,
    status: String,
    admin_notes: Option<String>,
    total_amount: Option<Decimal>,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = StoreError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(Order {
            city: City::from_str(&row.city).ok_or_else(|| corrupt("city", &row.city))?,
            project_type: ProjectType::from_str(&row.project_type)
                .ok_or_else(|| corrupt("project_type", &row.project_type))?,
            status: OrderStatus::from_str(&row.status)
                .ok_or_else(|| corrupt("status", &row.status))?,
            id: row.order_id,
            user_id: row.user_id,
            customer_name: row.customer_name,
            phone: row.phone,
            location: row.location,
            items: row.items.0,
            admin_notes: row.admin_notes,
            total_amount: row.total_amount,
            created_at: row.created_at,
        })
    }
}

fn orders_from_rows(rows: Vec<OrderRow>) -> StoreResult<Vec<Order>> {
    rows.into_iter().map(Order::try_from).collect()
}

const LEDGER_COLUMNS: &str = "id, order_id, type, amount, gst_amount, margin, notes, created_at";

#[derive(sqlx::FromRow)]
struct LedgerRow {
    id: Uuid,
    order_id: Option<String>,
    #[sqlx(rename = "type")]
    entry_type: String,
    amount: Decimal,
    gst_amount: Decimal,
    margin: Decimal,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<LedgerRow> for LedgerEntry {
    type Error = StoreError;

    fn try_from(row: LedgerRow) -> Result<Self, Self::Error> {
        Ok(LedgerEntry {
            entry_type: LedgerEntryType::from_str(&row.entry_type)
                .ok_or_else(|| corrupt("ledger type", &row.entry_type))?,
            id: row.id,
            order_id: row.order_id,
            amount: row.amount,
            gst_amount: row.gst_amount,
            margin: row.margin,
            notes: row.notes,
            created_at: row.created_at,
        })
    }
}

const BATCH_COLUMNS: &str =
    "id, product_id, vendor_id, quantity_purchased, quantity_remaining, unit_price, purchased_at";

#[derive(sqlx::FromRow)]
struct BatchRow {
    id: Uuid,
    product_id: Uuid,
    vendor_id: Uuid,
    quantity_purchased: i32,
    quantity_remaining: i32,
    unit_price: Decimal,
    purchased_at: DateTime<Utc>,
}

impl From<BatchRow> for PurchaseBatch {
    fn from(row: BatchRow) -> Self {
        PurchaseBatch {
            id: row.id,
            product_id: row.product_id,
            vendor_id: row.vendor_id,
            quantity_purchased: row.quantity_purchased,
            quantity_remaining: row.quantity_remaining,
            unit_price: row.unit_price,
            purchased_at: row.purchased_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct BatchVendorRow {
    #[sqlx(flatten)]
    batch: BatchRow,
    vendor_name: Option<String>,
}

const PRODUCT_COLUMNS: &str = "id, category_id, name, uom, price_range, gst_percentage, sku, \
     stock_quantity, vendor_id, description, created_at";

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    category_id: Uuid,
    name: String,
    uom: String,
    price_range: String,
    gst_percentage: Decimal,
    sku: Option<String>,
    stock_quantity: i64,
    vendor_id: Option<Uuid>,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            category_id: row.category_id,
            name: row.name,
            uom: row.uom,
            price_range: row.price_range,
            gst_percentage: row.gst_percentage,
            sku: row.sku,
            stock_quantity: row.stock_quantity,
            vendor_id: row.vendor_id,
            description: row.description,
            created_at: row.created_at,
        }
    }
}

const VENDOR_COLUMNS: &str = "id, name, contact_person, phone, email, is_active, \
     delivery_success_rate, quality_rating, speed_rank, created_at";

#[derive(sqlx::FromRow)]
struct VendorRow {
    id: Uuid,
    name: String,
    contact_person: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    is_active: bool,
    delivery_success_rate: Option<Decimal>,
    quality_rating: Option<Decimal>,
    speed_rank: Option<Decimal>,
    created_at: DateTime<Utc>,
}

impl From<VendorRow> for Vendor {
    fn from(row: VendorRow) -> Self {
        // Performance is stored all-or-nothing
        let performance = match (row.delivery_success_rate, row.quality_rating, row.speed_rank) {
            (Some(delivery_success_rate), Some(quality_rating), Some(speed_rank)) => {
                Some(SupplierPerformance {
                    delivery_success_rate,
                    quality_rating,
                    speed_rank,
                })
            }
            _ => None,
        };
        Vendor {
            id: row.id,
            name: row.name,
            contact_person: row.contact_person,
            phone: row.phone,
            email: row.email,
            is_active: row.is_active,
            performance,
            created_at: row.created_at,
        }
    }
}

// ============================================================================
// Orders
// ============================================================================

#[async_trait]
impl OrderStore for PgStore {
    async fn insert_order(&self, order: &Order) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO orders (order_id, user_id, customer_name, phone, city, location,
                                project_type, items, status, admin_notes, total_amount, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(&order.id)
        .bind(order.user_id)
        .bind(&order.customer_name)
        .bind(&order.phone)
        .bind(order.city.as_str())
        .bind(&order.location)
        .bind(order.project_type.as_str())
        .bind(Json(&order.items))
        .bind(order.status.as_str())
        .bind(&order.admin_notes)
        .bind(order.total_amount)
        .bind(order.created_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn get_order(&self, id: &str) -> StoreResult<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {} FROM orders WHERE order_id = $1",
            ORDER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        row.map(Order::try_from).transpose()
    }

    async fn list_orders(&self) -> StoreResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {} FROM orders ORDER BY created_at DESC",
            ORDER_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        orders_from_rows(rows)
    }

    async fn list_orders_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {} FROM orders WHERE user_id = $1 ORDER BY created_at DESC",
            ORDER_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        orders_from_rows(rows)
    }

    async fn find_orders(&self, query: &str) -> StoreResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {} FROM orders WHERE order_id = $1 OR phone = $1 ORDER BY created_at DESC",
            ORDER_COLUMNS
        ))
        .bind(query)
        .fetch_all(&self.db)
        .await?;

        orders_from_rows(rows)
    }

    async fn update_status(
        &self,
        id: &str,
        expected: OrderStatus,
        status: OrderStatus,
        admin_notes: Option<&str>,
    ) -> StoreResult<Order> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            UPDATE orders
            SET status = $3, admin_notes = COALESCE($4, admin_notes)
            WHERE order_id = $1 AND status = $2
            RETURNING {}
            "#,
            ORDER_COLUMNS
        ))
        .bind(id)
        .bind(expected.as_str())
        .bind(status.as_str())
        .bind(admin_notes)
        .fetch_optional(&self.db)
        .await?;

        match row {
            Some(row) => Order::try_from(row),
            None => {
                let current: Option<String> =
                    sqlx::query_scalar("SELECT status FROM orders WHERE order_id = $1")
                        .bind(id)
                        .fetch_optional(&self.db)
                        .await?;
                match current {
                    Some(current) => Err(StoreError::Conflict(format!(
                        "Order {} is {}, not {}",
                        id, current, expected
                    ))),
                    None => Err(StoreError::NotFound(format!("Order {}", id))),
                }
            }
        }
    }

    async fn update_items(
        &self,
        id: &str,
        items: &[EnquiryItem],
        total_amount: Decimal,
    ) -> StoreResult<Order> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            UPDATE orders
            SET items = $2, total_amount = $3
            WHERE order_id = $1
            RETURNING {}
            "#,
            ORDER_COLUMNS
        ))
        .bind(id)
        .bind(Json(items))
        .bind(total_amount)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("Order {}", id)))?;

        Order::try_from(row)
    }
}

// ============================================================================
// Ledger
// ============================================================================

#[async_trait]
impl LedgerStore for PgStore {
    async fn append_entry(&self, entry: NewLedgerEntry) -> StoreResult<LedgerEntry> {
        let row = sqlx::query_as::<_, LedgerRow>(&format!(
            r#"
            INSERT INTO ledger (order_id, type, amount, gst_amount, margin, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            LEDGER_COLUMNS
        ))
        .bind(&entry.order_id)
        .bind(entry.entry_type.as_str())
        .bind(entry.amount)
        .bind(entry.gst_amount)
        .bind(entry.margin)
        .bind(&entry.notes)
        .fetch_one(&self.db)
        .await?;

        LedgerEntry::try_from(row)
    }

    async fn list_entries(&self) -> StoreResult<Vec<LedgerEntry>> {
        let rows = sqlx::query_as::<_, LedgerRow>(&format!(
            "SELECT {} FROM ledger ORDER BY created_at DESC",
            LEDGER_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(LedgerEntry::try_from).collect()
    }
}

// ============================================================================
// Purchase Batches
// ============================================================================

#[async_trait]
impl BatchStore for PgStore {
    async fn insert_batch(&self, batch: &PurchaseBatch) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO purchase_batches (id, product_id, vendor_id, quantity_purchased,
                                          quantity_remaining, unit_price, purchased_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(batch.id)
        .bind(batch.product_id)
        .bind(batch.vendor_id)
        .bind(batch.quantity_purchased)
        .bind(batch.quantity_remaining)
        .bind(batch.unit_price)
        .bind(batch.purchased_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn batches_for_product(&self, product_id: Uuid) -> StoreResult<Vec<PurchaseBatch>> {
        let rows = sqlx::query_as::<_, BatchRow>(&format!(
            "SELECT {} FROM purchase_batches WHERE product_id = $1 ORDER BY purchased_at, id",
            BATCH_COLUMNS
        ))
        .bind(product_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(PurchaseBatch::from).collect())
    }

    async fn all_batches(&self) -> StoreResult<Vec<PurchaseBatch>> {
        let rows = sqlx::query_as::<_, BatchRow>(&format!(
            "SELECT {} FROM purchase_batches ORDER BY purchased_at, id",
            BATCH_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(PurchaseBatch::from).collect())
    }

    async fn list_batches_with_vendor(&self) -> StoreResult<Vec<BatchWithVendor>> {
        let rows = sqlx::query_as::<_, BatchVendorRow>(
            r#"
            SELECT pb.id, pb.product_id, pb.vendor_id, pb.quantity_purchased,
                   pb.quantity_remaining, pb.unit_price, pb.purchased_at,
                   v.name AS vendor_name
            FROM purchase_batches pb
            LEFT JOIN vendors v ON v.id = pb.vendor_id
            ORDER BY pb.purchased_at DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| BatchWithVendor {
                batch: r.batch.into(),
                vendor_name: r.vendor_name,
            })
            .collect())
    }

    async fn apply_depletion(&self, plan: &[BatchDepletion]) -> StoreResult<()> {
        let mut tx = self.db.begin().await?;

        for step in plan {
            // Guarded decrement; zero rows means a concurrent sale got there first
            let result = sqlx::query(
                r#"
                UPDATE purchase_batches
                SET quantity_remaining = quantity_remaining - $2
                WHERE id = $1 AND quantity_remaining >= $2
                "#,
            )
            .bind(step.batch_id)
            .bind(step.quantity)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                tx.rollback().await?;
                return Err(StoreError::Conflict(format!(
                    "Batch {} no longer holds {} units",
                    step.batch_id, step.quantity
                )));
            }
        }

        tx.commit().await?;
        Ok(())
    }

    async fn restock(&self, plan: &[BatchDepletion]) -> StoreResult<()> {
        let mut tx = self.db.begin().await?;

        for step in plan {
            sqlx::query(
                r#"
                UPDATE purchase_batches
                SET quantity_remaining = LEAST(quantity_remaining::BIGINT + $2, quantity_purchased)
                WHERE id = $1
                "#,
            )
            .bind(step.batch_id)
            .bind(step.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

// ============================================================================
// Audit
// ============================================================================

#[async_trait]
impl AuditStore for PgStore {
    async fn append(&self, entry: NewAuditLog) -> StoreResult<AuditLog> {
        let row = sqlx::query_as::<_, (Uuid, Option<Uuid>, String, String, serde_json::Value, DateTime<Utc>)>(
            r#"
            INSERT INTO audit_logs (user_id, action, resource, metadata)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, action, resource, metadata, created_at
            "#,
        )
        .bind(entry.user_id)
        .bind(&entry.action)
        .bind(&entry.resource)
        .bind(&entry.metadata)
        .fetch_one(&self.db)
        .await?;

        Ok(AuditLog {
            id: row.0,
            user_id: row.1,
            action: row.2,
            resource: row.3,
            metadata: row.4,
            created_at: row.5,
        })
    }

    async fn recent(&self, limit: i64) -> StoreResult<Vec<AuditLog>> {
        let rows = sqlx::query_as::<_, (Uuid, Option<Uuid>, String, String, serde_json::Value, DateTime<Utc>)>(
            r#"
            SELECT id, user_id, action, resource, metadata, created_at
            FROM audit_logs
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| AuditLog {
                id: r.0,
                user_id: r.1,
                action: r.2,
                resource: r.3,
                metadata: r.4,
                created_at: r.5,
            })
            .collect())
    }
}

// ============================================================================
// Catalog
// ============================================================================

#[async_trait]
impl CatalogStore for PgStore {
    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, (Uuid, String, String, Option<String>)>(
            "SELECT id, name, slug, description FROM categories ORDER BY name",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Category {
                id: r.0,
                name: r.1,
                slug: r.2,
                description: r.3,
            })
            .collect())
    }

    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products ORDER BY name",
            PRODUCT_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn get_product(&self, id: Uuid) -> StoreResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE id = $1",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Product::from))
    }

    async fn upsert_product(&self, product: &Product) -> StoreResult<Product> {
        // stock_quantity is owned by the batch ledger and never overwritten here
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            INSERT INTO products (id, category_id, name, uom, price_range, gst_percentage,
                                  sku, stock_quantity, vendor_id, description, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (id) DO UPDATE SET
                category_id = EXCLUDED.category_id,
                name = EXCLUDED.name,
                uom = EXCLUDED.uom,
                price_range = EXCLUDED.price_range,
                gst_percentage = EXCLUDED.gst_percentage,
                sku = EXCLUDED.sku,
                vendor_id = EXCLUDED.vendor_id,
                description = EXCLUDED.description
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(product.id)
        .bind(product.category_id)
        .bind(&product.name)
        .bind(&product.uom)
        .bind(&product.price_range)
        .bind(product.gst_percentage)
        .bind(&product.sku)
        .bind(product.stock_quantity)
        .bind(product.vendor_id)
        .bind(&product.description)
        .bind(product.created_at)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    async fn delete_product(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("Product".to_string()));
        }
        Ok(())
    }

    async fn set_stock_quantity(&self, id: Uuid, quantity: i64) -> StoreResult<()> {
        sqlx::query("UPDATE products SET stock_quantity = $2 WHERE id = $1")
            .bind(id)
            .bind(quantity)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    async fn list_vendors(&self) -> StoreResult<Vec<Vendor>> {
        let rows = sqlx::query_as::<_, VendorRow>(&format!(
            "SELECT {} FROM vendors ORDER BY name",
            VENDOR_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Vendor::from).collect())
    }

    async fn get_vendor(&self, id: Uuid) -> StoreResult<Option<Vendor>> {
        let row = sqlx::query_as::<_, VendorRow>(&format!(
            "SELECT {} FROM vendors WHERE id = $1",
            VENDOR_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Vendor::from))
    }

    async fn upsert_vendor(&self, vendor: &Vendor) -> StoreResult<Vendor> {
        let performance = vendor.performance;
        let row = sqlx::query_as::<_, VendorRow>(&format!(
            r#"
            INSERT INTO vendors (id, name, contact_person, phone, email, is_active,
                                 delivery_success_rate, quality_rating, speed_rank, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                contact_person = EXCLUDED.contact_person,
                phone = EXCLUDED.phone,
                email = EXCLUDED.email,
                is_active = EXCLUDED.is_active,
                delivery_success_rate = EXCLUDED.delivery_success_rate,
                quality_rating = EXCLUDED.quality_rating,
                speed_rank = EXCLUDED.speed_rank
            RETURNING {}
            "#,
            VENDOR_COLUMNS
        ))
        .bind(vendor.id)
        .bind(&vendor.name)
        .bind(&vendor.contact_person)
        .bind(&vendor.phone)
        .bind(&vendor.email)
        .bind(vendor.is_active)
        .bind(performance.map(|p| p.delivery_success_rate))
        .bind(performance.map(|p| p.quality_rating))
        .bind(performance.map(|p| p.speed_rank))
        .bind(vendor.created_at)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    async fn delete_vendor(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM vendors WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("Vendor".to_string()));
        }
        Ok(())
    }
}
