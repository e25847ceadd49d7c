//! Inventory service: purchase batches, FIFO depletion and the stock ledger report

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use shared::{
    percent_of, plan_fifo_depletion, round_currency, summarize_batches, validate_quantity,
    AuditAction, AuditResource, BatchDepletion, EnquiryItem, LedgerEntryType, NewLedgerEntry,
    PurchaseBatch, StockSummary,
};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::AuditService;
use crate::session::Session;
use crate::store::{BatchWithVendor, StoreError, Stores};

/// Input for recording a stock-in
#[derive(Debug, Deserialize)]
pub struct StockInInput {
    pub product_id: Uuid,
    pub vendor_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    /// Defaults to now
    pub purchased_at: Option<DateTime<Utc>>,
}

/// Input for a standalone depletion
#[derive(Debug, Deserialize)]
pub struct DepleteInput {
    pub product_id: Uuid,
    pub quantity: i64,
}

/// Stock position of one product
#[derive(Debug, Clone, Serialize)]
pub struct ProductStockReport {
    pub product_id: Uuid,
    pub product_name: String,
    pub uom: String,
    #[serde(flatten)]
    pub summary: StockSummary,
    pub low_stock: bool,
}

#[derive(Clone)]
pub struct InventoryService {
    stores: Stores,
    audit: AuditService,
    low_stock_threshold: i64,
}

impl InventoryService {
    pub fn new(stores: Stores, audit: AuditService, low_stock_threshold: i64) -> Self {
        Self {
            stores,
            audit,
            low_stock_threshold,
        }
    }

    /// Record a purchase batch (admin)
    pub async fn record_batch(
        &self,
        session: &Session,
        input: StockInInput,
    ) -> AppResult<PurchaseBatch> {
        session.require_admin()?;
        validate_quantity(input.quantity as i64)?;
        if input.unit_price < Decimal::ZERO {
            return Err(AppError::validation("unit_price", "Unit price cannot be negative"));
        }

        let product = self
            .stores
            .catalog
            .get_product(input.product_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))?;
        if self.stores.catalog.get_vendor(input.vendor_id).await?.is_none() {
            return Err(AppError::NotFound("Vendor".to_string()));
        }

        let batch = PurchaseBatch::stock_in(
            input.product_id,
            input.vendor_id,
            input.quantity,
            input.unit_price,
            input.purchased_at.unwrap_or_else(Utc::now),
        );
        self.stores.batches.insert_batch(&batch).await?;

        tracing::info!(
            batch_id = %batch.id,
            product_id = %batch.product_id,
            "Stocked in {} {} of {}",
            batch.quantity_purchased,
            product.uom,
            product.name
        );

        self.audit
            .record(
                session,
                AuditAction::StockIn,
                AuditResource::PurchaseBatch,
                json!({
                    "id": batch.id,
                    "product_id": batch.product_id,
                    "vendor_id": batch.vendor_id,
                    "quantity": batch.quantity_purchased,
                }),
            )
            .await;

        // Purchase ledger entry is secondary to the batch itself
        let amount = round_currency(Decimal::from(batch.quantity_purchased) * batch.unit_price);
        let purchase = NewLedgerEntry {
            order_id: None,
            entry_type: LedgerEntryType::Purchase,
            amount,
            gst_amount: round_currency(percent_of(amount, product.gst_percentage)),
            margin: Decimal::ZERO,
            notes: Some(format!("Stock-in of {} {}", batch.quantity_purchased, product.name)),
        };
        if let Err(e) = self.stores.ledger.append_entry(purchase).await {
            tracing::warn!(batch_id = %batch.id, "Purchase ledger entry failed: {}", e);
        }

        self.refresh_stock(&[batch.product_id]).await;

        Ok(batch)
    }

    /// Batches with vendor names, newest first (admin)
    pub async fn list_batches(&self, session: &Session) -> AppResult<Vec<BatchWithVendor>> {
        session.require_admin()?;
        Ok(self.stores.batches.list_batches_with_vendor().await?)
    }

    /// Per-product stock ledger (admin)
    pub async fn ledger_report(&self, session: &Session) -> AppResult<Vec<ProductStockReport>> {
        session.require_admin()?;

        let products = self.stores.catalog.list_products().await?;
        let batches = self.stores.batches.all_batches().await?;

        let mut by_product: HashMap<Uuid, Vec<&PurchaseBatch>> = HashMap::new();
        for batch in &batches {
            by_product.entry(batch.product_id).or_default().push(batch);
        }

        Ok(products
            .into_iter()
            .map(|product| {
                let mut summary = by_product
                    .get(&product.id)
                    .map(|batches| summarize_batches(batches.iter().copied()))
                    .unwrap_or_default();
                summary.average_price = round_currency(summary.average_price);
                ProductStockReport {
                    product_id: product.id,
                    product_name: product.name,
                    uom: product.uom,
                    low_stock: summary.is_low_stock(self.low_stock_threshold),
                    summary,
                }
            })
            .collect())
    }

    /// Deplete one product FIFO outside the order lifecycle (admin)
    pub async fn deplete_stock(
        &self,
        session: &Session,
        input: DepleteInput,
    ) -> AppResult<Vec<BatchDepletion>> {
        session.require_admin()?;
        validate_quantity(input.quantity)?;

        let batches = self.stores.batches.batches_for_product(input.product_id).await?;
        let plan = plan_fifo_depletion(input.product_id, &batches, input.quantity)?;
        self.commit_depletion(&plan).await?;

        self.audit
            .record(
                session,
                AuditAction::StockDepletion,
                AuditResource::PurchaseBatch,
                json!({ "product_id": input.product_id, "quantity": input.quantity, "batches": plan.len() }),
            )
            .await;

        Ok(plan)
    }

    /// Plan depletion of every line of a manifest. Lines of the same product
    /// are combined; nothing is planned unless every product is covered.
    pub async fn plan_for_items(&self, items: &[EnquiryItem]) -> AppResult<Vec<BatchDepletion>> {
        let mut wanted: Vec<(Uuid, i64)> = Vec::new();
        for item in items {
            match wanted.iter_mut().find(|(pid, _)| *pid == item.product_id) {
                Some((_, qty)) => *qty += item.quantity as i64,
                None => wanted.push((item.product_id, item.quantity as i64)),
            }
        }

        let mut plan = Vec::new();
        for (product_id, quantity) in wanted {
            let batches = self.stores.batches.batches_for_product(product_id).await?;
            plan.extend(plan_fifo_depletion(product_id, &batches, quantity)?);
        }
        Ok(plan)
    }

    /// Apply a plan in one store transaction, then refresh stock counts
    pub async fn commit_depletion(&self, plan: &[BatchDepletion]) -> AppResult<()> {
        match self.stores.batches.apply_depletion(plan).await {
            Ok(()) => {}
            Err(StoreError::Conflict(msg)) => return Err(AppError::InsufficientStock(msg)),
            Err(e) => return Err(e.into()),
        }

        tracing::info!(steps = plan.len(), "Depleted stock");
        self.refresh_stock(&affected_products(plan)).await;
        Ok(())
    }

    /// Reverse a committed plan
    pub async fn reverse_depletion(&self, plan: &[BatchDepletion]) -> AppResult<()> {
        self.stores.batches.restock(plan).await?;
        tracing::info!(steps = plan.len(), "Restocked after aborted depletion");
        self.refresh_stock(&affected_products(plan)).await;
        Ok(())
    }

    /// Weighted-average purchase price per product; products without
    /// batches are absent
    pub async fn average_prices(&self, product_ids: &[Uuid]) -> AppResult<HashMap<Uuid, Decimal>> {
        let mut prices = HashMap::new();
        for product_id in product_ids {
            let batches = self.stores.batches.batches_for_product(*product_id).await?;
            if !batches.is_empty() {
                prices.insert(*product_id, summarize_batches(&batches).average_price);
            }
        }
        Ok(prices)
    }

    /// Recompute denormalized stock counts; failures are logged only
    async fn refresh_stock(&self, product_ids: &[Uuid]) {
        for product_id in product_ids {
            let result = match self.stores.batches.batches_for_product(*product_id).await {
                Ok(batches) => {
                    let remaining = summarize_batches(&batches).total_remaining;
                    self.stores
                        .catalog
                        .set_stock_quantity(*product_id, remaining)
                        .await
                }
                Err(e) => Err(e),
            };
            if let Err(e) = result {
                tracing::warn!(product_id = %product_id, "Stock count refresh failed: {}", e);
            }
        }
    }
}

fn affected_products(plan: &[BatchDepletion]) -> Vec<Uuid> {
    let mut ids: Vec<Uuid> = plan.iter().map(|step| step.product_id).collect();
    ids.sort();
    ids.dedup();
    ids
}
