//! Purchase batches and the per-product stock ledger

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};

/// Products whose remaining stock falls below this are flagged for attention
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 50;

/// One stock-in event from a vendor at a given unit price.
///
/// `quantity_purchased` never changes after recording; `quantity_remaining`
/// only decreases as sales deplete it and stays within `0..=quantity_purchased`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PurchaseBatch {
    pub id: Uuid,
    pub product_id: Uuid,
    pub vendor_id: Uuid,
    pub quantity_purchased: i32,
    pub quantity_remaining: i32,
    pub unit_price: Decimal,
    pub purchased_at: DateTime<Utc>,
}

impl PurchaseBatch {
    /// A freshly recorded batch starts fully stocked
    pub fn stock_in(
        product_id: Uuid,
        vendor_id: Uuid,
        quantity_purchased: i32,
        unit_price: Decimal,
        purchased_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_id,
            vendor_id,
            quantity_purchased,
            quantity_remaining: quantity_purchased,
            unit_price,
            purchased_at,
        }
    }

    pub fn quantity_sold(&self) -> i32 {
        self.quantity_purchased - self.quantity_remaining
    }

    pub fn is_depleted(&self) -> bool {
        self.quantity_remaining == 0
    }

    /// Take units out of the batch; never goes below zero
    pub fn deplete(&mut self, quantity: i32) -> CoreResult<()> {
        if quantity < 1 {
            return Err(CoreError::InvalidQuantity(quantity as i64));
        }
        if quantity > self.quantity_remaining {
            return Err(CoreError::InsufficientStock {
                product_id: self.product_id,
                requested: quantity as i64,
                available: self.quantity_remaining as i64,
            });
        }
        self.quantity_remaining -= quantity;
        Ok(())
    }

    /// Put units back, e.g. when a depletion is reversed; never exceeds the purchase
    pub fn restock(&mut self, quantity: i32) {
        self.quantity_remaining = self
            .quantity_remaining
            .saturating_add(quantity.max(0))
            .min(self.quantity_purchased);
    }
}

/// Reconciled stock position of one product across its batches
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StockSummary {
    pub total_purchased: i64,
    pub total_remaining: i64,
    pub total_sold: i64,
    /// Weighted average unit price over everything ever purchased
    pub average_price: Decimal,
}

impl StockSummary {
    /// Fold one batch into the running totals.
    ///
    /// The weighted average is order-independent, so batches may be absorbed
    /// in any order.
    pub fn absorb(&mut self, batch: &PurchaseBatch) {
        let purchased = Decimal::from(batch.quantity_purchased);
        let new_total = self.total_purchased + batch.quantity_purchased as i64;

        self.average_price = if new_total > 0 {
            (self.average_price * Decimal::from(self.total_purchased) + batch.unit_price * purchased)
                / Decimal::from(new_total)
        } else {
            Decimal::ZERO
        };
        self.total_purchased = new_total;
        self.total_remaining += batch.quantity_remaining as i64;
        self.total_sold = self.total_purchased - self.total_remaining;
    }

    pub fn is_low_stock(&self, threshold: i64) -> bool {
        self.total_remaining < threshold
    }
}

/// Summarize a product's batches; no batches yields an all-zero summary
pub fn summarize_batches<'a>(batches: impl IntoIterator<Item = &'a PurchaseBatch>) -> StockSummary {
    batches
        .into_iter()
        .fold(StockSummary::default(), |mut summary, batch| {
            summary.absorb(batch);
            summary
        })
}

/// Units to take from one batch as part of a depletion
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchDepletion {
    pub batch_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
}

/// Plan a FIFO depletion of `quantity` units of a product.
///
/// Batches are consumed oldest first (`purchased_at` ascending, ties broken
/// by id), splitting across batches when one is insufficient. Nothing is
/// planned when total remaining stock cannot cover the request.
pub fn plan_fifo_depletion(
    product_id: Uuid,
    batches: &[PurchaseBatch],
    quantity: i64,
) -> CoreResult<Vec<BatchDepletion>> {
    if quantity < 1 {
        return Err(CoreError::InvalidQuantity(quantity));
    }

    let mut candidates: Vec<&PurchaseBatch> = batches
        .iter()
        .filter(|batch| batch.product_id == product_id && batch.quantity_remaining > 0)
        .collect();
    candidates.sort_by(|a, b| a.purchased_at.cmp(&b.purchased_at).then(a.id.cmp(&b.id)));

    let available: i64 = candidates.iter().map(|b| b.quantity_remaining as i64).sum();
    if available < quantity {
        return Err(CoreError::InsufficientStock {
            product_id,
            requested: quantity,
            available,
        });
    }

    let mut remaining = quantity;
    let mut plan = Vec::new();
    for batch in candidates {
        if remaining == 0 {
            break;
        }
        let take = remaining.min(batch.quantity_remaining as i64);
        plan.push(BatchDepletion {
            batch_id: batch.id,
            product_id,
            quantity: take as i32,
        });
        remaining -= take;
    }

    Ok(plan)
}

/// Apply a plan to an in-memory set of batches.
///
/// Either every step applies or none does.
pub fn apply_depletion(batches: &mut [PurchaseBatch], plan: &[BatchDepletion]) -> CoreResult<()> {
    for step in plan {
        let batch = batches.iter().find(|b| b.id == step.batch_id);
        let available = batch.map(|b| b.quantity_remaining).unwrap_or(0);
        if available < step.quantity {
            return Err(CoreError::InsufficientStock {
                product_id: step.product_id,
                requested: step.quantity as i64,
                available: available as i64,
            });
        }
    }

    for step in plan {
        if let Some(batch) = batches.iter_mut().find(|b| b.id == step.batch_id) {
            batch.deplete(step.quantity)?;
        }
    }
    Ok(())
}
