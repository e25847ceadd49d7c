//! Cart aggregator: the client-held list of line items awaiting submission

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreResult;
use crate::validation::validate_quantity;

/// One line of a cart or order manifest
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnquiryItem {
    pub product_id: Uuid,
    /// Denormalized at add time so the manifest survives product deletion
    pub product_name: String,
    pub quantity: i32,
    pub uom: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Decimal>,
}

impl EnquiryItem {
    pub fn new(product_id: Uuid, product_name: impl Into<String>, quantity: i32, uom: impl Into<String>) -> Self {
        Self {
            product_id,
            product_name: product_name.into(),
            quantity,
            uom: uom.into(),
            unit_price: None,
        }
    }
}

/// In-memory set of line items keyed by product id.
///
/// Holds at most one entry per product; insertion order is kept for display.
/// A cart belongs to a single session and is never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cart {
    items: Vec<EnquiryItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cart from raw lines, merging lines for the same product.
    pub fn from_items(items: impl IntoIterator<Item = EnquiryItem>) -> CoreResult<Self> {
        let mut cart = Self::new();
        for item in items {
            cart.add(item)?;
        }
        Ok(cart)
    }

    /// Add a line; an existing entry for the product has its quantity increased.
    ///
    /// The merged quantity is bounded by [`crate::validation::MAX_LINE_QUANTITY`]; a rejected
    /// add leaves the cart unchanged.
    pub fn add(&mut self, item: EnquiryItem) -> CoreResult<()> {
        validate_quantity(item.quantity as i64)?;

        match self.find_mut(item.product_id) {
            Some(existing) => {
                let merged = existing.quantity as i64 + item.quantity as i64;
                validate_quantity(merged)?;
                existing.quantity = merged as i32;
            }
            None => self.items.push(item),
        }
        Ok(())
    }

    /// Overwrite the quantity of a product.
    ///
    /// A quantity of zero or less removes the entry. A missing entry is only
    /// created when both the name and unit of measure are supplied.
    pub fn set_quantity(
        &mut self,
        product_id: Uuid,
        quantity: i32,
        product_name: Option<&str>,
        uom: Option<&str>,
    ) {
        if quantity <= 0 {
            self.remove(product_id);
            return;
        }

        if let Some(existing) = self.find_mut(product_id) {
            existing.quantity = quantity;
            return;
        }

        if let (Some(name), Some(uom)) = (product_name, uom) {
            self.items
                .push(EnquiryItem::new(product_id, name, quantity, uom));
        }
    }

    /// Remove a product; removing an absent product is a no-op.
    pub fn remove(&mut self, product_id: Uuid) {
        self.items.retain(|item| item.product_id != product_id);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn items(&self) -> &[EnquiryItem] {
        &self.items
    }

    pub fn get(&self, product_id: Uuid) -> Option<&EnquiryItem> {
        self.items.iter().find(|item| item.product_id == product_id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|item| item.quantity as i64).sum()
    }

    pub fn into_items(self) -> Vec<EnquiryItem> {
        self.items
    }

    fn find_mut(&mut self, product_id: Uuid) -> Option<&mut EnquiryItem> {
        self.items
            .iter_mut()
            .find(|item| item.product_id == product_id)
    }
}
