//! Order engine: manifest creation, status machine, item edits and tracking

use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use shared::{
    calculate_margin, compute_order_totals, format_order_id, validate_items, AuditAction,
    AuditResource, Cart, CoreError, CustomerDetails, EnquiryItem, LedgerEntry, LedgerEntryType,
    NewLedgerEntry, Order, OrderStatus, OrderTotals, ORDER_ID_DIGITS,
};
use uuid::Uuid;
use validator::Validate;

use crate::config::{OrderConfig, PricingConfig};
use crate::error::{AppError, AppResult};
use crate::services::{AuditService, InventoryService};
use crate::session::Session;
use crate::store::{StoreError, Stores};

/// Order submission: the cart's lines plus contact details
#[derive(Debug, Deserialize)]
pub struct CreateOrderInput {
    pub items: Vec<EnquiryItem>,
    #[serde(flatten)]
    pub customer: CustomerDetails,
}

/// Result of placing an order. The order is authoritative; the sale ledger
/// entry is best-effort and its failure is reported alongside.
#[derive(Debug, Clone, Serialize)]
pub struct OrderPlacement {
    pub order: Order,
    pub totals: OrderTotals,
    pub ledger_entry: Option<LedgerEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ledger_error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateInput {
    pub status: OrderStatus,
    pub admin_notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ItemsUpdateInput {
    pub items: Vec<EnquiryItem>,
}

/// Tracking lookup outcome; nothing found is a normal answer
#[derive(Debug, Clone, Serialize)]
pub struct TrackResult {
    pub found: bool,
    pub orders: Vec<Order>,
}

#[derive(Clone)]
pub struct OrderService {
    stores: Stores,
    inventory: InventoryService,
    audit: AuditService,
    pricing: PricingConfig,
    ids: OrderConfig,
}

impl OrderService {
    pub fn new(
        stores: Stores,
        inventory: InventoryService,
        audit: AuditService,
        pricing: PricingConfig,
        ids: OrderConfig,
    ) -> Self {
        Self {
            stores,
            inventory,
            audit,
            pricing,
            ids,
        }
    }

    /// Turn a cart into a PENDING order.
    ///
    /// Nothing is written unless the actor is known, the cart is non-empty
    /// and every field validates. The cart is cleared once the order row is
    /// stored; a failing sale ledger write does not undo the order.
    pub async fn create_order(
        &self,
        session: &Session,
        cart: &mut Cart,
        customer: CustomerDetails,
    ) -> AppResult<OrderPlacement> {
        let actor = session.require_actor()?;
        if cart.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }
        customer.validate()?;
        validate_items(cart.items())?;
        self.require_products(cart.items()).await?;

        let totals = self.totals(cart.items());
        let draft = Order {
            id: String::new(),
            user_id: Some(actor),
            customer_name: customer.customer_name.trim().to_string(),
            phone: customer.phone.trim().to_string(),
            city: customer.city,
            location: customer.location.trim().to_string(),
            project_type: customer.project_type,
            items: cart.items().to_vec(),
            status: OrderStatus::Pending,
            admin_notes: None,
            total_amount: Some(totals.total),
            created_at: chrono::Utc::now(),
        };

        let order = self.insert_with_fresh_id(draft).await?;
        cart.clear();

        tracing::info!(
            order_id = %order.id,
            user_id = %actor,
            lines = order.items.len(),
            "Order placed, total {}",
            totals.total
        );

        let (ledger_entry, ledger_error) = match self.record_sale(&order, &totals).await {
            Ok(entry) => (Some(entry), None),
            Err(e) => {
                tracing::warn!(order_id = %order.id, "Sale ledger entry failed: {}", e);
                (None, Some(e.to_string()))
            }
        };

        Ok(OrderPlacement {
            order,
            totals,
            ledger_entry,
            ledger_error,
        })
    }

    /// Move an order to a new status (admin).
    ///
    /// Entering a stock-committing status depletes every line FIFO first; if
    /// the status write then fails the depletion is reversed.
    pub async fn update_status(
        &self,
        session: &Session,
        order_id: &str,
        input: StatusUpdateInput,
    ) -> AppResult<Order> {
        session.require_admin()?;
        let current = self.find(order_id).await?;
        let next = input.status;

        if !current.status.can_transition_to(next) {
            return Err(CoreError::InvalidTransition {
                from: current.status,
                to: next,
            }
            .into());
        }

        let depletion = if !current.status.commits_stock() && next.commits_stock() {
            let plan = self.inventory.plan_for_items(&current.items).await?;
            self.inventory.commit_depletion(&plan).await?;
            Some(plan)
        } else {
            None
        };

        let notes = input
            .admin_notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty());

        let write = self
            .stores
            .orders
            .update_status(order_id, current.status, next, notes)
            .await;
        let updated = match write {
            Ok(order) => order,
            Err(e) => {
                tracing::error!(order_id, "Status update failed: {}", e);
                if let Some(plan) = &depletion {
                    if let Err(undo) = self.inventory.reverse_depletion(plan).await {
                        tracing::error!(order_id, "Could not reverse depletion: {}", undo);
                    }
                }
                return Err(match e {
                    StoreError::Conflict(msg) => AppError::InvalidStateTransition(format!(
                        "{}; it was changed by another update",
                        msg
                    )),
                    other => other.into(),
                });
            }
        };

        tracing::info!(order_id, from = %current.status, to = %next, "Order status updated");

        self.audit
            .record(
                session,
                AuditAction::StatusUpdate,
                AuditResource::Order,
                json!({ "id": order_id, "to": next }),
            )
            .await;

        Ok(updated)
    }

    /// Replace an order's lines and recompute its total (admin).
    ///
    /// Only orders that have not yet drawn stock can be edited; once an
    /// order is Confirmed its manifest matches what left the batches.
    pub async fn edit_items(
        &self,
        session: &Session,
        order_id: &str,
        input: ItemsUpdateInput,
    ) -> AppResult<Order> {
        session.require_admin()?;
        let current = self.find(order_id).await?;
        if current.status.is_terminal() || current.status.commits_stock() {
            return Err(AppError::InvalidStateTransition(format!(
                "Order {} is {} and can no longer be edited",
                order_id, current.status
            )));
        }

        // Working copy merges duplicate lines before the single save
        let working = Cart::from_items(input.items)?;
        if working.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }
        validate_items(working.items())?;
        self.require_products(working.items()).await?;

        let totals = self.totals(working.items());
        let updated = self
            .stores
            .orders
            .update_items(order_id, working.items(), totals.total)
            .await?;

        tracing::info!(order_id, lines = updated.items.len(), "Order items replaced");

        self.audit
            .record(
                session,
                AuditAction::ItemsUpdate,
                AuditResource::Order,
                json!({ "id": order_id, "lines": updated.items.len(), "total": totals.total }),
            )
            .await;

        Ok(updated)
    }

    /// One order, visible to its owner and to admins
    pub async fn get_order(&self, session: &Session, order_id: &str) -> AppResult<Order> {
        let actor = session.require_actor()?;
        let order = self.find(order_id).await?;
        if !session.is_admin && order.user_id != Some(actor) {
            return Err(AppError::Forbidden);
        }
        Ok(order)
    }

    /// Orders placed by the calling actor, newest first
    pub async fn my_orders(&self, session: &Session) -> AppResult<Vec<Order>> {
        let actor = session.require_actor()?;
        Ok(self.stores.orders.list_orders_for_user(actor).await?)
    }

    /// Every order, newest first (admin)
    pub async fn list_all(&self, session: &Session) -> AppResult<Vec<Order>> {
        session.require_admin()?;
        Ok(self.stores.orders.list_orders().await?)
    }

    /// Public lookup by order id or phone
    pub async fn track(&self, query: &str) -> AppResult<TrackResult> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(TrackResult {
                found: false,
                orders: Vec::new(),
            });
        }
        let orders = self.stores.orders.find_orders(query).await?;
        Ok(TrackResult {
            found: !orders.is_empty(),
            orders,
        })
    }

    fn totals(&self, items: &[EnquiryItem]) -> OrderTotals {
        compute_order_totals(
            items,
            self.pricing.reference_unit_rate,
            self.pricing.gst_rate_percent,
        )
    }

    async fn find(&self, order_id: &str) -> AppResult<Order> {
        self.stores
            .orders
            .get_order(order_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Order {}", order_id)))
    }

    async fn require_products(&self, items: &[EnquiryItem]) -> AppResult<()> {
        for item in items {
            if self.stores.catalog.get_product(item.product_id).await?.is_none() {
                return Err(AppError::validation(
                    "items",
                    format!("Unknown product {}", item.product_id),
                ));
            }
        }
        Ok(())
    }

    /// Store the draft under a random id, retrying on collisions
    async fn insert_with_fresh_id(&self, mut draft: Order) -> AppResult<Order> {
        let attempts = self.ids.id_max_attempts.max(1);
        for attempt in 1..=attempts {
            draft.id = random_order_id(&self.ids.id_prefix);
            match self.stores.orders.insert_order(&draft).await {
                Ok(()) => return Ok(draft),
                Err(StoreError::Conflict(_)) => {
                    tracing::debug!(attempt, order_id = %draft.id, "Order id collision, retrying");
                }
                Err(e) => {
                    tracing::error!("Order write failed: {}", e);
                    return Err(e.into());
                }
            }
        }
        Err(AppError::IdGeneration { attempts })
    }

    /// SALE entry with margin over the weighted-average purchase cost
    async fn record_sale(&self, order: &Order, totals: &OrderTotals) -> AppResult<LedgerEntry> {
        let product_ids: Vec<Uuid> = order.items.iter().map(|item| item.product_id).collect();
        let prices = self.inventory.average_prices(&product_ids).await?;
        let purchase_cost: Decimal = order
            .items
            .iter()
            .map(|item| {
                prices.get(&item.product_id).copied().unwrap_or(Decimal::ZERO)
                    * Decimal::from(item.quantity)
            })
            .sum();

        let breakdown = calculate_margin(
            totals.subtotal,
            purchase_cost,
            Decimal::ZERO,
            self.pricing.gst_rate_percent,
        );

        Ok(self
            .stores
            .ledger
            .append_entry(NewLedgerEntry {
                order_id: Some(order.id.clone()),
                entry_type: LedgerEntryType::Sale,
                amount: totals.total,
                gst_amount: totals.gst_amount,
                margin: breakdown.margin,
                notes: None,
            })
            .await?)
    }
}

fn random_order_id(prefix: &str) -> String {
    let suffix = rand::thread_rng().gen_range(0..10u32.pow(ORDER_ID_DIGITS));
    format_order_id(prefix, suffix)
}
