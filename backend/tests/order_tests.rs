//! Order engine tests
//!
//! Covers order placement, the status machine, stock depletion at
//! confirmation, manifest edits and public tracking.

mod common;

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use shared::{
    Cart, EnquiryItem, LedgerEntry, LedgerEntryType, NewLedgerEntry, Order, OrderStatus,
};
use uuid::Uuid;

use common::{customer_details, fixture, fixture_with, line, Fixture};
use materialcart_backend::services::order::{ItemsUpdateInput, StatusUpdateInput};
use materialcart_backend::store::{
    AuditStore, BatchStore, CatalogStore, LedgerStore, MemoryStore, OrderStore, StoreError,
    StoreResult,
};
use materialcart_backend::{AppError, Session};

// ============================================================================
// Store Wrappers
// ============================================================================

/// Ledger that is always offline
struct OfflineLedger;

#[async_trait]
impl LedgerStore for OfflineLedger {
    async fn append_entry(&self, _entry: NewLedgerEntry) -> StoreResult<LedgerEntry> {
        Err(StoreError::Backend("ledger connection reset".to_string()))
    }

    async fn list_entries(&self) -> StoreResult<Vec<LedgerEntry>> {
        Ok(Vec::new())
    }
}

/// Order store that can reject inserts or status writes
struct FlakyOrders {
    inner: Arc<MemoryStore>,
    insert_error: Option<StoreError>,
    status_error: Option<StoreError>,
    /// Status another admin writes just before ours lands
    competing_status: Option<OrderStatus>,
    inserts: AtomicU32,
}

impl FlakyOrders {
    fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            insert_error: None,
            status_error: None,
            competing_status: None,
            inserts: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl OrderStore for FlakyOrders {
    async fn insert_order(&self, order: &Order) -> StoreResult<()> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        match &self.insert_error {
            Some(e) => Err(e.clone()),
            None => self.inner.insert_order(order).await,
        }
    }

    async fn get_order(&self, id: &str) -> StoreResult<Option<Order>> {
        self.inner.get_order(id).await
    }

    async fn list_orders(&self) -> StoreResult<Vec<Order>> {
        self.inner.list_orders().await
    }

    async fn list_orders_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Order>> {
        self.inner.list_orders_for_user(user_id).await
    }

    async fn find_orders(&self, query: &str) -> StoreResult<Vec<Order>> {
        self.inner.find_orders(query).await
    }

    async fn update_status(
        &self,
        id: &str,
        expected: OrderStatus,
        status: OrderStatus,
        admin_notes: Option<&str>,
    ) -> StoreResult<Order> {
        if let Some(competing) = self.competing_status {
            self.inner.update_status(id, expected, competing, None).await?;
        }
        match &self.status_error {
            Some(e) => Err(e.clone()),
            None => self.inner.update_status(id, expected, status, admin_notes).await,
        }
    }

    async fn update_items(
        &self,
        id: &str,
        items: &[EnquiryItem],
        total_amount: Decimal,
    ) -> StoreResult<Order> {
        self.inner.update_items(id, items, total_amount).await
    }
}

// ============================================================================
// Helpers
// ============================================================================

async fn place(fx: &Fixture, session: &Session, items: Vec<EnquiryItem>) -> Order {
    let mut cart = Cart::from_items(items).unwrap();
    fx.state
        .order_service()
        .create_order(session, &mut cart, customer_details())
        .await
        .unwrap()
        .order
}

async fn set_status(fx: &Fixture, order_id: &str, status: OrderStatus) -> Result<Order, AppError> {
    fx.state
        .order_service()
        .update_status(
            &fx.admin,
            order_id,
            StatusUpdateInput {
                status,
                admin_notes: None,
            },
        )
        .await
}

async fn remaining(fx: &Fixture, product_id: Uuid) -> Vec<i32> {
    fx.memory
        .batches_for_product(product_id)
        .await
        .unwrap()
        .iter()
        .map(|b| b.quantity_remaining)
        .collect()
}

// ============================================================================
// Order Placement
// ============================================================================

#[tokio::test]
async fn test_order_totals_for_three_lines() {
    let fx = fixture().await;
    let cement = fx.add_product("OPC 53 Grade Cement", "bag").await;
    let steel = fx.add_product("TMT Bar 12mm", "piece").await;
    let sand = fx.add_product("River Sand", "brass").await;

    let mut cart = Cart::new();
    cart.add(line(&cement, 2)).unwrap();
    cart.add(line(&steel, 5)).unwrap();
    cart.add(line(&sand, 1)).unwrap();

    let placement = fx
        .state
        .order_service()
        .create_order(&fx.customer, &mut cart, customer_details())
        .await
        .unwrap();

    assert_eq!(placement.totals.subtotal, dec!(4000));
    assert_eq!(placement.totals.gst_amount, dec!(720));
    assert_eq!(placement.totals.total, dec!(4720));
    assert_eq!(placement.order.total_amount, Some(dec!(4720)));
    assert_eq!(placement.order.status, OrderStatus::Pending);
    assert_eq!(placement.order.user_id, fx.customer.actor);
    assert!(shared::is_order_id(&placement.order.id, "MCART"));
    assert!(cart.is_empty());

    let stored = fx.memory.get_order(&placement.order.id).await.unwrap();
    assert_eq!(stored.map(|o| o.items.len()), Some(3));
}

#[tokio::test]
async fn test_sale_entry_without_batches_has_full_margin() {
    let fx = fixture().await;
    let bricks = fx.add_product("Red Clay Brick", "piece").await;

    let mut cart = Cart::from_items(vec![line(&bricks, 4)]).unwrap();
    let placement = fx
        .state
        .order_service()
        .create_order(&fx.customer, &mut cart, customer_details())
        .await
        .unwrap();

    let entry = placement.ledger_entry.expect("sale entry");
    assert_eq!(entry.entry_type, LedgerEntryType::Sale);
    assert_eq!(entry.order_id.as_deref(), Some(placement.order.id.as_str()));
    assert_eq!(entry.amount, dec!(2360));
    assert_eq!(entry.gst_amount, dec!(360));
    assert_eq!(entry.margin, dec!(2000));
    assert!(placement.ledger_error.is_none());
}

#[tokio::test]
async fn test_sale_margin_uses_weighted_average_cost() {
    let fx = fixture().await;
    let cement = fx.add_product("PPC Cement", "bag").await;
    let vendor = fx.add_vendor("Krishna Traders", None).await;
    fx.add_batch(cement.id, vendor.id, 100, dec!(10), 20).await;
    fx.add_batch(cement.id, vendor.id, 50, dec!(16), 10).await;

    let mut cart = Cart::from_items(vec![line(&cement, 10)]).unwrap();
    let placement = fx
        .state
        .order_service()
        .create_order(&fx.customer, &mut cart, customer_details())
        .await
        .unwrap();

    // subtotal 5000, cost 10 × 12
    let entry = placement.ledger_entry.unwrap();
    assert_eq!(entry.amount, dec!(5900));
    assert_eq!(entry.margin, dec!(4880));

    // Placing an order does not touch stock
    assert_eq!(remaining(&fx, cement.id).await, vec![100, 50]);
}

#[tokio::test]
async fn test_ledger_failure_still_places_order() {
    let fx = fixture_with(|stores| materialcart_backend::Stores {
        ledger: Arc::new(OfflineLedger),
        ..stores
    })
    .await;
    let blocks = fx.add_product("AAC Block", "piece").await;

    let mut cart = Cart::from_items(vec![line(&blocks, 3)]).unwrap();
    let placement = fx
        .state
        .order_service()
        .create_order(&fx.customer, &mut cart, customer_details())
        .await
        .expect("order placed despite ledger outage");

    assert!(cart.is_empty());
    assert!(placement.ledger_entry.is_none());
    assert!(placement
        .ledger_error
        .as_deref()
        .is_some_and(|e| e.contains("ledger connection reset")));
    assert!(fx.memory.get_order(&placement.order.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_empty_cart_is_rejected_without_side_effects() {
    let fx = fixture().await;
    let mut cart = Cart::new();

    let err = fx
        .state
        .order_service()
        .create_order(&fx.customer, &mut cart, customer_details())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation { ref field, .. } if field == "items"));
    assert!(fx.memory.list_orders().await.unwrap().is_empty());
    assert!(fx.memory.list_entries().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_anonymous_submit_requires_authentication() {
    let fx = fixture().await;
    let sand = fx.add_product("M-Sand", "brass").await;
    let mut cart = Cart::from_items(vec![line(&sand, 1)]).unwrap();

    let err = fx
        .state
        .order_service()
        .create_order(&Session::anonymous(), &mut cart, customer_details())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::AuthenticationRequired));
    assert_eq!(cart.len(), 1);
    assert!(fx.memory.list_orders().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_blank_contact_fields_are_rejected() {
    let fx = fixture().await;
    let sand = fx.add_product("M-Sand", "brass").await;
    let mut cart = Cart::from_items(vec![line(&sand, 1)]).unwrap();
    let mut details = customer_details();
    details.phone = "   ".to_string();

    let err = fx
        .state
        .order_service()
        .create_order(&fx.customer, &mut cart, details)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation { ref field, .. } if field == "phone"));
    assert_eq!(cart.len(), 1);
}

#[tokio::test]
async fn test_unknown_product_is_rejected() {
    let fx = fixture().await;
    let ghost = EnquiryItem::new(Uuid::new_v4(), "Discontinued Tile", 2, "box");
    let mut cart = Cart::from_items(vec![ghost]).unwrap();

    let err = fx
        .state
        .order_service()
        .create_order(&fx.customer, &mut cart, customer_details())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation { .. }));
    assert!(fx.memory.list_orders().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_order_write_failure_keeps_cart() {
    let memory = Arc::new(MemoryStore::new());
    let mut flaky = FlakyOrders::new(memory.clone());
    flaky.insert_error = Some(StoreError::Backend("permission denied".to_string()));
    let fx = fixture_with(|stores| materialcart_backend::Stores {
        orders: Arc::new(flaky),
        ..stores
    })
    .await;
    let pipe = fx.add_product("PVC Pipe 4in", "piece").await;
    let mut cart = Cart::from_items(vec![line(&pipe, 6)]).unwrap();

    let err = fx
        .state
        .order_service()
        .create_order(&fx.customer, &mut cart, customer_details())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Persistence(ref msg) if msg.contains("permission denied")));
    assert_eq!(cart.len(), 1);
    assert!(fx.memory.list_entries().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_id_collisions_exhaust_retries() {
    let memory = Arc::new(MemoryStore::new());
    let mut flaky = FlakyOrders::new(memory);
    flaky.insert_error = Some(StoreError::Conflict("duplicate key".to_string()));
    let flaky = Arc::new(flaky);
    let orders: Arc<dyn OrderStore> = flaky.clone();
    let fx = fixture_with(|stores| materialcart_backend::Stores { orders, ..stores }).await;
    let wire = fx.add_product("Copper Wire 2.5mm", "coil").await;
    let mut cart = Cart::from_items(vec![line(&wire, 1)]).unwrap();

    let err = fx
        .state
        .order_service()
        .create_order(&fx.customer, &mut cart, customer_details())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::IdGeneration { attempts: 5 }));
    assert_eq!(flaky.inserts.load(Ordering::SeqCst), 5);
    assert_eq!(cart.len(), 1);
}

// ============================================================================
// Status Machine
// ============================================================================

#[tokio::test]
async fn test_confirmation_depletes_fifo_and_audits() {
    let fx = fixture().await;
    let cement = fx.add_product("OPC 43 Cement", "bag").await;
    let vendor = fx.add_vendor("Sangli Cement Depot", None).await;
    fx.add_batch(cement.id, vendor.id, 50, dec!(16), 10).await;
    fx.add_batch(cement.id, vendor.id, 100, dec!(10), 20).await;

    let order = place(&fx, &fx.customer, vec![line(&cement, 120)]).await;
    let confirmed = set_status(&fx, &order.id, OrderStatus::Confirmed).await.unwrap();
    assert_eq!(confirmed.status, OrderStatus::Confirmed);

    // Older batch first: 100 from it, then 20 from the newer one
    let batches = fx.memory.batches_for_product(cement.id).await.unwrap();
    assert_eq!(batches[0].quantity_purchased, 100);
    assert_eq!(batches[0].quantity_remaining, 0);
    assert_eq!(batches[1].quantity_remaining, 30);

    let product = fx.memory.get_product(cement.id).await.unwrap().unwrap();
    assert_eq!(product.stock_quantity, 30);

    let audit = fx.memory.recent(10).await.unwrap();
    let entry = audit
        .iter()
        .find(|a| a.action == "STATUS_UPDATE")
        .expect("status audit");
    assert_eq!(entry.resource, "ORDER");
    assert_eq!(entry.user_id, fx.admin.actor);
    assert_eq!(entry.metadata["id"], order.id.as_str());
    assert_eq!(entry.metadata["to"], "Confirmed");

    // Moving further along does not deplete again
    set_status(&fx, &order.id, OrderStatus::Shipped).await.unwrap();
    assert_eq!(remaining(&fx, cement.id).await, vec![0, 30]);
}

#[tokio::test]
async fn test_insufficient_stock_blocks_confirmation() {
    let fx = fixture().await;
    let steel = fx.add_product("TMT Bar 16mm", "piece").await;
    let vendor = fx.add_vendor("Miraj Steel", None).await;
    fx.add_batch(steel.id, vendor.id, 100, dec!(650), 5).await;
    fx.add_batch(steel.id, vendor.id, 50, dec!(640), 2).await;

    let order = place(&fx, &fx.customer, vec![line(&steel, 200)]).await;
    let err = set_status(&fx, &order.id, OrderStatus::Confirmed).await.unwrap_err();

    assert!(matches!(err, AppError::InsufficientStock(_)));
    assert_eq!(remaining(&fx, steel.id).await, vec![100, 50]);
    let stored = fx.memory.get_order(&order.id).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Pending);
    assert!(fx
        .memory
        .recent(10)
        .await
        .unwrap()
        .iter()
        .all(|a| a.action != "STATUS_UPDATE"));
}

#[tokio::test]
async fn test_shortfall_on_any_line_depletes_nothing() {
    let fx = fixture().await;
    let cement = fx.add_product("PPC Cement", "bag").await;
    let sand = fx.add_product("River Sand", "brass").await;
    let vendor = fx.add_vendor("Kupwad Suppliers", None).await;
    fx.add_batch(cement.id, vendor.id, 40, dec!(380), 3).await;
    fx.add_batch(sand.id, vendor.id, 2, dec!(5200), 3).await;

    let order = place(&fx, &fx.customer, vec![line(&cement, 10), line(&sand, 5)]).await;
    let err = set_status(&fx, &order.id, OrderStatus::Shipped).await.unwrap_err();

    assert!(matches!(err, AppError::InsufficientStock(_)));
    assert_eq!(remaining(&fx, cement.id).await, vec![40]);
    assert_eq!(remaining(&fx, sand.id).await, vec![2]);
}

#[tokio::test]
async fn test_failed_status_write_restocks() {
    let memory = Arc::new(MemoryStore::new());
    let mut flaky = FlakyOrders::new(memory.clone());
    flaky.status_error = Some(StoreError::Backend("row level security".to_string()));
    let fx = fixture_with(|stores| materialcart_backend::Stores {
        orders: Arc::new(flaky),
        ..stores
    })
    .await;

    let tiles = fx.add_product("Vitrified Tile", "box").await;
    let vendor = fx.add_vendor("Tile House", None).await;
    fx.add_batch(tiles.id, vendor.id, 30, dec!(900), 1).await;

    // FlakyOrders wraps a separate memory store, so seed the order through it
    let mut cart = Cart::from_items(vec![line(&tiles, 12)]).unwrap();
    let order = fx
        .state
        .order_service()
        .create_order(&fx.customer, &mut cart, customer_details())
        .await
        .unwrap()
        .order;
    assert!(memory.get_order(&order.id).await.unwrap().is_some());

    let err = set_status(&fx, &order.id, OrderStatus::Confirmed).await.unwrap_err();
    assert!(matches!(err, AppError::Persistence(_)));
    assert_eq!(remaining(&fx, tiles.id).await, vec![30]);
    assert_eq!(
        memory.get_order(&order.id).await.unwrap().unwrap().status,
        OrderStatus::Pending
    );
}

#[tokio::test]
async fn test_losing_a_concurrent_confirm_restocks() {
    let memory = Arc::new(MemoryStore::new());
    let mut flaky = FlakyOrders::new(memory.clone());
    flaky.competing_status = Some(OrderStatus::Called);
    let fx = fixture_with(|stores| materialcart_backend::Stores {
        orders: Arc::new(flaky),
        ..stores
    })
    .await;

    let tiles = fx.add_product("Vitrified Tile", "box").await;
    let vendor = fx.add_vendor("Tile House", None).await;
    fx.add_batch(tiles.id, vendor.id, 30, dec!(900), 1).await;
    let order = place(&fx, &fx.customer, vec![line(&tiles, 12)]).await;

    // Another admin moves the order first; our write expected Pending
    let err = set_status(&fx, &order.id, OrderStatus::Confirmed).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidStateTransition(_)));
    assert_eq!(remaining(&fx, tiles.id).await, vec![30]);

    let stored = memory.get_order(&order.id).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Called);

    let stale = memory
        .update_status(&order.id, OrderStatus::Pending, OrderStatus::Confirmed, None)
        .await;
    assert!(matches!(stale, Err(StoreError::Conflict(_))));
}

#[tokio::test]
async fn test_terminal_states_are_frozen() {
    let fx = fixture().await;
    let bricks = fx.add_product("Fly Ash Brick", "piece").await;
    let order = place(&fx, &fx.customer, vec![line(&bricks, 500)]).await;

    set_status(&fx, &order.id, OrderStatus::Cancelled).await.unwrap();
    let err = set_status(&fx, &order.id, OrderStatus::Confirmed).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidStateTransition(_)));

    // Re-setting the same status amends notes only
    let noted = fx
        .state
        .order_service()
        .update_status(
            &fx.admin,
            &order.id,
            StatusUpdateInput {
                status: OrderStatus::Cancelled,
                admin_notes: Some("Customer bought locally".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(noted.admin_notes.as_deref(), Some("Customer bought locally"));
}

#[tokio::test]
async fn test_status_update_requires_admin() {
    let fx = fixture().await;
    let bricks = fx.add_product("Fly Ash Brick", "piece").await;
    let order = place(&fx, &fx.customer, vec![line(&bricks, 10)]).await;

    let err = fx
        .state
        .order_service()
        .update_status(
            &fx.customer,
            &order.id,
            StatusUpdateInput {
                status: OrderStatus::Called,
                admin_notes: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
}

#[tokio::test]
async fn test_unknown_order_is_not_found() {
    let fx = fixture().await;
    let err = set_status(&fx, "MCART-000000", OrderStatus::Called).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

// ============================================================================
// Manifest Edits
// ============================================================================

#[tokio::test]
async fn test_item_edit_merges_lines_and_recomputes_total() {
    let fx = fixture().await;
    let cement = fx.add_product("OPC 53 Cement", "bag").await;
    let sand = fx.add_product("River Sand", "brass").await;
    let order = place(&fx, &fx.customer, vec![line(&cement, 2)]).await;
    assert_eq!(order.total_amount, Some(dec!(1180)));

    let updated = fx
        .state
        .order_service()
        .edit_items(
            &fx.admin,
            &order.id,
            ItemsUpdateInput {
                items: vec![line(&cement, 3), line(&sand, 1), line(&cement, 2)],
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.items.len(), 2);
    assert_eq!(updated.items[0].quantity, 5);
    assert_eq!(updated.total_amount, Some(dec!(3540)));

    let audit = fx.memory.recent(10).await.unwrap();
    assert!(audit.iter().any(|a| a.action == "ITEMS_UPDATE"));
}

#[tokio::test]
async fn test_item_edit_refused_once_stock_is_drawn() {
    let fx = fixture().await;
    let cement = fx.add_product("OPC 53 Cement", "bag").await;
    let vendor = fx.add_vendor("Sangli Cement Depot", None).await;
    fx.add_batch(cement.id, vendor.id, 100, dec!(340), 5).await;
    let order = place(&fx, &fx.customer, vec![line(&cement, 10)]).await;
    set_status(&fx, &order.id, OrderStatus::Confirmed).await.unwrap();

    let err = fx
        .state
        .order_service()
        .edit_items(&fx.admin, &order.id, ItemsUpdateInput { items: vec![line(&cement, 60)] })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidStateTransition(_)));

    let stored = fx.memory.get_order(&order.id).await.unwrap().unwrap();
    assert_eq!(stored.items[0].quantity, 10);
    assert_eq!(remaining(&fx, cement.id).await, vec![90]);
}

#[tokio::test]
async fn test_item_edit_rejects_bad_lines_and_terminal_orders() {
    let fx = fixture().await;
    let cement = fx.add_product("OPC 53 Cement", "bag").await;
    let order = place(&fx, &fx.customer, vec![line(&cement, 2)]).await;

    let err = fx
        .state
        .order_service()
        .edit_items(
            &fx.admin,
            &order.id,
            ItemsUpdateInput {
                items: vec![line(&cement, 0)],
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation { .. }));

    set_status(&fx, &order.id, OrderStatus::Cancelled).await.unwrap();
    let err = fx
        .state
        .order_service()
        .edit_items(
            &fx.admin,
            &order.id,
            ItemsUpdateInput {
                items: vec![line(&cement, 1)],
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidStateTransition(_)));
}

// ============================================================================
// Tracking
// ============================================================================

#[tokio::test]
async fn test_tracking_by_id_and_phone() {
    let fx = fixture().await;
    let bricks = fx.add_product("Red Clay Brick", "piece").await;
    let order = place(&fx, &fx.customer, vec![line(&bricks, 1000)]).await;
    let service = fx.state.order_service();

    let by_id = service.track(&order.id).await.unwrap();
    assert!(by_id.found);
    assert_eq!(by_id.orders[0].id, order.id);

    let by_phone = service.track(" 9876543210 ").await.unwrap();
    assert!(by_phone.found);

    let missing = service.track("MCART-999999").await.unwrap();
    assert!(!missing.found);
    assert!(missing.orders.is_empty());

    assert!(!service.track("").await.unwrap().found);
}

#[tokio::test]
async fn test_customers_see_only_their_orders() {
    let fx = fixture().await;
    let bricks = fx.add_product("Red Clay Brick", "piece").await;
    let order = place(&fx, &fx.customer, vec![line(&bricks, 10)]).await;
    let stranger = Session::customer(Uuid::new_v4());
    let service = fx.state.order_service();

    assert_eq!(service.my_orders(&fx.customer).await.unwrap().len(), 1);
    assert!(service.my_orders(&stranger).await.unwrap().is_empty());
    assert!(matches!(
        service.get_order(&stranger, &order.id).await,
        Err(AppError::Forbidden)
    ));
    assert!(service.get_order(&fx.admin, &order.id).await.is_ok());
    assert!(matches!(
        service.list_all(&fx.customer).await,
        Err(AppError::Forbidden)
    ));
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// Stored total and sale amount always equal Σq × 500 × 1.18
        #[test]
        fn prop_placed_total_matches_formula(
            quantities in prop::collection::vec(1i32..500, 1..6)
        ) {
            let runtime = tokio::runtime::Runtime::new().unwrap();
            runtime.block_on(async {
                let fx = fixture().await;
                let mut cart = Cart::new();
                for (i, qty) in quantities.iter().enumerate() {
                    let product = fx.add_product(&format!("Item {}", i), "bag").await;
                    cart.add(line(&product, *qty)).unwrap();
                }

                let placement = fx
                    .state
                    .order_service()
                    .create_order(&fx.customer, &mut cart, customer_details())
                    .await
                    .unwrap();

                let units: i64 = quantities.iter().map(|q| *q as i64).sum();
                let expected = Decimal::from(units) * dec!(500) * dec!(1.18);
                assert_eq!(placement.order.total_amount, Some(expected));
                assert_eq!(placement.ledger_entry.map(|e| e.amount), Some(expected));
            });
        }
    }
}
