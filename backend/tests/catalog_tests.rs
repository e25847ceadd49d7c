//! Catalog, manual ledger and audit log tests

mod common;

use rust_decimal_macros::dec;
use shared::{Cart, LedgerEntryType};
use uuid::Uuid;

use common::{customer_details, fixture, line, performance};
use materialcart_backend::services::catalog::{ProductInput, VendorInput};
use materialcart_backend::services::ledger::ManualEntryInput;
use materialcart_backend::store::{AuditStore, CatalogStore};
use materialcart_backend::{AppError, Session};

fn product_input(category_id: Uuid) -> ProductInput {
    ProductInput {
        id: None,
        category_id,
        name: "  UltraTech OPC 53  ".to_string(),
        uom: "bag".to_string(),
        price_range: "₹380 - ₹410".to_string(),
        gst_percentage: dec!(28),
        sku: Some("   ".to_string()),
        vendor_id: None,
        description: None,
    }
}

fn vendor_input() -> VendorInput {
    VendorInput {
        id: None,
        name: "Shree Traders".to_string(),
        contact_person: Some("Anil Kulkarni".to_string()),
        phone: Some("9822012345".to_string()),
        email: Some("orders@shreetraders.in".to_string()),
        is_active: true,
        performance: Some(performance("0.92", "4.4", "0.8")),
    }
}

// ============================================================================
// Products
// ============================================================================

#[tokio::test]
async fn test_product_upsert_normalizes_and_audits() {
    let fx = fixture().await;
    let service = fx.state.catalog_service();

    let product = service
        .upsert_product(&fx.admin, product_input(fx.category_id))
        .await
        .unwrap();

    assert_eq!(product.name, "UltraTech OPC 53");
    assert!(product.sku.is_none());
    assert_eq!(product.stock_quantity, 0);

    let audit = fx.memory.recent(1).await.unwrap();
    assert_eq!(audit[0].action, "UPSERT");
    assert_eq!(audit[0].resource, "PRODUCT");
    assert_eq!(audit[0].metadata["id"], product.id.to_string());
}

#[tokio::test]
async fn test_product_update_keeps_stock_and_created_at() {
    let fx = fixture().await;
    let service = fx.state.catalog_service();
    let original = service
        .upsert_product(&fx.admin, product_input(fx.category_id))
        .await
        .unwrap();
    fx.memory.set_stock_quantity(original.id, 75).await.unwrap();

    let mut edit = product_input(fx.category_id);
    edit.id = Some(original.id);
    edit.price_range = "₹390 - ₹420".to_string();
    let updated = service.upsert_product(&fx.admin, edit).await.unwrap();

    assert_eq!(updated.id, original.id);
    assert_eq!(updated.price_range, "₹390 - ₹420");
    assert_eq!(updated.stock_quantity, 75);
    assert_eq!(updated.created_at, original.created_at);
    assert_eq!(service.list_products().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_product_validation() {
    let fx = fixture().await;
    let service = fx.state.catalog_service();

    let mut gst = product_input(fx.category_id);
    gst.gst_percentage = dec!(30);
    assert!(matches!(
        service.upsert_product(&fx.admin, gst).await,
        Err(AppError::Validation { field, .. }) if field == "gst_percentage"
    ));

    let mut range = product_input(fx.category_id);
    range.price_range = "on request".to_string();
    assert!(matches!(
        service.upsert_product(&fx.admin, range).await,
        Err(AppError::Validation { field, .. }) if field == "price_range"
    ));

    let unknown_category = product_input(Uuid::new_v4());
    assert!(matches!(
        service.upsert_product(&fx.admin, unknown_category).await,
        Err(AppError::Validation { field, .. }) if field == "category_id"
    ));

    let mut unknown_vendor = product_input(fx.category_id);
    unknown_vendor.vendor_id = Some(Uuid::new_v4());
    assert!(matches!(
        service.upsert_product(&fx.admin, unknown_vendor).await,
        Err(AppError::NotFound(_))
    ));

    let mut blank = product_input(fx.category_id);
    blank.name = String::new();
    assert!(matches!(
        service.upsert_product(&fx.admin, blank).await,
        Err(AppError::Validation { .. })
    ));

    assert!(service.list_products().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_catalog_writes_are_admin_only() {
    let fx = fixture().await;
    let service = fx.state.catalog_service();

    assert!(matches!(
        service.upsert_product(&fx.customer, product_input(fx.category_id)).await,
        Err(AppError::Forbidden)
    ));
    assert!(matches!(
        service.upsert_vendor(&Session::anonymous(), vendor_input()).await,
        Err(AppError::AuthenticationRequired)
    ));
}

#[tokio::test]
async fn test_delete_missing_product_is_not_found() {
    let fx = fixture().await;
    let service = fx.state.catalog_service();
    let product = fx.add_product("Binding Wire", "kg").await;

    service.delete_product(&fx.admin, product.id).await.unwrap();
    assert!(matches!(
        service.get_product(product.id).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        service.delete_product(&fx.admin, product.id).await,
        Err(AppError::NotFound(_))
    ));

    let audit = fx.memory.recent(10).await.unwrap();
    assert_eq!(audit.iter().filter(|a| a.action == "DELETE").count(), 1);
}

// ============================================================================
// Vendors
// ============================================================================

#[tokio::test]
async fn test_vendor_upsert_and_performance_bounds() {
    let fx = fixture().await;
    let service = fx.state.catalog_service();

    let vendor = service.upsert_vendor(&fx.admin, vendor_input()).await.unwrap();
    assert!(vendor.is_active);
    assert_eq!(service.get_vendor(vendor.id).await.unwrap().name, "Shree Traders");

    let mut bad_rating = vendor_input();
    bad_rating.performance = Some(performance("0.9", "5.5", "1"));
    assert!(matches!(
        service.upsert_vendor(&fx.admin, bad_rating).await,
        Err(AppError::Validation { field, .. }) if field == "performance"
    ));

    let mut bad_email = vendor_input();
    bad_email.email = Some("not-an-email".to_string());
    assert!(matches!(
        service.upsert_vendor(&fx.admin, bad_email).await,
        Err(AppError::Validation { field, .. }) if field == "email"
    ));

    service.delete_vendor(&fx.admin, vendor.id).await.unwrap();
    assert!(service.list_vendors().await.unwrap().is_empty());
}

// ============================================================================
// Manual Ledger Entries
// ============================================================================

#[tokio::test]
async fn test_manual_ledger_entry_against_order() {
    let fx = fixture().await;
    let cement = fx.add_product("PPC Cement", "bag").await;
    let mut cart = Cart::from_items(vec![line(&cement, 10)]).unwrap();
    let placed = fx
        .state
        .order_service()
        .create_order(&fx.customer, &mut cart, customer_details())
        .await
        .unwrap();

    let entry = fx
        .state
        .ledger_service()
        .record_manual(
            &fx.admin,
            ManualEntryInput {
                entry_type: LedgerEntryType::Logistics,
                order_id: Some(placed.order.id.clone()),
                amount: dec!(646.005),
                gst_amount: dec!(0),
                notes: Some("Tempo to Vishrambag".to_string()),
            },
        )
        .await
        .unwrap();

    assert_eq!(entry.amount, dec!(646.00));
    assert_eq!(entry.order_id.as_deref(), Some(placed.order.id.as_str()));

    let entries = fx.state.ledger_service().list(&fx.admin).await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].entry_type, LedgerEntryType::Logistics);
    assert_eq!(entries[1].entry_type, LedgerEntryType::Sale);

    let audit = fx.memory.recent(1).await.unwrap();
    assert_eq!(audit[0].action, "LEDGER_ENTRY");
}

#[tokio::test]
async fn test_manual_ledger_entry_restrictions() {
    let fx = fixture().await;
    let service = fx.state.ledger_service();
    let entry = |entry_type, order_id: Option<&str>, amount| ManualEntryInput {
        entry_type,
        order_id: order_id.map(str::to_string),
        amount,
        gst_amount: dec!(0),
        notes: None,
    };

    let sale = service
        .record_manual(&fx.admin, entry(LedgerEntryType::Sale, None, dec!(100)))
        .await;
    assert!(matches!(sale, Err(AppError::Validation { field, .. }) if field == "type"));

    let negative = service
        .record_manual(&fx.admin, entry(LedgerEntryType::Gst, None, dec!(-5)))
        .await;
    assert!(matches!(negative, Err(AppError::Validation { field, .. }) if field == "amount"));

    let orphan = service
        .record_manual(
            &fx.admin,
            entry(LedgerEntryType::Logistics, Some("MCART-000001"), dec!(250)),
        )
        .await;
    assert!(matches!(orphan, Err(AppError::NotFound(_))));

    let customer = service
        .record_manual(&fx.customer, entry(LedgerEntryType::Gst, None, dec!(10)))
        .await;
    assert!(matches!(customer, Err(AppError::Forbidden)));

    assert!(service.list(&fx.admin).await.unwrap().is_empty());
}

// ============================================================================
// Audit Log
// ============================================================================

#[tokio::test]
async fn test_audit_log_is_newest_first_and_admin_only() {
    let fx = fixture().await;
    let catalog = fx.state.catalog_service();
    let first = catalog.upsert_vendor(&fx.admin, vendor_input()).await.unwrap();
    catalog.delete_vendor(&fx.admin, first.id).await.unwrap();

    let logs = fx.state.audit_service().recent(&fx.admin).await.unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].action, "DELETE");
    assert_eq!(logs[1].action, "UPSERT");
    assert!(logs.iter().all(|log| log.user_id == fx.admin.actor));

    assert!(matches!(
        fx.state.audit_service().recent(&fx.customer).await,
        Err(AppError::Forbidden)
    ));
}
