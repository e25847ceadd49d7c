//! HTTP handlers for the product and vendor catalog

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use shared::{Category, Product, Vendor};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::catalog::{ProductInput, VendorInput};
use crate::session::Session;
use crate::AppState;

pub async fn list_categories(State(state): State<AppState>) -> AppResult<Json<Vec<Category>>> {
    let categories = state.catalog_service().list_categories().await?;
    Ok(Json(categories))
}

pub async fn list_products(State(state): State<AppState>) -> AppResult<Json<Vec<Product>>> {
    let products = state.catalog_service().list_products().await?;
    Ok(Json(products))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<Product>> {
    let product = state.catalog_service().get_product(product_id).await?;
    Ok(Json(product))
}

/// Create or replace a product
pub async fn save_product(
    State(state): State<AppState>,
    session: Session,
    Json(input): Json<ProductInput>,
) -> AppResult<Json<Product>> {
    let product = state.catalog_service().upsert_product(&session, input).await?;
    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    session: Session,
    Path(product_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state
        .catalog_service()
        .delete_product(&session, product_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_vendors(State(state): State<AppState>) -> AppResult<Json<Vec<Vendor>>> {
    let vendors = state.catalog_service().list_vendors().await?;
    Ok(Json(vendors))
}

/// Create or replace a vendor
pub async fn save_vendor(
    State(state): State<AppState>,
    session: Session,
    Json(input): Json<VendorInput>,
) -> AppResult<Json<Vendor>> {
    let vendor = state.catalog_service().upsert_vendor(&session, input).await?;
    Ok(Json(vendor))
}

pub async fn delete_vendor(
    State(state): State<AppState>,
    session: Session,
    Path(vendor_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state
        .catalog_service()
        .delete_vendor(&session, vendor_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
