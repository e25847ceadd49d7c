//! HTTP handlers for order placement, tracking and the status machine

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use shared::{Cart, Order};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::order::{
    CreateOrderInput, ItemsUpdateInput, OrderPlacement, StatusUpdateInput, TrackResult,
};
use crate::session::Session;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct TrackQuery {
    #[serde(default)]
    pub q: String,
}

/// Submit a cart as a new order
pub async fn create_order(
    State(state): State<AppState>,
    session: Session,
    Json(input): Json<CreateOrderInput>,
) -> AppResult<(StatusCode, Json<OrderPlacement>)> {
    session.require_actor()?;
    // The client's cart arrives as plain lines; rebuild it so duplicates merge
    let mut cart = Cart::from_items(input.items)?;
    let placement = state
        .order_service()
        .create_order(&session, &mut cart, input.customer)
        .await?;
    Ok((StatusCode::CREATED, Json(placement)))
}

/// All orders (admin)
pub async fn list_orders(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<Vec<Order>>> {
    let orders = state.order_service().list_all(&session).await?;
    Ok(Json(orders))
}

/// Orders of the signed-in customer
pub async fn my_orders(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<Order>>> {
    let orders = state.order_service().my_orders(&user.session()).await?;
    Ok(Json(orders))
}

/// Public tracking lookup by order id or phone
pub async fn track_orders(
    State(state): State<AppState>,
    Query(query): Query<TrackQuery>,
) -> AppResult<Json<TrackResult>> {
    let result = state.order_service().track(&query.q).await?;
    Ok(Json(result))
}

/// One order (owner or admin)
pub async fn get_order(
    State(state): State<AppState>,
    session: Session,
    Path(order_id): Path<String>,
) -> AppResult<Json<Order>> {
    let order = state.order_service().get_order(&session, &order_id).await?;
    Ok(Json(order))
}

/// Move an order through the status machine (admin)
pub async fn update_order_status(
    State(state): State<AppState>,
    session: Session,
    Path(order_id): Path<String>,
    Json(input): Json<StatusUpdateInput>,
) -> AppResult<Json<Order>> {
    let order = state
        .order_service()
        .update_status(&session, &order_id, input)
        .await?;
    Ok(Json(order))
}

/// Replace an order's manifest (admin)
pub async fn update_order_items(
    State(state): State<AppState>,
    session: Session,
    Path(order_id): Path<String>,
    Json(input): Json<ItemsUpdateInput>,
) -> AppResult<Json<Order>> {
    let order = state
        .order_service()
        .edit_items(&session, &order_id, input)
        .await?;
    Ok(Json(order))
}
