//! Domain errors raised by the pure core

use thiserror::Error;
use uuid::Uuid;

use crate::models::OrderStatus;

/// Errors produced by domain operations before any persistence happens
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Nothing to submit: the cart is empty")]
    EmptyCart,

    #[error("Quantity must be at least 1, got {0}")]
    InvalidQuantity(i64),

    #[error("Quantity {0} exceeds the per-line limit of {max}", max = crate::validation::MAX_LINE_QUANTITY)]
    QuantityTooLarge(i64),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: Uuid,
        requested: i64,
        available: i64,
    },

    #[error("Cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
}

pub type CoreResult<T> = Result<T, CoreError>;
