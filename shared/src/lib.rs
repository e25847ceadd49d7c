//! Shared types and domain logic for the Material Cart marketplace
//!
//! This crate holds everything that has no I/O: the catalog and order data
//! model, the cart aggregator, order totals and the status machine, the
//! purchase-batch ledger, margin accounting and supplier allocation. It is
//! used by the backend and, through the wasm crate, by the storefront.

pub mod error;
pub mod models;
pub mod types;
pub mod validation;

pub use error::*;
pub use models::*;
pub use types::*;
pub use validation::*;
