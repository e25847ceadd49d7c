//! HTTP handlers

pub mod audit;
pub mod catalog;
pub mod health;
pub mod inventory;
pub mod ledger;
pub mod orders;
pub mod supply;

pub use audit::*;
pub use catalog::*;
pub use health::*;
pub use inventory::*;
pub use ledger::*;
pub use orders::*;
pub use supply::*;
