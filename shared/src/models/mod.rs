//! Domain models for the Material Cart marketplace

mod accounting;
mod audit;
mod cart;
mod catalog;
mod inventory;
mod ledger;
mod order;
mod supply;

pub use accounting::*;
pub use audit::*;
pub use cart::*;
pub use catalog::*;
pub use inventory::*;
pub use ledger::*;
pub use order::*;
pub use supply::*;
