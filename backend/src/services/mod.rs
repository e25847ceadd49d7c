//! Business logic services for the Material Cart marketplace

pub mod audit;
pub mod catalog;
pub mod inventory;
pub mod ledger;
pub mod order;
pub mod supply;

pub use audit::AuditService;
pub use catalog::CatalogService;
pub use inventory::InventoryService;
pub use ledger::LedgerService;
pub use order::OrderService;
pub use supply::SupplyService;
