//! # Repositories
//!
//! One repository per aggregate. Read-only convenience methods run on
//! the pool; every write that belongs to a settlement takes
//! `&mut SqliteConnection` so the coordinator can thread one transaction
//! through the whole write set (see `crate::settlement`).

pub mod inventory;
pub mod ledger;
pub mod order;
pub mod recipe;
pub mod sale;

pub use inventory::InventoryRepository;
pub use ledger::LedgerRepository;
pub use order::OrderRepository;
pub use recipe::RecipeRepository;
pub use sale::SaleRepository;
