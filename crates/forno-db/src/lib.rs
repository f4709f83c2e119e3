//! # Forno POS Database Layer
//!
//! SQLite persistence and the settlement orchestration that runs on top
//! of it, backing the point-of-sale money path.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        forno-db                             │
//! │                                                             │
//! │  ┌───────────────┐      ┌─────────────────────────────────┐ │
//! │  │  settlement   │─────▶│  repository                     │ │
//! │  │  (coordinator)│      │  orders / sales / recipes       │ │
//! │  └───────┬───────┘      │  inventory / ledgers            │ │
//! │          │              └───────────────┬─────────────────┘ │
//! │          │                              │                   │
//! │          ▼                              ▼                   │
//! │  ┌───────────────┐      ┌─────────────────────────────────┐ │
//! │  │  pool         │─────▶│  migrations (embedded SQL)      │ │
//! │  │  (Database)   │      └─────────────────────────────────┘ │
//! │  └───────────────┘                                          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The pure domain types, validation, and recipe math live in
//! `forno-core`; this crate owns everything that touches SQL.

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod settlement;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use settlement::{SettlementConfig, SettlementCoordinator, StockPolicy};
