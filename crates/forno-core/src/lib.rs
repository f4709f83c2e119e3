//! # forno-core: Pure Business Logic for Forno POS
//!
//! This crate is the heart of the Forno POS settlement path. It contains
//! all business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Forno POS Architecture                       │
//! │                                                                 │
//! │  Remote caller (registerSale payload)                           │
//! │       │                                                         │
//! │  ┌────▼────────────────────────────────────────────────────┐    │
//! │  │             ★ forno-core (THIS CRATE) ★                 │    │
//! │  │                                                         │    │
//! │  │  ┌────────┐ ┌───────┐ ┌────────────┐ ┌─────────────┐    │    │
//! │  │  │ types  │ │ money │ │ validation │ │   recipe    │    │    │
//! │  │  │ Order  │ │ Money │ │  amounts,  │ │ consumption │    │    │
//! │  │  │ Ledger │ │ cents │ │   items    │ │  expansion  │    │    │
//! │  │  └────────┘ └───────┘ └────────────┘ └─────────────┘    │    │
//! │  │                                                         │    │
//! │  │  NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS     │    │
//! │  └────┬────────────────────────────────────────────────────┘    │
//! │       │                                                         │
//! │  ┌────▼────────────────────────────────────────────────────┐    │
//! │  │            forno-db (settlement engine)                 │    │
//! │  │   SQLite repositories, atomic settlement transaction    │    │
//! │  └─────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Order, SaleRecord, Ledger, Movement, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Settlement error taxonomy
//! - [`validation`] - Settlement request validation
//! - [`recipe`] - Recipe expansion into per-ingredient inventory deltas
//! - [`api`] - Wire-level response and failure DTOs
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: deterministic - same input = same output
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: all monetary values are in cents (i64)
//! 4. **Explicit Errors**: all errors are typed, never strings or panics

pub mod api;
pub mod error;
pub mod money;
pub mod recipe;
pub mod types;
pub mod validation;

pub use api::{ApiFailure, ErrorKind, RegisterSaleResponse};
pub use error::{SettlementError, ValidationError};
pub use money::Money;
pub use types::*;

/// Maximum number of line items accepted in a single settlement request.
///
/// Prevents runaway payloads; a pizza order does not have 500 lines.
pub const MAX_SETTLEMENT_ITEMS: usize = 100;

/// Maximum quantity of a single item in a settlement request.
///
/// Guards against data-entry slips (1000 typed instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;
