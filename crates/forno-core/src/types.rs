//! # Domain Types
//!
//! Core domain types of the settlement path.
//!
//! ## Type Hierarchy
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                             │
//! │                                                                  │
//! │  ┌───────────────┐   ┌────────────────┐   ┌──────────────────┐   │
//! │  │     Order     │   │   SaleRecord   │   │      Ledger      │   │
//! │  │  ───────────  │   │  ────────────  │   │  ──────────────  │   │
//! │  │  id (UUID)    │   │  id (UUID)     │   │  entry_date (PK) │   │
//! │  │  status       │──►│  order_id (FK) │──►│  totals, closed  │   │
//! │  │  total_cents  │   │  net_cents     │   │  + Movements     │   │
//! │  └───────────────┘   └────────────────┘   └──────────────────┘   │
//! │                                                                  │
//! │  One successful settlement produces exactly one SaleRecord and   │
//! │  one Movement whose reference_id is the sale id.                 │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Persisted structs keep monetary values as raw `_cents: i64` columns;
//! [`crate::money::Money`] is used in pure calculations. The `sqlx`
//! feature adds Type/FromRow derives so forno-db can map rows directly.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Order
// =============================================================================

/// Lifecycle status of an order.
///
/// Settlement performs the terminal `received`/`ready` → `paid`
/// transition; `cancelled` orders are never settleable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
pub enum OrderStatus {
    Received,
    Ready,
    Paid,
    Cancelled,
}

/// An order placed by a customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Optional reference to the customer record.
    pub customer_id: Option<String>,

    /// Lifecycle status.
    pub status: OrderStatus,

    /// Order total at creation time, in cents.
    pub total_cents: i64,

    /// When the order was created.
    pub created_at: DateTime<Utc>,

    /// Set exactly once, by settlement.
    pub paid_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Settlement Request
// =============================================================================

/// How the customer paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
pub enum PaymentMethod {
    Cash,
    Card,
    Pix,
}

/// One sold line in a settlement request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementItem {
    /// Sellable item identifier (menu item / pizza id).
    pub item_id: String,

    /// Units sold. Must be positive.
    pub quantity: i64,
}

/// Immutable input to a settlement attempt.
///
/// ## Amount Precedence
/// `net_cents` is the settled amount; a missing net falls back to
/// `gross_cents`. A request carrying neither is rejected - amounts are
/// never silently defaulted to zero (see [`crate::validation`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementRequest {
    /// The order being settled.
    pub order_id: String,

    /// Sold lines. Must be non-empty.
    pub items: Vec<SettlementItem>,

    /// Gross amount in cents, before discounts and fees.
    #[serde(default)]
    pub gross_cents: Option<i64>,

    /// Discounts in cents.
    #[serde(default)]
    pub discount_cents: i64,

    /// Fees in cents (delivery, card surcharge, ...).
    #[serde(default)]
    pub fee_cents: i64,

    /// Net amount in cents - what actually enters the cash ledger.
    #[serde(default)]
    pub net_cents: Option<i64>,

    /// How the customer paid.
    pub payment_method: PaymentMethod,

    /// Cashier who received the payment.
    pub operator_id: String,
}

/// Result of a successful (or idempotently replayed) settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementOutcome {
    /// Generated sale identifier, also the ledger movement reference.
    pub sale_id: String,

    /// Net amount posted to the ledger, in cents.
    pub net_amount_cents: i64,

    /// How the customer paid.
    pub payment_method: PaymentMethod,
}

// =============================================================================
// Sale
// =============================================================================

/// An append-only financial fact: one successful settlement.
///
/// Created exactly once per settlement, never updated afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleRecord {
    /// Unique identifier (UUID v4), generated before commit.
    pub id: String,

    /// Back-reference to the settled order.
    pub order_id: String,

    /// Monetary breakdown, in cents.
    pub gross_cents: i64,
    pub discount_cents: i64,
    pub fee_cents: i64,
    pub net_cents: i64,

    /// How the customer paid.
    pub payment_method: PaymentMethod,

    /// Cashier who received the payment.
    pub operator_id: String,

    /// When the settlement committed.
    pub created_at: DateTime<Utc>,
}

/// One sold line snapshotted onto a sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub item_id: String,
    pub quantity: i64,
}

// =============================================================================
// Recipe & Inventory
// =============================================================================

/// One ingredient consumption line of a recipe.
///
/// A recipe is the ordered list of lines registered for a sellable item;
/// items without a registered recipe sell with no inventory effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct RecipeLine {
    /// Ingredient consumed.
    pub ingredient_id: String,

    /// Units of the ingredient consumed per unit sold (e.g. grams).
    pub quantity_per_unit: i64,
}

/// Quantity on hand for one ingredient.
///
/// Mutated only via relative adjustment, never absolute overwrite, to
/// avoid lost updates under concurrent settlements. May legitimately go
/// negative (oversell/backorder) unless the stock policy rejects it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InventoryItem {
    pub ingredient_id: String,
    pub quantity_on_hand: i64,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Ledger & Movements
// =============================================================================

/// Direction of a cash movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
pub enum MovementKind {
    In,
    Out,
}

/// What produced a cash movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
pub enum MovementOrigin {
    Sale,
    Purchase,
    Adjustment,
}

/// The per-calendar-day cash ledger.
///
/// Exactly one exists per date, created lazily on the
/// first movement of the day. `closing_balance_cents` always equals
/// `opening + total_in - total_out`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Ledger {
    /// Calendar date key, the operator's local day.
    pub entry_date: NaiveDate,

    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,

    pub opening_balance_cents: i64,
    pub closing_balance_cents: i64,
    pub total_in_cents: i64,
    pub total_out_cents: i64,

    /// A closed day's ledger is immutable to new movements.
    pub closed: bool,
    pub closed_by: Option<String>,
}

/// One immutable entry in a ledger.
///
/// Appended only, never removed or reordered - the sequence is the
/// audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Movement {
    pub id: String,

    /// Date key of the ledger this movement belongs to.
    pub ledger_date: NaiveDate,

    pub kind: MovementKind,
    pub amount_cents: i64,
    pub description: String,
    pub origin: MovementOrigin,

    /// Idempotency key: the sale/purchase/adjustment id that produced
    /// this movement. Unique across all movements.
    pub reference_id: String,

    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Purchases (restock)
// =============================================================================

/// One restocked ingredient line in a purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestockLine {
    pub ingredient_id: String,

    /// Units received. Must be positive.
    pub quantity: i64,
}

/// A supplier purchase restocking inventory and paying cash out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestockRequest {
    /// Optional reference to the supplier record.
    #[serde(default)]
    pub supplier_id: Option<String>,

    /// Restocked lines. Must be non-empty.
    pub lines: Vec<RestockLine>,

    /// Total paid to the supplier, in cents.
    pub total_cents: i64,

    pub payment_method: PaymentMethod,
    pub operator_id: String,
}

/// Persisted record of a supplier purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PurchaseRecord {
    pub id: String,
    pub supplier_id: Option<String>,
    pub total_cents: i64,
    pub payment_method: PaymentMethod,
    pub operator_id: String,
    pub created_at: DateTime<Utc>,
}

impl MovementKind {
    /// Stable string form used in descriptions and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::In => "in",
            MovementKind::Out => "out",
        }
    }
}

impl PaymentMethod {
    /// Stable string form used on the wire and in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Pix => "pix",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settlement_request_defaults() {
        // Payload omitting optional amounts must still deserialize.
        let json = r#"{
            "orderId": "o-1",
            "items": [{"itemId": "p-1", "quantity": 2}],
            "netCents": 4500,
            "paymentMethod": "cash",
            "operatorId": "alice"
        }"#;
        let req: SettlementRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.net_cents, Some(4500));
        assert_eq!(req.gross_cents, None);
        assert_eq!(req.discount_cents, 0);
        assert_eq!(req.fee_cents, 0);
        assert_eq!(req.payment_method, PaymentMethod::Cash);
    }

    #[test]
    fn test_enum_wire_forms() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Received).unwrap(),
            "\"received\""
        );
        assert_eq!(
            serde_json::to_string(&MovementOrigin::Sale).unwrap(),
            "\"sale\""
        );
        assert_eq!(serde_json::to_string(&MovementKind::In).unwrap(), "\"in\"");
    }
}
