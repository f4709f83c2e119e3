//! # Error Types
//!
//! The settlement error taxonomy.
//!
//! ## Error Flow
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                       Error Propagation                          │
//! │                                                                  │
//! │  ValidationError (this file)  ─┐                                 │
//! │                                ▼                                 │
//! │  SettlementError (this file) ← store failures classified by      │
//! │       │                        forno-db (DbError → Settlement)   │
//! │       ▼                                                          │
//! │  ApiFailure { kind, message } ← what the remote caller sees      │
//! │                                                                  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every non-success outcome guarantees zero visible writes: the
//! coordinator only surfaces these after rollback.

use thiserror::Error;

use crate::types::OrderStatus;

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation failures. No writes are ever attempted for these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// The request has no line items.
    #[error("items must not be empty")]
    EmptyItems,

    /// Too many line items in one request.
    #[error("items must not exceed {max} lines")]
    TooManyItems { max: usize },

    /// A line quantity is zero or negative.
    #[error("quantity for item {item_id} must be positive, got {quantity}")]
    NonPositiveQuantity { item_id: String, quantity: i64 },

    /// A line quantity exceeds the sanity cap.
    #[error("quantity for item {item_id} exceeds maximum allowed ({max})")]
    QuantityTooLarge { item_id: String, max: i64 },

    /// A monetary field is negative.
    #[error("{field} must not be negative, got {value}")]
    NegativeAmount { field: String, value: i64 },

    /// Neither net nor gross amount was supplied.
    ///
    /// Ambiguous amounts are rejected instead of silently settling for
    /// zero; a genuinely free order must say `netCents: 0` explicitly.
    #[error("either netCents or grossCents must be supplied")]
    MissingAmount,
}

// =============================================================================
// Settlement Error
// =============================================================================

/// Typed failure of a settlement attempt.
///
/// `Conflict` is the only kind the coordinator retries automatically
/// (bounded, with backoff); all others are terminal for the attempt.
#[derive(Debug, Error)]
pub enum SettlementError {
    /// Malformed or missing input. No writes attempted.
    #[error("invalid settlement request: {0}")]
    InvalidArgument(#[from] ValidationError),

    /// The order is not in a settleable state (already paid, cancelled,
    /// or unknown).
    #[error("order {order_id} is not settleable (status: {status})")]
    InvalidOrderState {
        order_id: String,
        /// Current status, or `UnknownOrder` for an unknown order id.
        status: OrderStatusDescription,
    },

    /// The stock policy rejected a decrement that would drive an
    /// ingredient below zero.
    #[error("insufficient stock of {ingredient_id}: requested {requested}")]
    InsufficientStock {
        ingredient_id: String,
        requested: i64,
    },

    /// The target day's ledger is closed to new movements.
    #[error("ledger for {date} is closed")]
    LedgerClosed { date: String },

    /// The commit lost a concurrency race (duplicate key, busy store).
    /// Safe to retry with the same request.
    #[error("settlement conflict: {message}")]
    Conflict { message: String },

    /// Unexpected store failure.
    #[error("internal settlement failure: {message}")]
    Internal { message: String },
}

/// Order status as seen by a failed transition: a known status or an
/// unknown order altogether.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatusDescription {
    Known(OrderStatus),
    UnknownOrder,
}

impl std::fmt::Display for OrderStatusDescription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusDescription::Known(status) => write!(f, "{:?}", status),
            OrderStatusDescription::UnknownOrder => write!(f, "unknown order"),
        }
    }
}

impl SettlementError {
    /// Shorthand for a conflict with a plain message.
    pub fn conflict(message: impl Into<String>) -> Self {
        SettlementError::Conflict {
            message: message.into(),
        }
    }

    /// Shorthand for an internal failure with a plain message.
    pub fn internal(message: impl Into<String>) -> Self {
        SettlementError::Internal {
            message: message.into(),
        }
    }

    /// True only for failures the caller (or coordinator) may retry
    /// with the identical request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SettlementError::Conflict { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryability() {
        assert!(SettlementError::conflict("busy").is_retryable());
        assert!(!SettlementError::internal("boom").is_retryable());
        assert!(!SettlementError::LedgerClosed {
            date: "2026-08-29".into()
        }
        .is_retryable());
    }

    #[test]
    fn test_messages_carry_context() {
        let err = SettlementError::InvalidOrderState {
            order_id: "o-1".into(),
            status: OrderStatusDescription::Known(OrderStatus::Paid),
        };
        assert!(err.to_string().contains("o-1"));
        assert!(err.to_string().contains("Paid"));

        let err = SettlementError::InvalidOrderState {
            order_id: "ghost".into(),
            status: OrderStatusDescription::UnknownOrder,
        };
        assert!(err.to_string().contains("unknown order"));
    }
}
