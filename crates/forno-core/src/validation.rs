//! # Validation Module
//!
//! Settlement request validation.
//!
//! ## Validation Strategy
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                           │
//! │                                                                  │
//! │  Layer 1: Deserialization (serde)                                │
//! │  └── Shape and type checks on the inbound payload                │
//! │           │                                                      │
//! │           ▼                                                      │
//! │  Layer 2: THIS MODULE                                            │
//! │  └── Business rules: amount precedence, quantities, limits       │
//! │           │                                                      │
//! │           ▼                                                      │
//! │  Layer 3: Database (SQLite)                                      │
//! │  └── NOT NULL / UNIQUE / FOREIGN KEY constraints                 │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Amount Precedence
//! The settled amount is `net_cents`, falling back to `gross_cents` when
//! net is absent. A request carrying neither is rejected with
//! [`ValidationError::MissingAmount`] - the legacy behavior of silently
//! settling for zero masked data-entry errors and is not carried over.
//! A genuinely zero-value settlement must state `netCents: 0` explicitly.

use crate::error::ValidationError;
use crate::types::{RestockRequest, SettlementRequest};
use crate::{MAX_ITEM_QUANTITY, MAX_SETTLEMENT_ITEMS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a settlement request and resolves its net amount.
///
/// ## Rules
/// - `order_id` and `operator_id` must be non-empty
/// - `items` must be non-empty, at most [`MAX_SETTLEMENT_ITEMS`] lines
/// - every quantity must be in `1..=MAX_ITEM_QUANTITY`
/// - every supplied amount must be non-negative
/// - `net_cents` falls back to `gross_cents`; absent both is an error
///
/// ## Returns
/// The resolved net amount in cents.
///
/// ## Example
/// ```rust
/// use forno_core::types::{PaymentMethod, SettlementItem, SettlementRequest};
/// use forno_core::validation::validate_settlement;
///
/// let req = SettlementRequest {
///     order_id: "o-1".into(),
///     items: vec![SettlementItem { item_id: "p-1".into(), quantity: 2 }],
///     gross_cents: Some(5000),
///     discount_cents: 500,
///     fee_cents: 0,
///     net_cents: None,
///     payment_method: PaymentMethod::Cash,
///     operator_id: "alice".into(),
/// };
///
/// // No net supplied: falls back to gross.
/// assert_eq!(validate_settlement(&req).unwrap(), 5000);
/// ```
pub fn validate_settlement(request: &SettlementRequest) -> ValidationResult<i64> {
    require_non_empty("orderId", &request.order_id)?;
    require_non_empty("operatorId", &request.operator_id)?;

    if request.items.is_empty() {
        return Err(ValidationError::EmptyItems);
    }
    if request.items.len() > MAX_SETTLEMENT_ITEMS {
        return Err(ValidationError::TooManyItems {
            max: MAX_SETTLEMENT_ITEMS,
        });
    }

    for item in &request.items {
        require_non_empty("itemId", &item.item_id)?;
        if item.quantity <= 0 {
            return Err(ValidationError::NonPositiveQuantity {
                item_id: item.item_id.clone(),
                quantity: item.quantity,
            });
        }
        if item.quantity > MAX_ITEM_QUANTITY {
            return Err(ValidationError::QuantityTooLarge {
                item_id: item.item_id.clone(),
                max: MAX_ITEM_QUANTITY,
            });
        }
    }

    require_non_negative("discountCents", request.discount_cents)?;
    require_non_negative("feeCents", request.fee_cents)?;
    if let Some(gross) = request.gross_cents {
        require_non_negative("grossCents", gross)?;
    }
    if let Some(net) = request.net_cents {
        require_non_negative("netCents", net)?;
    }

    request
        .net_cents
        .or(request.gross_cents)
        .ok_or(ValidationError::MissingAmount)
}

/// Validates a restock (supplier purchase) request.
///
/// Same discipline as settlement: non-empty lines, positive quantities,
/// non-negative total.
pub fn validate_restock(request: &RestockRequest) -> ValidationResult<()> {
    require_non_empty("operatorId", &request.operator_id)?;

    if request.lines.is_empty() {
        return Err(ValidationError::EmptyItems);
    }

    for line in &request.lines {
        require_non_empty("ingredientId", &line.ingredient_id)?;
        if line.quantity <= 0 {
            return Err(ValidationError::NonPositiveQuantity {
                item_id: line.ingredient_id.clone(),
                quantity: line.quantity,
            });
        }
    }

    require_non_negative("totalCents", request.total_cents)
}

fn require_non_empty(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn require_non_negative(field: &str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::NegativeAmount {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PaymentMethod, SettlementItem};

    fn base_request() -> SettlementRequest {
        SettlementRequest {
            order_id: "o-1".to_string(),
            items: vec![SettlementItem {
                item_id: "p-1".to_string(),
                quantity: 2,
            }],
            gross_cents: Some(5000),
            discount_cents: 500,
            fee_cents: 0,
            net_cents: Some(4500),
            payment_method: PaymentMethod::Cash,
            operator_id: "alice".to_string(),
        }
    }

    #[test]
    fn test_valid_request_resolves_net() {
        assert_eq!(validate_settlement(&base_request()).unwrap(), 4500);
    }

    #[test]
    fn test_net_falls_back_to_gross() {
        let mut req = base_request();
        req.net_cents = None;
        assert_eq!(validate_settlement(&req).unwrap(), 5000);
    }

    #[test]
    fn test_missing_both_amounts_rejected() {
        let mut req = base_request();
        req.net_cents = None;
        req.gross_cents = None;
        assert_eq!(
            validate_settlement(&req),
            Err(ValidationError::MissingAmount)
        );
    }

    #[test]
    fn test_explicit_zero_net_is_allowed() {
        let mut req = base_request();
        req.net_cents = Some(0);
        req.gross_cents = None;
        assert_eq!(validate_settlement(&req).unwrap(), 0);
    }

    #[test]
    fn test_empty_items_rejected() {
        let mut req = base_request();
        req.items.clear();
        assert_eq!(validate_settlement(&req), Err(ValidationError::EmptyItems));
    }

    #[test]
    fn test_non_positive_quantity_rejected() {
        let mut req = base_request();
        req.items[0].quantity = 0;
        assert!(matches!(
            validate_settlement(&req),
            Err(ValidationError::NonPositiveQuantity { .. })
        ));
    }

    #[test]
    fn test_negative_amount_rejected() {
        let mut req = base_request();
        req.discount_cents = -1;
        assert!(matches!(
            validate_settlement(&req),
            Err(ValidationError::NegativeAmount { .. })
        ));
    }

    #[test]
    fn test_blank_order_id_rejected() {
        let mut req = base_request();
        req.order_id = "  ".to_string();
        assert!(matches!(
            validate_settlement(&req),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_restock_validation() {
        use crate::types::{RestockLine, RestockRequest};

        let req = RestockRequest {
            supplier_id: Some("s-1".to_string()),
            lines: vec![RestockLine {
                ingredient_id: "cheese".to_string(),
                quantity: 1000,
            }],
            total_cents: 12000,
            payment_method: PaymentMethod::Pix,
            operator_id: "bob".to_string(),
        };
        assert!(validate_restock(&req).is_ok());

        let empty = RestockRequest { lines: vec![], ..req };
        assert_eq!(validate_restock(&empty), Err(ValidationError::EmptyItems));
    }
}
