//! # Wire DTOs
//!
//! Response and failure shapes for the `registerSale` remote boundary.
//!
//! Transport itself (HTTP/RPC) lives outside this workspace; callers
//! deserialize the request into [`crate::types::SettlementRequest`] and
//! serialize one of these back.

use serde::{Deserialize, Serialize};

use crate::error::{SettlementError, ValidationError};
use crate::types::{PaymentMethod, SettlementOutcome};

// =============================================================================
// Success Shape
// =============================================================================

/// Successful `registerSale` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterSaleResponse {
    pub success: bool,
    pub sale_id: String,
    pub net_amount_cents: i64,
    pub payment_method: PaymentMethod,
}

impl From<SettlementOutcome> for RegisterSaleResponse {
    fn from(outcome: SettlementOutcome) -> Self {
        RegisterSaleResponse {
            success: true,
            sale_id: outcome.sale_id,
            net_amount_cents: outcome.net_amount_cents,
            payment_method: outcome.payment_method,
        }
    }
}

// =============================================================================
// Failure Shape
// =============================================================================

/// Machine-readable failure category exposed to remote callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    InvalidArgument,
    InvalidState,
    Conflict,
    Internal,
}

/// Structured error returned over the remote boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiFailure {
    pub kind: ErrorKind,
    pub message: String,
}

impl ApiFailure {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        ApiFailure {
            kind,
            message: message.into(),
        }
    }
}

impl From<&SettlementError> for ErrorKind {
    fn from(err: &SettlementError) -> Self {
        match err {
            SettlementError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            // Stock rejection is a state problem of the store, not of
            // the request shape.
            SettlementError::InvalidOrderState { .. }
            | SettlementError::InsufficientStock { .. }
            | SettlementError::LedgerClosed { .. } => ErrorKind::InvalidState,
            SettlementError::Conflict { .. } => ErrorKind::Conflict,
            SettlementError::Internal { .. } => ErrorKind::Internal,
        }
    }
}

impl From<SettlementError> for ApiFailure {
    fn from(err: SettlementError) -> Self {
        ApiFailure {
            kind: ErrorKind::from(&err),
            message: err.to_string(),
        }
    }
}

impl From<ValidationError> for ApiFailure {
    fn from(err: ValidationError) -> Self {
        ApiFailure::from(SettlementError::from(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OrderStatusDescription;
    use crate::types::OrderStatus;

    #[test]
    fn test_kind_wire_form_is_kebab_case() {
        assert_eq!(
            serde_json::to_string(&ErrorKind::InvalidArgument).unwrap(),
            "\"invalid-argument\""
        );
        assert_eq!(
            serde_json::to_string(&ErrorKind::InvalidState).unwrap(),
            "\"invalid-state\""
        );
    }

    #[test]
    fn test_settlement_error_mapping() {
        let failure = ApiFailure::from(SettlementError::InvalidOrderState {
            order_id: "o-1".into(),
            status: OrderStatusDescription::Known(OrderStatus::Cancelled),
        });
        assert_eq!(failure.kind, ErrorKind::InvalidState);
        assert!(failure.message.contains("o-1"));

        let failure = ApiFailure::from(SettlementError::conflict("duplicate movement"));
        assert_eq!(failure.kind, ErrorKind::Conflict);
    }

    #[test]
    fn test_success_response_shape() {
        let response = RegisterSaleResponse::from(SettlementOutcome {
            sale_id: "s-1".into(),
            net_amount_cents: 4500,
            payment_method: PaymentMethod::Card,
        });
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["saleId"], "s-1");
        assert_eq!(json["netAmountCents"], 4500);
        assert_eq!(json["paymentMethod"], "card");
    }
}
