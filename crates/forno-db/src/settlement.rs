//! # Settlement Coordinator
//!
//! The orchestrator of the order-settlement path: given a completed
//! order and payment, atomically record the sale, mark the order paid,
//! deplete ingredient inventory per recipe, and post the money into the
//! day's cash ledger.
//!
//! ## Settlement Flow
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  settle(request)                                                 │
//! │       │                                                          │
//! │       ▼                                                          │
//! │  1. validate (amounts, items)           ← no writes on failure   │
//! │  2. date key = operator-local day                                │
//! │  3. resolve recipes → ingredient deltas ← read-only              │
//! │       │                                                          │
//! │  ┌────▼──────────── ONE SQL TRANSACTION ─────────────────────┐   │
//! │  │ 4a. order: received/ready → paid   (guarded UPDATE)       │   │
//! │  │ 4b. ledger: ensure-open, reject if closed                 │   │
//! │  │ 4c. sale + item snapshots          (id generated upfront) │   │
//! │  │ 4d. inventory: one upsert-increment per ingredient        │   │
//! │  │ 4e. movement: +net, reference_id = sale id (UNIQUE)       │   │
//! │  └───────────────┬───────────────────────────────────────────┘   │
//! │                  │                                               │
//! │       commit ────┴──── any failure → full rollback               │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//! Workers coordinate only through the store: the order transition and
//! the ledger-existence check are guarded single statements, inventory
//! mutation is a relative increment, and the movement reference is
//! UNIQUE. Contention surfaces as `Conflict`, which is retried here with
//! a small bounded backoff before reaching the caller.

use std::time::Duration;

use chrono::{Local, NaiveDate, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::DbError;
use crate::pool::Database;
use crate::repository::inventory::InventoryRepository;
use crate::repository::ledger::LedgerRepository;
use crate::repository::order::OrderRepository;
use crate::repository::sale::{generate_sale_item_id, SaleRepository};
use forno_core::error::OrderStatusDescription;
use forno_core::recipe::{expand_consumption, IngredientDeltas};
use forno_core::validation::{validate_restock, validate_settlement};
use forno_core::{
    ApiFailure, Money, Movement, MovementKind, MovementOrigin, OrderStatus, PurchaseRecord,
    RegisterSaleResponse, RestockRequest, SaleItem, SaleRecord, SettlementError,
    SettlementOutcome, SettlementRequest,
};

// =============================================================================
// Configuration
// =============================================================================

/// What to do when a settlement would drive an ingredient below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StockPolicy {
    /// Let quantity_on_hand go negative (oversell/backorder). This is
    /// the legacy behavior and the default.
    #[default]
    Allow,

    /// Reject the settlement with `InsufficientStock`.
    Reject,
}

/// Coordinator tuning knobs.
#[derive(Debug, Clone)]
pub struct SettlementConfig {
    /// Negative-inventory policy.
    pub stock_policy: StockPolicy,

    /// Total commit attempts for a retryable conflict (>= 1).
    pub max_commit_attempts: u32,

    /// Base backoff between attempts; grows linearly per attempt.
    pub retry_backoff: Duration,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        SettlementConfig {
            stock_policy: StockPolicy::Allow,
            max_commit_attempts: 3,
            retry_backoff: Duration::from_millis(25),
        }
    }
}

// =============================================================================
// Coordinator
// =============================================================================

/// Orchestrates atomic settlements against an injected [`Database`].
///
/// Cloning is cheap; hand clones to concurrent workers.
#[derive(Debug, Clone)]
pub struct SettlementCoordinator {
    db: Database,
    config: SettlementConfig,
}

impl SettlementCoordinator {
    /// Creates a coordinator with the default configuration.
    pub fn new(db: Database) -> Self {
        Self::with_config(db, SettlementConfig::default())
    }

    /// Creates a coordinator with explicit configuration.
    pub fn with_config(db: Database, config: SettlementConfig) -> Self {
        SettlementCoordinator { db, config }
    }

    /// Settles an order dated on the operator's local calendar day.
    ///
    /// Either every effect commits - one SaleRecord, one order
    /// transition, the inventory deltas, one ledger movement - or none
    /// is visible.
    pub async fn settle(
        &self,
        request: &SettlementRequest,
    ) -> Result<SettlementOutcome, SettlementError> {
        // Local, not UTC: all sales between local midnights must land on
        // the same ledger regardless of the serving process's zone.
        self.settle_on(request, Local::now().date_naive()).await
    }

    /// Settles an order against an explicit ledger date.
    ///
    /// The public [`Self::settle`] derives the date from the wall clock;
    /// this entry point exists so day-boundary behavior is testable.
    pub async fn settle_on(
        &self,
        request: &SettlementRequest,
        date: NaiveDate,
    ) -> Result<SettlementOutcome, SettlementError> {
        let net_cents = validate_settlement(request)?;

        // Collected eagerly: holding a lazy borrow across the await
        // point makes the future fail the Send inference under
        // tokio::spawn.
        let item_ids: Vec<&str> = request.items.iter().map(|item| item.item_id.as_str()).collect();
        let recipes = self.db.recipes().resolve_all(item_ids).await?;
        let deltas = expand_consumption(&request.items, &recipes);

        // Generated before commit: known to the caller on success and
        // reused across retries as the movement's idempotency reference.
        let sale_id = Uuid::new_v4().to_string();

        debug!(
            order_id = %request.order_id,
            sale_id = %sale_id,
            net_cents,
            ingredients = deltas.len(),
            %date,
            "Settlement prepared"
        );

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self
                .try_commit(request, net_cents, &deltas, date, &sale_id)
                .await
            {
                Err(err) if err.is_retryable() && attempt < self.config.max_commit_attempts => {
                    warn!(
                        order_id = %request.order_id,
                        attempt,
                        error = %err,
                        "Settlement conflict, retrying"
                    );
                    tokio::time::sleep(self.config.retry_backoff * attempt).await;
                }
                Err(err) => return Err(err),
                Ok(outcome) => {
                    info!(
                        order_id = %request.order_id,
                        sale_id = %outcome.sale_id,
                        net_cents = outcome.net_amount_cents,
                        payment = outcome.payment_method.as_str(),
                        %date,
                        "Settlement committed"
                    );
                    return Ok(outcome);
                }
            }
        }
    }

    /// One commit attempt: the entire write set in one transaction.
    async fn try_commit(
        &self,
        request: &SettlementRequest,
        net_cents: i64,
        deltas: &IngredientDeltas,
        date: NaiveDate,
        sale_id: &str,
    ) -> Result<SettlementOutcome, SettlementError> {
        let now = Utc::now();
        let mut tx = self.db.pool().begin().await.map_err(DbError::from)?;

        // (b) Order transition, guarded by its prior status. Doing this
        // first means nothing else is attempted for a non-settleable
        // order.
        let transitioned =
            OrderRepository::transition_to_paid(&mut *tx, &request.order_id, now).await?;
        if !transitioned {
            return self.diagnose_failed_transition(&mut *tx, request).await;
        }

        // (d1) Ledger for the settlement date; a closed day rejects the
        // whole settlement before any money or stock moves.
        let ledger = LedgerRepository::ensure_open(&mut *tx, date, now).await?;
        if ledger.closed {
            return Err(SettlementError::LedgerClosed {
                date: date.to_string(),
            });
        }

        // (a) The append-only sale fact plus its item snapshots.
        let sale = SaleRecord {
            id: sale_id.to_string(),
            order_id: request.order_id.clone(),
            gross_cents: request.gross_cents.unwrap_or(net_cents),
            discount_cents: request.discount_cents,
            fee_cents: request.fee_cents,
            net_cents,
            payment_method: request.payment_method,
            operator_id: request.operator_id.clone(),
            created_at: now,
        };
        let items: Vec<SaleItem> = request
            .items
            .iter()
            .map(|item| SaleItem {
                id: generate_sale_item_id(),
                sale_id: sale_id.to_string(),
                item_id: item.item_id.clone(),
                quantity: item.quantity,
            })
            .collect();
        SaleRepository::insert_in_tx(&mut *tx, &sale, &items).await?;

        // (c) One relative increment per ingredient.
        for (ingredient_id, delta) in deltas {
            match self.config.stock_policy {
                StockPolicy::Allow => {
                    InventoryRepository::adjust(&mut *tx, ingredient_id, *delta, now).await?;
                }
                StockPolicy::Reject => {
                    let applied =
                        InventoryRepository::adjust_non_negative(&mut *tx, ingredient_id, *delta, now)
                            .await?;
                    if !applied {
                        return Err(SettlementError::InsufficientStock {
                            ingredient_id: ingredient_id.clone(),
                            requested: -delta,
                        });
                    }
                }
            }
        }

        // (d2) The ledger movement carrying the sale id as its
        // idempotency reference.
        let movement = Movement {
            id: Uuid::new_v4().to_string(),
            ledger_date: date,
            kind: MovementKind::In,
            amount_cents: net_cents,
            description: format!(
                "sale for order {} ({})",
                request.order_id,
                Money::from_cents(net_cents)
            ),
            origin: MovementOrigin::Sale,
            reference_id: sale_id.to_string(),
            created_at: now,
        };
        let appended = LedgerRepository::append_movement(&mut *tx, &movement).await?;
        if !appended {
            // The ledger was open moments ago in this same transaction;
            // losing the guard means another writer closed it underneath
            // us.
            return Err(SettlementError::conflict(format!(
                "ledger for {date} closed during commit"
            )));
        }

        tx.commit().await.map_err(DbError::from)?;

        Ok(SettlementOutcome {
            sale_id: sale_id.to_string(),
            net_amount_cents: net_cents,
            payment_method: request.payment_method,
        })
    }

    /// Explains a rejected order transition, or replays an already
    /// completed settlement.
    ///
    /// An order that is `paid` *and* has a recorded sale was settled by
    /// a previous (possibly retried) request; returning the recorded
    /// outcome makes the operation idempotent instead of failing the
    /// retry.
    async fn diagnose_failed_transition(
        &self,
        tx: &mut sqlx::SqliteConnection,
        request: &SettlementRequest,
    ) -> Result<SettlementOutcome, SettlementError> {
        let order = OrderRepository::fetch_in_tx(tx, &request.order_id).await?;

        match order {
            Some(order) if order.status == OrderStatus::Paid => {
                if let Some(sale) = SaleRepository::find_by_order_in_tx(tx, &request.order_id).await?
                {
                    info!(
                        order_id = %request.order_id,
                        sale_id = %sale.id,
                        "Order already settled, replaying recorded outcome"
                    );
                    return Ok(SettlementOutcome {
                        sale_id: sale.id,
                        net_amount_cents: sale.net_cents,
                        payment_method: sale.payment_method,
                    });
                }
                // Paid outside the settlement path; nothing to replay.
                Err(SettlementError::InvalidOrderState {
                    order_id: request.order_id.clone(),
                    status: OrderStatusDescription::Known(OrderStatus::Paid),
                })
            }
            Some(order) => Err(SettlementError::InvalidOrderState {
                order_id: request.order_id.clone(),
                status: OrderStatusDescription::Known(order.status),
            }),
            None => Err(SettlementError::InvalidOrderState {
                order_id: request.order_id.clone(),
                status: OrderStatusDescription::UnknownOrder,
            }),
        }
    }

    // =========================================================================
    // Remote boundary
    // =========================================================================

    /// The `registerSale` operation: settle and translate to the wire
    /// response/failure shapes.
    pub async fn register_sale(
        &self,
        request: &SettlementRequest,
    ) -> Result<RegisterSaleResponse, ApiFailure> {
        match self.settle(request).await {
            Ok(outcome) => Ok(RegisterSaleResponse::from(outcome)),
            Err(err) => {
                warn!(order_id = %request.order_id, error = %err, "registerSale failed");
                Err(ApiFailure::from(err))
            }
        }
    }

    // =========================================================================
    // Restock (supplier purchase)
    // =========================================================================

    /// Records a supplier purchase: positive inventory increments per
    /// line plus an `out` movement on the day's ledger, atomically.
    pub async fn restock(
        &self,
        request: &RestockRequest,
    ) -> Result<PurchaseRecord, SettlementError> {
        self.restock_on(request, Local::now().date_naive()).await
    }

    /// Restock against an explicit ledger date (testing day boundaries).
    pub async fn restock_on(
        &self,
        request: &RestockRequest,
        date: NaiveDate,
    ) -> Result<PurchaseRecord, SettlementError> {
        validate_restock(request)?;

        let now = Utc::now();
        let purchase = PurchaseRecord {
            id: Uuid::new_v4().to_string(),
            supplier_id: request.supplier_id.clone(),
            total_cents: request.total_cents,
            payment_method: request.payment_method,
            operator_id: request.operator_id.clone(),
            created_at: now,
        };

        let mut tx = self.db.pool().begin().await.map_err(DbError::from)?;

        let ledger = LedgerRepository::ensure_open(&mut *tx, date, now).await?;
        if ledger.closed {
            return Err(SettlementError::LedgerClosed {
                date: date.to_string(),
            });
        }

        SaleRepository::insert_purchase_in_tx(&mut *tx, &purchase).await?;

        for line in &request.lines {
            InventoryRepository::adjust(&mut *tx, &line.ingredient_id, line.quantity, now).await?;
        }

        let movement = Movement {
            id: Uuid::new_v4().to_string(),
            ledger_date: date,
            kind: MovementKind::Out,
            amount_cents: request.total_cents,
            description: match &request.supplier_id {
                Some(supplier) => format!(
                    "purchase from supplier {supplier} ({})",
                    Money::from_cents(request.total_cents)
                ),
                None => format!("purchase ({})", Money::from_cents(request.total_cents)),
            },
            origin: MovementOrigin::Purchase,
            reference_id: purchase.id.clone(),
            created_at: now,
        };
        let appended = LedgerRepository::append_movement(&mut *tx, &movement).await?;
        if !appended {
            return Err(SettlementError::conflict(format!(
                "ledger for {date} closed during commit"
            )));
        }

        tx.commit().await.map_err(DbError::from)?;

        info!(
            purchase_id = %purchase.id,
            total_cents = purchase.total_cents,
            lines = request.lines.len(),
            %date,
            "Restock committed"
        );

        Ok(purchase)
    }
}

// =============================================================================
// Error mapping
// =============================================================================

/// Store failures classified for the settlement taxonomy: contention is
/// retryable `Conflict`, everything else is `Internal`.
impl From<DbError> for SettlementError {
    fn from(err: DbError) -> Self {
        if err.is_contention() {
            SettlementError::conflict(err.to_string())
        } else {
            SettlementError::internal(err.to_string())
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
