//! # Order Repository
//!
//! Database operations for orders and their lifecycle status.
//!
//! ## Order Lifecycle
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                       Order Lifecycle                            │
//! │                                                                  │
//! │   received ──► ready ──► paid       (terminal, set by settlement)│
//! │       │          │                                               │
//! │       └──────────┴─────► cancelled  (out-of-core)                │
//! │                                                                  │
//! │   Settlement transitions received/ready → paid with a guarded    │
//! │   UPDATE; zero rows affected means the order is not settleable.  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use forno_core::Order;

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, customer_id, status, total_cents, created_at, paid_at
            FROM orders
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Inserts an order (used by order intake, seeding, and tests).
    pub async fn insert(&self, order: &Order) -> DbResult<()> {
        debug!(id = %order.id, "Inserting order");

        sqlx::query(
            r#"
            INSERT INTO orders (id, customer_id, status, total_cents, created_at, paid_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&order.id)
        .bind(&order.customer_id)
        .bind(order.status)
        .bind(order.total_cents)
        .bind(order.created_at)
        .bind(order.paid_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetches an order inside an open transaction.
    ///
    /// Used by the coordinator to diagnose a failed transition without
    /// leaving the transaction's snapshot.
    pub async fn fetch_in_tx(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, customer_id, status, total_cents, created_at, paid_at
            FROM orders
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(order)
    }

    /// Transitions an order to `paid`, guarded by its prior status.
    ///
    /// ## Why a Guarded UPDATE
    /// ```text
    /// UPDATE orders SET status = 'paid', ...
    /// WHERE id = ?1 AND status IN ('received', 'ready')
    /// ```
    /// The status precondition and the mutation are one statement, so an
    /// already-paid, cancelled, or unknown order can never be settled
    /// twice - there is no window between check and write.
    ///
    /// ## Returns
    /// `true` if the transition applied, `false` if the order was not in
    /// a settleable state (caller inspects why).
    pub async fn transition_to_paid(
        conn: &mut SqliteConnection,
        order_id: &str,
        paid_at: DateTime<Utc>,
    ) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE orders SET
                status = 'paid',
                paid_at = ?2
            WHERE id = ?1 AND status IN ('received', 'ready')
            "#,
        )
        .bind(order_id)
        .bind(paid_at)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
