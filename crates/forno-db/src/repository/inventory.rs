//! # Inventory Repository
//!
//! Quantity-on-hand store keyed by ingredient, mutated only through
//! relative adjustments.
//!
//! ## Why Relative Increments
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  ❌ LOST UPDATE (read-modify-write)                              │
//! │     Terminal A: reads 10, writes 10-3 = 7                        │
//! │     Terminal B: reads 10, writes 10-2 = 8   ← A's sale vanished  │
//! │                                                                  │
//! │  ✅ ATOMIC INCREMENT (store-native)                              │
//! │     Terminal A: quantity_on_hand = quantity_on_hand - 3          │
//! │     Terminal B: quantity_on_hand = quantity_on_hand - 2          │
//! │     Final: 5, regardless of interleaving                         │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Unknown ingredients are created on first adjustment with
//! `quantity_on_hand = delta` - settlement never blocks on catalog gaps.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};

use crate::error::DbResult;
use forno_core::InventoryItem;

/// Repository for ingredient stock levels.
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    pool: SqlitePool,
}

impl InventoryRepository {
    /// Creates a new InventoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InventoryRepository { pool }
    }

    /// Gets the stock record for one ingredient.
    pub async fn get(&self, ingredient_id: &str) -> DbResult<Option<InventoryItem>> {
        let item = sqlx::query_as::<_, InventoryItem>(
            r#"
            SELECT ingredient_id, quantity_on_hand, updated_at
            FROM inventory
            WHERE ingredient_id = ?1
            "#,
        )
        .bind(ingredient_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Current quantity on hand, zero for unknown ingredients.
    pub async fn quantity_on_hand(&self, ingredient_id: &str) -> DbResult<i64> {
        Ok(self
            .get(ingredient_id)
            .await?
            .map(|item| item.quantity_on_hand)
            .unwrap_or(0))
    }

    /// Applies a signed relative adjustment, creating the row if the
    /// ingredient is unknown.
    ///
    /// The upsert-increment is a single statement, so concurrent
    /// adjustments compose without lost updates; runs on the caller's
    /// connection so it joins the settlement transaction.
    pub async fn adjust(
        conn: &mut SqliteConnection,
        ingredient_id: &str,
        delta: i64,
        now: DateTime<Utc>,
    ) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO inventory (ingredient_id, quantity_on_hand, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (ingredient_id) DO UPDATE SET
                quantity_on_hand = quantity_on_hand + excluded.quantity_on_hand,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(ingredient_id)
        .bind(delta)
        .bind(now)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Like [`Self::adjust`], but refuses to drive the quantity below
    /// zero (the `StockPolicy::Reject` path).
    ///
    /// ## Returns
    /// `true` if the adjustment applied, `false` if it would have gone
    /// negative (nothing written in that case).
    pub async fn adjust_non_negative(
        conn: &mut SqliteConnection,
        ingredient_id: &str,
        delta: i64,
        now: DateTime<Utc>,
    ) -> DbResult<bool> {
        if delta >= 0 {
            Self::adjust(conn, ingredient_id, delta, now).await?;
            return Ok(true);
        }

        // Guarded decrement: precondition and mutation in one statement.
        // An unknown ingredient has no row, so a decrement never applies.
        let result = sqlx::query(
            r#"
            UPDATE inventory SET
                quantity_on_hand = quantity_on_hand + ?2,
                updated_at = ?3
            WHERE ingredient_id = ?1 AND quantity_on_hand + ?2 >= 0
            "#,
        )
        .bind(ingredient_id)
        .bind(delta)
        .bind(now)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
