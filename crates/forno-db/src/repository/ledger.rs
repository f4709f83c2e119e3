//! # Daily Ledger Repository
//!
//! One cash ledger per calendar day, plus its append-only movement
//! trail.
//!
//! ## Race-Safe Lazy Open
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  First sale of the day, two terminals at once:                   │
//! │                                                                  │
//! │  ❌ "SELECT then INSERT" - both see no ledger, both create one,  │
//! │     one initialization silently clobbers the other               │
//! │                                                                  │
//! │  ✅ INSERT ... ON CONFLICT (entry_date) DO NOTHING               │
//! │     Both attempts degrade to "ensure it exists"; the PRIMARY KEY │
//! │     keeps exactly one ledger per date                            │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Balance Maintenance
//! Every movement append bumps `total_in`/`total_out` and recomputes
//! `closing_balance = opening + total_in - total_out` in the same
//! statement, guarded by `closed = 0`. A closed day is
//! immutable to new movements.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::DbResult;
use forno_core::{Ledger, Movement, MovementKind, MovementOrigin};

/// Repository for daily cash ledgers.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

impl LedgerRepository {
    /// Creates a new LedgerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LedgerRepository { pool }
    }

    /// Gets the ledger for a date, if one has been opened.
    pub async fn get(&self, date: NaiveDate) -> DbResult<Option<Ledger>> {
        let mut conn = self.pool.acquire().await?;
        Self::get_in_tx(&mut *conn, date).await
    }

    /// Gets a date's movements in append order.
    pub async fn movements(&self, date: NaiveDate) -> DbResult<Vec<Movement>> {
        let movements = sqlx::query_as::<_, Movement>(
            r#"
            SELECT id, ledger_date, kind, amount_cents, description, origin,
                   reference_id, created_at
            FROM movements
            WHERE ledger_date = ?1
            ORDER BY created_at, id
            "#,
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    /// Ledger fetch on an explicit connection (transaction-safe).
    pub async fn get_in_tx(
        conn: &mut SqliteConnection,
        date: NaiveDate,
    ) -> DbResult<Option<Ledger>> {
        let ledger = sqlx::query_as::<_, Ledger>(
            r#"
            SELECT entry_date, opened_at, closed_at,
                   opening_balance_cents, closing_balance_cents,
                   total_in_cents, total_out_cents, closed, closed_by
            FROM ledgers
            WHERE entry_date = ?1
            "#,
        )
        .bind(date)
        .fetch_optional(conn)
        .await?;

        Ok(ledger)
    }

    /// Ensures the date's ledger exists and returns it.
    ///
    /// Atomic conditional create: if absent, a zeroed open ledger is
    /// inserted; if present, it is returned unchanged. Never overwrites
    /// an existing ledger's initialization.
    pub async fn ensure_open(
        conn: &mut SqliteConnection,
        date: NaiveDate,
        now: DateTime<Utc>,
    ) -> DbResult<Ledger> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO ledgers (
                entry_date, opened_at,
                opening_balance_cents, closing_balance_cents,
                total_in_cents, total_out_cents, closed
            ) VALUES (?1, ?2, 0, 0, 0, 0, 0)
            ON CONFLICT (entry_date) DO NOTHING
            "#,
        )
        .bind(date)
        .bind(now)
        .execute(&mut *conn)
        .await?
        .rows_affected();

        if inserted > 0 {
            info!(date = %date, "Opened cash ledger");
        }

        // The row is guaranteed to exist now; a vanishing row here would
        // mean the schema lost its PRIMARY KEY.
        let ledger = Self::get_in_tx(conn, date)
            .await?
            .ok_or_else(|| crate::error::DbError::not_found("Ledger", date.to_string()))?;

        Ok(ledger)
    }

    /// Appends a movement and updates the running totals
    /// in one guarded statement.
    ///
    /// ## Returns
    /// `true` on success; `false` if the date's ledger is closed (or was
    /// never opened) - nothing is written in that case.
    pub async fn append_movement(
        conn: &mut SqliteConnection,
        movement: &Movement,
    ) -> DbResult<bool> {
        let (in_delta, out_delta) = match movement.kind {
            MovementKind::In => (movement.amount_cents, 0),
            MovementKind::Out => (0, movement.amount_cents),
        };

        // Totals first: the closed-guard rejects before the movement row
        // is ever written.
        let updated = sqlx::query(
            r#"
            UPDATE ledgers SET
                total_in_cents = total_in_cents + ?2,
                total_out_cents = total_out_cents + ?3,
                closing_balance_cents = opening_balance_cents
                    + total_in_cents + ?2
                    - total_out_cents - ?3
            WHERE entry_date = ?1 AND closed = 0
            "#,
        )
        .bind(movement.ledger_date)
        .bind(in_delta)
        .bind(out_delta)
        .execute(&mut *conn)
        .await?
        .rows_affected();

        if updated == 0 {
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO movements (
                id, ledger_date, kind, amount_cents, description, origin,
                reference_id, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&movement.id)
        .bind(movement.ledger_date)
        .bind(movement.kind)
        .bind(movement.amount_cents)
        .bind(&movement.description)
        .bind(movement.origin)
        .bind(&movement.reference_id)
        .bind(movement.created_at)
        .execute(conn)
        .await?;

        debug!(
            date = %movement.ledger_date,
            kind = movement.kind.as_str(),
            amount = movement.amount_cents,
            reference = %movement.reference_id,
            "Movement appended"
        );

        Ok(true)
    }

    /// Closes a day's cash ledger; later movement appends fail.
    ///
    /// Ensures the ledger exists first, so a day with no sales can still
    /// be closed explicitly.
    ///
    /// ## Returns
    /// `true` if this call closed the ledger, `false` if it was already
    /// closed.
    pub async fn close_day(
        &self,
        date: NaiveDate,
        operator_id: &str,
        now: DateTime<Utc>,
    ) -> DbResult<bool> {
        let mut tx = self.pool.begin().await?;

        Self::ensure_open(&mut *tx, date, now).await?;

        let closed = sqlx::query(
            r#"
            UPDATE ledgers SET
                closed = 1,
                closed_at = ?2,
                closed_by = ?3
            WHERE entry_date = ?1 AND closed = 0
            "#,
        )
        .bind(date)
        .bind(now)
        .bind(operator_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;

        if closed > 0 {
            info!(date = %date, operator = %operator_id, "Cash ledger closed");
        }

        Ok(closed > 0)
    }

    /// Posts a standalone manual cash adjustment to the date's ledger.
    ///
    /// Same atomic discipline as settlement: ensure-open plus guarded
    /// append in one transaction.
    ///
    /// ## Returns
    /// The appended movement, or `None` if the ledger is closed.
    pub async fn record_adjustment(
        &self,
        date: NaiveDate,
        kind: MovementKind,
        amount_cents: i64,
        description: &str,
    ) -> DbResult<Option<Movement>> {
        let now = Utc::now();
        let movement = Movement {
            id: Uuid::new_v4().to_string(),
            ledger_date: date,
            kind,
            amount_cents,
            description: description.to_string(),
            origin: MovementOrigin::Adjustment,
            reference_id: Uuid::new_v4().to_string(),
            created_at: now,
        };

        let mut tx = self.pool.begin().await?;
        Self::ensure_open(&mut *tx, date, now).await?;
        let appended = Self::append_movement(&mut *tx, &movement).await?;
        if !appended {
            // Closed day; drop the transaction without committing.
            return Ok(None);
        }
        tx.commit().await?;

        Ok(Some(movement))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 29).unwrap()
    }

    fn movement(kind: MovementKind, amount: i64, reference: &str) -> Movement {
        Movement {
            id: Uuid::new_v4().to_string(),
            ledger_date: date(),
            kind,
            amount_cents: amount,
            description: "test".to_string(),
            origin: MovementOrigin::Sale,
            reference_id: reference.to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_ensure_open_creates_zeroed_ledger_once() {
        let db = test_db().await;
        let mut conn = db.pool().acquire().await.unwrap();

        let ledger = LedgerRepository::ensure_open(&mut *conn, date(), Utc::now())
            .await
            .unwrap();
        assert_eq!(ledger.opening_balance_cents, 0);
        assert_eq!(ledger.closing_balance_cents, 0);
        assert!(!ledger.closed);

        // Second ensure returns the same ledger unchanged.
        let again = LedgerRepository::ensure_open(&mut *conn, date(), Utc::now())
            .await
            .unwrap();
        assert_eq!(again.opened_at, ledger.opened_at);
    }

    #[tokio::test]
    async fn test_append_maintains_balance_law() {
        let db = test_db().await;
        let mut conn = db.pool().acquire().await.unwrap();
        LedgerRepository::ensure_open(&mut *conn, date(), Utc::now())
            .await
            .unwrap();

        assert!(
            LedgerRepository::append_movement(&mut *conn, &movement(MovementKind::In, 4500, "r1"))
                .await
                .unwrap()
        );
        assert!(
            LedgerRepository::append_movement(&mut *conn, &movement(MovementKind::In, 3000, "r2"))
                .await
                .unwrap()
        );
        assert!(
            LedgerRepository::append_movement(&mut *conn, &movement(MovementKind::Out, 1200, "r3"))
                .await
                .unwrap()
        );

        // Release the single pooled connection before pool-based reads.
        drop(conn);

        let ledger = db.ledgers().get(date()).await.unwrap().unwrap();
        assert_eq!(ledger.total_in_cents, 7500);
        assert_eq!(ledger.total_out_cents, 1200);
        assert_eq!(
            ledger.closing_balance_cents,
            ledger.opening_balance_cents + ledger.total_in_cents - ledger.total_out_cents
        );

        let movements = db.ledgers().movements(date()).await.unwrap();
        assert_eq!(movements.len(), 3);
    }

    #[tokio::test]
    async fn test_duplicate_reference_rejected() {
        let db = test_db().await;
        let mut conn = db.pool().acquire().await.unwrap();
        LedgerRepository::ensure_open(&mut *conn, date(), Utc::now())
            .await
            .unwrap();

        LedgerRepository::append_movement(&mut *conn, &movement(MovementKind::In, 100, "same"))
            .await
            .unwrap();
        let err =
            LedgerRepository::append_movement(&mut *conn, &movement(MovementKind::In, 100, "same"))
                .await
                .unwrap_err();
        assert!(matches!(err, crate::error::DbError::Duplicate { .. }));
    }

    #[tokio::test]
    async fn test_closed_day_rejects_movements() {
        let db = test_db().await;
        let repo = db.ledgers();

        assert!(repo.close_day(date(), "alice", Utc::now()).await.unwrap());
        // Second close is a no-op.
        assert!(!repo.close_day(date(), "alice", Utc::now()).await.unwrap());

        let mut conn = db.pool().acquire().await.unwrap();
        let appended =
            LedgerRepository::append_movement(&mut *conn, &movement(MovementKind::In, 100, "r9"))
                .await
                .unwrap();
        assert!(!appended);
        drop(conn);

        let ledger = repo.get(date()).await.unwrap().unwrap();
        assert!(ledger.closed);
        assert_eq!(ledger.closed_by.as_deref(), Some("alice"));
        assert_eq!(ledger.total_in_cents, 0);
    }

    #[tokio::test]
    async fn test_record_adjustment_round_trip() {
        let db = test_db().await;
        let repo = db.ledgers();

        let movement = repo
            .record_adjustment(date(), MovementKind::Out, 2000, "pizza boxes")
            .await
            .unwrap()
            .expect("open day accepts adjustments");
        assert_eq!(movement.origin, MovementOrigin::Adjustment);

        let ledger = repo.get(date()).await.unwrap().unwrap();
        assert_eq!(ledger.total_out_cents, 2000);
        assert_eq!(ledger.closing_balance_cents, -2000);

        repo.close_day(date(), "alice", Utc::now()).await.unwrap();
        let rejected = repo
            .record_adjustment(date(), MovementKind::In, 100, "late")
            .await
            .unwrap();
        assert!(rejected.is_none());
    }
}
