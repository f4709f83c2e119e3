//! # Sale Repository
//!
//! Append-only storage of settled sales.
//!
//! A SaleRecord is a financial fact: created exactly once per
//! successful settlement, never updated afterward. The `order_id`
//! UNIQUE constraint makes a second sale for the same order a
//! duplicate-key conflict even if every other guard were bypassed.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use forno_core::{PurchaseRecord, SaleItem, SaleRecord};

/// Repository for sale and purchase records.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<SaleRecord>> {
        let sale = sqlx::query_as::<_, SaleRecord>(
            r#"
            SELECT id, order_id, gross_cents, discount_cents, fee_cents, net_cents,
                   payment_method, operator_id, created_at
            FROM sales
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Gets all items snapshotted onto a sale.
    pub async fn get_items(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(
            r#"
            SELECT id, sale_id, item_id, quantity
            FROM sale_items
            WHERE sale_id = ?1
            ORDER BY id
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Looks up the sale recorded for an order, inside an open
    /// transaction.
    ///
    /// Used by the coordinator's idempotent-replay path: an already-paid
    /// order with a recorded sale means the settlement already happened.
    pub async fn find_by_order_in_tx(
        conn: &mut SqliteConnection,
        order_id: &str,
    ) -> DbResult<Option<SaleRecord>> {
        let sale = sqlx::query_as::<_, SaleRecord>(
            r#"
            SELECT id, order_id, gross_cents, discount_cents, fee_cents, net_cents,
                   payment_method, operator_id, created_at
            FROM sales
            WHERE order_id = ?1
            "#,
        )
        .bind(order_id)
        .fetch_optional(conn)
        .await?;

        Ok(sale)
    }

    /// Inserts a sale and its item snapshots on the caller's connection.
    pub async fn insert_in_tx(
        conn: &mut SqliteConnection,
        sale: &SaleRecord,
        items: &[SaleItem],
    ) -> DbResult<()> {
        debug!(id = %sale.id, order_id = %sale.order_id, net = sale.net_cents, "Inserting sale");

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, order_id, gross_cents, discount_cents, fee_cents, net_cents,
                payment_method, operator_id, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.order_id)
        .bind(sale.gross_cents)
        .bind(sale.discount_cents)
        .bind(sale.fee_cents)
        .bind(sale.net_cents)
        .bind(sale.payment_method)
        .bind(&sale.operator_id)
        .bind(sale.created_at)
        .execute(&mut *conn)
        .await?;

        for item in items {
            sqlx::query(
                r#"
                INSERT INTO sale_items (id, sale_id, item_id, quantity)
                VALUES (?1, ?2, ?3, ?4)
                "#,
            )
            .bind(&item.id)
            .bind(&item.sale_id)
            .bind(&item.item_id)
            .bind(item.quantity)
            .execute(&mut *conn)
            .await?;
        }

        Ok(())
    }

    /// Inserts a purchase record on the caller's connection (restock).
    pub async fn insert_purchase_in_tx(
        conn: &mut SqliteConnection,
        purchase: &PurchaseRecord,
    ) -> DbResult<()> {
        debug!(id = %purchase.id, total = purchase.total_cents, "Inserting purchase");

        sqlx::query(
            r#"
            INSERT INTO purchases (id, supplier_id, total_cents, payment_method, operator_id, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&purchase.id)
        .bind(&purchase.supplier_id)
        .bind(purchase.total_cents)
        .bind(purchase.payment_method)
        .bind(&purchase.operator_id)
        .bind(purchase.created_at)
        .execute(conn)
        .await?;

        Ok(())
    }
}

/// Generates a new sale item ID.
pub fn generate_sale_item_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;
    use forno_core::{Order, OrderStatus, PaymentMethod};

    async fn test_db_with_order(order_id: &str) -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.orders()
            .insert(&Order {
                id: order_id.to_string(),
                customer_id: None,
                status: OrderStatus::Received,
                total_cents: 4500,
                created_at: Utc::now(),
                paid_at: None,
            })
            .await
            .unwrap();
        db
    }

    fn sale(id: &str, order_id: &str) -> SaleRecord {
        SaleRecord {
            id: id.to_string(),
            order_id: order_id.to_string(),
            gross_cents: 5000,
            discount_cents: 500,
            fee_cents: 0,
            net_cents: 4500,
            payment_method: PaymentMethod::Cash,
            operator_id: "alice".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let db = test_db_with_order("o-1").await;
        let mut conn = db.pool().acquire().await.unwrap();

        let items = vec![SaleItem {
            id: generate_sale_item_id(),
            sale_id: "s-1".to_string(),
            item_id: "p-1".to_string(),
            quantity: 2,
        }];
        SaleRepository::insert_in_tx(&mut *conn, &sale("s-1", "o-1"), &items)
            .await
            .unwrap();

        let by_order = SaleRepository::find_by_order_in_tx(&mut *conn, "o-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_order.id, "s-1");

        // Return the single pooled connection before pool-based reads.
        drop(conn);

        let fetched = db.sales().get_by_id("s-1").await.unwrap().unwrap();
        assert_eq!(fetched.net_cents, 4500);
        assert_eq!(fetched.payment_method, PaymentMethod::Cash);

        let items = db.sales().get_items("s-1").await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_second_sale_for_order_is_duplicate() {
        let db = test_db_with_order("o-1").await;
        let mut conn = db.pool().acquire().await.unwrap();

        SaleRepository::insert_in_tx(&mut *conn, &sale("s-1", "o-1"), &[])
            .await
            .unwrap();

        let err = SaleRepository::insert_in_tx(&mut *conn, &sale("s-2", "o-1"), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Duplicate { .. }), "got {err:?}");
    }
}
