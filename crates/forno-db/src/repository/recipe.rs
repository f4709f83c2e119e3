//! # Recipe Repository
//!
//! Read side of the recipe catalog: maps a sellable item to its ordered
//! ingredient consumption lines.
//!
//! Recipes are owned by a separate recipe-management collaborator; the
//! settlement path only ever reads them. A missing recipe is not an
//! error - the item sells with no inventory effect.

use sqlx::SqlitePool;
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::DbResult;
use forno_core::RecipeLine;

/// Repository for recipe lookups.
#[derive(Debug, Clone)]
pub struct RecipeRepository {
    pool: SqlitePool,
}

impl RecipeRepository {
    /// Creates a new RecipeRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RecipeRepository { pool }
    }

    /// Resolves the recipe for one item: its consumption lines in
    /// declared order, or an empty list if no recipe is registered.
    pub async fn resolve(&self, item_id: &str) -> DbResult<Vec<RecipeLine>> {
        let lines = sqlx::query_as::<_, RecipeLine>(
            r#"
            SELECT ingredient_id, quantity_per_unit
            FROM recipe_lines
            WHERE item_id = ?1
            ORDER BY position
            "#,
        )
        .bind(item_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Resolves recipes for every distinct item id, as a map.
    ///
    /// Items without a recipe are absent from the map. Recipes change
    /// rarely, so this pre-transaction read is safe for settlement.
    pub async fn resolve_all(
        &self,
        item_ids: impl IntoIterator<Item = &str>,
    ) -> DbResult<BTreeMap<String, Vec<RecipeLine>>> {
        let mut recipes = BTreeMap::new();

        for item_id in item_ids {
            if recipes.contains_key(item_id) {
                continue;
            }
            let lines = self.resolve(item_id).await?;
            if !lines.is_empty() {
                recipes.insert(item_id.to_string(), lines);
            }
        }

        Ok(recipes)
    }

    /// Replaces the recipe registered for an item (seeding and recipe
    /// management).
    pub async fn put(&self, item_id: &str, lines: &[RecipeLine]) -> DbResult<()> {
        debug!(item_id = %item_id, lines = lines.len(), "Registering recipe");

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM recipe_lines WHERE item_id = ?1")
            .bind(item_id)
            .execute(&mut *tx)
            .await?;

        for (position, line) in lines.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO recipe_lines (item_id, position, ingredient_id, quantity_per_unit)
                VALUES (?1, ?2, ?3, ?4)
                "#,
            )
            .bind(item_id)
            .bind(position as i64)
            .bind(&line.ingredient_id)
            .bind(line.quantity_per_unit)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn line(ingredient: &str, per_unit: i64) -> RecipeLine {
        RecipeLine {
            ingredient_id: ingredient.to_string(),
            quantity_per_unit: per_unit,
        }
    }

    #[tokio::test]
    async fn test_resolve_preserves_declared_order() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.recipes();

        repo.put("p1", &[line("cheese", 200), line("dough", 150), line("sauce", 80)])
            .await
            .unwrap();

        let resolved = repo.resolve("p1").await.unwrap();
        assert_eq!(resolved, vec![line("cheese", 200), line("dough", 150), line("sauce", 80)]);
    }

    #[tokio::test]
    async fn test_missing_recipe_resolves_empty() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let resolved = db.recipes().resolve("no-such-item").await.unwrap();
        assert!(resolved.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_all_skips_items_without_recipes() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.recipes();
        repo.put("p1", &[line("cheese", 200)]).await.unwrap();

        let recipes = repo.resolve_all(["p1", "p2", "p1"]).await.unwrap();
        assert_eq!(recipes.len(), 1);
        assert!(recipes.contains_key("p1"));
    }

    #[tokio::test]
    async fn test_put_replaces_previous_recipe() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.recipes();
        repo.put("p1", &[line("cheese", 200)]).await.unwrap();
        repo.put("p1", &[line("cheese", 250), line("basil", 5)])
            .await
            .unwrap();

        let resolved = repo.resolve("p1").await.unwrap();
        assert_eq!(resolved, vec![line("cheese", 250), line("basil", 5)]);
    }
}
