//! # Recipe Expansion
//!
//! Pure expansion of sold items into per-ingredient inventory deltas.
//!
//! ## How Expansion Works
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  Sold: P1 × 2,  P2 × 1                                           │
//! │                                                                  │
//! │  Recipe P1: cheese 200/unit, dough 150/unit                      │
//! │  Recipe P2: cheese 100/unit                                      │
//! │                                                                  │
//! │  Deltas (consumption, negated):                                  │
//! │    cheese: -(200×2 + 100×1) = -500                               │
//! │    dough:  -(150×2)         = -300                               │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Items with no registered recipe contribute nothing - a missing recipe
//! is a catalog gap, not an error, and must never block a settlement.

use std::collections::BTreeMap;

use crate::types::{RecipeLine, SettlementItem};

/// Per-ingredient signed inventory deltas.
///
/// BTreeMap keeps iteration deterministic, which keeps the write set
/// ordering stable across retries.
pub type IngredientDeltas = BTreeMap<String, i64>;

/// Expands sold items into consumption deltas.
///
/// Accumulates `quantity_per_unit × quantity_sold` per ingredient across
/// all sold items, negated. `recipes` maps each item id
/// to its resolved recipe; absent entries and empty recipes are skipped.
///
/// ## Example
/// ```rust
/// use std::collections::BTreeMap;
/// use forno_core::recipe::expand_consumption;
/// use forno_core::types::{RecipeLine, SettlementItem};
///
/// let mut recipes = BTreeMap::new();
/// recipes.insert(
///     "p1".to_string(),
///     vec![RecipeLine { ingredient_id: "cheese".into(), quantity_per_unit: 200 }],
/// );
///
/// let items = [SettlementItem { item_id: "p1".into(), quantity: 2 }];
/// let deltas = expand_consumption(&items, &recipes);
/// assert_eq!(deltas.get("cheese"), Some(&-400));
/// ```
pub fn expand_consumption(
    items: &[SettlementItem],
    recipes: &BTreeMap<String, Vec<RecipeLine>>,
) -> IngredientDeltas {
    let mut deltas = IngredientDeltas::new();

    for item in items {
        let Some(lines) = recipes.get(&item.item_id) else {
            continue;
        };
        for line in lines {
            // Quantities are validator-capped but per-unit amounts come
            // straight from the catalog, so saturate instead of wrapping.
            let consumed = line.quantity_per_unit.saturating_mul(item.quantity);
            let entry = deltas.entry(line.ingredient_id.clone()).or_insert(0);
            *entry = entry.saturating_sub(consumed);
        }
    }

    // Zero-effect lines would still touch rows; drop them.
    deltas.retain(|_, delta| *delta != 0);
    deltas
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line(ingredient: &str, per_unit: i64) -> RecipeLine {
        RecipeLine {
            ingredient_id: ingredient.to_string(),
            quantity_per_unit: per_unit,
        }
    }

    fn item(id: &str, quantity: i64) -> SettlementItem {
        SettlementItem {
            item_id: id.to_string(),
            quantity,
        }
    }

    #[test]
    fn test_shared_ingredient_accumulates_across_items() {
        // The two-pizza scenario: P1×2 (cheese 200, dough 150),
        // P2×1 (cheese 100) → cheese -500, dough -300.
        let mut recipes = BTreeMap::new();
        recipes.insert("p1".to_string(), vec![line("cheese", 200), line("dough", 150)]);
        recipes.insert("p2".to_string(), vec![line("cheese", 100)]);

        let deltas = expand_consumption(&[item("p1", 2), item("p2", 1)], &recipes);

        assert_eq!(deltas.get("cheese"), Some(&-500));
        assert_eq!(deltas.get("dough"), Some(&-300));
        assert_eq!(deltas.len(), 2);
    }

    #[test]
    fn test_missing_recipe_has_no_effect() {
        let recipes = BTreeMap::new();
        let deltas = expand_consumption(&[item("p1", 3)], &recipes);
        assert!(deltas.is_empty());
    }

    #[test]
    fn test_duplicate_item_lines_accumulate() {
        let mut recipes = BTreeMap::new();
        recipes.insert("p1".to_string(), vec![line("cheese", 100)]);

        // Same item appearing twice in the request is legal.
        let deltas = expand_consumption(&[item("p1", 1), item("p1", 2)], &recipes);
        assert_eq!(deltas.get("cheese"), Some(&-300));
    }

    #[test]
    fn test_huge_per_unit_amount_saturates_instead_of_wrapping() {
        let mut recipes = BTreeMap::new();
        recipes.insert("p1".to_string(), vec![line("cheese", i64::MAX)]);

        let deltas = expand_consumption(&[item("p1", 999)], &recipes);
        // The multiply clamps to i64::MAX before the negation.
        assert_eq!(deltas.get("cheese"), Some(&-i64::MAX));
    }

    #[test]
    fn test_zero_per_unit_lines_are_dropped() {
        let mut recipes = BTreeMap::new();
        recipes.insert("p1".to_string(), vec![line("box", 0)]);

        let deltas = expand_consumption(&[item("p1", 5)], &recipes);
        assert!(deltas.is_empty());
    }
}
