//! # Seed Data Generator
//!
//! Populates a development database with a small pizzeria: menu recipes,
//! ingredient stock, and a handful of open orders ready to settle.
//!
//! ## Usage
//! ```bash
//! # Seed the default development database
//! cargo run -p forno-db --bin seed
//!
//! # Specify database path and number of demo orders
//! cargo run -p forno-db --bin seed -- --db ./data/forno.db --orders 20
//!
//! # Also settle a couple of orders to produce a live ledger
//! cargo run -p forno-db --bin seed -- --settle 3
//! ```

use std::env;

use chrono::Utc;
use uuid::Uuid;

use forno_core::{
    Order, OrderStatus, PaymentMethod, RecipeLine, SettlementItem, SettlementRequest,
};
use forno_db::{Database, DbConfig, SettlementCoordinator};

/// Menu items with their ingredient draw per unit (grams, except units).
const MENU: &[(&str, i64, &[(&str, i64)])] = &[
    (
        "item-margherita",
        3900,
        &[("ing-dough", 250), ("ing-tomato", 120), ("ing-mozzarella", 180), ("ing-basil", 5)],
    ),
    (
        "item-pepperoni",
        4500,
        &[("ing-dough", 250), ("ing-tomato", 120), ("ing-mozzarella", 160), ("ing-pepperoni", 80)],
    ),
    (
        "item-quattro-formaggi",
        4900,
        &[("ing-dough", 250), ("ing-mozzarella", 120), ("ing-gorgonzola", 60), ("ing-parmesan", 40), ("ing-provolone", 60)],
    ),
    (
        "item-calzone",
        4200,
        &[("ing-dough", 300), ("ing-tomato", 80), ("ing-mozzarella", 150), ("ing-ham", 100)],
    ),
    // Drinks carry no recipe; they settle without touching inventory.
    ("item-soda", 800, &[]),
    ("item-water", 500, &[]),
];

/// Starting stock per ingredient.
const STOCK: &[(&str, i64)] = &[
    ("ing-dough", 20_000),
    ("ing-tomato", 10_000),
    ("ing-mozzarella", 12_000),
    ("ing-basil", 500),
    ("ing-pepperoni", 4_000),
    ("ing-gorgonzola", 2_000),
    ("ing-parmesan", 2_000),
    ("ing-provolone", 2_000),
    ("ing-ham", 5_000),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut order_count: usize = 10;
    let mut settle_count: usize = 0;
    let mut db_path = String::from("./forno_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--orders" | "-o" => {
                if i + 1 < args.len() {
                    order_count = args[i + 1].parse().unwrap_or(10);
                    i += 1;
                }
            }
            "--settle" | "-s" => {
                if i + 1 < args.len() {
                    settle_count = args[i + 1].parse().unwrap_or(0);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Forno POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -o, --orders <N>   Number of open orders to create (default: 10)");
                println!("  -s, --settle <N>   Settle the first N orders (default: 0)");
                println!("  -d, --db <PATH>    Database file path (default: ./forno_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🍕 Forno POS Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!("Orders:   {}", order_count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Menu recipes
    for (item_id, _, lines) in MENU {
        let lines: Vec<RecipeLine> = lines
            .iter()
            .map(|(ingredient_id, quantity_per_unit)| RecipeLine {
                ingredient_id: ingredient_id.to_string(),
                quantity_per_unit: *quantity_per_unit,
            })
            .collect();
        db.recipes().put(item_id, &lines).await?;
    }
    println!("✓ Registered {} menu recipes", MENU.len());

    // Ingredient stock
    {
        let mut conn = db.pool().acquire().await?;
        let now = Utc::now();
        for (ingredient_id, quantity) in STOCK {
            forno_db::repository::InventoryRepository::adjust(
                &mut *conn,
                ingredient_id,
                *quantity,
                now,
            )
            .await?;
        }
    }
    println!("✓ Stocked {} ingredients", STOCK.len());

    // Open orders cycling through the menu
    let mut order_ids = Vec::with_capacity(order_count);
    for n in 0..order_count {
        let (item_id, price_cents, _) = MENU[n % MENU.len()];
        let quantity = 1 + (n % 3) as i64;
        let order = Order {
            id: Uuid::new_v4().to_string(),
            customer_id: None,
            status: OrderStatus::Received,
            total_cents: price_cents * quantity,
            created_at: Utc::now(),
            paid_at: None,
        };
        db.orders().insert(&order).await?;
        order_ids.push((order.id, item_id.to_string(), quantity, order.total_cents));
    }
    println!("✓ Created {} open orders", order_ids.len());

    // Optionally settle a few so the day has a live ledger.
    if settle_count > 0 {
        let coordinator = SettlementCoordinator::new(db.clone());
        for (order_id, item_id, quantity, total_cents) in order_ids.iter().take(settle_count) {
            let request = SettlementRequest {
                order_id: order_id.clone(),
                items: vec![SettlementItem {
                    item_id: item_id.clone(),
                    quantity: *quantity,
                }],
                gross_cents: Some(*total_cents),
                discount_cents: 0,
                fee_cents: 0,
                net_cents: Some(*total_cents),
                payment_method: PaymentMethod::Cash,
                operator_id: "op-seed".to_string(),
            };
            let outcome = coordinator.settle(&request).await?;
            println!(
                "  Settled order {} → sale {} ({})",
                order_id,
                outcome.sale_id,
                forno_core::Money::from_cents(outcome.net_amount_cents)
            );
        }
        println!("✓ Settled {} orders", settle_count.min(order_ids.len()));
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
