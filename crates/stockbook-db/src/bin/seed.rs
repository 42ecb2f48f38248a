//! # Seed Data Generator
//!
//! Populates a ledger with a demo catalog, a few sales and expenses, then
//! prints the resulting summary as JSON.
//!
//! ## Usage
//! ```bash
//! # Seed the configured database for the demo owner
//! cargo run -p stockbook-db --bin seed
//!
//! # Specify database path and owner
//! cargo run -p stockbook-db --bin seed -- --db ./stockbook_dev.db --owner uid-42
//!
//! # Use an explicit config file
//! cargo run -p stockbook-db --bin seed -- --config ./stockbook.toml
//! ```
//!
//! All writes go through the public ledger API, so seeding exercises the
//! same validation and atomic sale path as the app.

use std::env;
use std::path::PathBuf;
use stockbook_core::{NewExpense, NewProduct, OwnerId};
use stockbook_db::{Database, Scope, StockbookConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Demo catalog: (name, cost cents, sale cents, stock)
const CATALOG: &[(&str, i64, i64, i64)] = &[
    ("Whey Protein 900g", 2000, 3500, 10),
    ("Creatine 300g", 4500, 7990, 4),
    ("BCAA 120 caps", 3000, 5490, 12),
    ("Pre-Workout 300g", 6000, 9990, 2),
    ("Protein Bar", 450, 900, 40),
    ("Shaker 700ml", 1200, 2500, 5),
    ("Multivitamin 60 tabs", 1800, 3290, 0),
];

/// Demo sales: (catalog index, quantity)
const SALES: &[(usize, i64)] = &[(0, 3), (4, 6), (1, 1), (2, 2)];

/// Demo expenses: (description, amount cents)
const EXPENSES: &[(&str, i64)] = &[("Rent", 120_000), ("Electricity", 18_750), ("Flyers", 4_500)];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    let mut db_path: Option<String> = None;
    let mut owner = String::from("demo-owner");
    let mut config_path: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--owner" | "-o" => {
                if i + 1 < args.len() {
                    owner = args[i + 1].clone();
                    i += 1;
                }
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Stockbook Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>       Database file path (default: from config)");
                println!("  -o, --owner <ID>      Owner to seed (default: demo-owner)");
                println!("  -c, --config <PATH>   Config file (default: platform config dir)");
                println!("  -h, --help            Show this help message");
                return Ok(());
            }
            other => warn!(arg = %other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    let mut config = StockbookConfig::load(config_path)?;
    if let Some(path) = db_path {
        config.database.path = PathBuf::from(path);
    }

    println!("🌱 Stockbook Seed Data Generator");
    println!("================================");
    println!("Database: {}", config.database.path.display());
    println!("Owner:    {}", owner);
    println!();

    if let Some(parent) = config.database.path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db = Database::new(config.db_config()).await?;
    let ledger = db.ledger(Scope::new(
        config.ledger.app_id.clone(),
        OwnerId::new(owner)?,
    ));

    if !db.health_check().await {
        return Err("database is not answering queries".into());
    }
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = ledger.products().count().await?;
    if existing > 0 {
        println!("⚠ Ledger already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        return Ok(());
    }

    for (name, cost, sale, quantity) in CATALOG {
        ledger
            .add_product(NewProduct {
                name: name.to_string(),
                cost_price_cents: *cost,
                sale_price_cents: *sale,
                quantity: *quantity,
            })
            .await?;
    }
    println!("✓ Added {} products", CATALOG.len());

    // Each sale validates against a fresh snapshot, as the form would.
    let mut recorded = 0;
    for (index, quantity) in SALES {
        let products = ledger.list_products().await?;
        let Some(product) = products.iter().find(|p| p.name == CATALOG[*index].0) else {
            continue;
        };
        match ledger.record_sale(&product.id, *quantity, &products).await {
            Ok(sale) => {
                recorded += 1;
                info!(sale_id = %sale.id, product = %sale.product_name, "Seeded sale");
            }
            Err(e) => eprintln!("Failed to record sale of {}: {}", product.name, e.user_message()),
        }
    }
    println!("✓ Recorded {} sales", recorded);

    for (description, amount) in EXPENSES {
        ledger
            .add_expense(NewExpense {
                description: description.to_string(),
                amount_cents: *amount,
            })
            .await?;
    }
    println!("✓ Added {} expenses", EXPENSES.len());

    let products = ledger.list_products().await?;
    let sales = ledger.list_sales().await?;
    let expenses = ledger.list_expenses().await?;
    let summary = stockbook_core::compute_summary(&products, &sales, &expenses);

    println!();
    println!("Net profit: {}", summary.net_profit);
    println!("{}", serde_json::to_string_pretty(&summary)?);

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}

/// Installs the log subscriber.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - Default: INFO, with DEBUG for stockbook-db
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,stockbook_db=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
