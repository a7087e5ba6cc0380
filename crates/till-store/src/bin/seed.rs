//! # Demo Data Seeder
//!
//! Writes the demo catalog into a register database.
//!
//! ## Usage
//! ```bash
//! cargo run -p till-store --bin seed
//! cargo run -p till-store --bin seed -- --db ./data/till.db
//! cargo run -p till-store --bin seed -- --force
//! ```
//!
//! Without `--force` an existing catalog is left alone.

use std::env;
use till_store::demo::demo_state;
use till_store::{Database, DbConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = "./till_dev.db".to_string();
    let mut force = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--force" | "-f" => force = true,
            "--help" | "-h" => {
                println!("Till POS Demo Seeder");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./till_dev.db)");
                println!("  -f, --force        Replace an existing catalog and ledger");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Till POS Demo Seeder");
    println!("====================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.state().load_snapshot().await?;
    if existing.has_catalog() && !force {
        println!("⚠ Database already has a catalog");
        println!("  Skipping seed. Pass --force to replace it.");
        return Ok(());
    }

    let state = demo_state();
    db.state().save_snapshot(&state).await?;

    println!(
        "✓ Seeded {} products, {} payment methods",
        state.products.as_ref().map_or(0, Vec::len),
        state.payment_methods.as_ref().map_or(0, Vec::len)
    );

    db.close().await;
    Ok(())
}
