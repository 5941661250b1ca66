//! # Seed Data Generator
//!
//! Populates the database with a small demo inventory for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./kasir.db
//! cargo run -p kasir-db --bin seed
//!
//! # Specify database path
//! cargo run -p kasir-db --bin seed -- --db ./data/kasir.db
//! ```
//!
//! ## Generated Data
//! Three categories and a handful of products, including the reference
//! items used in the checkout walkthroughs:
//! - Indomie Godog: 3500, stock 10
//! - Vit 1000ml: 3000, stock 40
//! - Kecap: 12000, stock 20

use anyhow::Context;
use clap::Parser;
use kasir_core::{CategoryInput, Money, ProductInput};
use kasir_db::{migrations, Database, DbConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Kasir POS Seed Data Generator
#[derive(Parser, Debug)]
#[command(name = "seed")]
#[command(about = "Inserts demo categories and products", long_about = None)]
struct Args {
    /// Database file path (created if missing)
    #[arg(short, long, value_name = "PATH", default_value = "./kasir.db")]
    db: PathBuf,
}

/// (category, description, products as (name, price, stock))
const INVENTORY: &[(&str, &str, &[(&str, i64, i64)])] = &[
    (
        "Makanan",
        "Makanan instan dan camilan",
        &[
            ("Indomie Godog", 3500, 10),
            ("Indomie Goreng", 3500, 25),
            ("Roti Tawar", 15000, 8),
        ],
    ),
    (
        "Minuman",
        "Air mineral dan minuman kemasan",
        &[
            ("Vit 1000ml", 3000, 40),
            ("Teh Botol", 4500, 30),
            ("Kopi Sachet", 1500, 60),
        ],
    ),
    (
        "Bumbu",
        "Bumbu dapur",
        &[("Kecap", 12000, 20), ("Garam", 5000, 15), ("Gula 1kg", 16000, 12)],
    ),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();

    println!("🌱 Kasir POS Seed Data Generator");
    println!("================================");
    println!("Database: {}", args.db.display());
    println!();

    let db = Database::new(DbConfig::new(&args.db))
        .await
        .with_context(|| format!("opening {}", args.db.display()))?;

    println!("✓ Connected to database");
    let (total, applied) = migrations::migration_status(db.pool()).await?;
    println!("✓ Migrations applied ({}/{})", applied, total);

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let start = std::time::Instant::now();
    let mut generated = 0;

    for (category_name, description, products) in INVENTORY {
        let category = db
            .categories()
            .insert(&CategoryInput {
                name: category_name.to_string(),
                description: description.to_string(),
            })
            .await
            .with_context(|| format!("inserting category {category_name}"))?;

        for (name, price, stock) in products.iter() {
            let product = db
                .products()
                .insert(&ProductInput {
                    name: name.to_string(),
                    price: Money::from_minor(*price),
                    stock: *stock,
                    category_id: Some(category.id),
                })
                .await
                .with_context(|| format!("inserting product {name}"))?;

            println!(
                "  #{:<3} {:<16} {:>6}  stock {:>3}  [{}]",
                product.id, product.name, product.price.minor(), product.stock, category.name
            );
            generated += 1;
        }
    }

    println!();
    println!("✓ Generated {} products in {:?}", generated, start.elapsed());

    db.close().await;
    Ok(())
}
