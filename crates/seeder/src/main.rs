//! Critiq Seed-Data Importer
//!
//! One-shot bulk import of reference data from CSV files:
//! 1. Applies the relational schema
//! 2. Imports users and catalog tables in foreign-key order
//! 3. Imports reviews and comments
//!
//! Not part of the serving path.

mod importer;

use critiq_common::{config::AppConfig, db::DbPool, VERSION};
use std::path::PathBuf;
use tracing::{info, Level};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(true)
        .init();

    info!("Starting Critiq Seeder v{}", VERSION);

    // Load configuration
    let config = AppConfig::load().map_err(|e| {
        tracing::error!(error = %e, "Failed to load configuration");
        e
    })?;

    // Data directory from the first argument, ./data by default
    let data_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"));

    // Initialize database connection
    info!("Connecting to database...");
    let db = DbPool::new(&config.database).await?;

    db.apply_schema().await?;

    let mut importer = importer::Importer::new(db);
    importer.run(&data_dir).await?;

    info!("Seed data imported");
    Ok(())
}
