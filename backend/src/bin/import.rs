//! Seed the tag and ingredient catalogs from CSV files
//!
//! Usage: `foodgram-import [ingredients.csv] [tags.csv]`. Paths default to
//! the `import` section of the configuration. Rows that already exist are
//! skipped, so the import can be re-run safely.

use anyhow::{Context, Result};
use foodgram_backend::config::AppConfig;
use foodgram_backend::db;
use foodgram_backend::repositories::{IngredientRepository, TagRepository};
use foodgram_backend::services::catalog::{parse_ingredients_csv, parse_tags_csv};
use std::fs::File;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "foodgram_import=info,foodgram_backend=info,sqlx=warn".into()),
        )
        .init();

    let config = AppConfig::load()?;
    let mut args = std::env::args().skip(1);
    let ingredients_path = args.next().unwrap_or_else(|| config.import.ingredients_csv.clone());
    let tags_path = args.next().unwrap_or_else(|| config.import.tags_csv.clone());

    let pool = db::create_pool(&config.database).await?;
    db::run_migrations(&pool).await?;

    let file = File::open(&ingredients_path)
        .with_context(|| format!("Cannot open {}", ingredients_path))?;
    let ingredients = parse_ingredients_csv(file)?;
    let inserted = IngredientRepository::insert_many(&pool, &ingredients).await?;
    info!(
        path = %ingredients_path,
        read = ingredients.len(),
        inserted,
        "Ingredients imported"
    );

    let file = File::open(&tags_path).with_context(|| format!("Cannot open {}", tags_path))?;
    let tags = parse_tags_csv(file)?;
    let inserted = TagRepository::insert_many(&pool, &tags).await?;
    info!(path = %tags_path, read = tags.len(), inserted, "Tags imported");

    Ok(())
}
