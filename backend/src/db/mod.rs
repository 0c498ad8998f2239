//! Database connection, migrations and constraint helpers
//!
//! Uniqueness of favorites, cart entries, follows and short links is enforced
//! by Postgres constraints. Services use the helpers at the bottom of this
//! module to tell a constraint violation apart from a real failure.

use crate::config::DatabaseConfig;
use anyhow::Result;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

/// Postgres SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";
/// Postgres SQLSTATE for foreign_key_violation
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Pool tuning on top of [`DatabaseConfig`]
pub struct PoolSettings {
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            min_connections: 2,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),   // 10 minutes
            max_lifetime: Duration::from_secs(1800),  // 30 minutes
        }
    }
}

/// Create a PostgreSQL connection pool
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool> {
    create_pool_with_settings(config, &PoolSettings::default()).await
}

/// Create a PostgreSQL connection pool with explicit tuning
pub async fn create_pool_with_settings(
    config: &DatabaseConfig,
    settings: &PoolSettings,
) -> Result<PgPool> {
    let connect_options = PgConnectOptions::from_str(&config.url)?.application_name("foodgram");

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(settings.min_connections.min(config.max_connections))
        .acquire_timeout(settings.acquire_timeout)
        .idle_timeout(settings.idle_timeout)
        .max_lifetime(settings.max_lifetime)
        .test_before_acquire(true)
        .connect_with(connect_options)
        .await?;

    info!(
        max = config.max_connections,
        min = settings.min_connections,
        "Database pool created"
    );

    Ok(pool)
}

/// Apply pending schema migrations
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations completed successfully");
    Ok(())
}

/// Check database health
pub async fn health_check(pool: &PgPool) -> Result<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map(|_| ())
        .map_err(|e| {
            warn!("Database health check failed: {}", e);
            e.into()
        })
}

fn sqlstate(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().map(|code| code.into_owned()),
        _ => None,
    }
}

/// True when the error is a unique constraint violation
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    sqlstate(err).as_deref() == Some(UNIQUE_VIOLATION)
}

/// True when the error is a foreign key violation
pub fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    sqlstate(err).as_deref() == Some(FOREIGN_KEY_VIOLATION)
}

/// Row a write pointed at that no longer exists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingReference {
    /// The acting user, e.g. a valid token for a deleted account
    Caller,
    /// Anything else: a recipe, ingredient, tag or followed author
    Target,
}

impl MissingReference {
    /// Classify by constraint name; Postgres names inline keys `<table>_<column>_fkey`
    fn from_constraint(constraint: Option<&str>) -> Self {
        match constraint {
            Some(name) if name.ends_with("_user_id_fkey") || name.ends_with("_author_id_fkey") => {
                MissingReference::Caller
            }
            _ => MissingReference::Target,
        }
    }
}

/// Which reference a failed write tripped over, if it was a foreign key violation
pub fn missing_reference(err: &anyhow::Error) -> Option<MissingReference> {
    let err = err.downcast_ref::<sqlx::Error>()?;
    if !is_foreign_key_violation(err) {
        return None;
    }
    let constraint = match err {
        sqlx::Error::Database(db_err) => db_err.constraint(),
        _ => None,
    };
    Some(MissingReference::from_constraint(constraint))
}
