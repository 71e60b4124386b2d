//! Pool setup, schema migrations and database bootstrap for `db-init`.

use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, FromRow, PgPool};
use tracing::{debug, info};

use crate::config::DbConfig;

/// Migrations embedded at compile time from `crates/plotkeeper-db/migrations/`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

/// Upper bound on pooled connections. Each request holds at most one.
const MAX_CONNECTIONS: u32 = 10;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

pub async fn create_pool(config: &DbConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(&config.database_url)
        .await
        .with_context(|| format!("failed to connect to {}", config.redacted_url()))?;
    debug!(max_connections = MAX_CONNECTIONS, "database pool ready");
    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    MIGRATOR
        .run(pool)
        .await
        .context("failed to run database migrations")?;

    info!("migrations applied successfully");
    Ok(())
}

/// Create the configured database on its server unless it is already there.
///
/// Only names made of ASCII letters, digits and `_` are accepted, since the
/// name has to be spliced into `CREATE DATABASE`.
pub async fn ensure_database_exists(config: &DbConfig) -> Result<()> {
    let db_name = config
        .database_name()
        .with_context(|| format!("no database name in {}", config.redacted_url()))?;
    if !db_name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        anyhow::bail!("database name {db_name:?} may only contain letters, digits and '_'");
    }

    let maintenance = config.maintenance();
    let maint_pool = PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(&maintenance.database_url)
        .await
        .with_context(|| format!("failed to connect to {}", maintenance.redacted_url()))?;

    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(db_name)
            .fetch_one(&maint_pool)
            .await
            .context("failed to look up database in pg_database")?;

    if exists {
        info!(db = db_name, "database already exists");
    } else {
        maint_pool
            .execute(format!("CREATE DATABASE \"{db_name}\"").as_str())
            .await
            .with_context(|| format!("failed to create database {db_name}"))?;
        info!(db = db_name, "database created");
    }

    maint_pool.close().await;
    Ok(())
}

/// Row counts of the registry tables, reported by `plotkeeper db-init`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct TableCounts {
    pub blocks: i64,
    pub customers: i64,
    pub plots: i64,
}

impl TableCounts {
    /// `(table, rows)` pairs in display order.
    pub fn rows(&self) -> [(&'static str, i64); 3] {
        [
            ("blocks", self.blocks),
            ("customers", self.customers),
            ("plots", self.plots),
        ]
    }
}

pub async fn table_counts(pool: &PgPool) -> Result<TableCounts> {
    let counts = sqlx::query_as::<_, TableCounts>(
        "SELECT (SELECT COUNT(*) FROM blocks) AS blocks, \
                (SELECT COUNT(*) FROM customers) AS customers, \
                (SELECT COUNT(*) FROM plots) AS plots",
    )
    .fetch_one(pool)
    .await
    .context("failed to count registry rows")?;

    Ok(counts)
}
