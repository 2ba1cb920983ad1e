//! PostgreSQL persistence for the order engine.
//!
//! Pool bootstrap and embedded migrations live here; read-only catalog
//! lookups in [`catalog`]; the [`PgStore`] implementation of
//! `mesa_core::OrderStore` in [`orders`].

use anyhow::{Context, Result};
use sqlx::{postgres::PgPoolOptions, PgPool};

pub mod catalog;
pub mod orders;

pub use orders::PgStore;

pub const ENV_DB_URL: &str = "MESA_DATABASE_URL";

/// Connect to Postgres using MESA_DATABASE_URL.
pub async fn connect_from_env() -> Result<PgPool> {
    let url =
        std::env::var(ENV_DB_URL).with_context(|| format!("missing env var {ENV_DB_URL}"))?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&url)
        .await
        .context("failed to connect to Postgres")?;

    Ok(pool)
}

/// Run embedded SQLx migrations.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("db migrate failed")?;
    Ok(())
}
