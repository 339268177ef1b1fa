use std::str::FromStr;

use anyhow::Context;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use tracing::info;

use crate::config::AppConfig;

const SCHEMA: &str = include_str!("../schema.sql");

/// Opens the pool described by `CALC_DB_URL`, creating the database file if needed.
pub async fn connect(config: &AppConfig) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.database_url)
        .with_context(|| format!("parse database url {}", config.database_url))?
        .create_if_missing(true)
        .foreign_keys(true);

    let db = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await
        .context("connect to database")?;
    Ok(db)
}

/// Creates the tables and indexes if they are absent. Safe to run on every start.
pub async fn init_schema(db: &SqlitePool) -> anyhow::Result<()> {
    sqlx::query(SCHEMA)
        .execute(db)
        .await
        .context("create schema")?;
    info!("database schema ready");
    Ok(())
}

/// Seconds since the unix epoch, as stored in `created_at` columns.
pub fn now_ts() -> i64 {
    time::OffsetDateTime::now_utc().unix_timestamp()
}
