//! Database schema creation
//!
//! Tables are created if absent at startup; no migration machinery. The
//! audit tables are append-only by convention: nothing in this crate issues
//! UPDATE or DELETE against them.

use crate::error::Result;
use sqlx::SqlitePool;
use tracing::info;

/// Create all tables if they do not exist
pub async fn init(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS answers (
            mode TEXT NOT NULL,
            game_date TEXT NOT NULL,
            song TEXT NOT NULL,
            start_timestamp TEXT NOT NULL,
            end_timestamp TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (mode, game_date)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS game_stats (
            mode TEXT PRIMARY KEY,
            lifetime_day_count INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS execution_logs (
            id TEXT PRIMARY KEY,
            logged_at TEXT NOT NULL,
            target_date TEXT NOT NULL,
            mode TEXT NOT NULL,
            triggered_by TEXT NOT NULL,
            status TEXT NOT NULL,
            steps TEXT NOT NULL,
            counter_error TEXT,
            total_duration_ms INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS verification_logs (
            id TEXT PRIMARY KEY,
            logged_at TEXT NOT NULL,
            target_date TEXT NOT NULL,
            report TEXT NOT NULL,
            recovery_needed INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    info!("Database schema ready");
    Ok(())
}
