//! Lifetime game statistics
//!
//! A single counter per mode, incremented once per successful reset. The
//! increment is read-then-write per the collaborator contract; racing
//! writers can lose an increment, which the pipeline accepts because the
//! counter is best-effort and non-critical.

use crate::error::Result;
use sqlx::SqlitePool;

/// Read the lifetime day count for a mode (0 when the row is absent)
pub async fn lifetime_day_count(pool: &SqlitePool, mode: &str) -> Result<i64> {
    let count: Option<i64> =
        sqlx::query_scalar("SELECT lifetime_day_count FROM game_stats WHERE mode = ?")
            .bind(mode)
            .fetch_optional(pool)
            .await?;
    Ok(count.unwrap_or(0))
}

/// Increment the lifetime day count for a mode, returning the new value
pub async fn increment_day_count(pool: &SqlitePool, mode: &str) -> Result<i64> {
    let current = lifetime_day_count(pool, mode).await?;
    let next = current + 1;

    sqlx::query(
        r#"
        INSERT INTO game_stats (mode, lifetime_day_count)
        VALUES (?, ?)
        ON CONFLICT(mode) DO UPDATE SET lifetime_day_count = excluded.lifetime_day_count
        "#,
    )
    .bind(mode)
    .bind(next)
    .execute(pool)
    .await?;

    Ok(next)
}
