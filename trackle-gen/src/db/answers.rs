//! Answer record persistence
//!
//! Answers are upserted with merge semantics: a re-run for the same
//! (mode, date) updates the answer fields in place rather than adding a
//! second row, which is what makes repeated resets convergent.

use crate::error::Result;
use crate::model::AnswerRecord;
use sqlx::{Row, SqlitePool};

/// Upsert the answer for one (mode, date)
pub async fn upsert(pool: &SqlitePool, answer: &AnswerRecord) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO answers (mode, game_date, song, start_timestamp, end_timestamp, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(mode, game_date) DO UPDATE SET
            song = excluded.song,
            start_timestamp = excluded.start_timestamp,
            end_timestamp = excluded.end_timestamp,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&answer.mode)
    .bind(&answer.game_date)
    .bind(&answer.song)
    .bind(&answer.start_timestamp)
    .bind(&answer.end_timestamp)
    .bind(trackle_common::time::now().to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Load the answer for one (mode, date)
pub async fn get(pool: &SqlitePool, mode: &str, game_date: &str) -> Result<Option<AnswerRecord>> {
    let row = sqlx::query(
        r#"
        SELECT mode, game_date, song, start_timestamp, end_timestamp
        FROM answers
        WHERE mode = ? AND game_date = ?
        "#,
    )
    .bind(mode)
    .bind(game_date)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| AnswerRecord {
        mode: row.get("mode"),
        game_date: row.get("game_date"),
        song: row.get("song"),
        start_timestamp: row.get("start_timestamp"),
        end_timestamp: row.get("end_timestamp"),
    }))
}

/// True when an answer row exists for (mode, date)
pub async fn exists(pool: &SqlitePool, mode: &str, game_date: &str) -> Result<bool> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM answers WHERE mode = ? AND game_date = ?)",
    )
    .bind(mode)
    .bind(game_date)
    .fetch_one(pool)
    .await?;
    Ok(exists)
}

/// Count answer rows for (mode, date); used by idempotence tests
pub async fn count(pool: &SqlitePool, mode: &str, game_date: &str) -> Result<i64> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM answers WHERE mode = ? AND game_date = ?")
            .bind(mode)
            .bind(game_date)
            .fetch_one(pool)
            .await?;
    Ok(count)
}
