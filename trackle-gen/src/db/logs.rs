//! Append-only audit log persistence
//!
//! One row per orchestrator invocation and one per verification sweep.
//! Step records and sweep reports are stored as serialized JSON columns so
//! the schema stays stable as records grow.

use crate::error::{Error, Result};
use crate::model::{ExecutionLog, VerificationReport};
use sqlx::SqlitePool;
use uuid::Uuid;

/// Append one execution log row
pub async fn append_execution(pool: &SqlitePool, log: &ExecutionLog) -> Result<()> {
    let steps = serde_json::to_string(&log.steps)
        .map_err(|e| Error::Internal(format!("Failed to serialize step log: {}", e)))?;

    sqlx::query(
        r#"
        INSERT INTO execution_logs (
            id, logged_at, target_date, mode, triggered_by, status,
            steps, counter_error, total_duration_ms
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(log.id.to_string())
    .bind(log.logged_at.to_rfc3339())
    .bind(&log.target_date)
    .bind(&log.mode)
    .bind(log.triggered_by.as_str())
    .bind(log.status.as_str())
    .bind(steps)
    .bind(&log.counter_error)
    .bind(log.total_duration_ms as i64)
    .execute(pool)
    .await?;

    Ok(())
}

/// Append one verification log row
pub async fn append_verification(
    pool: &SqlitePool,
    id: Uuid,
    report: &VerificationReport,
) -> Result<()> {
    let json = serde_json::to_string(report)
        .map_err(|e| Error::Internal(format!("Failed to serialize report: {}", e)))?;

    sqlx::query(
        r#"
        INSERT INTO verification_logs (id, logged_at, target_date, report, recovery_needed)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(trackle_common::time::now().to_rfc3339())
    .bind(&report.target_date)
    .bind(json)
    .bind(report.recovery_needed as i64)
    .execute(pool)
    .await?;

    Ok(())
}

/// Count execution log rows for a (mode, target date)
pub async fn execution_count(pool: &SqlitePool, mode: &str, target_date: &str) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM execution_logs WHERE mode = ? AND target_date = ?",
    )
    .bind(mode)
    .bind(target_date)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

/// Latest execution status for a (mode, target date), if any
pub async fn latest_execution_status(
    pool: &SqlitePool,
    mode: &str,
    target_date: &str,
) -> Result<Option<String>> {
    let status: Option<String> = sqlx::query_scalar(
        r#"
        SELECT status FROM execution_logs
        WHERE mode = ? AND target_date = ?
        ORDER BY logged_at DESC
        LIMIT 1
        "#,
    )
    .bind(mode)
    .bind(target_date)
    .fetch_optional(pool)
    .await?;
    Ok(status)
}
