//! Pipeline data types shared between the orchestrator, persistence, and API

use crate::duration::DurationMethod;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What triggered a reset run; audit-only, never changes pipeline behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    Cron,
    Manual,
    Recovery,
}

impl Trigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trigger::Cron => "cron",
            Trigger::Manual => "manual",
            Trigger::Recovery => "recovery",
        }
    }
}

/// Overall status of a reset run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Started,
    Success,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Started => "started",
            RunStatus::Success => "success",
            RunStatus::Failed => "failed",
        }
    }
}

/// Timing and outcome of one pipeline step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    pub success: bool,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepRecord {
    pub fn ok(duration_ms: u64) -> Self {
        Self {
            success: true,
            duration_ms,
            error: None,
        }
    }

    pub fn failed(duration_ms: u64, error: impl Into<String>) -> Self {
        Self {
            success: false,
            duration_ms,
            error: Some(error.into()),
        }
    }
}

/// Per-step records of a reset run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepLog {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet_generation: Option<StepRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload: Option<StepRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata_write: Option<StepRecord>,
}

/// Append-only audit record, one per orchestrator invocation
///
/// Never mutated after persistence; a failed run and its retry are two rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionLog {
    pub id: Uuid,
    pub logged_at: DateTime<Utc>,
    /// Unpadded `Y-M-D` date the run generated content for
    pub target_date: String,
    pub mode: String,
    pub triggered_by: Trigger,
    pub status: RunStatus,
    pub steps: StepLog,
    /// Best-effort counter failure, outside the critical step records
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counter_error: Option<String>,
    pub total_duration_ms: u64,
}

/// Result of a successful reset run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnippetResult {
    pub success: bool,
    pub song_name: String,
    pub message: String,
    /// Snippet start within the track, `MM:SS`
    pub start_timestamp: String,
    /// Snippet end within the track, `MM:SS`
    pub end_timestamp: String,
    /// Blob key the snippet was published under
    pub snippet_key: String,
    pub duration_method: DurationMethod,
    /// Execution log row recording this run
    pub execution_id: Uuid,
}

/// Published answer record for one (mode, date)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub mode: String,
    pub game_date: String,
    pub song: String,
    pub start_timestamp: String,
    pub end_timestamp: String,
}

/// Existence checks for one mode during a verification sweep
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModeCheck {
    pub mode: String,
    pub metadata_exists: bool,
    pub blob_exists: bool,
    pub all_good: bool,
}

/// Outcome of one mode's recovery attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryOutcome {
    pub mode: String,
    /// True when the mode was already good or the pipeline re-run succeeded
    pub recovered: bool,
    /// Execution log id when the pipeline was actually re-run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Full report of one verification sweep
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    pub target_date: String,
    pub checks: Vec<ModeCheck>,
    pub recovery_needed: bool,
    pub recoveries: Vec<RecoveryOutcome>,
}
