//! Daily reset orchestration
//!
//! One invocation runs the ordered pipeline for a single (mode, date):
//!
//! ```text
//! select -> fetch-source -> resolve-duration -> slice
//!        -> upload-snippet -> publish-metadata -> increment-counters
//! ```
//!
//! The first four operations share the `snippet_generation` step record;
//! upload and metadata write are recorded separately. Critical steps are
//! fail-fast: the failure and its timing are written to an append-only
//! execution log and the invocation aborts. Nothing is retried here;
//! retry belongs to the scheduler and the verification sweep. The counter
//! increment is best-effort and never fails a run.
//!
//! Re-running the same (mode, date) is safe and convergent: the answer row
//! is upserted, the snippet blob is overwritten under the same key, and the
//! deterministic seed reproduces the same song and offset.

pub mod verify;

use crate::db::{self, answers, logs, stats};
use crate::duration::DurationResolver;
use crate::error::{Error, Result};
use crate::model::{
    AnswerRecord, ExecutionLog, RunStatus, SnippetResult, StepLog, StepRecord, Trigger,
};
use crate::mp3::slice_snippet;
use crate::storage::BlobStore;
use chrono::NaiveDate;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};
use trackle_common::config::ModeConfig;
use trackle_common::select::{select_song, select_start_offset};
use trackle_common::time::{date_key, format_mm_ss};
use trackle_common::{Catalog, DateSeed};
use uuid::Uuid;

/// Everything produced by the in-memory half of a run, before any publish
struct GeneratedSnippet {
    song_name: String,
    snippet_key: String,
    bytes: Vec<u8>,
    start_timestamp: String,
    end_timestamp: String,
    duration_method: crate::duration::DurationMethod,
}

/// The reset orchestrator
///
/// All collaborators are constructor-injected so tests can substitute
/// temp-dir blob stores and an in-memory database.
pub struct ResetPipeline {
    db: SqlitePool,
    source: Arc<dyn BlobStore>,
    snippets: Arc<dyn BlobStore>,
    resolver: DurationResolver,
    snippet_secs: f64,
    modes: Vec<ModeConfig>,
    catalogs: HashMap<String, Catalog>,
}

impl ResetPipeline {
    /// Build the pipeline, loading every configured mode's catalog up front
    pub fn new(
        db: SqlitePool,
        source: Arc<dyn BlobStore>,
        snippets: Arc<dyn BlobStore>,
        resolver: DurationResolver,
        snippet_secs: f64,
        modes: Vec<ModeConfig>,
    ) -> Result<Self> {
        let mut catalogs = HashMap::new();
        for mode in &modes {
            let catalog = Catalog::load(&mode.catalog)?;
            info!(mode = %mode.name, songs = catalog.len(), "Loaded catalog");
            catalogs.insert(mode.name.clone(), catalog);
        }

        Ok(Self {
            db,
            source,
            snippets,
            resolver,
            snippet_secs,
            modes,
            catalogs,
        })
    }

    pub fn modes(&self) -> &[ModeConfig] {
        &self.modes
    }

    pub fn db(&self) -> &SqlitePool {
        &self.db
    }

    fn mode(&self, name: &str) -> Result<&ModeConfig> {
        self.modes
            .iter()
            .find(|m| m.name == name)
            .ok_or_else(|| Error::UnknownMode(name.to_string()))
    }

    /// Blob key a mode's snippet is published under for a date
    pub fn snippet_key(mode: &ModeConfig, date: NaiveDate) -> String {
        format!("{}/{}.mp3", mode.collection, date_key(date))
    }

    /// Run the full reset pipeline for one mode and target date
    pub async fn run_reset(
        &self,
        mode_name: &str,
        date: NaiveDate,
        trigger: Trigger,
    ) -> Result<SnippetResult> {
        let mode = self.mode(mode_name)?;
        let target_date = date_key(date);
        let run_start = Instant::now();

        let mut log = ExecutionLog {
            id: Uuid::new_v4(),
            logged_at: trackle_common::time::now(),
            target_date: target_date.clone(),
            mode: mode.name.clone(),
            triggered_by: trigger,
            status: RunStatus::Started,
            steps: StepLog::default(),
            counter_error: None,
            total_duration_ms: 0,
        };

        info!(
            mode = %mode.name,
            target_date = %target_date,
            triggered_by = trigger.as_str(),
            execution_id = %log.id,
            "Starting reset pipeline"
        );

        // Step group 1: select -> fetch-source -> resolve-duration -> slice
        let step_start = Instant::now();
        let generated = match self.generate_snippet(mode, date).await {
            Ok(generated) => {
                log.steps.snippet_generation =
                    Some(StepRecord::ok(step_start.elapsed().as_millis() as u64));
                generated
            }
            Err(e) => {
                log.steps.snippet_generation = Some(StepRecord::failed(
                    step_start.elapsed().as_millis() as u64,
                    e.to_string(),
                ));
                return self.abort(log, run_start, e).await;
            }
        };

        // Step group 2: upload the snippet blob
        let step_start = Instant::now();
        match self
            .snippets
            .put(&generated.snippet_key, &generated.bytes, "audio/mpeg")
            .await
        {
            Ok(()) => {
                log.steps.upload = Some(StepRecord::ok(step_start.elapsed().as_millis() as u64));
            }
            Err(e) => {
                let e = Error::Upload(e.to_string());
                log.steps.upload = Some(StepRecord::failed(
                    step_start.elapsed().as_millis() as u64,
                    e.to_string(),
                ));
                return self.abort(log, run_start, e).await;
            }
        }

        // Step group 3: publish the answer metadata (merge upsert)
        let step_start = Instant::now();
        let answer = AnswerRecord {
            mode: mode.name.clone(),
            game_date: target_date.clone(),
            song: generated.song_name.clone(),
            start_timestamp: generated.start_timestamp.clone(),
            end_timestamp: generated.end_timestamp.clone(),
        };
        match answers::upsert(&self.db, &answer).await {
            Ok(()) => {
                log.steps.metadata_write =
                    Some(StepRecord::ok(step_start.elapsed().as_millis() as u64));
            }
            Err(e) => {
                let e = Error::MetadataWrite(e.to_string());
                log.steps.metadata_write = Some(StepRecord::failed(
                    step_start.elapsed().as_millis() as u64,
                    e.to_string(),
                ));
                return self.abort(log, run_start, e).await;
            }
        }

        // Best-effort: the snippet and answer are durable by now, so a
        // counter failure is recorded but does not fail the run.
        if let Err(e) = stats::increment_day_count(&self.db, &mode.name).await {
            let e = Error::CounterIncrement(e.to_string());
            warn!(mode = %mode.name, error = %e, "Counter increment failed (non-fatal)");
            log.counter_error = Some(e.to_string());
        }

        log.status = RunStatus::Success;
        log.total_duration_ms = run_start.elapsed().as_millis() as u64;
        self.persist_log(&log).await;

        info!(
            mode = %mode.name,
            target_date = %target_date,
            song = %generated.song_name,
            total_duration_ms = log.total_duration_ms,
            "Reset pipeline completed"
        );

        Ok(SnippetResult {
            success: true,
            song_name: generated.song_name,
            message: format!(
                "Published snippet for {} ({}..{})",
                target_date, generated.start_timestamp, generated.end_timestamp
            ),
            start_timestamp: generated.start_timestamp,
            end_timestamp: generated.end_timestamp,
            snippet_key: generated.snippet_key,
            duration_method: generated.duration_method,
            execution_id: log.id,
        })
    }

    /// select -> fetch -> resolve-duration -> slice, entirely in memory
    async fn generate_snippet(
        &self,
        mode: &ModeConfig,
        date: NaiveDate,
    ) -> Result<GeneratedSnippet> {
        let catalog = self
            .catalogs
            .get(&mode.name)
            .ok_or_else(|| Error::UnknownMode(mode.name.clone()))?;

        // One seeded stream per run; the song index is drawn before the
        // start offset and that order is part of the answer contract.
        let seed = DateSeed::new(date, mode.salt.clone());
        let mut rng = seed.rng();

        let (song, index) = select_song(&mut rng, &catalog.songs);
        info!(
            mode = %mode.name,
            song = %song.name,
            index,
            seed = %seed.seed_string(),
            "Selected song"
        );

        let source_key = format!("{}/{}.mp3", mode.collection, song.file_stem());
        if !self.source.exists(&source_key).await? {
            return Err(Error::SourceNotFound { key: source_key });
        }
        let buf = self.source.download(&source_key).await?;

        let (total_secs, duration_method) = self.resolver.resolve(&buf).await?;
        let start_secs = select_start_offset(&mut rng, total_secs, self.snippet_secs);

        let slice = slice_snippet(&buf, start_secs, self.snippet_secs)?;
        let end_secs = slice.actual_start_secs + slice.actual_duration_secs;

        info!(
            song = %song.name,
            track_secs = total_secs,
            start_byte = slice.start_byte,
            end_byte = slice.end_byte,
            snippet_bytes = slice.bytes.len(),
            "Sliced snippet"
        );

        Ok(GeneratedSnippet {
            song_name: song.name.clone(),
            snippet_key: Self::snippet_key(mode, date),
            bytes: slice.bytes,
            start_timestamp: format_mm_ss(slice.actual_start_secs),
            end_timestamp: format_mm_ss(end_secs),
            duration_method,
        })
    }

    /// Record a failed run and return its error
    async fn abort(
        &self,
        mut log: ExecutionLog,
        run_start: Instant,
        e: Error,
    ) -> Result<SnippetResult> {
        log.status = RunStatus::Failed;
        log.total_duration_ms = run_start.elapsed().as_millis() as u64;
        error!(
            mode = %log.mode,
            target_date = %log.target_date,
            execution_id = %log.id,
            error = %e,
            "Reset pipeline failed"
        );
        self.persist_log(&log).await;
        Err(e)
    }

    /// Append the execution log; a log-write failure must not mask the
    /// pipeline outcome, so it is traced and swallowed
    async fn persist_log(&self, log: &ExecutionLog) {
        if let Err(e) = logs::append_execution(&self.db, log).await {
            error!(execution_id = %log.id, error = %e, "Failed to persist execution log");
        }
    }
}
