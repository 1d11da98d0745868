//! Verification and recovery sweep
//!
//! Runs on its own schedule, after the daily reset should have happened:
//! checks that tomorrow's answer row and snippet blob both exist for every
//! mode, re-runs the reset pipeline in recovery mode for any mode that
//! fails either check, and persists a single verification log once all
//! modes are processed.
//!
//! The sweep never propagates errors past its own boundary: check failures
//! count as "missing" and recovery failures are captured in the report.
//! Running it repeatedly, or concurrently with a reset, is safe: every
//! write it can trigger is an idempotent upsert or a same-key overwrite.

use super::ResetPipeline;
use crate::db::{answers, logs};
use crate::model::{ModeCheck, RecoveryOutcome, Trigger, VerificationReport};
use chrono::NaiveDate;
use tracing::{error, info, warn};
use trackle_common::time::date_key;
use uuid::Uuid;

impl ResetPipeline {
    /// Check every configured mode's published state for a date
    ///
    /// A mode is good only when both the answer row and the snippet blob
    /// exist. Check errors are logged and treated as missing, which errs
    /// toward re-generation.
    pub async fn verify(&self, date: NaiveDate) -> Vec<ModeCheck> {
        let target_date = date_key(date);
        let mut checks = Vec::with_capacity(self.modes().len());

        for mode in self.modes() {
            let metadata_exists = match answers::exists(self.db(), &mode.name, &target_date).await {
                Ok(exists) => exists,
                Err(e) => {
                    warn!(mode = %mode.name, error = %e, "Answer existence check failed");
                    false
                }
            };

            let snippet_key = Self::snippet_key(mode, date);
            let blob_exists = match self.snippets.exists(&snippet_key).await {
                Ok(exists) => exists,
                Err(e) => {
                    warn!(mode = %mode.name, error = %e, "Snippet existence check failed");
                    false
                }
            };

            checks.push(ModeCheck {
                mode: mode.name.clone(),
                metadata_exists,
                blob_exists,
                all_good: metadata_exists && blob_exists,
            });
        }

        checks
    }

    /// Verify every mode for a date and recover the ones that fail
    ///
    /// Returns the full report; also persists it as a verification log.
    pub async fn run_sweep(&self, date: NaiveDate) -> VerificationReport {
        let target_date = date_key(date);
        info!(target_date = %target_date, "Starting verification sweep");

        let checks = self.verify(date).await;
        let recovery_needed = checks.iter().any(|c| !c.all_good);

        let mut recoveries = Vec::with_capacity(checks.len());
        for check in &checks {
            if check.all_good {
                // Nothing to do; record the mode as trivially successful
                recoveries.push(RecoveryOutcome {
                    mode: check.mode.clone(),
                    recovered: true,
                    execution_id: None,
                    error: None,
                });
                continue;
            }

            warn!(
                mode = %check.mode,
                metadata_exists = check.metadata_exists,
                blob_exists = check.blob_exists,
                "Mode failed verification, running recovery"
            );

            match self.run_reset(&check.mode, date, Trigger::Recovery).await {
                Ok(result) => {
                    info!(mode = %check.mode, execution_id = %result.execution_id, "Recovery succeeded");
                    recoveries.push(RecoveryOutcome {
                        mode: check.mode.clone(),
                        recovered: true,
                        execution_id: Some(result.execution_id),
                        error: None,
                    });
                }
                Err(e) => {
                    error!(mode = %check.mode, error = %e, "Recovery failed");
                    recoveries.push(RecoveryOutcome {
                        mode: check.mode.clone(),
                        recovered: false,
                        execution_id: None,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        let report = VerificationReport {
            target_date,
            checks,
            recovery_needed,
            recoveries,
        };

        if let Err(e) = logs::append_verification(self.db(), Uuid::new_v4(), &report).await {
            error!(error = %e, "Failed to persist verification log");
        }

        report
    }
}
