//! Track duration resolution
//!
//! Primary path: an external probe (`ffprobe`) invoked as a subprocess,
//! asked to print the container duration as a bare number on stdout. The
//! probe is a black box and may be absent entirely (sandboxed hosts), so
//! any probe failure falls through to the scanner: walk every frame and
//! sum durations. A non-positive frame sum is a hard failure with no
//! further fallback.
//!
//! The method that actually produced the duration is always reported;
//! callers persist it for audit.

use crate::error::{Error, Result};
use crate::mp3::{locate_first_frame, scanner, Frames};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tokio::process::Command;

/// Which path produced the duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DurationMethod {
    Probe,
    FrameSum,
}

/// Typed result of a probe subprocess run
///
/// Parse-or-fail: the probe either yields a positive finite duration or a
/// reason string; nothing duck-typed leaks out of this module.
#[derive(Debug)]
enum ProbeOutcome {
    Duration(f64),
    Failed(String),
}

/// Duration resolver configuration
#[derive(Debug, Clone)]
pub struct DurationResolver {
    /// Probe binary; `None` disables the probe path outright
    probe_binary: Option<String>,
    /// Subprocess wall-clock bound; a single attempt, never retried
    probe_timeout: Duration,
}

impl DurationResolver {
    pub fn new(probe_binary: Option<String>, probe_timeout: Duration) -> Self {
        Self {
            probe_binary,
            probe_timeout,
        }
    }

    /// Resolve the total duration of an MP3 buffer
    pub async fn resolve(&self, buf: &[u8]) -> Result<(f64, DurationMethod)> {
        if let Some(binary) = &self.probe_binary {
            match self.run_probe(binary, buf).await {
                ProbeOutcome::Duration(secs) => return Ok((secs, DurationMethod::Probe)),
                ProbeOutcome::Failed(reason) => {
                    tracing::warn!(reason, "Duration probe failed, falling back to frame sum");
                }
            }
        } else {
            tracing::debug!("No probe binary configured, using frame sum");
        }

        let secs = frame_sum(buf)?;
        Ok((secs, DurationMethod::FrameSum))
    }

    /// Run the probe against a temp copy of the buffer
    ///
    /// The temp file is removed on every exit path.
    async fn run_probe(&self, binary: &str, buf: &[u8]) -> ProbeOutcome {
        let temp_path = temp_audio_path();
        if let Err(e) = tokio::fs::write(&temp_path, buf).await {
            return ProbeOutcome::Failed(format!("Failed to write temp file: {}", e));
        }

        let outcome = self.invoke_probe(binary, &temp_path).await;
        let _ = tokio::fs::remove_file(&temp_path).await;
        outcome
    }

    async fn invoke_probe(&self, binary: &str, path: &PathBuf) -> ProbeOutcome {
        tracing::debug!(binary, file = %path.display(), "Running duration probe");

        let child = Command::new(binary)
            .arg("-v")
            .arg("error")
            .arg("-show_entries")
            .arg("format=duration")
            .arg("-of")
            .arg("default=noprint_wrappers=1:nokey=1")
            .arg(path)
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(self.probe_timeout, child).await {
            Err(_) => {
                return ProbeOutcome::Failed(format!(
                    "Probe timed out after {:?}",
                    self.probe_timeout
                ))
            }
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                return ProbeOutcome::Failed(format!("Probe binary not found: {}", binary))
            }
            Ok(Err(e)) => return ProbeOutcome::Failed(format!("Failed to spawn probe: {}", e)),
            Ok(Ok(output)) => output,
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return ProbeOutcome::Failed(format!(
                "Probe exit code {:?}: {}",
                output.status.code(),
                stderr.trim()
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        match stdout.trim().parse::<f64>() {
            Ok(secs) if secs > 0.0 && secs.is_finite() => ProbeOutcome::Duration(secs),
            Ok(secs) => ProbeOutcome::Failed(format!("Probe reported non-positive duration {}", secs)),
            Err(_) => ProbeOutcome::Failed(format!(
                "Probe stdout not a number: {:?}",
                stdout.trim()
            )),
        }
    }
}

/// Sum every frame duration from the first valid frame to end of buffer
pub fn frame_sum(buf: &[u8]) -> Result<f64> {
    let origin = scanner::stream_origin(buf);
    let first = locate_first_frame(buf, origin)?;
    let total: f64 = Frames::from(buf, first).map(|f| f.duration_secs()).sum();

    if total <= 0.0 {
        return Err(Error::DurationUnresolved(
            "Frame sum produced a non-positive duration".to_string(),
        ));
    }
    Ok(total)
}

fn temp_audio_path() -> PathBuf {
    std::env::temp_dir().join(format!("trackle_probe_{}.mp3", uuid::Uuid::new_v4()))
}
