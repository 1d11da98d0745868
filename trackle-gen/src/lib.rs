//! # Trackle Snippet Generator
//!
//! Daily snippet generation service for the Trackle guessing game:
//! - Deterministic per-day song selection
//! - MP3 container scanning and frame-accurate slicing
//! - Duration resolution (ffprobe with frame-sum fallback)
//! - Reset orchestration with durable execution logs
//! - Verification and recovery sweep

pub mod api;
pub mod db;
pub mod duration;
pub mod error;
pub mod model;
pub mod mp3;
pub mod pipeline;
pub mod storage;

pub use error::{Error, Result};
pub use model::{SnippetResult, Trigger, VerificationReport};
pub use pipeline::ResetPipeline;
