//! Error types for trackle-gen
//!
//! Defines the pipeline error taxonomy using thiserror. Every variant that
//! aborts a reset run is terminal for that invocation; retry belongs to the
//! external scheduler backed by the verification sweep.

use thiserror::Error;

/// Main error type for the snippet generation pipeline
#[derive(Error, Debug)]
pub enum Error {
    /// Shared-secret mismatch; rejected before any pipeline work is logged
    #[error("Authorization failed")]
    Authorization,

    /// Requested mode is not configured
    #[error("Unknown mode: {0}")]
    UnknownMode(String),

    /// Source audio blob missing from the source bucket
    #[error("Source audio not found: {key}")]
    SourceNotFound { key: String },

    /// Both the probe and the frame-sum fallback failed
    #[error("Could not resolve track duration: {0}")]
    DurationUnresolved(String),

    /// No valid frame sync located within the scan window
    #[error("No valid MPEG frame found in bytes {scan_start}..{scan_end}")]
    FrameLocation { scan_start: usize, scan_end: usize },

    /// Computed slice bounds are degenerate
    #[error("Invalid slice bounds: start {start_byte} >= end {end_byte}")]
    SliceBounds { start_byte: usize, end_byte: usize },

    /// Snippet blob publish failed
    #[error("Snippet upload failed: {0}")]
    Upload(String),

    /// Answer metadata write failed
    #[error("Answer metadata write failed: {0}")]
    MetadataWrite(String),

    /// Lifetime counter increment failed (non-fatal, logged only)
    #[error("Counter increment failed: {0}")]
    CounterIncrement(String),

    /// Database connection or query errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Shared-library error (config, catalog)
    #[error(transparent)]
    Common(#[from] trackle_common::Error),

    /// Invalid request parameter
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Other errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience Result type using trackle-gen Error
pub type Result<T> = std::result::Result<T, Error>;
