//! # Trackle Common Library
//!
//! Shared code for the Trackle daily snippet generator:
//! - Error types
//! - Configuration loading
//! - Song catalog model
//! - Date-seeded deterministic random draws
//! - Timestamp and date-key helpers

pub mod catalog;
pub mod config;
pub mod error;
pub mod seed;
pub mod select;
pub mod time;

pub use catalog::{Catalog, Song};
pub use error::{Error, Result};
pub use seed::DateSeed;
