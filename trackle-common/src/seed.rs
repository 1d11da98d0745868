//! Date-derived deterministic random generator
//!
//! Every random choice for a given game day flows from one seed string
//! `"{year}-{month}-{day}{salt}"` (unpadded date, optional per-mode salt).
//! The seed string is hashed with SHA-256 and the digest seeds a `StdRng`,
//! so two runs with the same date and salt produce identical draw sequences
//! across process restarts and hosts.
//!
//! Draw order matters: the generator is a consumable stream, and the
//! pipeline draws the song index before the snippet start offset. Changing
//! that order changes historical answers.

use chrono::{Datelike, NaiveDate};
use rand::rngs::StdRng;
use rand::SeedableRng;
use sha2::{Digest, Sha256};

/// A calendar date plus an optional salt, the root of all per-day randomness
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateSeed {
    date: NaiveDate,
    salt: String,
}

impl DateSeed {
    pub fn new(date: NaiveDate, salt: impl Into<String>) -> Self {
        Self {
            date,
            salt: salt.into(),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// The seed string: unpadded `Y-M-D` immediately followed by the salt
    pub fn seed_string(&self) -> String {
        format!(
            "{}-{}-{}{}",
            self.date.year(),
            self.date.month(),
            self.date.day(),
            self.salt
        )
    }

    /// Build the seeded generator for this day
    pub fn rng(&self) -> StdRng {
        let digest = Sha256::digest(self.seed_string().as_bytes());
        let mut seed = [0u8; 32];
        seed.copy_from_slice(&digest);
        StdRng::from_seed(seed)
    }
}
