//! Deterministic song and snippet-offset selection
//!
//! Pure functions over a caller-supplied generator. The caller owns draw
//! ordering: the pipeline draws the song index first and the start offset
//! second from the same [`crate::seed::DateSeed`] stream.

use crate::catalog::Song;
use rand::rngs::StdRng;
use rand::Rng;

/// Pick the day's song: `floor(uniform[0,1) * len)`, clamped to the last index
///
/// Precondition: `catalog` is non-empty (enforced at catalog load).
pub fn select_song<'a>(rng: &mut StdRng, catalog: &'a [Song]) -> (&'a Song, usize) {
    let draw: f64 = rng.gen();
    let index = ((draw * catalog.len() as f64).floor() as usize).min(catalog.len() - 1);
    (&catalog[index], index)
}

/// Pick the snippet start offset in seconds, uniform over the playable range
///
/// The range keeps the whole snippet inside the track. Tracks shorter than
/// the snippet collapse the range to zero and always start at 0.0.
pub fn select_start_offset(rng: &mut StdRng, track_secs: f64, snippet_secs: f64) -> f64 {
    let range = (track_secs - snippet_secs).max(0.0);
    let draw: f64 = rng.gen();
    draw * range
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::DateSeed;
    use chrono::NaiveDate;

    fn catalog(n: usize) -> Vec<Song> {
        (0..n)
            .map(|i| Song {
                name: format!("Song {}", i),
                album: format!("Album {}", i / 10),
            })
            .collect()
    }

    fn day_seed() -> DateSeed {
        DateSeed::new(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(), "")
    }

    #[test]
    fn test_selection_stable_across_repeated_invocations() {
        // Seed "2024-1-10", 40-song catalog: the index must be identical
        // across 100 fresh generator instances.
        let songs = catalog(40);
        let (_, first) = select_song(&mut day_seed().rng(), &songs);
        for _ in 0..100 {
            let (_, index) = select_song(&mut day_seed().rng(), &songs);
            assert_eq!(index, first);
        }
    }

    #[test]
    fn test_selection_in_bounds() {
        let songs = catalog(40);
        for day in 1..=28 {
            let seed = DateSeed::new(NaiveDate::from_ymd_opt(2024, 2, day).unwrap(), "");
            let (_, index) = select_song(&mut seed.rng(), &songs);
            assert!(index < songs.len());
        }
    }

    #[test]
    fn test_single_song_catalog() {
        let songs = catalog(1);
        let (song, index) = select_song(&mut day_seed().rng(), &songs);
        assert_eq!(index, 0);
        assert_eq!(song.name, "Song 0");
    }

    #[test]
    fn test_offset_draw_follows_song_draw() {
        // The offset comes from the second position in the stream, so it
        // must differ from a first-draw offset but still be reproducible.
        let mut rng = day_seed().rng();
        let _ = select_song(&mut rng, &catalog(40));
        let offset = select_start_offset(&mut rng, 180.0, 5.0);

        let mut rng2 = day_seed().rng();
        let _ = select_song(&mut rng2, &catalog(40));
        let offset2 = select_start_offset(&mut rng2, 180.0, 5.0);

        assert_eq!(offset, offset2);
        assert!((0.0..=175.0).contains(&offset));
    }

    #[test]
    fn test_offset_for_short_track_is_zero() {
        let mut rng = day_seed().rng();
        let offset = select_start_offset(&mut rng, 3.0, 5.0);
        assert_eq!(offset, 0.0);
    }

    #[test]
    fn test_salted_selection_is_independently_stable() {
        // Each mode salts the seed: its draws are reproducible on their own
        // and do not consume from the unsalted stream.
        let songs = catalog(40);
        let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();

        let (_, salted_a) = select_song(&mut DateSeed::new(date, "albums").rng(), &songs);
        let (_, salted_b) = select_song(&mut DateSeed::new(date, "albums").rng(), &songs);
        assert_eq!(salted_a, salted_b);

        let (_, plain) = select_song(&mut DateSeed::new(date, "").rng(), &songs);
        assert!(plain < songs.len());
    }
}
