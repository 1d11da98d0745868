//! Song catalog model and loader
//!
//! A catalog is a static TOML file of `[[songs]]` tables. Vector order is
//! significant: it defines the index space the deterministic selector draws
//! from, so reordering a shipped catalog changes every future answer.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One guessable song
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    /// Display name; also the answer key and the source-file stem
    pub name: String,
    /// Album the song appears on
    pub album: String,
}

impl Song {
    /// Source blob file stem: the song name with apostrophes replaced by
    /// underscores (object keys containing apostrophes break presigned URLs)
    pub fn file_stem(&self) -> String {
        self.name.replace('\'', "_")
    }
}

/// Ordered song catalog for one game mode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub songs: Vec<Song>,
}

impl Catalog {
    /// Load a catalog from a TOML file
    ///
    /// Rejects empty catalogs: the selector's precondition is a non-empty
    /// index space.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Catalog(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let catalog: Catalog = toml::from_str(&content)
            .map_err(|e| Error::Catalog(format!("Failed to parse {}: {}", path.display(), e)))?;

        if catalog.songs.is_empty() {
            return Err(Error::Catalog(format!(
                "Catalog {} contains no songs",
                path.display()
            )));
        }

        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_catalog(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_catalog() {
        let file = write_catalog(
            r#"
            [[songs]]
            name = "Daylight"
            album = "Lover"

            [[songs]]
            name = "Don't Blame Me"
            album = "Reputation"
            "#,
        );

        let catalog = Catalog::load(file.path()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.songs[0].name, "Daylight");
        assert_eq!(catalog.songs[1].album, "Reputation");
    }

    #[test]
    fn test_empty_catalog_rejected() {
        let file = write_catalog("songs = []\n");
        let err = Catalog::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("no songs"));
    }

    #[test]
    fn test_missing_file_rejected() {
        let err = Catalog::load(Path::new("/nonexistent/catalog.toml")).unwrap_err();
        assert!(matches!(err, Error::Catalog(_)));
    }

    #[test]
    fn test_file_stem_replaces_apostrophes() {
        let song = Song {
            name: "Don't Blame Me".to_string(),
            album: "Reputation".to_string(),
        };
        assert_eq!(song.file_stem(), "Don_t Blame Me");
    }
}
