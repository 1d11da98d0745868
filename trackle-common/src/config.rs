//! Configuration loading and resolution
//!
//! Configuration priority order (highest first):
//! 1. Command-line argument
//! 2. Environment variable (`TRACKLE_CONFIG`)
//! 3. Platform config dir (`~/.config/trackle/trackle.toml`, then
//!    `/etc/trackle/trackle.toml` on Linux)
//!
//! Relative paths inside the file (catalogs, data roots, database) resolve
//! against the config file's own directory.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// One game mode: an independent catalog with its own seed salt
#[derive(Debug, Clone, Deserialize)]
pub struct ModeConfig {
    /// Mode name used in API requests, answer rows, and audit logs
    pub name: String,
    /// Blob key prefix for both source audio and published snippets
    pub collection: String,
    /// Path to the mode's catalog TOML
    pub catalog: PathBuf,
    /// Seed salt appended to the date string (empty for the primary mode)
    #[serde(default)]
    pub salt: String,
}

/// Service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// HTTP port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Shared secret required as a bearer token on trigger endpoints
    pub shared_secret: String,
    /// SQLite database path
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
    /// Root directory of the source-audio bucket
    pub source_root: PathBuf,
    /// Root directory of the published-snippet bucket
    pub snippet_root: PathBuf,
    /// Duration probe binary; `None` forces the frame-sum fallback
    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: Option<String>,
    /// Probe subprocess timeout in seconds
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,
    /// Target snippet length in seconds
    #[serde(default = "default_snippet_duration_secs")]
    pub snippet_duration_secs: f64,
    /// Configured game modes (at least one required)
    pub modes: Vec<ModeConfig>,
}

fn default_port() -> u16 {
    5830
}

fn default_database_path() -> PathBuf {
    PathBuf::from("trackle.db")
}

fn default_ffprobe_path() -> Option<String> {
    Some("ffprobe".to_string())
}

fn default_probe_timeout_secs() -> u64 {
    10
}

fn default_snippet_duration_secs() -> f64 {
    5.0
}

impl Config {
    /// Load configuration from an explicit path, the environment, or the
    /// platform config directory, in that order
    pub fn resolve(cli_arg: Option<&Path>) -> Result<Self> {
        if let Some(path) = cli_arg {
            return Self::load(path);
        }

        if let Ok(path) = std::env::var("TRACKLE_CONFIG") {
            return Self::load(Path::new(&path));
        }

        Self::load(&find_config_file()?)
    }

    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let mut config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;

        if config.shared_secret.is_empty() {
            return Err(Error::Config("shared_secret must not be empty".to_string()));
        }
        if config.modes.is_empty() {
            return Err(Error::Config("At least one [[modes]] entry is required".to_string()));
        }
        if config.snippet_duration_secs <= 0.0 {
            return Err(Error::Config("snippet_duration_secs must be positive".to_string()));
        }

        // Resolve relative paths against the config file's directory
        if let Some(base) = path.parent() {
            config.database_path = absolutize(base, &config.database_path);
            config.source_root = absolutize(base, &config.source_root);
            config.snippet_root = absolutize(base, &config.snippet_root);
            for mode in &mut config.modes {
                mode.catalog = absolutize(base, &mode.catalog);
            }
        }

        Ok(config)
    }

    /// Look up a configured mode by name
    pub fn mode(&self, name: &str) -> Option<&ModeConfig> {
        self.modes.iter().find(|m| m.name == name)
    }
}

fn absolutize(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Find the platform config file
fn find_config_file() -> Result<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("trackle").join("trackle.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Ok(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/trackle/trackle.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
    }

    Err(Error::Config("No config file found".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL: &str = r#"
        shared_secret = "hunter2"
        source_root = "sources"
        snippet_root = "snippets"

        [[modes]]
        name = "classic"
        collection = "songs"
        catalog = "catalogs/classic.toml"
    "#;

    fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trackle.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn test_minimal_config_defaults() {
        let (_dir, path) = write_config(MINIMAL);
        let config = Config::load(&path).unwrap();
        assert_eq!(config.port, 5830);
        assert_eq!(config.snippet_duration_secs, 5.0);
        assert_eq!(config.ffprobe_path.as_deref(), Some("ffprobe"));
        assert_eq!(config.modes.len(), 1);
        assert_eq!(config.modes[0].salt, "");
    }

    #[test]
    fn test_relative_paths_resolve_against_config_dir() {
        let (dir, path) = write_config(MINIMAL);
        let config = Config::load(&path).unwrap();
        assert_eq!(config.source_root, dir.path().join("sources"));
        assert_eq!(config.modes[0].catalog, dir.path().join("catalogs/classic.toml"));
    }

    #[test]
    fn test_empty_secret_rejected() {
        let content = MINIMAL.replace("hunter2", "");
        let (_dir, path) = write_config(&content);
        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("shared_secret"));
    }

    #[test]
    fn test_no_modes_rejected() {
        let (_dir, path) = write_config(
            r#"
            shared_secret = "hunter2"
            source_root = "sources"
            snippet_root = "snippets"
            modes = []
            "#,
        );
        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("modes"));
    }

    #[test]
    fn test_mode_lookup() {
        let (_dir, path) = write_config(MINIMAL);
        let config = Config::load(&path).unwrap();
        assert!(config.mode("classic").is_some());
        assert!(config.mode("missing").is_none());
    }
}
