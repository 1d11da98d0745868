//! Blob storage collaborators
//!
//! The pipeline talks to two buckets through one object-safe trait: the
//! source bucket (read) and the snippet bucket (write + existence checks).
//! Production uses directory-rooted stores; tests inject temp-dir stores.
//! Keys may contain `/` separators and map to relative paths.

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};

/// Object storage seam used by the pipeline
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// True when a blob exists under `key`
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Fetch a blob's bytes
    async fn download(&self, key: &str) -> Result<Vec<u8>>;

    /// Write a blob, overwriting any existing object under the same key
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<()>;
}

/// Filesystem-rooted blob store
///
/// Keys resolve relative to `root`; parent directories are created on put.
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a key, rejecting absolute keys and parent traversal
    fn resolve(&self, key: &str) -> Result<PathBuf> {
        let rel = Path::new(key);
        let traversal = rel
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)));
        if key.is_empty() || traversal {
            return Err(Error::BadRequest(format!("Invalid blob key: {:?}", key)));
        }
        Ok(self.root.join(rel))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn exists(&self, key: &str) -> Result<bool> {
        let path = self.resolve(key)?;
        Ok(tokio::fs::try_exists(&path).await?)
    }

    async fn download(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.resolve(key)?;
        Ok(tokio::fs::read(&path).await?)
    }

    async fn put(&self, key: &str, bytes: &[u8], _content_type: &str) -> Result<()> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, FsBlobStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());
        (dir, store)
    }

    #[tokio::test]
    async fn test_put_download_roundtrip() {
        let (_dir, store) = store();
        store.put("songs/a.mp3", b"abc", "audio/mpeg").await.unwrap();
        assert!(store.exists("songs/a.mp3").await.unwrap());
        assert_eq!(store.download("songs/a.mp3").await.unwrap(), b"abc");
    }

    #[tokio::test]
    async fn test_put_overwrites_same_key() {
        let (_dir, store) = store();
        store.put("k", b"one", "audio/mpeg").await.unwrap();
        store.put("k", b"two", "audio/mpeg").await.unwrap();
        assert_eq!(store.download("k").await.unwrap(), b"two");
    }

    #[tokio::test]
    async fn test_missing_key_not_exists() {
        let (_dir, store) = store();
        assert!(!store.exists("nope.mp3").await.unwrap());
        assert!(store.download("nope.mp3").await.is_err());
    }

    #[tokio::test]
    async fn test_traversal_key_rejected() {
        let (_dir, store) = store();
        assert!(store.exists("../escape").await.is_err());
        assert!(store.put("/abs", b"x", "audio/mpeg").await.is_err());
    }
}
