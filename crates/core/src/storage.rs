//! File storage for uploaded images.
//!
//! [`FileStorage`] is the seam between the catalog and wherever image bytes
//! live. Paths returned by [`FileStorage::put`] are relative (e.g.
//! `products/0190c3b2-....jpg`) and are what the database stores.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use uuid::Uuid;

/// Directory hint for product images.
pub const PRODUCTS_DIR: &str = "products";

/// Directory hint for category images.
pub const CATEGORIES_DIR: &str = "categories";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Invalid storage path: {0}")]
    InvalidPath(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Durable storage for uploaded files.
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Persist `bytes` under `dir_hint` with the given extension and return
    /// the stored relative path.
    async fn put(&self, bytes: &[u8], dir_hint: &str, extension: &str)
        -> Result<String, StorageError>;

    /// Remove a previously stored file. Removing a missing file succeeds.
    async fn delete(&self, path: &str) -> Result<(), StorageError>;

    /// Confirm new files can currently be written.
    async fn check_writable(&self) -> Result<(), StorageError>;
}

/// Stores files on the local disk beneath a root directory.
#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a stored relative path, refusing anything that could escape the root.
    fn resolve(&self, relative: &str) -> Result<PathBuf, StorageError> {
        let rel = Path::new(relative);
        let safe = !relative.is_empty()
            && rel
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if safe {
            Ok(self.root.join(rel))
        } else {
            Err(StorageError::InvalidPath(relative.to_string()))
        }
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn put(
        &self,
        bytes: &[u8],
        dir_hint: &str,
        extension: &str,
    ) -> Result<String, StorageError> {
        let relative = format!("{dir_hint}/{}.{extension}", Uuid::now_v7());
        let full = self.resolve(&relative)?;

        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| StorageError::Io {
                    path: parent.display().to_string(),
                    source,
                })?;
        }
        tokio::fs::write(&full, bytes)
            .await
            .map_err(|source| StorageError::Io {
                path: relative.clone(),
                source,
            })?;

        tracing::debug!(path = %relative, size = bytes.len(), "Stored file");
        Ok(relative)
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        let full = self.resolve(path)?;
        match tokio::fs::remove_file(&full).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io {
                path: path.to_string(),
                source,
            }),
        }
    }

    async fn check_writable(&self) -> Result<(), StorageError> {
        let marker = self.root.join(format!(".write-check-{}", Uuid::now_v7()));
        let io_err = |source: std::io::Error| StorageError::Io {
            path: marker.display().to_string(),
            source,
        };
        tokio::fs::create_dir_all(&self.root).await.map_err(io_err)?;
        tokio::fs::write(&marker, b"").await.map_err(io_err)?;
        tokio::fs::remove_file(&marker).await.map_err(io_err)
    }
}
