//! Durable draft storage: one JSON snapshot, written wholesale.
//!
//! Persistence happens on explicit mutation boundaries (the reducer emits a
//! save effect after each mutating action), never as a hidden side effect.
//! One process owns one snapshot path; concurrent processes sharing a path
//! are last-write-wins with no cross-process lock.

use crate::draft::DraftSnapshot;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use thiserror::Error;

/// Errors from the draft snapshot store
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem failure reading or writing the snapshot
    #[error("draft snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The snapshot exists but does not parse
    ///
    /// Callers fall back to an empty draft; a corrupt snapshot must never
    /// block a new booking.
    #[error("corrupt draft snapshot: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Durable storage for the in-progress draft
///
/// Implemented by [`FileDraftStore`] in production and by an in-memory mock
/// in tests. Methods return boxed futures so the trait stays object-safe
/// behind `Arc<dyn DraftStore>`.
pub trait DraftStore: Send + Sync {
    /// Persist a snapshot, replacing any previous one wholesale
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] when the snapshot cannot be written.
    fn save(
        &self,
        snapshot: DraftSnapshot,
    ) -> Pin<Box<dyn Future<Output = Result<(), StorageError>> + Send + '_>>;

    /// Load the persisted snapshot, if one exists
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Corrupt`] when a snapshot exists but does not
    /// parse, and [`StorageError::Io`] on filesystem failures other than a
    /// missing file.
    fn load(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Option<DraftSnapshot>, StorageError>> + Send + '_>>;

    /// Remove the persisted snapshot
    ///
    /// Clearing an absent snapshot is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] when the snapshot exists but cannot be
    /// removed.
    fn clear(&self) -> Pin<Box<dyn Future<Output = Result<(), StorageError>> + Send + '_>>;
}

/// File-backed snapshot store
///
/// Writes the snapshot as pretty-printed JSON to a single path, creating
/// parent directories on first save. A missing file loads as `None`.
#[derive(Debug, Clone)]
pub struct FileDraftStore {
    path: PathBuf,
}

impl FileDraftStore {
    /// Create a store persisting to the given path
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The snapshot path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DraftStore for FileDraftStore {
    fn save(
        &self,
        snapshot: DraftSnapshot,
    ) -> Pin<Box<dyn Future<Output = Result<(), StorageError>> + Send + '_>> {
        Box::pin(async move {
            let bytes = serde_json::to_vec_pretty(&snapshot)?;
            if let Some(parent) = self.path.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
            tokio::fs::write(&self.path, bytes).await?;
            tracing::trace!(path = %self.path.display(), "draft snapshot written");
            Ok(())
        })
    }

    fn load(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Option<DraftSnapshot>, StorageError>> + Send + '_>>
    {
        Box::pin(async move {
            match tokio::fs::read(&self.path).await {
                Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
                Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(error) => Err(error.into()),
            }
        })
    }

    fn clear(&self) -> Pin<Box<dyn Future<Output = Result<(), StorageError>> + Send + '_>> {
        Box::pin(async move {
            match tokio::fs::remove_file(&self.path).await {
                Ok(()) => Ok(()),
                Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(error) => Err(error.into()),
            }
        })
    }
}
