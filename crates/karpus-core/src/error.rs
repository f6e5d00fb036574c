use thiserror::Error;

/// Failures of the key/value storage primitive.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage quota exceeded: needs {needed} bytes, quota is {quota}")]
    QuotaExceeded { needed: usize, quota: usize },

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage file is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage lock poisoned")]
    Poisoned,
}

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache write failed: {0}")]
    Storage(#[from] StorageError),

    #[error("Cache value could not be serialized: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors surfaced by mutating store operations.
///
/// A `Persist` error means the in-memory change was applied but the
/// write-through to storage did not complete.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to persist store snapshot: {0}")]
    Persist(#[from] StorageError),

    #[error("Failed to serialize store snapshot: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// True when the failure came from the storage quota.
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, StoreError::Persist(StorageError::QuotaExceeded { .. }))
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
