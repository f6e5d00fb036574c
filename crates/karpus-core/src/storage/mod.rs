//! Key/value storage primitive shared by the cache and the store.
//!
//! This is the equivalent of a browser's local storage: a flat map of
//! string keys to string values. Two backends are provided:
//! - `MemoryStorage`: in-process, with an optional byte quota
//! - `FileStorage`: the whole map persisted as a single JSON file
//!
//! Both are cheap to share as `SharedStorage` (`Arc<dyn Storage>`).

pub mod file;
pub mod memory;

use std::sync::Arc;

use crate::error::StorageError;

pub use file::FileStorage;
pub use memory::MemoryStorage;

pub type SharedStorage = Arc<dyn Storage>;

pub trait Storage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing a key that does not exist is not an error.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;

    fn keys(&self) -> Result<Vec<String>, StorageError>;
}

/// Bytes a map occupies when counted the way quotas count them.
pub(crate) fn entry_size(key: &str, value: &str) -> usize {
    key.len() + value.len()
}
