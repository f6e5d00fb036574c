//! Karpus Kids core library.
//!
//! Local data layer for the Karpus Kids school app:
//! - `storage`: the key/value storage primitive (memory or JSON file)
//! - `cache`: namespaced TTL cache for short-lived list data
//! - `store`: the local application store and its aggregate queries
//! - `models`: the records the store holds
//! - `config`: application configuration

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod storage;
pub mod store;
pub mod utils;

pub use cache::TtlCache;
pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use config::{Config, RejectedOverride};
pub use error::{CacheError, StorageError, StoreError, StoreResult};
pub use storage::{FileStorage, MemoryStorage, SharedStorage, Storage};
pub use store::KarpusStore;
