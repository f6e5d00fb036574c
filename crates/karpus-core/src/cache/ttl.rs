use chrono::Duration;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::clock::{window_millis, SharedClock};
use crate::error::CacheError;
use crate::storage::SharedStorage;
use crate::utils::format_age;

/// Namespace used for the attendance list cache
pub const ATTENDANCE_CACHE_PREFIX: &str = "attendance_cache:";

/// Default freshness window: 5 minutes.
pub const DEFAULT_TTL_MS: u64 = 5 * 60 * 1000;

/// What is stored under each namespaced key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// Epoch milliseconds at write time
    pub ts: i64,
    pub value: T,
}

impl<T> CacheEntry<T> {
    pub fn age(&self, now_ms: i64) -> Duration {
        Duration::milliseconds(now_ms - self.ts)
    }
}

pub struct TtlCache {
    storage: SharedStorage,
    clock: SharedClock,
    prefix: String,
    ttl_ms: u64,
}

impl TtlCache {
    pub fn new(
        storage: SharedStorage,
        clock: SharedClock,
        prefix: impl Into<String>,
        ttl_ms: u64,
    ) -> Self {
        Self {
            storage,
            clock,
            prefix: prefix.into(),
            ttl_ms,
        }
    }

    /// The cache used for attendance lists (`attendance_cache:` namespace).
    pub fn attendance(storage: SharedStorage, clock: SharedClock, ttl_ms: u64) -> Self {
        Self::new(storage, clock, ATTENDANCE_CACHE_PREFIX, ttl_ms)
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    /// Read the raw entry, treating unreadable or unparseable data as absent.
    fn load_entry(&self, full_key: &str) -> Option<CacheEntry<Value>> {
        let raw = match self.storage.get_item(full_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                debug!(key = full_key, error = %e, "Cache read failed, treating as miss");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!(key = full_key, error = %e, "Cache entry unparseable, treating as miss");
                None
            }
        }
    }

    fn is_expired<T>(&self, entry: &CacheEntry<T>) -> bool {
        let age_ms = self.clock.now_millis().saturating_sub(entry.ts);
        age_ms > window_millis(self.ttl_ms)
    }

    /// Get a fresh value for `key`.
    ///
    /// Returns `None` when the entry is missing, expired, corrupt or of a
    /// different shape than `T`. An expired entry is deleted from storage.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let full_key = self.namespaced(key);
        let entry = self.load_entry(&full_key)?;

        if self.is_expired(&entry) {
            debug!(key = %full_key, "Cache entry expired, removing");
            if let Err(e) = self.storage.remove_item(&full_key) {
                debug!(key = %full_key, error = %e, "Failed to remove expired cache entry");
            }
            return None;
        }

        match serde_json::from_value(entry.value) {
            Ok(value) => {
                debug!(key = %full_key, "Cache hit");
                Some(value)
            }
            Err(e) => {
                debug!(key = %full_key, error = %e, "Cache entry has unexpected shape");
                None
            }
        }
    }

    /// Store `value` under `key` stamped with the current time.
    ///
    /// The result may be ignored; a failed write only means the next read
    /// is a miss.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let full_key = self.namespaced(key);
        let entry = CacheEntry {
            ts: self.clock.now_millis(),
            value,
        };
        let raw = serde_json::to_string(&entry)?;

        self.storage.set_item(&full_key, &raw).map_err(|e| {
            warn!(key = %full_key, error = %e, "Cache write failed");
            CacheError::from(e)
        })
    }

    /// Return the cached value, or run `fetch` and cache what it returns.
    ///
    /// A failed cache write does not affect the returned value.
    pub fn get_or_fetch<T, E, F>(&self, key: &str, fetch: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<T, E>,
    {
        if let Some(cached) = self.get(key) {
            return Ok(cached);
        }

        let fresh = fetch()?;
        let _ = self.set(key, &fresh);
        Ok(fresh)
    }

    /// Drop a single entry.
    pub fn invalidate(&self, key: &str) -> Result<(), CacheError> {
        self.storage.remove_item(&self.namespaced(key))?;
        Ok(())
    }

    /// Remove every entry in this cache's namespace. Keys outside the
    /// namespace are left untouched. Returns the number of entries removed.
    pub fn invalidate_all(&self) -> Result<usize, CacheError> {
        let keys: Vec<String> = self
            .storage
            .keys()?
            .into_iter()
            .filter(|k| k.starts_with(&self.prefix))
            .collect();

        for key in &keys {
            self.storage.remove_item(key)?;
        }

        debug!(prefix = %self.prefix, removed = keys.len(), "Cache invalidated");
        Ok(keys.len())
    }

    /// Age of the entry for `key`, fresh or not.
    pub fn age(&self, key: &str) -> Option<Duration> {
        self.load_entry(&self.namespaced(key))
            .map(|entry| entry.age(self.clock.now_millis()))
    }

    /// Age formatted for a status line, or "never" when nothing is cached.
    pub fn age_display(&self, key: &str) -> String {
        self.age(key)
            .map(format_age)
            .unwrap_or_else(|| "never".to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================
