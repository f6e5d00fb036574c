//! Namespaced key/value cache with TTL expiry.
//!
//! Short-lived list data (today's attendance, class rosters) is cached in
//! the shared storage under a prefix such as `attendance_cache:`. Entries
//! older than the TTL read as absent and are removed on that read.
//!
//! The cache is an optimization only: every failure reads as a miss and
//! callers fall back to a live fetch.

pub mod ttl;

pub use ttl::{CacheEntry, TtlCache, ATTENDANCE_CACHE_PREFIX, DEFAULT_TTL_MS};
