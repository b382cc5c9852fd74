//! Time-to-live cache kept in process memory
//!
//! Provides a `TtlCache` that stores values with an expiry deadline. Reads past
//! the deadline behave as a miss and remove the entry.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tracing::debug;

use super::clock::{Clock, SystemClock};

/// Default time-to-live for cache entries, in seconds (5 minutes)
pub const DEFAULT_TTL_SECS: i64 = 5 * 60;

/// A single stored value with its freshness metadata
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    /// The cached value
    value: V,
    /// When the value was stored
    cached_at: DateTime<Utc>,
    /// How long the value stays readable
    ttl: Duration,
}

impl<V> CacheEntry<V> {
    /// An entry is readable while `now - cached_at <= ttl`
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now - self.cached_at <= self.ttl
    }
}

/// In-memory key/value store where every value carries an expiry deadline
///
/// Expired entries are never returned. They are removed the next time they are
/// read through `get` or `has`, or in bulk by `clear_expired`. There is no
/// background sweep, so `size` may include entries that have expired but have
/// not been touched since.
///
/// Keys are plain strings; callers namespace them (see [`super::keys`]) so that
/// distinct queries never share an entry.
#[derive(Debug)]
pub struct TtlCache<V, C: Clock = SystemClock> {
    entries: HashMap<String, CacheEntry<V>>,
    default_ttl: Duration,
    clock: C,
}

impl<V> TtlCache<V, SystemClock> {
    /// Creates an empty cache on the wall clock with the 5 minute default TTL
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    /// Creates an empty cache on the wall clock with a custom default TTL
    pub fn with_default_ttl(default_ttl: Duration) -> Self {
        Self::with_clock(SystemClock).default_ttl(default_ttl)
    }
}

impl<V> Default for TtlCache<V, SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, C: Clock> TtlCache<V, C> {
    /// Creates an empty cache that reads time from `clock`
    pub fn with_clock(clock: C) -> Self {
        Self {
            entries: HashMap::new(),
            default_ttl: Duration::seconds(DEFAULT_TTL_SECS),
            clock,
        }
    }

    /// Replaces the TTL used by [`TtlCache::set`]
    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Stores `value` under `key` with the default TTL
    pub fn set(&mut self, key: impl Into<String>, value: V) {
        let ttl = self.default_ttl;
        self.set_with_ttl(key, value, ttl);
    }

    /// Stores `value` under `key`, readable for `ttl` from now
    ///
    /// Any existing entry for `key` is replaced regardless of its freshness.
    pub fn set_with_ttl(&mut self, key: impl Into<String>, value: V, ttl: Duration) {
        let entry = CacheEntry {
            value,
            cached_at: self.clock.now(),
            ttl,
        };
        self.entries.insert(key.into(), entry);
    }

    /// Returns the value for `key` if present and not expired
    ///
    /// An expired entry is removed as part of the read.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        if !self.check_fresh(key) {
            return None;
        }
        self.entries.get(key).map(|entry| &entry.value)
    }

    /// Whether a fresh value exists for `key`; evicts it if expired
    pub fn has(&mut self, key: &str) -> bool {
        self.check_fresh(key)
    }

    /// Removes the entry for `key`, returning whether one was stored
    pub fn delete(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Removes every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Removes every entry whose deadline has passed, returning how many went
    pub fn clear_expired(&mut self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_fresh(now));
        let removed = before - self.entries.len();
        if removed > 0 {
            debug!(removed, "swept expired cache entries");
        }
        removed
    }

    /// Number of stored entries, including expired ones not yet evicted
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    /// Freshness check shared by `get` and `has`
    fn check_fresh(&mut self, key: &str) -> bool {
        let now = self.clock.now();
        match self.entries.get(key).map(|entry| entry.is_fresh(now)) {
            Some(true) => true,
            Some(false) => {
                self.entries.remove(key);
                debug!(key, "evicted expired cache entry");
                false
            }
            None => false,
        }
    }
}
