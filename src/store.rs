//! Key-value store seam shared by the rate limiter and the response cache.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cache backend error: {0}")]
    Backend(String),
    #[error("cache entry could not be encoded: {0}")]
    Codec(#[from] serde_json::Error),
    #[error("gave up updating {key} after {tries} conflicting writes")]
    Contention { key: String, tries: u32 },
}

/// External cache the limiter and the response cache sit on.
///
/// Implementations must make [`CacheStore::compare_and_swap`] atomic; it is
/// the only write the rate limiter performs.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Live value for `key`; expired entries read as absent.
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// A zero `ttl` stores nothing.
    async fn put(&self, key: &str, value: Value, ttl: Duration) -> Result<(), StoreError>;

    /// Write `new` only if the live value still equals `expected` (`None`
    /// meaning absent). Returns whether the write happened.
    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&Value>,
        new: Value,
        ttl: Duration,
    ) -> Result<bool, StoreError>;

    async fn forget(&self, key: &str) -> Result<bool, StoreError>;

    /// Number of entries removed.
    async fn forget_prefix(&self, prefix: &str) -> Result<usize, StoreError>;
}

#[derive(Debug)]
struct Entry {
    value: Value,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// Process-local [`CacheStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.lock().values().filter(|e| e.is_live(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Raw map size, expired entries included.
    #[cfg(test)]
    fn stored(&self) -> usize {
        self.lock().len()
    }

    /// Every write sweeps expired entries, so keys that are never read again
    /// do not accumulate.
    fn write(entries: &mut HashMap<String, Entry>, key: &str, value: Value, ttl: Duration) {
        let now = Instant::now();
        entries.retain(|_, e| e.is_live(now));
        if ttl.is_zero() {
            entries.remove(key);
            return;
        }
        entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: now + ttl,
            },
        );
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let now = Instant::now();
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if entry.is_live(now) => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, value: Value, ttl: Duration) -> Result<(), StoreError> {
        Self::write(&mut self.lock(), key, value, ttl);
        Ok(())
    }

    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&Value>,
        new: Value,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        let now = Instant::now();
        let mut entries = self.lock();
        let current = entries
            .get(key)
            .filter(|e| e.is_live(now))
            .map(|e| &e.value);
        if current != expected {
            debug!(key, "compare-and-swap lost a race");
            return Ok(false);
        }
        Self::write(&mut entries, key, new, ttl);
        Ok(true)
    }

    async fn forget(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.lock().remove(key).is_some())
    }

    async fn forget_prefix(&self, prefix: &str) -> Result<usize, StoreError> {
        let now = Instant::now();
        let mut entries = self.lock();
        let mut removed = 0;
        entries.retain(|key, entry| {
            if !entry.is_live(now) {
                return false;
            }
            if key.starts_with(prefix) {
                removed += 1;
                return false;
            }
            true
        });
        Ok(removed)
    }
}
