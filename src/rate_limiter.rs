use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::store::{CacheStore, StoreError};

/// Conflicting writes tolerated before [`RateLimiter::attempt`] gives up.
const MAX_SWAP_TRIES: u32 = 16;

/// Counter persisted under `rate_limit:{key}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitRecord {
    pub key: String,
    pub attempts: u32,
    #[serde(with = "time::serde::rfc3339")]
    pub window_expiry: OffsetDateTime,
}

impl RateLimitRecord {
    fn is_live(&self, now: OffsetDateTime) -> bool {
        self.window_expiry > now
    }
}

/// Fixed-window attempt counter keyed by an arbitrary string.
///
/// Every successful attempt refreshes the window to `now + window`. Once the
/// limit is reached, further attempts are refused without touching the
/// stored record, so a blocked caller does not extend its own window.
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn CacheStore>,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    pub fn cache_key(key: &str) -> String {
        format!("rate_limit:{}", key)
    }

    /// Count one attempt; `false` once `max_attempts` is reached.
    pub async fn attempt(
        &self,
        key: &str,
        max_attempts: u32,
        window_minutes: u64,
    ) -> Result<bool, StoreError> {
        let cache_key = Self::cache_key(key);
        let window = Duration::from_secs(window_minutes.saturating_mul(60));

        for _ in 0..MAX_SWAP_TRIES {
            let raw = self.store.get(&cache_key).await?;
            let now = OffsetDateTime::now_utc();
            let attempts = live_record(raw.as_ref(), now).map_or(0, |r| r.attempts);

            if attempts >= max_attempts {
                debug!(key, attempts, max_attempts, "rate limit reached");
                return Ok(false);
            }

            let next = RateLimitRecord {
                key: key.to_string(),
                attempts: attempts + 1,
                window_expiry: now + window,
            };
            let swapped = self
                .store
                .compare_and_swap(&cache_key, raw.as_ref(), serde_json::to_value(&next)?, window)
                .await?;
            if swapped {
                debug!(key, attempts = next.attempts, "rate limit attempt recorded");
                return Ok(true);
            }
        }

        warn!(key, "rate limiter could not record attempt under contention");
        Err(StoreError::Contention {
            key: cache_key,
            tries: MAX_SWAP_TRIES,
        })
    }

    /// Attempts counted in the current window.
    pub async fn attempts(&self, key: &str) -> Result<u32, StoreError> {
        Ok(self.record(key).await?.map_or(0, |r| r.attempts))
    }

    /// Live record for `key`, if any.
    pub async fn record(&self, key: &str) -> Result<Option<RateLimitRecord>, StoreError> {
        let raw = self.store.get(&Self::cache_key(key)).await?;
        Ok(live_record(raw.as_ref(), OffsetDateTime::now_utc()))
    }

    /// `max_attempts` minus the attempts used, never negative.
    pub async fn remaining(&self, key: &str, max_attempts: u32) -> Result<u32, StoreError> {
        Ok(max_attempts.saturating_sub(self.attempts(key).await?))
    }

    pub async fn retries_left(&self, key: &str, max_attempts: u32) -> Result<u32, StoreError> {
        self.remaining(key, max_attempts).await
    }

    /// Read-only check; never records an attempt.
    pub async fn too_many_attempts(&self, key: &str, max_attempts: u32) -> Result<bool, StoreError> {
        Ok(self.attempts(key).await? >= max_attempts)
    }

    pub async fn clear(&self, key: &str) -> Result<(), StoreError> {
        self.store.forget(&Self::cache_key(key)).await?;
        Ok(())
    }
}

fn live_record(raw: Option<&Value>, now: OffsetDateTime) -> Option<RateLimitRecord> {
    raw.and_then(|v| serde_json::from_value::<RateLimitRecord>(v.clone()).ok())
        .filter(|r| r.is_live(now))
}
