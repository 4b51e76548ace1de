use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use convochat_core::{Envelope, EnvelopeStatus};
use tracing::{debug, warn};

use crate::manager::ConvoChat;
use crate::store::CacheStore;

const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Lifetime of a cached response, by kind.
pub fn ttl_for(kind: &str) -> Duration {
    match kind {
        "devices" => Duration::from_secs(300),
        "credits" => Duration::from_secs(60),
        "accounts" => Duration::from_secs(600),
        "rates" => Duration::from_secs(3600),
        "subscription" => Duration::from_secs(1800),
        _ => DEFAULT_TTL,
    }
}

pub fn cache_key(kind: &str, key: &str) -> String {
    format!("convochat.{}.{}", kind, key)
}

/// Memoizes slow-changing lookups (devices, credits, rates...).
///
/// The cache is best effort: a failing store is logged and bypassed, and
/// envelopes reporting an error are handed back without being stored.
#[derive(Clone)]
pub struct ResponseCache {
    store: Arc<dyn CacheStore>,
}

impl ResponseCache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    pub async fn remember<F, Fut>(
        &self,
        kind: &str,
        key: &str,
        loader: F,
    ) -> convochat_core::Result<Envelope>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = convochat_core::Result<Envelope>>,
    {
        let cache_key = cache_key(kind, key);

        match self.store.get(&cache_key).await {
            Ok(Some(value)) => {
                if let Some(envelope) = Envelope::from_value(value) {
                    debug!(key = %cache_key, "cache hit");
                    return Ok(envelope);
                }
            }
            Ok(None) => {}
            Err(e) => warn!(key = %cache_key, error = %e, "cache read failed"),
        }

        let envelope = loader().await?;
        if is_cacheable(&envelope) {
            let ttl = ttl_for(kind);
            if let Err(e) = self
                .store
                .put(&cache_key, envelope.as_value().clone(), ttl)
                .await
            {
                warn!(key = %cache_key, error = %e, "cache write failed");
            }
        }
        Ok(envelope)
    }

    pub async fn forget(&self, kind: &str, key: &str) {
        let cache_key = cache_key(kind, key);
        if let Err(e) = self.store.forget(&cache_key).await {
            warn!(key = %cache_key, error = %e, "cache forget failed");
        }
    }

    /// Drop every entry of `kind`.
    pub async fn invalidate_kind(&self, kind: &str) -> usize {
        let prefix = format!("convochat.{}.", kind);
        match self.store.forget_prefix(&prefix).await {
            Ok(removed) => removed,
            Err(e) => {
                warn!(kind, error = %e, "cache invalidation failed");
                0
            }
        }
    }

    /// Preload devices, credits and WhatsApp accounts. Failures are logged
    /// and stop the warm-up; they are never returned.
    pub async fn warm_up(&self, convochat: &ConvoChat) {
        let result = async {
            self.remember("devices", "all", || convochat.sms().get_devices(10, 1))
                .await?;
            self.remember("credits", "balance", || convochat.sms().get_credits())
                .await?;
            self.remember("accounts", "whatsapp", || {
                convochat.whatsapp().get_whatsapp_accounts()
            })
            .await?;
            Ok::<_, convochat_core::ConvoChatError>(())
        }
        .await;

        if let Err(e) = result {
            warn!(error = %e, "ConvoChat cache warming failed");
        }
    }
}

fn is_cacheable(envelope: &Envelope) -> bool {
    match envelope.status() {
        EnvelopeStatus::Error => false,
        EnvelopeStatus::Code(code) => (200..300).contains(&code),
        _ => true,
    }
}
