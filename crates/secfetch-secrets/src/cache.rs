//! Process-lifetime cache of raw secret bodies
//!
//! Keyed by provider prefix plus identifier. Entries are never evicted or
//! refreshed; one cache lives for one run. Concurrent first lookups of the
//! same key share a single in-flight fetch.

use crate::error::Result;
use crate::security::SecureString;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{OnceCell, RwLock};

/// How a cached body was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheLookup {
    /// Served from the cache (or from a fetch another caller had in flight)
    Hit,
    /// Fetched by this call and stored
    Fetched,
}

/// In-memory cache of unprocessed secret bodies
#[derive(Debug, Default)]
pub struct SecretCache {
    slots: RwLock<HashMap<String, Arc<OnceCell<SecureString>>>>,
}

impl SecretCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache key for `path` fetched through the provider triggered by `prefix`
    pub fn key(prefix: &str, path: &str) -> String {
        format!("{}{}", prefix, path)
    }

    pub async fn get(&self, key: &str) -> Option<SecureString> {
        let slots = self.slots.read().await;
        slots.get(key).and_then(|slot| slot.get().cloned())
    }

    /// Store `body` unless the key already holds a value
    pub async fn put(&self, key: &str, body: SecureString) {
        let slot = self.slot(key).await;
        let _ = slot.set(body);
    }

    /// Return the cached body for `key`, running `fetch` on a miss
    ///
    /// A failed fetch stores nothing, so a later call fetches again.
    pub async fn get_or_fetch<F, Fut>(&self, key: &str, fetch: F) -> Result<(SecureString, CacheLookup)>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<SecureString>>,
    {
        let slot = self.slot(key).await;
        if let Some(body) = slot.get() {
            return Ok((body.clone(), CacheLookup::Hit));
        }

        let mut fetched = false;
        let body = slot
            .get_or_try_init(|| {
                fetched = true;
                fetch()
            })
            .await?;

        let lookup = if fetched {
            CacheLookup::Fetched
        } else {
            CacheLookup::Hit
        };
        Ok((body.clone(), lookup))
    }

    /// Number of stored bodies
    pub async fn len(&self) -> usize {
        let slots = self.slots.read().await;
        slots.values().filter(|slot| slot.initialized()).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn slot(&self, key: &str) -> Arc<OnceCell<SecureString>> {
        {
            let slots = self.slots.read().await;
            if let Some(slot) = slots.get(key) {
                return slot.clone();
            }
        }

        let mut slots = self.slots.write().await;
        slots
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone()
    }
}
