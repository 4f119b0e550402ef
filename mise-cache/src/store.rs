use bytes::Bytes;
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::CacheError;

#[derive(Clone)]
struct CacheEntry {
    value: Bytes,
    stored_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_live(&self) -> bool {
        self.stored_at.elapsed() <= self.ttl
    }
}

/// Process-lifetime result cache keyed by string, with a TTL per entry.
///
/// Values are stored as serialized bytes so one cache can hold recipe lists,
/// pages and single records side by side. Expired entries are evicted lazily
/// on read. Cloning the handle shares the underlying store.
#[derive(Clone, Default)]
pub struct ResultCache {
    inner: Arc<DashMap<String, CacheEntry>>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a live value. An expired entry is removed and reported as a miss.
    pub fn get(&self, key: &str) -> Option<Bytes> {
        if let Some(entry) = self.inner.get(key) {
            if entry.is_live() {
                return Some(entry.value.clone());
            }
            // Drop the read guard before removing.
            drop(entry);
            self.inner.remove_if(key, |_, entry| !entry.is_live());
            tracing::trace!(key, "cache entry expired");
        }
        None
    }

    /// Store `value` under `key`, replacing any previous entry.
    pub fn set(&self, key: &str, value: Bytes, ttl: Duration) {
        self.inner.insert(
            key.to_string(),
            CacheEntry {
                value,
                stored_at: Instant::now(),
                ttl,
            },
        );
    }

    /// Get and deserialize a value. Undecodable entries are removed.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let bytes = self.get(key)?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(key, error = %err, "dropping undecodable cache entry");
                self.inner.remove(key);
                None
            }
        }
    }

    pub fn set_json<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let bytes = encode(value)?;
        self.set(key, bytes, ttl);
        Ok(())
    }

    pub fn remove(&self, key: &str) {
        self.inner.remove(key);
    }

    /// Invalidate entries.
    ///
    /// With `None` the whole cache is cleared. With `Some(pattern)` every entry
    /// whose key contains `pattern` is removed, so `"recipes"` drops
    /// `recipes-page-1` as well as `user-recipes-42`.
    pub fn invalidate(&self, pattern: Option<&str>) {
        match pattern {
            None => self.inner.clear(),
            Some(pattern) => self.inner.retain(|key, _| !key.contains(pattern)),
        }
        tracing::debug!(pattern = pattern.unwrap_or("*"), "cache invalidated");
    }

    /// Remove every expired entry.
    pub fn evict_expired(&self) {
        self.inner.retain(|_, entry| entry.is_live());
    }

    /// Number of stored entries, expired ones included until evicted.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

pub(crate) fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Bytes, CacheError> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(|e| CacheError::Encode(e.to_string()))
}

pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CacheError> {
    serde_json::from_slice(bytes).map_err(|e| CacheError::Decode(e.to_string()))
}
