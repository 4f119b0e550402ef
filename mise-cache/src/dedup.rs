use bytes::Bytes;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures_util::future::{BoxFuture, Shared};
use futures_util::FutureExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::error::CacheError;
use crate::store::{decode, encode, ResultCache};

type InFlight<E> = Shared<BoxFuture<'static, Result<Bytes, E>>>;

/// Shares one in-flight fetch between every caller asking for the same key.
///
/// Lookup order for a key: live cache entry, then a request already in
/// flight, then a fresh call to the producer. The in-flight registration is
/// removed when the producer settles, whatever the outcome, so a failure is
/// never remembered and the next call starts over.
///
/// The producer runs on its own tokio task. A caller that stops waiting does
/// not cancel it; the result still lands in the cache and later callers pick
/// it up. Must be called from within a tokio runtime.
///
/// `E` must be `Clone` because every joined caller receives the same error.
pub struct Deduplicator<E> {
    cache: ResultCache,
    pending: Arc<DashMap<String, InFlight<E>>>,
}

impl<E> Clone for Deduplicator<E> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            pending: Arc::clone(&self.pending),
        }
    }
}

impl<E> Deduplicator<E>
where
    E: From<CacheError> + Clone + Send + Sync + 'static,
{
    pub fn new(cache: ResultCache) -> Self {
        Self {
            cache,
            pending: Arc::new(DashMap::new()),
        }
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Number of keys with a request in flight.
    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    /// Run `producer` at most once per key while a request is in flight.
    ///
    /// The result is not written to the cache; use [`request_and_cache`]
    /// for that.
    ///
    /// [`request_and_cache`]: Deduplicator::request_and_cache
    pub async fn request<T, F, Fut>(&self, key: &str, producer: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        self.run(key, None, producer).await
    }

    /// Like [`request`](Deduplicator::request), storing a successful result
    /// under `key` for `ttl` before the in-flight registration is released.
    pub async fn request_and_cache<T, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        producer: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        self.run(key, Some(ttl), producer).await
    }

    async fn run<T, F, Fut>(&self, key: &str, ttl: Option<Duration>, producer: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        if let Some(hit) = self.cache.get_json::<T>(key) {
            tracing::debug!(key, "cache hit");
            return Ok(hit);
        }

        let in_flight = match self.pending.entry(key.to_string()) {
            Entry::Occupied(entry) => {
                tracing::debug!(key, "joining in-flight request");
                entry.get().clone()
            }
            Entry::Vacant(slot) => {
                tracing::debug!(key, "cache miss, starting request");
                let fut = producer();
                let cache = self.cache.clone();
                let pending = Arc::clone(&self.pending);
                let owned_key = key.to_string();
                // The shard lock held by `slot` keeps the task's removal
                // ordered after the insert below.
                let task = tokio::spawn(async move {
                    let _release = Release { pending, key: owned_key.clone() };
                    let outcome = match fut.await {
                        Ok(value) => encode(&value).map_err(E::from),
                        Err(err) => Err(err),
                    };
                    if let (Ok(bytes), Some(ttl)) = (&outcome, ttl) {
                        cache.set(&owned_key, bytes.clone(), ttl);
                    }
                    outcome
                });
                let shared = async move {
                    match task.await {
                        Ok(outcome) => outcome,
                        Err(err) => Err(E::from(CacheError::Aborted(err.to_string()))),
                    }
                }
                .boxed()
                .shared();
                slot.insert(shared.clone());
                shared
            }
        };

        let bytes = in_flight.await?;
        decode(&bytes).map_err(E::from)
    }
}

/// Drops the in-flight registration when the fetch task ends, panics
/// included.
struct Release<E> {
    pending: Arc<DashMap<String, InFlight<E>>>,
    key: String,
}

impl<E> Drop for Release<E> {
    fn drop(&mut self) {
        self.pending.remove(&self.key);
    }
}

/// Run `requests` in consecutive batches of at most `batch_size` concurrent
/// futures. Output order matches input order; the first error aborts.
pub async fn batch<T, E, F, Fut>(requests: Vec<F>, batch_size: usize) -> Result<Vec<T>, E>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let batch_size = batch_size.max(1);
    let mut results = Vec::with_capacity(requests.len());
    let mut requests = requests.into_iter().peekable();
    while requests.peek().is_some() {
        let chunk: Vec<Fut> = requests.by_ref().take(batch_size).map(|f| f()).collect();
        results.extend(futures_util::future::try_join_all(chunk).await?);
    }
    Ok(results)
}
