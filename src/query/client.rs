//! Process-wide query cache.
//!
//! A `QueryClient` is constructed once at startup and shared through `Arc`.
//! It stores normalized pages keyed by [`QueryKey`], hands out fresh entries
//! without touching the network, and collapses concurrent fetches of the same
//! key into a single request.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use serde_json::Value;
use tokio::time::Instant;
use tracing::debug;

use crate::error::QueryError;

use super::key::{KeyPart, QueryKey};
use super::page::PageResult;

/// A cached page as shared between consumers
pub type CachedPage = Arc<PageResult<Value>>;

type SharedFetch = Shared<BoxFuture<'static, Result<CachedPage, QueryError>>>;

/// Freshness rules for one query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub use_cache: bool,
    /// How long an entry is served without refetching
    pub stale_time: Duration,
    /// How long an unused entry is kept at all
    pub cache_time: Duration,
}

impl CachePolicy {
    /// Every request goes to the network and nothing is kept
    pub fn disabled() -> Self {
        Self {
            use_cache: false,
            stale_time: Duration::ZERO,
            cache_time: Duration::ZERO,
        }
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            use_cache: true,
            stale_time: Duration::from_secs(30),
            cache_time: Duration::from_secs(300),
        }
    }
}

#[derive(Debug)]
struct CacheEntry {
    page: CachedPage,
    fetched_at: Instant,
    last_used: Instant,
    invalidated: bool,
    cache_time: Duration,
}

impl CacheEntry {
    fn is_fresh(&self, stale_time: Duration) -> bool {
        !self.invalidated && self.fetched_at.elapsed() < stale_time
    }

    fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.last_used) >= self.cache_time
    }
}

/// Keyed cache of resolved and in-flight page requests
#[derive(Default)]
pub struct QueryClient {
    entries: DashMap<QueryKey, CacheEntry>,
    in_flight: DashMap<QueryKey, SharedFetch>,
    closed: AtomicBool,
    network_fetches: AtomicU64,
}

impl QueryClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Resolve `key`, going to the network through `fetch` only when needed.
    ///
    /// With caching disabled, or after shutdown, `fetch` always runs and the
    /// result is not stored.
    pub async fn fetch<F, Fut>(
        &self,
        key: &QueryKey,
        policy: CachePolicy,
        fetch: F,
    ) -> Result<CachedPage, QueryError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<PageResult<Value>, QueryError>> + Send + 'static,
    {
        if !policy.use_cache || self.is_closed() {
            debug!("cache bypass for {}", key);
            self.network_fetches.fetch_add(1, Ordering::Relaxed);
            return fetch().await.map(Arc::new);
        }

        if let Some(page) = self.fresh(key, policy.stale_time) {
            debug!("cache hit for {}", key);
            return Ok(page);
        }

        let shared = match self.in_flight.entry(key.clone()) {
            Entry::Occupied(entry) => {
                debug!("joining in-flight request for {}", key);
                entry.get().clone()
            }
            Entry::Vacant(entry) => {
                debug!("cache miss for {}", key);
                self.network_fetches.fetch_add(1, Ordering::Relaxed);
                let shared = fetch().map(|result| result.map(Arc::new)).boxed().shared();
                entry.insert(shared.clone());
                shared
            }
        };

        let result = shared.await;

        // Only drop the in-flight marker if it is the one that just completed
        self.in_flight
            .remove_if(key, |_, pending| pending.peek().is_some());

        if let Ok(page) = &result {
            self.store(key, Arc::clone(page), policy.cache_time);
        }
        result
    }

    /// Any cached page for `key`, fresh or not
    pub fn peek(&self, key: &QueryKey) -> Option<CachedPage> {
        self.entries.get(key).map(|entry| Arc::clone(&entry.page))
    }

    /// Insert a page directly (e.g. after a mutation returned the new state)
    pub fn store(&self, key: &QueryKey, page: CachedPage, cache_time: Duration) {
        if self.is_closed() {
            return;
        }
        let now = Instant::now();
        self.entries.insert(
            key.clone(),
            CacheEntry {
                page,
                fetched_at: now,
                last_used: now,
                invalidated: false,
                cache_time,
            },
        );
        self.collect_garbage();
    }

    /// Mark every entry under `prefix` stale. Returns how many were marked.
    pub fn invalidate(&self, prefix: &[KeyPart]) -> usize {
        let mut count = 0;
        for mut entry in self.entries.iter_mut() {
            if entry.key().matches_prefix(prefix) {
                entry.invalidated = true;
                count += 1;
            }
        }
        debug!("invalidated {} entries", count);
        count
    }

    /// Evict every entry under `prefix`. Returns how many were evicted.
    pub fn remove(&self, prefix: &[KeyPart]) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.matches_prefix(prefix));
        let count = before - self.entries.len();
        debug!("evicted {} entries", count);
        count
    }

    /// Drop entries unused for longer than their cache time
    pub fn collect_garbage(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before - self.entries.len()
    }

    pub fn clear(&self) {
        self.entries.clear();
        self.in_flight.clear();
    }

    /// Tear the cache down; afterwards every fetch goes to the network
    pub fn shutdown(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.clear();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of requests that actually went to the network
    pub fn network_fetches(&self) -> u64 {
        self.network_fetches.load(Ordering::Relaxed)
    }

    fn fresh(&self, key: &QueryKey, stale_time: Duration) -> Option<CachedPage> {
        let mut entry = self.entries.get_mut(key)?;
        if !entry.is_fresh(stale_time) {
            return None;
        }
        entry.last_used = Instant::now();
        Some(Arc::clone(&entry.page))
    }
}

impl std::fmt::Debug for QueryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryClient")
            .field("entries", &self.entries.len())
            .field("in_flight", &self.in_flight.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}
