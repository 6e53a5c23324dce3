//! In-memory TTL store.
//!
//! An expired entry is dropped the next time it is read, on every
//! [`SWEEP_EVERY`]th write, and by a background sweeper once a cache layer
//! has been built inside a tokio runtime. Writers are not coordinated, so two
//! requests filling the same key at once both write and the last one wins.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock, Weak};
use std::time::{Duration, Instant};

use axum::{
    body::{Body, Bytes},
    http::{HeaderValue, StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use tokio::time::MissedTickBehavior;
use tracing::debug;

/// Writes between two inline sweeps of expired entries.
pub const SWEEP_EVERY: usize = 128;

const MIN_SWEEP_PERIOD: Duration = Duration::from_millis(10);
const MAX_SWEEP_PERIOD: Duration = Duration::from_secs(60);

static GLOBAL: LazyLock<ResponseCache> = LazyLock::new(ResponseCache::new);

/// A response body captured for replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

impl IntoResponse for CachedResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        if let Some(content_type) = self.content_type {
            response.headers_mut().insert(CONTENT_TYPE, content_type);
        }
        response
    }
}

#[derive(Debug)]
struct Entry {
    value: CachedResponse,
    expires_at: Instant,
}

#[derive(Debug, Default)]
struct Inner {
    entries: DashMap<String, Entry>,
    writes: AtomicUsize,
    sweeping: AtomicBool,
}

impl Inner {
    fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0;
        self.entries.retain(|_, entry| {
            let live = entry.expires_at > now;
            if !live {
                removed += 1;
            }
            live
        });
        removed
    }
}

/// Shared key/value store for cached responses. Clones share storage.
#[derive(Debug, Clone, Default)]
pub struct ResponseCache {
    inner: Arc<Inner>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide store used by [`crate::cache`].
    pub fn global() -> Self {
        GLOBAL.clone()
    }

    pub fn get(&self, key: &str) -> Option<CachedResponse> {
        let now = Instant::now();
        if let Some(entry) = self.inner.entries.get(key) {
            if entry.expires_at > now {
                return Some(entry.value.clone());
            }
        }

        if self
            .inner
            .entries
            .remove_if(key, |_, entry| entry.expires_at <= now)
            .is_some()
        {
            debug!(cache.key = %key, "Cache entry expired");
        }
        None
    }

    pub fn put(&self, key: impl Into<String>, value: CachedResponse, ttl: Duration) {
        let key = key.into();
        debug!(cache.key = %key, cache.ttl_ms = %ttl.as_millis(), "Cache set");
        self.inner.entries.insert(
            key,
            Entry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );

        let writes = self.inner.writes.fetch_add(1, Ordering::Relaxed) + 1;
        if writes % SWEEP_EVERY == 0 {
            self.purge_expired();
        }
    }

    /// Drops every expired entry and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let removed = self.inner.purge_expired();
        if removed > 0 {
            debug!(cache.removed = removed, "Cache sweep");
        }
        removed
    }

    /// Starts the background sweeper for this store on the current tokio
    /// runtime, at most once per store. `period` is clamped to
    /// 10ms..=60s. Outside a runtime this does nothing.
    pub fn spawn_sweeper(&self, period: Duration) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };
        if self.inner.sweeping.swap(true, Ordering::AcqRel) {
            return;
        }

        let period = period.clamp(MIN_SWEEP_PERIOD, MAX_SWEEP_PERIOD);
        let store: Weak<Inner> = Arc::downgrade(&self.inner);
        debug!(cache.sweep_ms = %period.as_millis(), "Cache sweeper started");
        handle.spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(inner) = store.upgrade() else {
                    break;
                };
                inner.purge_expired();
            }
        });
    }

    pub fn invalidate(&self, key: &str) -> bool {
        self.inner.entries.remove(key).is_some()
    }

    pub fn clear(&self) {
        self.inner.entries.clear();
    }

    /// Number of stored entries, expired ones included until they are swept.
    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }
}
