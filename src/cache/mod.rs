//! Response cache keyed by request identity.
//!
//! Only successful responses to safe requests are ever stored, and the cache
//! is the single piece of state shared between concurrent executions.
//!
//! ## Core types
//!
//! - [`CacheKey`]: method + address of a request; headers and body are ignored.
//! - [`CachedResponse`]: immutable copy of a stored response.
//! - [`ResponseCache`]: the `save`/`lookup` seam the executor depends on.
//! - [`MemoryCache`]: bounded, concurrent, in-memory implementation.
//! - [`NoCache`]: stores nothing.

use std::fmt;
use std::sync::OnceLock;

use bytes::Bytes;
use moka::sync::Cache;

use crate::http::{Headers, Method, RawResponse, Request};

/// Default number of responses [`MemoryCache`] keeps before evicting.
pub const DEFAULT_CACHE_CAPACITY: u64 = 256;

/// Identity under which a response is cached.
///
/// Two requests with the same method and address share a key even when their
/// headers (an `Authorization` token, say) or bodies differ.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    method: Method,
    url: String,
}

impl CacheKey {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl From<&Request> for CacheKey {
    fn from(request: &Request) -> Self {
        Self::new(request.method(), request.url())
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// A stored response. Cloning shares the body buffer and never exposes it
/// mutably, so a later `save` to the same key cannot change a copy already
/// handed out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    pub body: Bytes,
    pub status: u16,
    pub headers: Headers,
}

impl CachedResponse {
    /// Captures a response that has already passed status classification.
    ///
    /// Returns `None` for a response without a status; such a response never
    /// reaches the success path.
    pub fn from_raw(response: &RawResponse) -> Option<Self> {
        Some(Self {
            body: response.body.clone(),
            status: response.status?,
            headers: response.headers.clone(),
        })
    }
}

/// Storage the executor reads before and writes after a network round-trip.
///
/// Implementations must be safe under concurrent use: `save` and `lookup`
/// are each atomic, a `lookup` never observes a half-written entry, and a
/// `lookup` on one key never waits on a `save` to another.
pub trait ResponseCache: Send + Sync {
    /// Stores or replaces the entry for `key`.
    fn save(&self, key: CacheKey, response: CachedResponse);

    /// Returns a copy of the entry for `key`, if present.
    fn lookup(&self, key: &CacheKey) -> Option<CachedResponse>;
}

/// Bounded in-memory cache.
///
/// Backed by a `moka` concurrent cache: reads are lock-free, writes lock a
/// single shard, and once the entry count exceeds the capacity the
/// least-valuable entries are evicted. Clones share storage.
///
/// # Examples
///
/// ```
/// use fakestore::cache::{CacheKey, CachedResponse, MemoryCache, ResponseCache};
/// use fakestore::http::{Headers, Method};
///
/// let cache = MemoryCache::with_capacity(16);
/// let key = CacheKey::new(Method::Get, "https://example.com/products/1");
///
/// assert!(cache.lookup(&key).is_none());
/// cache.save(
///     key.clone(),
///     CachedResponse { body: "{}".into(), status: 200, headers: Headers::new() },
/// );
/// assert_eq!(cache.lookup(&key).unwrap().body, "{}");
/// ```
#[derive(Clone)]
pub struct MemoryCache {
    entries: Cache<CacheKey, CachedResponse>,
}

impl MemoryCache {
    /// Creates a cache holding at most `capacity` responses.
    pub fn with_capacity(capacity: u64) -> Self {
        Self {
            entries: Cache::new(capacity),
        }
    }

    /// Returns the process-wide cache, creating it on first use.
    pub fn shared() -> Self {
        static SHARED: OnceLock<MemoryCache> = OnceLock::new();
        SHARED.get_or_init(MemoryCache::default).clone()
    }

    /// Approximate number of stored responses.
    ///
    /// Eviction bookkeeping runs lazily; call [`sync`](Self::sync) first for
    /// an exact figure.
    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }

    /// Runs pending eviction and bookkeeping work.
    pub fn sync(&self) {
        self.entries.run_pending_tasks();
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.entries.invalidate_all();
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryCache")
            .field("entry_count", &self.entries.entry_count())
            .field("capacity", &self.entries.policy().max_capacity())
            .finish()
    }
}

impl ResponseCache for MemoryCache {
    fn save(&self, key: CacheKey, response: CachedResponse) {
        self.entries.insert(key, response);
    }

    fn lookup(&self, key: &CacheKey) -> Option<CachedResponse> {
        self.entries.get(key)
    }
}

/// A cache that stores nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

impl ResponseCache for NoCache {
    fn save(&self, _key: CacheKey, _response: CachedResponse) {}

    fn lookup(&self, _key: &CacheKey) -> Option<CachedResponse> {
        None
    }
}
