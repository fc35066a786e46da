//! Request-level cache for GET responses.
//!
//! Entries are keyed by a deterministic signature of the request (method,
//! URL, and whichever of params/body/files are present) and expire lazily:
//! an entry past its lifetime is dropped by the next [`RequestCache::has`]
//! check for its key, never proactively. There is no size bound; the cache
//! is meant to live for a single script run.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use once_cell::sync::Lazy;
use serde_json::Value;

use crate::transport::{FilePart, Method};

/// Monotonic reference point for [`SystemClock`].
static EPOCH: Lazy<Instant> = Lazy::new(Instant::now);

/// Time source for cache expiry and rate-limit sleeps.
///
/// The client and cache only ever ask "how long since the epoch" and "block
/// for this long", which keeps the whole retry/TTL surface testable with a
/// scripted clock.
pub trait Clock: Send + Sync {
    /// Time elapsed since this clock's fixed epoch.
    fn now(&self) -> Duration;
    /// Block the calling thread for the given duration.
    fn sleep(&self, duration: Duration);
}

/// Wall clock used outside of tests.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        EPOCH.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

struct CacheEntry {
    value: Value,
    created: Duration,
}

/// In-memory response cache with lazy TTL eviction.
pub struct RequestCache {
    /// `None` means entries never expire
    lifetime: Option<Duration>,
    entries: HashMap<String, CacheEntry>,
}

impl RequestCache {
    pub fn new(lifetime: Option<Duration>) -> Self {
        Self {
            lifetime,
            entries: HashMap::new(),
        }
    }

    /// Deterministic signature for a logical call. Two requests with the
    /// same method, URL, and non-empty arguments always map to one key.
    pub fn key(
        method: Method,
        url: &str,
        params: &[(String, String)],
        body: Option<&Value>,
        files: &[FilePart],
    ) -> String {
        let mut key = format!("{} {}", method.as_str(), url);
        if !params.is_empty() {
            for (name, value) in params {
                key.push_str(&format!(" {name}={value}"));
            }
        }
        if let Some(body) = body {
            key.push(' ');
            key.push_str(&body.to_string());
        }
        for part in files {
            key.push_str(&format!(" {}:{}", part.field, part.filename));
        }
        key
    }

    /// Whether a live entry exists for the key. An expired entry is removed
    /// here and reported as absent.
    pub fn has(&mut self, key: &str, clock: &dyn Clock) -> bool {
        let Some(entry) = self.entries.get(key) else {
            return false;
        };

        if let Some(lifetime) = self.lifetime {
            if clock.now().saturating_sub(entry.created) > lifetime {
                self.entries.remove(key);
                return false;
            }
        }

        true
    }

    /// The cached value for the key, if any. Does not check expiry; pair
    /// with [`RequestCache::has`] or use [`RequestCache::lookup`].
    pub fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    /// Expiry-checked fetch.
    pub fn lookup(&mut self, key: &str, clock: &dyn Clock) -> Option<Value> {
        if self.has(key, clock) {
            self.get(key)
        } else {
            None
        }
    }

    pub fn store(&mut self, key: String, value: Value, clock: &dyn Clock) {
        self.entries.insert(
            key,
            CacheEntry {
                value,
                created: clock.now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
