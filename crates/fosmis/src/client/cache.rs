//! Session-scoped TTL cache for fetched portal HTML.
//!
//! The portal regenerates every page on each hit and is slow about it, so
//! raw HTML is cached per session for a few minutes. Keys embed a hash of
//! the session id rather than the id itself; a leaked cache key must not
//! be a usable session token.

use dashmap::DashMap;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::time::{Duration, Instant};

/// Default page lifetime: long enough that tab-switching is instant, short
/// enough that a refresh after results day picks up new marks.
const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Clone)]
struct CachedPage {
    html: String,
    cached_at: Instant,
    ttl: Duration,
}

impl CachedPage {
    fn is_expired(&self) -> bool {
        self.cached_at.elapsed() > self.ttl
    }
}

/// Cache statistics for the health endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub expired_entries: usize,
    pub active_entries: usize,
}

/// Thread-safe TTL cache for raw portal HTML.
pub struct HtmlCache {
    entries: DashMap<String, CachedPage>,
    default_ttl: Duration,
}

impl HtmlCache {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            default_ttl,
        }
    }

    pub fn with_default_ttl() -> Self {
        Self::new(DEFAULT_TTL)
    }

    /// Builds a cache key of the form `<session-hash>:<endpoint>:<args..>`.
    pub fn key(session: &str, endpoint: &str, args: &[&str]) -> String {
        let mut key = format!("{}:{endpoint}", session_hash(session));
        for arg in args {
            key.push(':');
            key.push_str(arg);
        }
        key
    }

    /// Returns the cached page if present and fresh; expired entries are
    /// evicted on the way out.
    pub fn get(&self, key: &str) -> Option<String> {
        let entry = self.entries.get(key)?;
        if entry.is_expired() {
            drop(entry);
            self.entries.remove(key);
            return None;
        }
        Some(entry.html.clone())
    }

    pub fn insert(&self, key: String, html: String) {
        self.insert_with_ttl(key, html, self.default_ttl);
    }

    pub fn insert_with_ttl(&self, key: String, html: String, ttl: Duration) {
        self.entries.insert(
            key,
            CachedPage {
                html,
                cached_at: Instant::now(),
                ttl,
            },
        );
    }

    /// Drops every entry belonging to the given session. Called on logout.
    pub fn purge_session(&self, session: &str) {
        let prefix = format!("{}:", session_hash(session));
        self.entries.retain(|key, _| !key.starts_with(&prefix));
    }

    /// Evicts expired entries; run periodically from a background task.
    /// Returns the number of entries dropped.
    pub fn cleanup_expired(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, page| !page.is_expired());
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        let mut expired = 0;
        let mut active = 0;
        for entry in self.entries.iter() {
            if entry.is_expired() {
                expired += 1;
            } else {
                active += 1;
            }
        }
        CacheStats {
            total_entries: self.entries.len(),
            expired_entries: expired,
            active_entries: active,
        }
    }
}

/// First 16 bytes of the session id's SHA-256, hex-encoded.
fn session_hash(session: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(session.as_bytes());
    let digest = hasher.finalize();
    digest[..16].iter().map(|b| format!("{b:02x}")).collect()
}
