// =============================================================================
// TTL Cache — read-through store shared by every request handler
// =============================================================================
//
// One `parking_lot::RwLock` guards the whole key space. Lock hold time is a
// single map access; callers never perform I/O while holding it.
//
// Expiry is lazy: `get` treats an expired entry as absent but leaves it in
// place. The entry is replaced by the next `set` of the same key, or dropped
// by `purge_expired` if the owner runs it.
// =============================================================================

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde::Serialize;

use crate::types::{AssetDetail, HistoryPoint, NormalizedAsset};

/// A single stored value with its absolute expiry (`None` = never).
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        matches!(self.expires_at, Some(at) if now > at)
    }
}

/// Concurrency-safe key/value store with per-entry expiry.
pub struct TtlCache<V> {
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Store `value` under `key`. A zero `ttl`, or one too large to represent
    /// as an `Instant`, means the entry never expires.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let expires_at = if ttl.is_zero() {
            None
        } else {
            Instant::now().checked_add(ttl)
        };
        let entry = CacheEntry { value, expires_at };
        self.entries.write().insert(key.into(), entry);
    }

    /// Return a clone of the live value under `key`, or `None` when the key
    /// is absent or its entry has expired.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let map = self.entries.read();
        match map.get(key) {
            Some(entry) if !entry.is_expired(now) => Some(entry.value.clone()),
            _ => None,
        }
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut map = self.entries.write();
        let before = map.len();
        map.retain(|_, entry| !entry.is_expired(now));
        before - map.len()
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> std::fmt::Debug for TtlCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("entries", &self.entries.read().len())
            .finish()
    }
}

// =============================================================================
// Cached views
// =============================================================================

/// Value type of the shared response cache: one variant per API view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CachedView {
    Assets(Vec<NormalizedAsset>),
    Detail(AssetDetail),
    History(Vec<HistoryPoint>),
}

/// Build a deterministic cache key from an endpoint name and its parameters.
pub fn cache_key(endpoint: &str, parts: &[&str]) -> String {
    let mut key = String::from(endpoint);
    for part in parts {
        key.push(':');
        key.push_str(part);
    }
    key
}
