//! Shared response store.
//!
//! Maps resource keys to resolved outcomes. One store is shared by every
//! hook, preload and codec call that was built from it; independent stores
//! never see each other's entries.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use metrics::counter;
use tracing::debug;

use super::config::CacheConfig;
use super::entry::CacheEntry;
use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::store";

pub(crate) const METRIC_STORE_HIT: &str = "caching_fetch_store_hit_total";
pub(crate) const METRIC_STORE_MISS: &str = "caching_fetch_store_miss_total";
pub(crate) const METRIC_MERGE: &str = "caching_fetch_merge_total";

/// Response store keyed by the verbatim resource key.
///
/// Keys are not normalized: `/a`, `/a/` and `/a?x=1` are distinct entries.
/// Entries live until overwritten or until [`CacheStore::wipe`].
pub struct CacheStore {
    config: CacheConfig,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl CacheStore {
    /// Create an empty store with the given configuration.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Returns true iff an entry exists for `key`.
    pub fn has(&self, key: &str) -> bool {
        rw_read(&self.entries, SOURCE, "has").contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<CacheEntry> {
        let entry = rw_read(&self.entries, SOURCE, "get").get(key).cloned();
        if entry.is_some() {
            counter!(METRIC_STORE_HIT).increment(1);
        } else {
            counter!(METRIC_STORE_MISS).increment(1);
        }
        entry
    }

    /// Overwrite or insert every given entry. Last write wins.
    pub fn merge<I>(&self, entries: I)
    where
        I: IntoIterator<Item = (String, CacheEntry)>,
    {
        let mut guard = rw_write(&self.entries, SOURCE, "merge");
        let mut merged = 0_u64;
        for (key, entry) in entries {
            if self.config.log_merges {
                debug!(
                    key = %key,
                    success = entry.is_success(),
                    "Cache entry merged"
                );
            }
            guard.insert(key, entry);
            merged += 1;
        }
        let total = guard.len();
        drop(guard);

        if self.config.log_merges {
            debug!(entries = merged, total, "Cache merge complete");
        }
        counter!(METRIC_MERGE).increment(merged);
    }

    /// Single-entry merge.
    pub fn insert(&self, key: impl Into<String>, entry: CacheEntry) {
        self.merge([(key.into(), entry)]);
    }

    /// Remove every entry in place. Handles to this store stay valid.
    pub fn wipe(&self) {
        let mut guard = rw_write(&self.entries, SOURCE, "wipe");
        let removed = guard.len();
        guard.clear();
        drop(guard);
        debug!(removed, "Cache wiped");
    }

    /// Get the number of stored entries.
    pub fn len(&self) -> usize {
        rw_read(&self.entries, SOURCE, "len").len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stored keys in sorted order.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = rw_read(&self.entries, SOURCE, "keys")
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    /// Ordered copy of every entry, used for deterministic encoding.
    pub fn snapshot(&self) -> BTreeMap<String, CacheEntry> {
        rw_read(&self.entries, SOURCE, "snapshot")
            .iter()
            .map(|(key, entry)| (key.clone(), entry.clone()))
            .collect()
    }
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}
