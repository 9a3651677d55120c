//! Cache configuration.
//!
//! Controls when a hook treats a stored entry as usable, via the `[cache]`
//! section of `caching-fetch.toml`.

use serde::Deserialize;

use super::entry::{CacheEntry, is_truthy};

/// Cache configuration from `caching-fetch.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Refetch when a stored payload is falsy (`null`, `false`, `0`, `""`),
    /// not only when the key is missing or stored as a failure.
    pub refetch_falsy_payloads: bool,
    /// Emit a debug event for every merge into the store.
    pub log_merges: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            refetch_falsy_payloads: true,
            log_merges: true,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            refetch_falsy_payloads: settings.refetch_falsy_payloads,
            log_merges: settings.log_merges,
        }
    }
}

impl CacheConfig {
    /// Returns true if a hook seeded with `seed` must fetch.
    pub fn needs_fetch(&self, seed: Option<&CacheEntry>) -> bool {
        let Some(entry) = seed else {
            return true;
        };
        if self.refetch_falsy_payloads {
            !entry.payload().is_some_and(is_truthy)
        } else {
            !entry.is_success()
        }
    }
}
