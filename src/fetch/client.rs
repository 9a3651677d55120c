//! Entry points bound to one explicitly constructed store.
//!
//! A server handling several requests builds one [`CachingFetch`] per
//! request so that each request renders against its own cache.

use std::sync::Arc;

use crate::cache::{CacheConfig, CacheStore, CodecError, Snapshot, initialize_cache, serialize_cache};
use crate::config::Settings;

use super::hook::FetchHook;
use super::preload::preload;
use super::resolver::FetchResolver;
use super::runner::{TaskRunner, TokioRunner};
use super::transport::{HttpTransport, Transport, TransportError};

#[derive(Clone)]
pub struct CachingFetch {
    resolver: Arc<FetchResolver>,
    runner: Arc<dyn TaskRunner>,
}

impl CachingFetch {
    pub fn new(
        store: Arc<CacheStore>,
        transport: Arc<dyn Transport>,
        runner: Arc<dyn TaskRunner>,
    ) -> Self {
        Self {
            resolver: Arc::new(FetchResolver::new(store, transport)),
            runner,
        }
    }

    /// Fresh store over HTTP, with fetches spawned on the ambient tokio runtime.
    pub fn from_settings(settings: &Settings) -> Result<Self, TransportError> {
        let transport = HttpTransport::new(&settings.http)?;
        let store = CacheStore::new(CacheConfig::from(&settings.cache));
        Ok(Self::new(
            Arc::new(store),
            Arc::new(transport),
            Arc::new(TokioRunner),
        ))
    }

    pub fn store(&self) -> &Arc<CacheStore> {
        self.resolver.store()
    }

    /// Activate a reactive hook for `key`.
    pub fn use_caching_fetch(&self, key: impl Into<String>) -> FetchHook {
        FetchHook::activate(key, Arc::clone(&self.resolver), Arc::clone(&self.runner))
    }

    /// Fetch `key` into the store and wait for it.
    pub async fn preload_caching_fetch(&self, key: &str) {
        preload(&self.resolver, key).await;
    }

    pub fn serialize_cache(&self) -> Snapshot {
        serialize_cache(self.store())
    }

    pub fn initialize_cache(&self, serialized: &str) -> Result<usize, CodecError> {
        initialize_cache(self.store(), serialized)
    }

    pub fn wipe_cache(&self) {
        self.store().wipe();
    }

    pub fn is_cached(&self, key: &str) -> bool {
        self.store().has(key)
    }
}
