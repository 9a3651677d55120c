//! Fetch outcome resolver.
//!
//! Performs one fetch, normalizes it into a success or failure entry and
//! merges that entry into the store. Shared by hooks and preloads.

use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::cache::{CacheEntry, CacheStore, FetchFailure};

use super::transport::Transport;

pub(crate) const METRIC_REQUEST: &str = "caching_fetch_request_total";
pub(crate) const METRIC_REQUEST_MS: &str = "caching_fetch_request_ms";

pub struct FetchResolver {
    store: Arc<CacheStore>,
    transport: Arc<dyn Transport>,
}

impl FetchResolver {
    pub fn new(store: Arc<CacheStore>, transport: Arc<dyn Transport>) -> Self {
        Self { store, transport }
    }

    pub fn store(&self) -> &Arc<CacheStore> {
        &self.store
    }

    /// Fetch `key` once and write the outcome into the store.
    ///
    /// Never fails: every failure becomes a stored failure entry. The entry
    /// that was written is returned so callers can mirror it locally.
    #[instrument(skip(self))]
    pub async fn resolve(&self, key: &str) -> CacheEntry {
        let started_at = Instant::now();

        let entry = match self.fetch_payload(key).await {
            Ok(payload) => {
                info!(key, "Fetch resolved");
                CacheEntry::success(payload)
            }
            Err(failure) => {
                warn!(
                    key,
                    kind = ?failure.kind,
                    error = %failure,
                    "An error happened while fetching the data"
                );
                CacheEntry::failure(failure)
            }
        };

        counter!(
            METRIC_REQUEST,
            "outcome" => if entry.is_success() { "success" } else { "failure" }
        )
        .increment(1);
        histogram!(METRIC_REQUEST_MS).record(started_at.elapsed().as_secs_f64() * 1000.0);

        self.store.insert(key, entry.clone());
        entry
    }

    async fn fetch_payload(&self, key: &str) -> Result<Value, FetchFailure> {
        let response = self
            .transport
            .fetch(key)
            .await
            .map_err(|err| FetchFailure::transport(err.to_string()))?;

        if !response.is_success() {
            return Err(FetchFailure::http_status(response.status));
        }

        serde_json::from_slice(&response.body).map_err(|err| FetchFailure::parse(&err))
    }
}
