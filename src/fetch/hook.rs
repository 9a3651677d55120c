//! Reactive fetch hook.
//!
//! A hook activation is a small state machine over one resource key:
//!
//! ```text
//! Seed ──hit──────────────────────▶ Resolved
//!   └───miss/unusable──▶ Fetching ─▶ Resolved
//! ```
//!
//! The seed reads the shared store once. When the seeded data is not usable
//! a fetch is handed to the task runner; its outcome is written to the store
//! by the resolver and mirrored into the hook's local state. The store is
//! never re-read for the lifetime of a seed.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, info};
use uuid::Uuid;

use crate::cache::{CacheEntry, FetchFailure};

use super::resolver::FetchResolver;
use super::runner::TaskRunner;

/// Hook phase derived from the loading flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Fetching,
    Resolved,
}

/// The `{isLoading, data, error}` triple observed by callers.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchState {
    pub is_loading: bool,
    pub data: Option<Value>,
    pub error: Option<FetchFailure>,
}

impl FetchState {
    pub fn loading() -> Self {
        Self {
            is_loading: true,
            data: None,
            error: None,
        }
    }

    fn from_entry(entry: CacheEntry) -> Self {
        let (data, error) = entry.into_parts();
        Self {
            is_loading: false,
            data,
            error,
        }
    }

    pub fn phase(&self) -> Phase {
        if self.is_loading {
            Phase::Fetching
        } else {
            Phase::Resolved
        }
    }
}

struct HookShared {
    state: watch::Sender<FetchState>,
    generation: AtomicU64,
}

impl HookShared {
    /// Publish a resolved outcome unless the hook has moved on to a newer seed.
    fn settle(&self, generation: u64, key: &str, entry: CacheEntry) {
        let current = self.generation.load(Ordering::SeqCst);
        if current != generation {
            debug!(
                key,
                generation,
                current,
                "Dropping outcome for superseded hook seed"
            );
            return;
        }
        self.state.send_replace(FetchState::from_entry(entry));
    }
}

/// One activation of the reactive fetch hook.
///
/// Dropping the hook stops observation only; an in-flight fetch still runs
/// to completion and still writes the store.
pub struct FetchHook {
    id: Uuid,
    key: String,
    shared: Arc<HookShared>,
    receiver: watch::Receiver<FetchState>,
    resolver: Arc<FetchResolver>,
    runner: Arc<dyn TaskRunner>,
}

impl FetchHook {
    /// Seed from the store and trigger a fetch if the seed is not usable.
    pub fn activate(
        key: impl Into<String>,
        resolver: Arc<FetchResolver>,
        runner: Arc<dyn TaskRunner>,
    ) -> Self {
        let (sender, receiver) = watch::channel(FetchState::loading());
        let mut hook = Self {
            id: Uuid::new_v4(),
            key: key.into(),
            shared: Arc::new(HookShared {
                state: sender,
                generation: AtomicU64::new(0),
            }),
            receiver,
            resolver,
            runner,
        };
        hook.seed(true);
        hook
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current `{isLoading, data, error}`.
    pub fn state(&self) -> FetchState {
        self.receiver.borrow().clone()
    }

    pub fn phase(&self) -> Phase {
        self.receiver.borrow().phase()
    }

    /// Independent observer of this hook's state.
    pub fn subscribe(&self) -> watch::Receiver<FetchState> {
        self.shared.state.subscribe()
    }

    /// Wait for the next state change and return it.
    pub async fn changed(&mut self) -> FetchState {
        // The sender lives in `self.shared`, so this cannot observe a closed channel.
        let _ = self.receiver.changed().await;
        self.receiver.borrow_and_update().clone()
    }

    /// Wait until the hook is no longer loading.
    pub async fn settled(&mut self) -> FetchState {
        let settled = self
            .receiver
            .wait_for(|state| !state.is_loading)
            .await
            .map(|state| state.clone());
        settled.unwrap_or_else(|_| self.state())
    }

    /// Point the hook at another key and seed again.
    ///
    /// Data and error from the previous key are kept while the new key
    /// loads; they are replaced by a cached entry right away, or by the
    /// fetched outcome once it resolves.
    pub fn set_key(&mut self, key: impl Into<String>) {
        let key = key.into();
        if key == self.key {
            return;
        }
        self.key = key;
        self.seed(false);
    }

    fn seed(&mut self, first: bool) {
        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let seed = self.resolver.store().get(&self.key);
        let needs_fetch = self.resolver.store().config().needs_fetch(seed.as_ref());
        let cached = seed.is_some();

        self.shared.state.send_modify(|state| {
            match seed {
                Some(entry) => *state = FetchState::from_entry(entry),
                None if first => *state = FetchState::loading(),
                None => {}
            }
            if needs_fetch {
                state.is_loading = true;
            }
        });
        let _ = self.receiver.borrow_and_update();

        info!(
            activation = %self.id,
            key = %self.key,
            generation,
            cached,
            fetch = needs_fetch,
            "Fetch hook seeded"
        );

        if needs_fetch {
            self.trigger(generation);
        }
    }

    fn trigger(&self, generation: u64) {
        let key = self.key.clone();
        let resolver = Arc::clone(&self.resolver);
        let shared = Arc::clone(&self.shared);
        self.runner.spawn(Box::pin(async move {
            let entry = resolver.resolve(&key).await;
            shared.settle(generation, &key, entry);
        }));
    }
}
