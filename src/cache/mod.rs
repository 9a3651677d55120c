//! Response cache.
//!
//! Holds resolved fetch outcomes keyed by resource key, and moves them
//! between execution contexts:
//!
//! - **Store**: shared map of key to [`CacheEntry`], merge-only writes
//! - **Codec**: whole-store JSON encoding for server-to-client handoff
//!
//! ## Configuration
//!
//! ```toml
//! [cache]
//! refetch_falsy_payloads = true
//! log_merges = true
//! ```

mod codec;
mod config;
mod entry;
mod lock;
mod store;

pub use codec::{CodecError, SERIALIZE_FAILURE_MESSAGE, Snapshot, initialize_cache, serialize_cache};
pub use config::CacheConfig;
pub use entry::{
    AmbiguousEntry, CacheEntry, FailureKind, FetchFailure, GENERIC_FAILURE_MESSAGE, is_truthy,
};
pub use store::CacheStore;

pub(crate) use store::{METRIC_MERGE, METRIC_STORE_HIT, METRIC_STORE_MISS};
