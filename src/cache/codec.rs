//! Cache transfer codec.
//!
//! Encodes a whole store to JSON text on one side of a render and merges it
//! back into a store on the other. Neither direction raises: encoding falls
//! back to an error marker, decoding leaves the store untouched.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::{info, warn};

use super::entry::CacheEntry;
use super::store::CacheStore;

/// Message carried by the fallback encoding.
pub const SERIALIZE_FAILURE_MESSAGE: &str = "An error happened while serializing cache";

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to encode cache: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to decode cache: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Result of encoding a store.
#[derive(Debug)]
pub enum Snapshot {
    /// Full encoding of the store.
    Encoded(String),
    /// Encoding failed; `text` holds only an error marker.
    Fallback { text: String, error: CodecError },
}

impl Snapshot {
    pub(crate) fn fallback(error: CodecError) -> Self {
        let text = serde_json::json!({ "error": SERIALIZE_FAILURE_MESSAGE }).to_string();
        Self::Fallback { text, error }
    }

    /// Text to embed in the page payload.
    pub fn text(&self) -> &str {
        match self {
            Self::Encoded(text) | Self::Fallback { text, .. } => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Self::Encoded(text) | Self::Fallback { text, .. } => text,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

/// Encode every entry of `store`, keys in sorted order.
pub fn serialize_cache(store: &CacheStore) -> Snapshot {
    let entries = store.snapshot();
    match serde_json::to_string(&entries) {
        Ok(text) => {
            info!(entries = entries.len(), bytes = text.len(), "Cache serialized");
            Snapshot::Encoded(text)
        }
        Err(err) => {
            let error = CodecError::Encode(err);
            warn!(error = %error, "An error happened while serializing cache");
            Snapshot::fallback(error)
        }
    }
}

/// Decode `serialized` and merge its entries into `store`.
///
/// Returns the number of merged entries. On failure the store is unchanged;
/// the error is logged and returned for callers that want it.
pub fn initialize_cache(store: &CacheStore, serialized: &str) -> Result<usize, CodecError> {
    let entries: BTreeMap<String, CacheEntry> = match serde_json::from_str(serialized) {
        Ok(entries) => entries,
        Err(err) => {
            let error = CodecError::Decode(err);
            warn!(error = %error, "An error happened while initializing the cache");
            return Err(error);
        }
    };

    let count = entries.len();
    store.merge(entries);
    info!(entries = count, "Cache initialized from serialized state");
    Ok(count)
}
