use tracing::{info, instrument};

use super::resolver::FetchResolver;

/// Fetch `key` into the store and wait for the write to land.
///
/// Intended to run before any hook for `key` is activated, e.g. during a
/// server render. Failures end up in the store like any other outcome.
#[instrument(skip(resolver))]
pub async fn preload(resolver: &FetchResolver, key: &str) {
    let entry = resolver.resolve(key).await;
    info!(key, success = entry.is_success(), "Preload complete");
}
