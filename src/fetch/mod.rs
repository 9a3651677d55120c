//! Fetching through the response cache.
//!
//! - **Resolver**: one request per call, outcome merged into the store
//! - **Hook**: seeds from the store, fetches only when the seed is unusable
//! - **Preload**: awaited one-shot fetch for server-side rendering
//! - **Client**: the entry points above bound to one store

mod client;
mod hook;
mod preload;
mod resolver;
mod runner;
#[cfg(test)]
mod testing;
mod transport;

pub use client::CachingFetch;
pub use hook::{FetchHook, FetchState, Phase};
pub use preload::preload;
pub use resolver::FetchResolver;
pub use runner::{ManualRunner, TaskRunner, TokioRunner};
pub use transport::{HttpTransport, Transport, TransportError, TransportResponse};

pub(crate) use resolver::{METRIC_REQUEST, METRIC_REQUEST_MS};
