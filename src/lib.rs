//! Request caching for data fetched during rendering.
//!
//! A [`fetch::CachingFetch`] binds one [`cache::CacheStore`] to a transport.
//! The server preloads keys, serializes the store into the page, and the
//! client initializes its own store from that text so the first render
//! reads cached data instead of issuing requests again.

pub mod cache;
pub mod config;
pub mod fetch;
pub mod infra;
