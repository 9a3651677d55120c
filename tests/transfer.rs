use std::sync::Arc;

use caching_fetch::cache::{CacheConfig, CacheStore};
use caching_fetch::config::HttpSettings;
use caching_fetch::fetch::{CachingFetch, HttpTransport, TokioRunner};
use httpmock::MockServer;
use serde_json::json;
use url::Url;

fn client_for(server: &MockServer) -> CachingFetch {
    let settings = HttpSettings {
        base_url: Some(Url::parse(&server.base_url()).expect("mock base url")),
        ..Default::default()
    };
    let transport = HttpTransport::new(&settings).expect("http transport");
    CachingFetch::new(
        Arc::new(CacheStore::new(CacheConfig::default())),
        Arc::new(transport),
        Arc::new(TokioRunner),
    )
}

#[tokio::test]
async fn server_preload_hydrates_client_without_second_request() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method("GET").path("/api/people");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"[{"name":"Luke"}]"#);
        })
        .await;

    let ssr = client_for(&server);
    ssr.preload_caching_fetch("/api/people").await;
    let payload = ssr.serialize_cache();
    assert!(!payload.is_fallback());

    let browser = client_for(&server);
    assert_eq!(browser.initialize_cache(payload.text()).expect("hydrate"), 1);

    let mut hook = browser.use_caching_fetch("/api/people");
    let state = hook.state();
    assert!(!state.is_loading);
    assert_eq!(state.data, Some(json!([{"name": "Luke"}])));
    assert!(state.error.is_none());
    assert_eq!(hook.settled().await, state);

    mock.assert_async().await;
}

#[tokio::test]
async fn client_without_server_data_fetches_once() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method("GET").path("/api/planets");
            then.status(200).body(r#"{"count":60}"#);
        })
        .await;

    let browser = client_for(&server);
    let mut hook = browser.use_caching_fetch("/api/planets");
    assert!(hook.state().is_loading);

    let state = hook.settled().await;
    assert_eq!(state.data, Some(json!({"count": 60})));
    assert!(browser.is_cached("/api/planets"));

    mock.assert_async().await;
}

#[tokio::test]
async fn http_failure_survives_transfer() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method("GET").path("/api/missing");
            then.status(404);
        })
        .await;

    let ssr = client_for(&server);
    ssr.preload_caching_fetch("/api/missing").await;
    let payload = ssr.serialize_cache().into_text();

    let browser = CachingFetch::new(
        Arc::new(CacheStore::default()),
        Arc::new(HttpTransport::new(&HttpSettings::default()).expect("http transport")),
        Arc::new(TokioRunner),
    );
    browser.initialize_cache(&payload).expect("hydrate");

    let entry = browser.store().get("/api/missing").expect("entry");
    let failure = entry.failure_ref().expect("failure");
    assert_eq!(failure.status(), Some(404));
    assert_eq!(failure.message, "HTTP error Status:404");

    mock.assert_async().await;
}

#[tokio::test]
async fn wiped_cache_is_fetched_again() {
    let server = MockServer::start_async().await;
    let _mock = server
        .mock_async(|when, then| {
            when.method("GET").path("/api/people");
            then.status(200).body(r#"["Leia"]"#);
        })
        .await;

    let fetch = client_for(&server);
    fetch.preload_caching_fetch("/api/people").await;
    assert!(fetch.is_cached("/api/people"));

    fetch.wipe_cache();
    assert!(!fetch.is_cached("/api/people"));
    assert!(fetch.store().is_empty());

    let mut hook = fetch.use_caching_fetch("/api/people");
    assert!(hook.state().is_loading);
    assert_eq!(hook.settled().await.data, Some(json!(["Leia"])));
    assert!(fetch.is_cached("/api/people"));
}
