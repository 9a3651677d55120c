use assert_cmd::Command;
use httpmock::MockServer;
use predicates::str::contains;
use serde_json::{Value, json};
use std::io::Write;
use tempfile::NamedTempFile;

// Nothing listens here; any request that escapes the cache fails fast.
const UNREACHABLE_BASE: &str = "http://127.0.0.1:9";

fn cache_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("tmp file");
    file.write_all(contents.as_bytes()).expect("write cache");
    file
}

fn cli() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("caching-fetch"));
    cmd.env_remove("CACHING_FETCH_CONFIG_FILE")
        .env("RUST_LOG", "warn");
    cmd
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be json")
}

#[test]
fn prefetch_prints_serialized_cache() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET").path("/api/people");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"[{"name":"Luke"}]"#);
    });

    let assert = cli()
        .arg("--base-url")
        .arg(server.base_url())
        .arg("prefetch")
        .arg("/api/people")
        .assert()
        .success();

    let cache = stdout_json(assert.get_output());
    assert_eq!(
        cache,
        json!({"/api/people": {"data": [{"name": "Luke"}], "error": null}})
    );
    mock.assert();
}

#[test]
fn prefetch_writes_output_file_and_keeps_failures() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET").path("/api/missing");
        then.status(404);
    });
    let output = NamedTempFile::new().expect("tmp file");

    cli()
        .arg("prefetch")
        .arg("/api/missing")
        .arg("--output")
        .arg(output.path())
        .arg("--base-url")
        .arg(server.base_url())
        .assert()
        .success();

    let written = std::fs::read_to_string(output.path()).expect("read output");
    let cache: Value = serde_json::from_str(&written).expect("output should be json");
    assert_eq!(cache["/api/missing"]["data"], Value::Null);
    assert_eq!(
        cache["/api/missing"]["error"]["message"],
        json!("HTTP error Status:404")
    );
    mock.assert();
}

#[test]
fn hydrate_reads_cached_keys_without_requests() {
    let input = cache_file(r#"{"/api/people":{"data":[{"name":"Leia"}],"error":null}}"#);

    let assert = cli()
        .arg("--base-url")
        .arg(UNREACHABLE_BASE)
        .arg("hydrate")
        .arg("--input")
        .arg(input.path())
        .arg("/api/people")
        .assert()
        .success();

    let report = stdout_json(assert.get_output());
    assert_eq!(
        report,
        json!([{
            "key": "/api/people",
            "isLoading": false,
            "data": [{"name": "Leia"}],
            "error": null
        }])
    );
}

#[test]
fn hydrate_fetches_keys_missing_from_the_cache() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET").path("/api/planets");
        then.status(200).body(r#"["Tatooine"]"#);
    });
    let input = cache_file("{}");

    let assert = cli()
        .arg("--base-url")
        .arg(server.base_url())
        .arg("hydrate")
        .arg("--input")
        .arg(input.path())
        .arg("/api/planets")
        .assert()
        .success();

    let report = stdout_json(assert.get_output());
    assert_eq!(report[0]["data"], json!(["Tatooine"]));
    assert_eq!(report[0]["isLoading"], json!(false));
    mock.assert();
}

#[test]
fn hydrate_refetches_falsy_payloads_by_default() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET").path("/api/flag");
        then.status(200).body("true");
    });
    let input = cache_file(r#"{"/api/flag":{"data":false,"error":null}}"#);

    let assert = cli()
        .arg("--base-url")
        .arg(server.base_url())
        .arg("hydrate")
        .arg("--input")
        .arg(input.path())
        .arg("/api/flag")
        .assert()
        .success();

    assert_eq!(stdout_json(assert.get_output())[0]["data"], json!(true));
    mock.assert();
}

#[test]
fn hydrate_keeps_falsy_payloads_when_refetch_is_disabled() {
    let input = cache_file(r#"{"/api/flag":{"data":false,"error":null}}"#);

    let assert = cli()
        .arg("--base-url")
        .arg(UNREACHABLE_BASE)
        .arg("--refetch-falsy-payloads")
        .arg("false")
        .arg("hydrate")
        .arg("--input")
        .arg(input.path())
        .arg("/api/flag")
        .assert()
        .success();

    let report = stdout_json(assert.get_output());
    assert_eq!(report[0]["data"], json!(false));
    assert_eq!(report[0]["error"], Value::Null);
}

#[test]
fn hydrate_with_missing_input_fails() {
    cli()
        .arg("hydrate")
        .arg("--input")
        .arg("/nonexistent/caching-fetch/cache.json")
        .arg("/api/people")
        .assert()
        .failure()
        .stderr(contains("io error"));
}

#[test]
fn zero_timeout_is_rejected() {
    cli()
        .arg("--timeout-seconds")
        .arg("0")
        .arg("prefetch")
        .arg("/api/people")
        .assert()
        .failure()
        .stderr(contains("http.timeout_seconds"));
}
