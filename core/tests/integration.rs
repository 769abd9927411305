//! End-to-end dispatch against the live mock server.
//!
//! # Design
//! Each test starts the mock server on a random port inside the test's own
//! runtime, then drives the real reqwest-backed `Dispatcher` over HTTP. The
//! response DTOs below are defined independently of the mock server's
//! types so schema drift between the two shows up here.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use apiclient_core::{
    Dispatcher, ErrorKind, HttpMethod, Json, RequestConfig, ScreenHook, Text,
};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
struct GetResponse {
    origin: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct Form {
    name: String,
}

#[derive(Debug, Deserialize)]
struct PostResponse {
    form: Form,
}

#[derive(Debug, Deserialize)]
struct PutResponse {
    data: String,
}

#[derive(Debug, Deserialize)]
struct DeleteResponse {
    origin: String,
}

#[derive(Debug, Deserialize)]
struct PatchResponse {
    json: Form,
}

#[derive(Debug, Deserialize)]
struct BearerResponse {
    authenticated: bool,
    token: String,
}

async fn start_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::run(listener));
    format!("http://{addr}")
}

fn config(base: &str, endpoint: &str, method: HttpMethod) -> RequestConfig {
    RequestConfig::build_without_token(base, endpoint, method, None, None, 5_000).unwrap()
}

fn with_name(base: &str, endpoint: &str, method: HttpMethod, name: &str) -> RequestConfig {
    RequestConfig::build_without_token(base, endpoint, method, None, Some(json!({ "name": name })), 5_000)
        .unwrap()
}

fn recording_hook() -> (ScreenHook, Arc<Mutex<Vec<&'static str>>>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let start = Arc::clone(&events);
    let end = Arc::clone(&events);
    let hook = ScreenHook::new()
        .on_start(move || start.lock().unwrap().push("start"))
        .on_end(move || end.lock().unwrap().push("end"));
    (hook, events)
}

// --- success paths ---

#[tokio::test]
async fn get_returns_origin_and_url() {
    let base = start_server().await;
    let dispatcher = Dispatcher::new().unwrap();

    let response = dispatcher
        .send_json::<GetResponse>(&config(&base, "/get", HttpMethod::Get), None)
        .await;

    assert!(response.is_successful(), "{response}");
    assert_eq!(response.status_code(), Some(200));
    assert_eq!(response.error_message(), None);
    let data = response.data().unwrap();
    assert_eq!(data.origin, "127.0.0.1");
    assert!(data.url.ends_with("/get"), "{}", data.url);
}

#[tokio::test]
async fn post_body_is_echoed_into_form() {
    let base = start_server().await;
    let dispatcher = Dispatcher::new().unwrap();

    let response = dispatcher
        .send_json::<PostResponse>(&with_name(&base, "/post", HttpMethod::Post, "A"), None)
        .await;

    assert!(response.is_successful(), "{response}");
    assert_eq!(response.data().unwrap().form.name, "A");
}

#[tokio::test]
async fn put_patch_delete_decode_their_shapes() {
    let base = start_server().await;
    let dispatcher = Dispatcher::new().unwrap();

    let put = dispatcher
        .send_json::<PutResponse>(&with_name(&base, "/put", HttpMethod::Put, "P"), None)
        .await;
    assert_eq!(put.data().unwrap().data, r#"{"name":"P"}"#);

    let patch = dispatcher
        .send_json::<PatchResponse>(&with_name(&base, "/patch", HttpMethod::Patch, "Q"), None)
        .await;
    assert_eq!(patch.data().unwrap().json.name, "Q");

    let delete = dispatcher
        .send_json::<DeleteResponse>(&config(&base, "/delete", HttpMethod::Delete), None)
        .await;
    assert_eq!(delete.data().unwrap().origin, "127.0.0.1");
}

#[tokio::test]
async fn head_succeeds_without_payload_and_exposes_headers() {
    let base = start_server().await;
    let dispatcher = Dispatcher::new().unwrap();

    let response = dispatcher
        .send_empty(&config(&base, "/headers", HttpMethod::Head), None)
        .await;

    assert!(response.is_successful(), "{response}");
    assert!(response.data().is_none());
    assert_eq!(response.header("content-type"), Some("application/json"));
}

#[tokio::test]
async fn text_shape_returns_raw_body() {
    let base = start_server().await;
    let dispatcher = Dispatcher::new().unwrap();

    let response = dispatcher
        .send(&config(&base, "/get", HttpMethod::Get), Text, None)
        .await;

    let body: serde_json::Value = serde_json::from_str(response.data().unwrap()).unwrap();
    assert_eq!(body["origin"], "127.0.0.1");
}

#[tokio::test]
async fn custom_headers_and_token_reach_the_server() {
    let base = start_server().await;
    let dispatcher = Dispatcher::new().unwrap();

    let mut headers = BTreeMap::new();
    headers.insert("X-Request-Id".to_string(), "42".to_string());
    let config = RequestConfig::build(&base, "/bearer", HttpMethod::Get, Some(headers), None, 5_000, Some("abc"))
        .unwrap();
    let response = dispatcher.send_json::<BearerResponse>(&config, None).await;

    let data = response.data().unwrap();
    assert!(data.authenticated);
    assert_eq!(data.token, "abc");

    let echoed = dispatcher
        .send_json::<serde_json::Value>(
            &RequestConfig::builder(&base, "/headers", HttpMethod::Get)
                .header("X-Request-Id", "42")
                .build()
                .unwrap(),
            None,
        )
        .await;
    let headers = &echoed.data().unwrap()["headers"];
    assert_eq!(headers["x-request-id"], "42");
    assert_eq!(headers["accept"], "application/json");
    assert!(headers["user-agent"].as_str().unwrap().starts_with("apiclient/"));
}

// --- failure paths ---

#[tokio::test]
async fn non_2xx_reports_status_without_data() {
    let base = start_server().await;
    let dispatcher = Dispatcher::new().unwrap();

    for code in [401u16, 404, 500, 503] {
        let response = dispatcher
            .send_json::<GetResponse>(&config(&base, &format!("/status/{code}"), HttpMethod::Get), None)
            .await;
        assert!(!response.is_successful());
        assert_eq!(response.status_code(), Some(code));
        assert!(response.data().is_none());
        assert_eq!(response.error().map(|e| e.kind()), Some(ErrorKind::HttpStatus));
    }
}

#[tokio::test]
async fn bearer_without_token_is_unauthorized() {
    let base = start_server().await;
    let dispatcher = Dispatcher::new().unwrap();

    let response = dispatcher
        .send_json::<BearerResponse>(&config(&base, "/bearer", HttpMethod::Get), None)
        .await;
    assert_eq!(response.status_code(), Some(401));
    assert_eq!(response.error_message().as_deref(), Some("HTTP 401 Unauthorized"));
}

#[tokio::test]
async fn malformed_success_body_keeps_2xx_status() {
    let base = start_server().await;
    let dispatcher = Dispatcher::new().unwrap();

    let response = dispatcher
        .send_json::<GetResponse>(&config(&base, "/malformed", HttpMethod::Get), None)
        .await;

    assert!(!response.is_successful());
    assert_eq!(response.status_code(), Some(200));
    assert_eq!(response.error().map(|e| e.kind()), Some(ErrorKind::Deserialization));
}

#[tokio::test]
async fn unreachable_host_has_no_status() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let dispatcher = Dispatcher::new().unwrap();
    let response = dispatcher
        .send_json::<GetResponse>(&config(&format!("http://{addr}"), "/get", HttpMethod::Get), None)
        .await;

    assert!(!response.is_successful());
    assert_eq!(response.status_code(), None);
    assert!(!response.error_message().unwrap().is_empty());
    assert_eq!(response.error().map(|e| e.kind()), Some(ErrorKind::Transport));
}

#[tokio::test]
async fn slow_server_times_out_near_the_deadline() {
    let base = start_server().await;
    let dispatcher = Dispatcher::new().unwrap();
    let config = RequestConfig::build_without_token(&base, "/delay/30", HttpMethod::Get, None, None, 1_000).unwrap();

    let started = Instant::now();
    let response = dispatcher.send_json::<GetResponse>(&config, None).await;
    let elapsed = started.elapsed();

    assert!(!response.is_successful());
    assert_eq!(response.error_message().as_deref(), Some("request timed out"));
    assert_eq!(response.status_code(), None);
    assert!(elapsed >= Duration::from_millis(1_000), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(2_500), "{elapsed:?}");
}

// --- hooks and concurrency ---

#[tokio::test]
async fn hook_brackets_every_outcome() {
    let base = start_server().await;
    let dispatcher = Dispatcher::new().unwrap();

    let configs = [
        config(&base, "/get", HttpMethod::Get),
        config(&base, "/status/500", HttpMethod::Get),
        config(&base, "/malformed", HttpMethod::Get),
        RequestConfig::build_without_token(&base, "/delay/5", HttpMethod::Get, None, None, 200).unwrap(),
    ];
    for config in &configs {
        let (hook, events) = recording_hook();
        dispatcher
            .send(config, Json::<GetResponse>::new(), Some(&hook))
            .await;
        assert_eq!(*events.lock().unwrap(), vec!["start", "end"], "{}", config.endpoint());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_sends_are_independent() {
    let base = start_server().await;
    let dispatcher = Dispatcher::new().unwrap();

    let slow = RequestConfig::build_without_token(&base, "/delay/30", HttpMethod::Get, None, None, 500).unwrap();
    let fast = config(&base, "/get", HttpMethod::Get);
    let missing = config(&base, "/status/404", HttpMethod::Get);

    let (slow, fast, missing) = tokio::join!(
        dispatcher.send_json::<GetResponse>(&slow, None),
        dispatcher.send_json::<GetResponse>(&fast, None),
        dispatcher.send_json::<GetResponse>(&missing, None),
    );

    assert_eq!(slow.error().map(|e| e.kind()), Some(ErrorKind::Timeout));
    assert!(fast.is_successful());
    assert_eq!(missing.status_code(), Some(404));
}

#[tokio::test]
async fn detached_send_still_reports_to_hook() {
    let base = start_server().await;
    let dispatcher = Dispatcher::new().unwrap();
    let events = Arc::new(Mutex::new(Vec::new()));
    let finished = Arc::new(tokio::sync::Notify::new());
    let hook = {
        let start = Arc::clone(&events);
        let end = Arc::clone(&events);
        let finished = Arc::clone(&finished);
        ScreenHook::new()
            .on_start(move || start.lock().unwrap().push("start"))
            .on_end(move || {
                end.lock().unwrap().push("end");
                finished.notify_one();
            })
    };
    let config = config(&base, "/get", HttpMethod::Get);

    // Nobody awaits the envelope.
    drop(tokio::spawn(async move {
        dispatcher.send_json::<GetResponse>(&config, Some(&hook)).await;
    }));

    tokio::time::timeout(Duration::from_secs(5), finished.notified())
        .await
        .unwrap();
    assert_eq!(*events.lock().unwrap(), vec!["start", "end"]);
}
