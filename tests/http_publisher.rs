//! `HttpPublisher` against a local stand-in for the remote store.

mod common;

use axum::{extract::State, http::HeaderMap, http::StatusCode, routing::put, Router};
use parknet_bridge::config::RemoteConfig;
use parknet_bridge::port::MockSerialPort;
use parknet_bridge::{
    Bridge, HttpPublisher, OccupancyState, PublishError, RecordingSink, SlotReading,
    StatePublisher,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
struct Captured {
    authorization: Option<String>,
    content_type: Option<String>,
    body: Value,
}

type Store = (Arc<Mutex<Vec<Captured>>>, StatusCode);

async fn store_handler(
    State((captured, status)): State<Store>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    captured.lock().unwrap().push(Captured {
        authorization: header("authorization"),
        content_type: header("content-type"),
        body: serde_json::from_str(&body).unwrap_or(Value::Null),
    });

    let reply = if status == StatusCode::OK {
        body
    } else {
        "Permission denied".to_string()
    };
    (status, reply)
}

/// Serve PUT /slots.json answering with `status`. Returns the URL and the
/// captured requests.
async fn spawn_store(status: StatusCode) -> (String, Arc<Mutex<Vec<Captured>>>) {
    let captured = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/slots.json", put(store_handler))
        .with_state((captured.clone(), status));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}/slots.json"), captured)
}

fn remote(url: &str, token: &str) -> RemoteConfig {
    RemoteConfig {
        url: url.to_string(),
        auth_token: token.to_string(),
        request_timeout_ms: Some(5_000),
    }
}

fn sample_state() -> OccupancyState {
    [SlotReading::new(1, true), SlotReading::new(2, false)]
        .into_iter()
        .collect()
}

#[tokio::test]
async fn test_put_without_token_has_no_auth_header() {
    let (url, captured) = spawn_store(StatusCode::OK).await;
    let mut publisher = HttpPublisher::new(&remote(&url, "")).unwrap();

    publisher.publish(&sample_state()).await.unwrap();

    let requests = captured.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].authorization, None);
    assert_eq!(requests[0].content_type.as_deref(), Some("application/json"));
    assert_eq!(requests[0].body, json!({"1": true, "2": false}));
}

#[tokio::test]
async fn test_put_with_token_sends_bearer() {
    let (url, captured) = spawn_store(StatusCode::OK).await;
    let mut publisher = HttpPublisher::new(&remote(&url, "s3cret")).unwrap();

    publisher.publish(&sample_state()).await.unwrap();

    let requests = captured.lock().unwrap().clone();
    assert_eq!(requests[0].authorization.as_deref(), Some("Bearer s3cret"));
}

#[tokio::test]
async fn test_non_200_success_code_is_an_error() {
    let (url, _captured) = spawn_store(StatusCode::CREATED).await;
    let mut publisher = HttpPublisher::new(&remote(&url, "")).unwrap();

    let err = publisher.publish(&sample_state()).await.unwrap_err();
    assert!(matches!(err, PublishError::Status { status: 201, .. }), "got {err:?}");
}

#[tokio::test]
async fn test_error_status_carries_body() {
    let (url, _captured) = spawn_store(StatusCode::UNAUTHORIZED).await;
    let mut publisher = HttpPublisher::new(&remote(&url, "expired")).unwrap();

    match publisher.publish(&sample_state()).await {
        Err(PublishError::Status { status, body }) => {
            assert_eq!(status, 401);
            assert_eq!(body, "Permission denied");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_bridge_publishes_to_store() {
    let (url, captured) = spawn_store(StatusCode::OK).await;
    let mut config = common::test_config();
    config.remote = remote(&url, "");

    let mut port = MockSerialPort::new("MOCK0");
    for line in ["S1: 25.3 cm → OC", "S2: 40.0 cm → FR", "S1: 10.0 cm → FR"] {
        port.enqueue_line(line);
    }

    let publisher = HttpPublisher::new(&config.remote).unwrap();
    let mut bridge = Bridge::new(config, publisher, RecordingSink::new());
    bridge.connect_with(move |_| Ok(port)).unwrap();

    while bridge.poll_once().await.unwrap() != parknet_bridge::PollOutcome::Idle {}

    let bodies: Vec<Value> = captured
        .lock()
        .unwrap()
        .iter()
        .map(|c| c.body.clone())
        .collect();
    assert_eq!(bodies.len(), 3);
    assert_eq!(bodies.last(), Some(&json!({"1": false, "2": false})));
}
