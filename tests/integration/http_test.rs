#![allow(clippy::expect_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use pulse::application::config::IngestConfig;
use pulse::application::context::AppContext;
use pulse::domain::ports::{MetricStore, StoreError};
use pulse::infrastructure::oracle::fixed::FixedOracle;
use pulse::infrastructure::persistence::in_memory_store::InMemoryStore;
use pulse::presentation::http::app;

// ---------------------------------------------------------------------------
// Test stores
// ---------------------------------------------------------------------------

/// Forwards to an in-memory store and counts every call.
struct RecordingStore {
    inner: InMemoryStore,
    calls: AtomicUsize,
}

impl RecordingStore {
    fn new() -> Self {
        Self {
            inner: InMemoryStore::new(),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl MetricStore for RecordingStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.touch();
        self.inner.get(key).await
    }
    async fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        self.touch();
        self.inner.set_with_expiry(key, value, ttl).await
    }
    async fn push_back(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.touch();
        self.inner.push_back(key, value).await
    }
    async fn trim_to_last(&self, key: &str, keep: usize) -> Result<(), StoreError> {
        self.touch();
        self.inner.trim_to_last(key, keep).await
    }
    async fn range_all(&self, key: &str) -> Result<Vec<String>, StoreError> {
        self.touch();
        self.inner.range_all(key).await
    }
    async fn ping(&self) -> Result<(), StoreError> {
        self.inner.ping().await
    }
}

/// A store whose connection is gone.
struct DownStore;

#[async_trait]
impl MetricStore for DownStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
    async fn set_with_expiry(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
    async fn push_back(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
    async fn trim_to_last(&self, _key: &str, _keep: usize) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
    async fn range_all(&self, _key: &str) -> Result<Vec<String>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
    async fn ping(&self) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn context(store: Arc<dyn MetricStore>) -> Arc<AppContext> {
    Arc::new(
        AppContext::build(store, Arc::new(FixedOracle::new(0.25)), &IngestConfig::default())
            .expect("context"),
    )
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_owned()))
        .expect("request")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes()
        .to_vec()
}

async fn body_json(response: axum::response::Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).expect("json body")
}

// ---------------------------------------------------------------------------
// POST /metrics
// ---------------------------------------------------------------------------

#[tokio::test]
async fn ingest_acknowledges_valid_sample() {
    let ctx = context(Arc::new(InMemoryStore::new()));
    let response = app(Arc::clone(&ctx))
        .oneshot(post_json(
            "/metrics",
            r#"{"name":"cpu","value":42.5,"timestamp":1700000000}"#,
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({ "message": "Received metric 'cpu' with value 42.50" })
    );

    ctx.shutdown().await;
    assert_eq!(ctx.aggregator.snapshot().total_count, 1);
}

#[tokio::test]
async fn ingest_rejects_missing_timestamp_without_touching_store() {
    let store = Arc::new(RecordingStore::new());
    let ctx = context(store.clone());
    let response = app(Arc::clone(&ctx))
        .oneshot(post_json("/metrics", r#"{"name":"cpu","value":1.5}"#))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().expect("error text").contains("timestamp"));

    ctx.shutdown().await;
    assert_eq!(store.calls(), 0);
    assert_eq!(ctx.aggregator.snapshot().total_count, 0);
}

#[tokio::test]
async fn ingest_rejects_zero_value() {
    let ctx = context(Arc::new(InMemoryStore::new()));
    let response = app(ctx)
        .oneshot(post_json(
            "/metrics",
            r#"{"name":"cpu","value":0,"timestamp":1700000000}"#,
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn ingest_rejects_malformed_json() {
    let ctx = context(Arc::new(InMemoryStore::new()));
    let response = app(Arc::clone(&ctx))
        .oneshot(post_json("/metrics", r#"{"name":"cpu","value":"#))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());

    let exported = ctx.telemetry.render().expect("render");
    assert!(exported.contains(r#"rps_total{status="error"} 1"#), "{exported}");
}

#[tokio::test]
async fn ingest_after_shutdown_is_unavailable() {
    let ctx = context(Arc::new(InMemoryStore::new()));
    ctx.shutdown().await;
    let response = app(ctx)
        .oneshot(post_json(
            "/metrics",
            r#"{"name":"cpu","value":2,"timestamp":1}"#,
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

// ---------------------------------------------------------------------------
// GET /analyze
// ---------------------------------------------------------------------------

#[tokio::test]
async fn analyze_reports_counters_after_ingestion() {
    let store = Arc::new(InMemoryStore::new());
    store.set("lat:mean", "10").expect("mean");
    store.set("lat:stddev", "1").expect("stddev");
    let ctx = context(store);
    let router = app(Arc::clone(&ctx));

    for (ts, value) in [(1, 10.2), (2, 14.0), (3, 9.9)] {
        let body = json!({ "name": "lat", "value": value, "timestamp": ts }).to_string();
        let response = router
            .clone()
            .oneshot(post_json("/metrics", &body))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }
    ctx.shutdown().await;

    let response = router.oneshot(get("/analyze")).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["window_size"], 50);
    assert_eq!(body["total_count"], 3);
    assert_eq!(body["anomaly_count"], 1);
    assert_eq!(body["prediction"], 0.25);
}

#[tokio::test]
async fn analyze_starts_at_zero() {
    let ctx = context(Arc::new(InMemoryStore::new()));
    let response = app(ctx).oneshot(get("/analyze")).await.expect("response");
    let body = body_json(response).await;
    assert_eq!(
        body,
        json!({ "prediction": 0.0, "window_size": 50, "total_count": 0, "anomaly_count": 0 })
    );
}

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_is_up_when_store_answers() {
    let ctx = context(Arc::new(InMemoryStore::new()));
    let response = app(ctx).oneshot(get("/health")).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "status": "UP" }));
}

#[tokio::test]
async fn health_is_down_when_store_is_gone() {
    let ctx = context(Arc::new(DownStore));
    let response = app(ctx).oneshot(get("/health")).await.expect("response");
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await, json!({ "status": "DOWN" }));
}

// ---------------------------------------------------------------------------
// GET /prometheus
// ---------------------------------------------------------------------------

#[tokio::test]
async fn exporter_serves_text_format() {
    let ctx = context(Arc::new(InMemoryStore::new()));
    let router = app(Arc::clone(&ctx));

    let response = router
        .clone()
        .oneshot(post_json("/metrics", r#"{"name":"cpu","value":3,"timestamp":9}"#))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    ctx.shutdown().await;

    let response = router.oneshot(get("/prometheus")).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .expect("content type")
        .to_owned();
    assert!(content_type.starts_with("text/plain"), "{content_type}");

    let text = String::from_utf8(body_bytes(response).await).expect("utf8");
    assert!(text.contains(r#"rps_total{status="success"} 1"#), "{text}");
    assert!(text.contains("anomalies_total 0"), "{text}");
    assert!(text.contains("prediction_value 0.25"), "{text}");
    assert!(text.contains("latency_seconds"), "{text}");
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let ctx = context(Arc::new(InMemoryStore::new()));
    let response = app(ctx).oneshot(get("/nope")).await.expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
