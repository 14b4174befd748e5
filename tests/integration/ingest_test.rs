#![allow(clippy::expect_used)]

use std::sync::Arc;

use pulse::application::config::IngestConfig;
use pulse::application::context::AppContext;
use pulse::application::services::CountingMode;
use pulse::domain::entities::MetricSample;
use pulse::domain::ports::MetricStore;
use pulse::domain::value_objects::WINDOW_SIZE;
use pulse::infrastructure::oracle::fixed::FixedOracle;
use pulse::infrastructure::persistence::in_memory_store::InMemoryStore;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn context_with(store: Arc<InMemoryStore>, ingest: &IngestConfig) -> Arc<AppContext> {
    Arc::new(
        AppContext::build(store, Arc::new(FixedOracle::new(0.5)), ingest).expect("context"),
    )
}

fn ingest_config(counting: CountingMode, serialize_per_metric: bool) -> IngestConfig {
    IngestConfig {
        queue_capacity: 64,
        workers: 8,
        serialize_per_metric,
        counting,
    }
}

async fn submit_concurrently(ctx: &Arc<AppContext>, metrics: &[&str], per_metric: i64) {
    let mut tasks = Vec::new();
    for (m, metric) in metrics.iter().enumerate() {
        for ts in 1..=per_metric {
            let ctx = Arc::clone(ctx);
            let metric = (*metric).to_string();
            #[allow(clippy::cast_precision_loss)]
            let value = (ts as f64).mul_add(0.5, m as f64 + 1.0);
            tasks.push(tokio::spawn(async move {
                let sample = MetricSample::new(metric, value, ts).expect("sample");
                ctx.queue.submit(sample).await.expect("submit");
            }));
        }
    }
    for task in tasks {
        task.await.expect("join");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn atomic_counting_sees_every_sample() {
    let store = Arc::new(InMemoryStore::new());
    let ctx = context_with(store, &ingest_config(CountingMode::Atomic, true));

    submit_concurrently(&ctx, &["cpu", "mem", "disk", "net"], 250).await;
    ctx.shutdown().await;

    let snapshot = ctx.aggregator.snapshot();
    assert_eq!(snapshot.total_count, 1000);
    assert!(snapshot.anomaly_count <= snapshot.total_count);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn load_store_counting_may_lose_samples_but_never_invents_them() {
    let store = Arc::new(InMemoryStore::new());
    // Nearly every sample lands far outside these baselines.
    for metric in ["cpu", "mem", "disk", "net"] {
        store.set(&format!("{metric}:mean"), "1").expect("mean");
        store.set(&format!("{metric}:stddev"), "0.1").expect("stddev");
    }
    let ctx = context_with(store, &ingest_config(CountingMode::LoadStore, true));

    submit_concurrently(&ctx, &["cpu", "mem", "disk", "net"], 250).await;
    ctx.shutdown().await;

    let snapshot = ctx.aggregator.snapshot();
    assert!(snapshot.total_count <= 1000);
    assert!(snapshot.total_count > 0);
    assert!(snapshot.anomaly_count > 0);
    assert!(snapshot.anomaly_count <= snapshot.total_count);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn window_stays_bounded_under_concurrency() {
    for serialize in [true, false] {
        let store = Arc::new(InMemoryStore::new());
        let ctx = context_with(Arc::clone(&store), &ingest_config(CountingMode::Atomic, serialize));

        submit_concurrently(&ctx, &["cpu", "mem"], 200).await;
        ctx.shutdown().await;

        for metric in ["cpu", "mem"] {
            let window = store
                .range_all(&format!("{metric}:rolling"))
                .await
                .expect("range");
            assert!(
                window.len() <= WINDOW_SIZE + 1,
                "{metric} window has {} entries (serialize={serialize})",
                window.len()
            );
        }
    }
}

#[tokio::test]
async fn serialized_window_keeps_last_values_in_order() {
    let store = Arc::new(InMemoryStore::new());
    let ctx = context_with(
        Arc::clone(&store),
        &IngestConfig {
            workers: 1,
            ..ingest_config(CountingMode::Atomic, true)
        },
    );

    for ts in 1..=20 {
        #[allow(clippy::cast_precision_loss)]
        let sample = MetricSample::new("cpu", ts as f64, ts).expect("sample");
        ctx.queue.submit(sample).await.expect("submit");
    }
    ctx.shutdown().await;

    let window = store.range_all("cpu:rolling").await.expect("range");
    let expected: Vec<String> = (10..=20).map(|v| v.to_string()).collect();
    assert_eq!(window, expected);
}

#[tokio::test]
async fn anomalies_are_counted_against_stored_baseline() {
    let store = Arc::new(InMemoryStore::new());
    store.set("latency:mean", "10").expect("mean");
    store.set("latency:stddev", "1").expect("stddev");
    let ctx = context_with(Arc::clone(&store), &IngestConfig::default());

    for (ts, value) in [(1, 10.5), (2, 13.0), (3, 11.5), (4, 5.0), (5, 9.0)] {
        let sample = MetricSample::new("latency", value, ts).expect("sample");
        ctx.queue.submit(sample).await.expect("submit");
    }
    ctx.shutdown().await;

    let snapshot = ctx.aggregator.snapshot();
    assert_eq!(snapshot.total_count, 5);
    assert_eq!(snapshot.anomaly_count, 2);
    assert!((snapshot.prediction - 0.5).abs() < f64::EPSILON);

    let exported = ctx.telemetry.render().expect("render");
    assert!(exported.contains("anomalies_total 2"), "{exported}");
}

#[tokio::test]
async fn metric_without_baseline_is_never_anomalous() {
    let store = Arc::new(InMemoryStore::new());
    let ctx = context_with(Arc::clone(&store), &IngestConfig::default());

    for (ts, value) in [(1, 1e-9), (2, 1e9), (3, -1e9)] {
        let sample = MetricSample::new("fresh", value, ts).expect("sample");
        ctx.queue.submit(sample).await.expect("submit");
    }
    ctx.shutdown().await;

    let snapshot = ctx.aggregator.snapshot();
    assert_eq!(snapshot.total_count, 3);
    assert_eq!(snapshot.anomaly_count, 0);
}

#[tokio::test]
async fn raw_samples_are_persisted_per_timestamp() {
    let store = Arc::new(InMemoryStore::new());
    let ctx = context_with(Arc::clone(&store), &IngestConfig::default());

    ctx.queue
        .submit(MetricSample::new("cpu", 1.25, 100).expect("sample"))
        .await
        .expect("submit");
    ctx.queue
        .submit(MetricSample::new("cpu", 2.5, 101).expect("sample"))
        .await
        .expect("submit");
    ctx.shutdown().await;

    assert_eq!(store.get("cpu:100").await.expect("get").as_deref(), Some("1.25"));
    assert_eq!(store.get("cpu:101").await.expect("get").as_deref(), Some("2.5"));
    assert!(store.ttl("cpu:100").expect("ttl").is_some());
}
