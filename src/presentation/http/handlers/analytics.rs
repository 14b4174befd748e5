use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::extract::State;

use crate::application::context::AppContext;
use crate::domain::entities::AnalyticsSnapshot;

/// Current counters and prediction.
pub async fn get_analytics(State(ctx): State<Arc<AppContext>>) -> Json<AnalyticsSnapshot> {
    let started = Instant::now();
    let snapshot = ctx.aggregator.snapshot();
    ctx.telemetry.observe_latency("analyze", started.elapsed());
    Json(snapshot)
}
