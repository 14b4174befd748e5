use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde_json::{Value, json};

use crate::application::context::AppContext;
use crate::application::services::Ingestor;
use crate::domain::entities::{IngestRequest, ValidationError};
use crate::infrastructure::telemetry::RequestStatus;
use crate::presentation::http::error::ApiError;

/// Accept a metric sample.
///
/// Validation happens here; persistence and analysis run later on the
/// ingestion workers, so a success reply only means the sample was queued.
/// Every reply, accepted or not, is counted and timed.
pub async fn ingest_metric(
    State(ctx): State<Arc<AppContext>>,
    payload: Result<Json<IngestRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let started = Instant::now();
    let result = accept(&ctx, payload).await;

    let status = if result.is_ok() {
        RequestStatus::Success
    } else {
        RequestStatus::Error
    };
    ctx.telemetry.record_request(status);
    ctx.telemetry.observe_latency("ingest", started.elapsed());
    result
}

async fn accept(
    ctx: &AppContext,
    payload: Result<Json<IngestRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let sample = payload
        .map_err(|rejection| ValidationError::MalformedBody(rejection.body_text()))
        .and_then(|Json(request)| Ingestor::validate(request))
        .inspect_err(|e| tracing::debug!("rejected sample: {e}"))?;

    let message = format!(
        "Received metric '{}' with value {:.2}",
        sample.name(),
        sample.value()
    );
    ctx.queue.submit(sample).await?;
    Ok(Json(json!({ "message": message })))
}
