use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde_json::{Value, json};

use crate::application::context::AppContext;

/// Store reachability probe. An unreachable store reports `DOWN` and
/// nothing else.
pub async fn health_check(State(ctx): State<Arc<AppContext>>) -> (StatusCode, Json<Value>) {
    if let Err(e) = ctx.store.ping().await {
        tracing::warn!("health check failed: {e}");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "DOWN" })),
        );
    }
    (StatusCode::OK, Json(json!({ "status": "UP" })))
}
