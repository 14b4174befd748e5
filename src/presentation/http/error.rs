use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::application::services::QueueError;
use crate::domain::entities::ValidationError;
use crate::infrastructure::telemetry::TelemetryError;

/// Errors surfaced synchronously to HTTP callers.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("service is shutting down")]
    ShuttingDown(#[from] QueueError),
    #[error("exporter failure: {0}")]
    Telemetry(#[from] TelemetryError),
}

impl ApiError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::ShuttingDown(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Telemetry(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
