use std::sync::Arc;

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;

use crate::application::context::AppContext;
use crate::presentation::http::error::ApiError;

/// Scrape endpoint in the Prometheus text format.
pub async fn export_metrics(
    State(ctx): State<Arc<AppContext>>,
) -> Result<impl IntoResponse, ApiError> {
    let body = ctx.telemetry.render()?;
    Ok(([(header::CONTENT_TYPE, ctx.telemetry.content_type())], body))
}
