use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::application::context::AppContext;

pub fn create_routes() -> Router<Arc<AppContext>> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", post(handlers::ingest_metric))
        .route("/analyze", get(handlers::get_analytics))
        .route("/prometheus", get(handlers::export_metrics))
        .layer(TraceLayer::new_for_http())
}

/// Router with the context attached, ready to serve.
pub fn app(ctx: Arc<AppContext>) -> Router {
    create_routes().with_state(ctx)
}
