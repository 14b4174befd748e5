use std::future::Future;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use crate::application::context::AppContext;
use crate::presentation::http::app;

/// Serve HTTP until `shutdown` resolves, then drain the ingestion queue.
///
/// In-flight requests are allowed to finish before the queue is closed, so
/// every acknowledged sample is still processed.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound or the server fails.
pub async fn run_serve(
    ctx: Arc<AppContext>,
    listener: TcpListener,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let addr = listener.local_addr().context("Listener has no local address")?;
    tracing::info!(%addr, "pulse listening");

    let served = axum::serve(listener, app(Arc::clone(&ctx)))
        .with_graceful_shutdown(shutdown)
        .await;

    ctx.shutdown().await;
    served.context("HTTP server failed")
}

/// Bind the configured address.
///
/// # Errors
///
/// Returns an error if the address cannot be bound.
pub async fn bind(listen_addr: &str) -> anyhow::Result<TcpListener> {
    TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("Failed to bind {listen_addr}"))
}

/// Resolves on Ctrl+C.
///
/// SIGTERM is not handled; orchestrators that only send SIGTERM will fall
/// back to a hard kill.
pub async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("cannot listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received, draining");
}
