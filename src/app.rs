use std::net::SocketAddr;

use anyhow::Context;
use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

pub fn build_app() -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     _span: &tracing::Span| {
                        let status = res.status();
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::debug!(%status, "response");
                        }
                    },
                ),
        )
}

/// Liveness endpoint for the process supervisor; runs until the socket fails.
pub async fn serve(addr: SocketAddr, app: Router) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind health endpoint on {}", addr))?;
    tracing::info!(addr = %listener.local_addr()?, "health endpoint listening");
    axum::serve(listener, app).await?;
    Ok(())
}
