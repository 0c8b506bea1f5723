use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};
use tracing::{debug, info, warn};

/// Logs each request with its status and latency. Only the path is logged,
/// never the body or query string.
pub async fn log_request_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    debug!("Incoming request: {method} {path}");

    let started = Instant::now();
    let response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if status.is_server_error() {
        warn!(%method, %path, status = status.as_u16(), elapsed_ms, "request failed");
    } else {
        info!(%method, %path, status = status.as_u16(), elapsed_ms, "request handled");
    }
    response
}
