//! Per-request access logging

use std::time::Instant;

use axum::{body::Body, extract::Request, middleware::Next, response::Response};

use super::request_id::RequestId;

/// Log method, path, status and latency of every request
pub async fn access_log_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().path().to_string();
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|r| r.0.clone())
        .unwrap_or_else(|| "unknown".to_string());

    let start = Instant::now();
    let response = next.run(request).await;
    let status = response.status().as_u16();

    tracing::info!(
        target: "access",
        request_id = %request_id,
        method = %method,
        path = %uri,
        status = %status,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Request handled"
    );

    response
}
