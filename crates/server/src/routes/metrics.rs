//! Prometheus metrics endpoint

use axum::{extract::State, http::header, response::IntoResponse};

use crate::AppState;

/// GET /metrics - Render HTTP and registry metrics in Prometheus text format
pub async fn get(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
