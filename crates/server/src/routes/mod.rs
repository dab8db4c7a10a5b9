//! HTTP route handlers

pub mod health;
pub mod metrics;
pub mod studies;
pub mod tools;

use axum::{
    Router,
    routing::{get, post},
};

use crate::AppState;

/// Tool endpoints and the direct study route
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/tools", get(tools::list))
        .route("/tools/search_trials", post(tools::search_trials))
        .route("/tools/get_study_details", post(tools::get_study_details))
        .route("/api/studies/{nct_id}", get(studies::get))
}
