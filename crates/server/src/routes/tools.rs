//! Tool invocation endpoints
//!
//! Tool calls always answer 200; success or failure is carried in the
//! envelope body.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde_json::{Value as JsonValue, json};
use trials_core::{SearchTrialsOutput, StudyDetailsOutput, TrialsError};

use crate::AppState;
use crate::tools::{self, SearchTrialsInput, StudyDetailsInput, search_trials::TOOL_PAGE_SIZE};

/// GET /tools - Tool catalogue
pub async fn list() -> Json<JsonValue> {
    Json(json!({ "tools": tools::catalogue() }))
}

/// POST /tools/search_trials
pub async fn search_trials(
    State(state): State<AppState>,
    body: Result<Json<SearchTrialsInput>, JsonRejection>,
) -> Json<SearchTrialsOutput> {
    let output = match body {
        Ok(Json(input)) => tools::search_trials::run(&state, input).await,
        Err(rejection) => SearchTrialsOutput::failure(&invalid_body(rejection), 1, TOOL_PAGE_SIZE, 0),
    };
    Json(output)
}

/// POST /tools/get_study_details
pub async fn get_study_details(
    State(state): State<AppState>,
    body: Result<Json<StudyDetailsInput>, JsonRejection>,
) -> Json<StudyDetailsOutput> {
    let output = match body {
        Ok(Json(input)) => tools::get_study_details::run(&state, input).await,
        Err(rejection) => StudyDetailsOutput::failure(&invalid_body(rejection)),
    };
    Json(output)
}

fn invalid_body(rejection: JsonRejection) -> TrialsError {
    tracing::debug!(error = %rejection, "Rejected tool input");
    TrialsError::Validation(rejection.body_text())
}
