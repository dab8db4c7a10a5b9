//! Direct study detail route

use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
};
use serde::Deserialize;
use trials_core::{StudyDetailsOutput, TrialsError};

use crate::AppState;
use crate::error::AppError;
use crate::tools::{StudyDetailsInput, get_study_details};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyQuery {
    #[serde(default)]
    include_eligibility_parsed: bool,
    /// Comma separated registry field names
    fields: Option<String>,
}

/// GET /api/studies/{nct_id} - Study detail with errors mapped to HTTP statuses
pub async fn get(
    State(state): State<AppState>,
    Path(nct_id): Path<String>,
    query: Result<Query<StudyQuery>, QueryRejection>,
) -> Result<Json<StudyDetailsOutput>, AppError> {
    let Query(query) = query.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected study query string");
        TrialsError::Validation(rejection.body_text())
    })?;

    let input = StudyDetailsInput {
        nct_id,
        fields: query.fields.map(|f| {
            f.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        }),
        include_eligibility_parsed: query.include_eligibility_parsed,
    };

    let study = get_study_details::fetch(&state, &input).await?;
    Ok(Json(StudyDetailsOutput::success(study)))
}
