//! `get_study_details` tool

use serde::Deserialize;
use trials_core::{DetailOptions, NctId, NormalizedStudy, StudyDetailsOutput, TrialsError, to_study_detail};

use crate::AppState;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyDetailsInput {
    pub nct_id: String,
    pub fields: Option<Vec<String>>,
    #[serde(default)]
    pub include_eligibility_parsed: bool,
}

/// Fetch one study. Failures come back inside the envelope.
pub async fn run(state: &AppState, input: StudyDetailsInput) -> StudyDetailsOutput {
    match fetch(state, &input).await {
        Ok(study) => StudyDetailsOutput::success(study),
        Err(err) => {
            tracing::warn!(
                nct_id = %input.nct_id,
                error = %err,
                code = err.code().as_str(),
                "get_study_details failed"
            );
            StudyDetailsOutput::failure(&err)
        }
    }
}

/// Validate the identifier, fetch the record and flatten it
pub async fn fetch(state: &AppState, input: &StudyDetailsInput) -> Result<NormalizedStudy, TrialsError> {
    let nct_id: NctId = input.nct_id.parse()?;
    let options = DetailOptions {
        include_eligibility_parsed: input.include_eligibility_parsed,
        fields: input.fields.clone(),
    };

    tracing::info!(nct_id = %nct_id, parsed = options.include_eligibility_parsed, "Fetching study");

    let fields = options.fields.as_deref().unwrap_or_default();
    let raw = state.registry.study(&nct_id, fields).await?;

    Ok(to_study_detail(&raw, &options))
}
