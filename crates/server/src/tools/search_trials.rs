//! `search_trials` tool

use std::time::Instant;

use serde::Deserialize;
use trials_core::{
    RADIUS_IGNORED_WARNING, RegistryQueryParams, SearchOptions, SearchPage, SearchTrialsOutput,
    SortOrder, TrialsError, build_search_params, to_trial_list,
};

use crate::AppState;

pub const TOOL_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Search criteria plus paging and sorting overrides
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchTrialsInput {
    #[serde(flatten)]
    pub options: SearchOptions,
    pub query: Option<String>,
    pub page_size: Option<u32>,
    pub page_number: Option<u32>,
    pub page_token: Option<String>,
    pub fields: Option<Vec<String>>,
    pub sort_field: Option<String>,
    pub sort_order: Option<SortOrder>,
}

impl SearchTrialsInput {
    pub fn page_size(&self) -> u32 {
        self.page_size.unwrap_or(TOOL_PAGE_SIZE)
    }

    pub fn page_number(&self) -> u32 {
        self.page_number.unwrap_or(1)
    }

    fn validate(&self) -> Result<(), TrialsError> {
        let page_size = self.page_size();
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(TrialsError::Validation(format!(
                "pageSize must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, page_size
            )));
        }
        if self.page_number() == 0 {
            return Err(TrialsError::Validation("pageNumber must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Registry parameters: built from the options, then the direct overrides
    fn params(&self, state: &AppState) -> RegistryQueryParams {
        let mut params = build_search_params(&self.options, &state.vocabulary);

        if let Some(query) = self.query.as_ref().filter(|q| !q.is_empty()) {
            params.query = Some(query.clone());
        }
        params.page_size = self.page_size();
        params.page_number = self.page_number();
        params.page_token = self.page_token.clone();
        if let Some(fields) = &self.fields {
            params.fields = fields.clone();
        }
        if let Some(field) = &self.sort_field {
            params.sort_field = Some(field.clone());
            params.sort_order = Some(self.sort_order.unwrap_or_default());
        }

        params
    }
}

/// Run a search. Failures come back inside the envelope.
pub async fn run(state: &AppState, input: SearchTrialsInput) -> SearchTrialsOutput {
    let start = Instant::now();
    let page_number = input.page_number();
    let page_size = input.page_size();

    tracing::info!(
        conditions = ?input.options.conditions,
        location = ?input.options.location,
        biomarkers = ?input.options.biomarkers,
        phases = ?input.options.phases,
        "search_trials called"
    );

    match search(state, &input).await {
        Ok((page, params)) => {
            let mut output =
                SearchTrialsOutput::success(page, page_number, page_size, params, elapsed_ms(start));
            if input.options.radius_ignored() {
                tracing::debug!(location = ?input.options.location, "Radius without coordinates ignored");
                output
                    .search_metadata
                    .warnings
                    .push(RADIUS_IGNORED_WARNING.to_string());
            }
            output
        }
        Err(err) => {
            tracing::warn!(error = %err, code = err.code().as_str(), "search_trials failed");
            SearchTrialsOutput::failure(&err, page_number, page_size, elapsed_ms(start))
        }
    }
}

async fn search(
    state: &AppState,
    input: &SearchTrialsInput,
) -> Result<(SearchPage, RegistryQueryParams), TrialsError> {
    input.validate()?;
    let params = input.params(state);

    let page = state.registry.search(&params).await?;
    let trials = to_trial_list(&page.studies, &input.options);

    Ok((
        SearchPage {
            trials,
            total_count: page.total_count,
            next_page_token: page.next_page_token,
        },
        params,
    ))
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
