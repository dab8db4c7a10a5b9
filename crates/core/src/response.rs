//! Tool response envelopes
//!
//! Both tools answer with `success` plus either a payload or an
//! `error`/`errorCode` pair. Failures are values here, never panics.

use serde::{Deserialize, Serialize};

use crate::error::{ErrorCode, TrialsError};
use crate::query::RegistryQueryParams;
use crate::transform::{NormalizedStudy, NormalizedTrial};

pub const NO_RESULTS_WARNING: &str =
    "No trials found matching your criteria. Consider broadening your search.";
pub const FEW_RESULTS_WARNING: &str =
    "Limited trials found. Consider removing some filters or expanding search radius.";
pub const RADIUS_IGNORED_WARNING: &str =
    "Search radius ignored: latitude and longitude are required for a distance search.";

/// Below this many results the caller is nudged to widen the search
const FEW_RESULTS_THRESHOLD: u64 = 5;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchMetadata {
    /// Milliseconds spent handling the request
    pub execution_time: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<RegistryQueryParams>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub total_pages: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_page_number: Option<u32>,
}

impl Pagination {
    pub fn new(total_count: u64, page_number: u32, page_size: u32, has_cursor: bool) -> Self {
        let total_pages = total_count.div_ceil(u64::from(page_size.max(1)));
        let has_next_page = has_cursor || u64::from(page_number) < total_pages;
        let has_previous_page = page_number > 1;

        Self {
            has_next_page,
            has_previous_page,
            total_pages,
            next_page_number: has_next_page.then(|| page_number.saturating_add(1)),
            previous_page_number: has_previous_page.then(|| page_number - 1),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchTrialsOutput {
    pub success: bool,
    pub total_count: u64,
    pub page_number: u32,
    pub page_size: u32,
    pub trials: Vec<NormalizedTrial>,
    pub search_metadata: SearchMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
}

/// One page of successful search results, before wrapping
#[derive(Debug, Clone)]
pub struct SearchPage {
    pub trials: Vec<NormalizedTrial>,
    pub total_count: u64,
    pub next_page_token: Option<String>,
}

impl SearchTrialsOutput {
    pub fn success(
        page: SearchPage,
        page_number: u32,
        page_size: u32,
        query: RegistryQueryParams,
        execution_time: u64,
    ) -> Self {
        let pagination = Pagination::new(
            page.total_count,
            page_number,
            page_size,
            page.next_page_token.is_some(),
        );

        Self {
            success: true,
            total_count: page.total_count,
            page_number,
            page_size,
            trials: page.trials,
            search_metadata: SearchMetadata {
                execution_time,
                query: Some(query),
                warnings: result_warnings(page.total_count),
            },
            pagination: Some(pagination),
            next_page_token: page.next_page_token,
            error: None,
            error_code: None,
        }
    }

    pub fn failure(err: &TrialsError, page_number: u32, page_size: u32, execution_time: u64) -> Self {
        let record = err.to_record();
        Self {
            success: false,
            total_count: 0,
            page_number,
            page_size,
            trials: Vec::new(),
            search_metadata: SearchMetadata {
                execution_time,
                query: None,
                warnings: vec![format!("Search failed: {}", record.message)],
            },
            pagination: None,
            next_page_token: None,
            error: Some(record.message),
            error_code: Some(record.code),
        }
    }
}

/// Advisory warnings keyed off the registry's total count
pub fn result_warnings(total_count: u64) -> Vec<String> {
    match total_count {
        0 => vec![NO_RESULTS_WARNING.to_string()],
        n if n < FEW_RESULTS_THRESHOLD => vec![FEW_RESULTS_WARNING.to_string()],
        _ => Vec::new(),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StudyDetailsOutput {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub study: Option<NormalizedStudy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
}

impl StudyDetailsOutput {
    pub fn success(study: NormalizedStudy) -> Self {
        Self {
            success: true,
            study: Some(study),
            error: None,
            error_code: None,
        }
    }

    pub fn failure(err: &TrialsError) -> Self {
        let record = err.to_record();
        Self {
            success: false,
            study: None,
            error: Some(record.message),
            error_code: Some(record.code),
        }
    }
}
