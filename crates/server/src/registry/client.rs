//! HTTP client for the ClinicalTrials.gov v2 API

use std::time::{Duration, Instant};

use reqwest::{StatusCode, header};
use serde::Deserialize;
use trials_core::{NctId, RawStudy, RegistryQueryParams, SortOrder, TrialsError};

/// Fields requested when the caller does not name any
pub const DEFAULT_FIELDS: &[&str] = &[
    "NCTId",
    "BriefTitle",
    "OfficialTitle",
    "OverallStatus",
    "Phase",
    "StudyType",
    "Condition",
    "InterventionType",
    "InterventionName",
    "BriefSummary",
    "DetailedDescription",
    "EligibilityCriteria",
    "HealthyVolunteers",
    "Sex",
    "MinimumAge",
    "MaximumAge",
    "StdAge",
    "EnrollmentCount",
    "EnrollmentType",
    "LeadSponsorName",
    "LeadSponsorClass",
    "LocationFacility",
    "LocationCity",
    "LocationState",
    "LocationZip",
    "LocationCountry",
    "LocationGeoPoint",
    "LocationStatus",
    "LocationContactName",
    "LocationContactRole",
    "LocationContactPhone",
    "LocationContactEMail",
    "StartDate",
    "PrimaryCompletionDate",
    "CompletionDate",
    "StudyFirstPostDate",
    "LastUpdatePostDate",
];

/// Extra fields requested by default for a single-study lookup
pub const DETAIL_FIELDS: &[&str] = &[
    "Acronym",
    "OrgFullName",
    "OrgClass",
    "StatusVerifiedDate",
    "HasExpandedAccess",
    "LastUpdateSubmitDate",
    "CollaboratorName",
    "CollaboratorClass",
    "ResponsiblePartyType",
    "ResponsiblePartyInvestigatorFullName",
    "ResponsiblePartyInvestigatorTitle",
    "ResponsiblePartyInvestigatorAffiliation",
    "Keyword",
    "DesignAllocation",
    "DesignInterventionModel",
    "DesignPrimaryPurpose",
    "DesignMasking",
    "DesignWhoMasked",
    "ArmGroupLabel",
    "ArmGroupType",
    "ArmGroupDescription",
    "ArmGroupInterventionName",
    "InterventionDescription",
    "InterventionArmGroupLabel",
    "InterventionOtherName",
    "PrimaryOutcomeMeasure",
    "PrimaryOutcomeDescription",
    "PrimaryOutcomeTimeFrame",
    "SecondaryOutcomeMeasure",
    "SecondaryOutcomeDescription",
    "SecondaryOutcomeTimeFrame",
    "CentralContactName",
    "CentralContactRole",
    "CentralContactPhone",
    "CentralContactPhoneExt",
    "CentralContactEMail",
    "OverallOfficialName",
    "OverallOfficialAffiliation",
    "OverallOfficialRole",
    "LocationContactPhoneExt",
    "HasResults",
];

const UNAVAILABLE_MESSAGE: &str = "ClinicalTrials.gov API is temporarily unavailable";

/// Client for the registry REST API
#[derive(Clone)]
pub struct RegistryClient {
    http: reqwest::Client,
    base_url: String,
}

/// One page of raw search results
#[derive(Debug, Clone)]
pub struct StudiesPage {
    pub studies: Vec<RawStudy>,
    pub total_count: u64,
    pub next_page_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StudiesResponse {
    #[serde(default)]
    studies: Vec<RawStudy>,
    total_count: Option<u64>,
    next_page_token: Option<String>,
}

/// `/studies/{id}` answers with either the study itself or a search-style wrapper
#[derive(Deserialize)]
#[serde(untagged)]
enum StudyResponse {
    Wrapped { studies: Vec<RawStudy> },
    Bare(Box<RawStudy>),
}

impl RegistryClient {
    /// Create a client for the given base URL with a per-request timeout
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(
                [(header::ACCEPT, header::HeaderValue::from_static("application/json"))]
                    .into_iter()
                    .collect(),
            )
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Search studies. A missing `totalCount` falls back to the page length.
    pub async fn search(&self, params: &RegistryQueryParams) -> Result<StudiesPage, TrialsError> {
        let pairs = search_query(params);
        tracing::debug!(query = ?pairs, "Registry search");

        let body = self
            .get("search", "/studies", &pairs, "Resource not found")
            .await?;

        let parsed: StudiesResponse = decode(&body)?;
        let total_count = parsed
            .total_count
            .unwrap_or(parsed.studies.len() as u64);

        tracing::info!(
            returned = parsed.studies.len(),
            total_count = total_count,
            "Registry search completed"
        );

        Ok(StudiesPage {
            studies: parsed.studies,
            total_count,
            next_page_token: parsed.next_page_token,
        })
    }

    /// Fetch a single study by identifier
    pub async fn study(&self, nct_id: &NctId, fields: &[String]) -> Result<RawStudy, TrialsError> {
        let pairs = vec![("format", "json".to_string()), ("fields", detail_field_list(fields))];
        let not_found = format!("Study {} not found", nct_id);

        let body = self
            .get("study", &format!("/studies/{}", nct_id), &pairs, &not_found)
            .await?;

        match decode::<StudyResponse>(&body)? {
            StudyResponse::Bare(study) => Ok(*study),
            StudyResponse::Wrapped { studies } => studies
                .into_iter()
                .next()
                .ok_or(TrialsError::NotFound(not_found)),
        }
    }

    /// Ping the registry's version endpoint
    pub async fn version(&self) -> Result<(), TrialsError> {
        self.get("version", "/version", &[], "Resource not found")
            .await
            .map(|_| ())
    }

    async fn get(
        &self,
        endpoint: &'static str,
        path: &str,
        query: &[(&str, String)],
        not_found: &str,
    ) -> Result<String, TrialsError> {
        let url = format!("{}{}", self.base_url, path);
        let start = Instant::now();

        let result = self.send(&url, query, not_found).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(err) => err.code().as_str(),
        };
        metrics::counter!(
            "registry_requests_total",
            "endpoint" => endpoint,
            "outcome" => outcome
        )
        .increment(1);
        metrics::histogram!("registry_request_duration_seconds", "endpoint" => endpoint)
            .record(start.elapsed().as_secs_f64());

        if let Err(err) = &result {
            tracing::warn!(
                endpoint = endpoint,
                error = %err,
                code = outcome,
                upstream_status = ?err.status(),
                "Registry request failed"
            );
        }

        result
    }

    async fn send(
        &self,
        url: &str,
        query: &[(&str, String)],
        not_found: &str,
    ) -> Result<String, TrialsError> {
        let response = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| TrialsError::Network(e.to_string()))?;

        let status = response.status();
        tracing::debug!(url = %url, status = status.as_u16(), "Registry response");

        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            return Err(status_error(status, retry_after, not_found));
        }

        response
            .text()
            .await
            .map_err(|e| TrialsError::Network(e.to_string()))
    }
}

/// Map a non-success registry status to the error taxonomy
fn status_error(status: StatusCode, retry_after: Option<String>, not_found: &str) -> TrialsError {
    match status {
        StatusCode::BAD_REQUEST => {
            TrialsError::Validation("registry rejected the request parameters".to_string())
        }
        StatusCode::NOT_FOUND => TrialsError::NotFound(not_found.to_string()),
        StatusCode::TOO_MANY_REQUESTS => TrialsError::RateLimited { retry_after },
        StatusCode::SERVICE_UNAVAILABLE => TrialsError::Api {
            status: status.as_u16(),
            message: UNAVAILABLE_MESSAGE.to_string(),
        },
        _ => TrialsError::Api {
            status: status.as_u16(),
            message: format!("Registry request failed with status {}", status.as_u16()),
        },
    }
}

fn decode<T: for<'de> Deserialize<'de>>(body: &str) -> Result<T, TrialsError> {
    serde_json::from_str(body)
        .map_err(|e| TrialsError::Unknown(format!("Unexpected registry response: {}", e)))
}

fn field_list(fields: &[String]) -> String {
    if fields.is_empty() {
        DEFAULT_FIELDS.join(",")
    } else {
        fields.join(",")
    }
}

/// Search defaults plus the sections only the detail view renders
fn detail_field_list(fields: &[String]) -> String {
    if fields.is_empty() {
        DEFAULT_FIELDS
            .iter()
            .chain(DETAIL_FIELDS)
            .copied()
            .collect::<Vec<_>>()
            .join(",")
    } else {
        fields.join(",")
    }
}

fn joined<T>(values: &[T], as_str: impl Fn(&T) -> &str) -> Option<String> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().map(as_str).collect::<Vec<_>>().join(","))
    }
}

/// Registry query string for `/studies`.
///
/// The page number is reported back to callers but never sent; the registry
/// pages with `pageToken` only. The distance term is already part of the
/// location expression.
fn search_query(params: &RegistryQueryParams) -> Vec<(&'static str, String)> {
    let mut pairs = vec![
        ("format", "json".to_string()),
        ("pageSize", params.page_size.to_string()),
    ];

    let optional = [
        ("query.term", params.query.clone()),
        ("query.cond", params.condition.clone()),
        ("query.locn", params.location.clone()),
        ("filter.overallStatus", joined(&params.status, |s| s.as_str())),
        ("filter.phase", joined(&params.phase, |p| p.as_str())),
        ("filter.studyType", joined(&params.study_type, |t| t.as_str())),
        (
            "filter.interventionType",
            joined(&params.intervention_type, |i| i.as_str()),
        ),
        ("filter.lead", params.sponsor.clone()),
        ("filter.ids", params.nct_id.clone()),
        ("filter.advanced", params.advanced_filter.clone()),
    ];
    pairs.extend(
        optional
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key, v))),
    );

    pairs.push(("fields", field_list(&params.fields)));

    if let Some(token) = &params.page_token {
        pairs.push(("pageToken", token.clone()));
    }
    if let Some(field) = &params.sort_field {
        let order = params.sort_order.unwrap_or(SortOrder::Asc);
        pairs.push(("sort", format!("{}:{}", field, order.as_str())));
    }

    pairs.push(("countTotal", "true".to_string()));
    pairs
}
