//! Integration tests for the trials server.
//!
//! Each test starts a stub registry on an ephemeral local port, points the
//! server at it and exercises the HTTP endpoints through the Axum router.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    body::Body,
    extract::{Path, Query},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use http_body_util::BodyExt;
use serde_json::{Value as JsonValue, json};
use tower::ServiceExt;

use trials_server::config::Config;

// ---------------------------------------------------------------------------
// Stub registry
// ---------------------------------------------------------------------------

/// Canned registry answer
#[derive(Clone)]
struct Reply {
    status: StatusCode,
    body: JsonValue,
    retry_after: Option<&'static str>,
}

impl Reply {
    fn ok(body: JsonValue) -> Self {
        Self {
            status: StatusCode::OK,
            body,
            retry_after: None,
        }
    }

    fn status(status: StatusCode) -> Self {
        Self {
            status,
            body: json!({"error": status.as_u16()}),
            retry_after: None,
        }
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.body)).into_response();
        if let Some(value) = self.retry_after {
            response
                .headers_mut()
                .insert("retry-after", value.parse().unwrap());
        }
        response
    }
}

struct StubRegistry {
    base_url: String,
    /// Query strings received on `/studies`
    searches: Arc<Mutex<Vec<HashMap<String, String>>>>,
    /// Identifiers requested on `/studies/{id}`
    lookups: Arc<Mutex<Vec<String>>>,
}

impl StubRegistry {
    fn last_search(&self) -> HashMap<String, String> {
        self.searches.lock().unwrap().last().cloned().expect("no search received")
    }
}

async fn start_registry(search: Reply, study: Reply) -> StubRegistry {
    let searches: Arc<Mutex<Vec<HashMap<String, String>>>> = Arc::default();
    let lookups: Arc<Mutex<Vec<String>>> = Arc::default();

    let seen_searches = searches.clone();
    let seen_lookups = lookups.clone();

    let router = Router::new()
        .route(
            "/studies",
            get(move |Query(query): Query<HashMap<String, String>>| {
                seen_searches.lock().unwrap().push(query);
                let reply = search.clone();
                async move { reply }
            }),
        )
        .route(
            "/studies/{id}",
            get(move |Path(id): Path<String>| {
                seen_lookups.lock().unwrap().push(id);
                let reply = study.clone();
                async move { reply }
            }),
        )
        .route(
            "/version",
            get(|| async { Json(json!({"apiVersion": "2.0.0", "dataTimestamp": "2024-06-01"})) }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub registry");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    StubRegistry {
        base_url: format!("http://{}", addr),
        searches,
        lookups,
    }
}

/// Base URL of a port that nothing listens on
async fn unreachable_registry() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn test_config(registry_base_url: &str) -> Config {
    Config {
        bind_address: "0.0.0.0:0".to_string(),
        registry_base_url: registry_base_url.to_string(),
        registry_timeout_secs: 5,
        rate_limit_rps: 1000,
        cors_origins: vec!["*".to_string()],
    }
}

/// Build the app router pointed at the given registry.
fn test_app(registry_base_url: &str) -> Router {
    trials_server::build_app(&test_config(registry_base_url)).expect("Failed to build app")
}

/// Send a request to the app and return (status, body as JSON).
async fn request(app: &Router, req: Request<Body>) -> (StatusCode, JsonValue) {
    let response = app.clone().oneshot(req).await.expect("Request failed");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();

    let body = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null)
    };

    (status, body)
}

fn get_req(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Build a POST request with JSON body.
fn post(uri: &str, body: JsonValue) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

/// Registry record with two geocoded sites and one without coordinates.
fn sample_study(nct_id: &str) -> JsonValue {
    json!({
        "protocolSection": {
            "identificationModule": {"nctId": nct_id, "briefTitle": "HER2+ Breast Cancer Study"},
            "statusModule": {
                "overallStatus": "RECRUITING",
                "startDateStruct": {"date": "2023-01-15", "type": "ACTUAL"}
            },
            "sponsorCollaboratorsModule": {
                "leadSponsor": {"name": "National Cancer Institute", "class": "NIH"}
            },
            "conditionsModule": {"conditions": ["Breast Cancer"]},
            "designModule": {"studyType": "INTERVENTIONAL", "phases": ["PHASE2"]},
            "eligibilityModule": {
                "eligibilityCriteria": "Inclusion Criteria:\n* HER2-positive disease\n* Age 18 or older\nExclusion Criteria:\n* Pregnant",
                "sex": "FEMALE"
            },
            "contactsLocationsModule": {
                "locations": [
                    {"facility": "Los Angeles Medical Center", "city": "Los Angeles",
                     "geoPoint": {"lat": 34.0522, "lon": -118.2437}},
                    {"facility": "Remote Clinic", "city": "Unknown"},
                    {"facility": "Boston Hospital", "city": "Boston",
                     "geoPoint": {"lat": 42.3601, "lon": -71.0589},
                     "contacts": [{"name": "Alice Smith", "phone": "617-555-0199"}]}
                ]
            }
        },
        "hasResults": false
    })
}

// ---------------------------------------------------------------------------
// Tests: search_trials
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_search_no_results() {
    let registry = start_registry(
        Reply::ok(json!({"studies": [], "totalCount": 0})),
        Reply::status(StatusCode::NOT_FOUND),
    )
    .await;
    let app = test_app(&registry.base_url);

    let (status, body) = request(
        &app,
        post(
            "/tools/search_trials",
            json!({
                "conditions": ["breast cancer"],
                "phases": ["2", "3"],
                "recruitingOnly": true
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["totalCount"], 0);
    assert_eq!(body["trials"], json!([]));
    assert_eq!(body["pageSize"], 20);
    assert_eq!(body["pageNumber"], 1);
    assert_eq!(
        body["searchMetadata"]["warnings"],
        json!(["No trials found matching your criteria. Consider broadening your search."])
    );
    assert_eq!(body["pagination"]["hasNextPage"], false);

    let query = registry.last_search();
    assert_eq!(query["format"], "json");
    assert_eq!(query["pageSize"], "20");
    assert_eq!(query["countTotal"], "true");
    assert!(query["query.cond"].starts_with("breast cancer OR mammary"));
    assert_eq!(query["filter.overallStatus"], "RECRUITING,NOT_YET_RECRUITING");
    assert_eq!(query["filter.phase"], "PHASE2,PHASE3");
}

#[tokio::test]
async fn test_search_radius_without_coordinates() {
    let registry = start_registry(
        Reply::ok(json!({"studies": [], "totalCount": 0})),
        Reply::status(StatusCode::NOT_FOUND),
    )
    .await;
    let app = test_app(&registry.base_url);

    let (status, body) = request(
        &app,
        post("/tools/search_trials", json!({"location": {"distance": 25}})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let warnings = body["searchMetadata"]["warnings"].as_array().unwrap();
    assert_eq!(warnings.len(), 2);
    assert_eq!(
        warnings[1],
        "Search radius ignored: latitude and longitude are required for a distance search."
    );

    let query = registry.last_search();
    assert!(!query.contains_key("query.locn"));
}

#[tokio::test]
async fn test_search_sorts_sites_by_distance() {
    let registry = start_registry(
        Reply::ok(json!({"studies": [sample_study("NCT04000001")], "totalCount": 1})),
        Reply::status(StatusCode::NOT_FOUND),
    )
    .await;
    let app = test_app(&registry.base_url);

    let (status, body) = request(
        &app,
        post(
            "/tools/search_trials",
            json!({
                "conditions": ["breast cancer"],
                "location": {"latitude": 40.7128, "longitude": -74.0060, "distance": 500},
                "recruitingOnly": true,
                "phases": ["2"]
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["totalCount"], 1);

    let locations = body["trials"][0]["locations"].as_array().unwrap();
    assert_eq!(locations[0]["facility"], "Boston Hospital");
    assert_eq!(locations[0]["distance"], 190);
    assert_eq!(locations[0]["contact"]["name"], "Alice Smith");
    assert_eq!(locations[1]["facility"], "Los Angeles Medical Center");
    assert_eq!(locations[2]["facility"], "Remote Clinic");
    assert!(locations[2].get("distance").is_none());

    assert_eq!(
        body["searchMetadata"]["warnings"][0],
        "Limited trials found. Consider removing some filters or expanding search radius."
    );
    assert_eq!(body["pagination"]["totalPages"], 1);

    let query = registry.last_search();
    assert_eq!(query["query.locn"], "distance(40.7128,-74.006,500mi)");
    assert_eq!(query["filter.overallStatus"], "RECRUITING,NOT_YET_RECRUITING");
    assert_eq!(query["filter.phase"], "PHASE2");
}

#[tokio::test]
async fn test_search_registry_unavailable() {
    let registry = start_registry(
        Reply::status(StatusCode::SERVICE_UNAVAILABLE),
        Reply::status(StatusCode::NOT_FOUND),
    )
    .await;
    let app = test_app(&registry.base_url);

    let (status, body) = request(
        &app,
        post("/tools/search_trials", json!({"conditions": ["lung cancer"]})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["errorCode"], "API_ERROR");
    assert_eq!(body["error"], "ClinicalTrials.gov API is temporarily unavailable");
    assert_eq!(
        body["searchMetadata"]["warnings"][0],
        "Search failed: ClinicalTrials.gov API is temporarily unavailable"
    );
    assert_eq!(body["trials"], json!([]));
}

#[tokio::test]
async fn test_search_registry_rate_limited() {
    let registry = start_registry(
        Reply {
            status: StatusCode::TOO_MANY_REQUESTS,
            body: json!({}),
            retry_after: Some("30"),
        },
        Reply::status(StatusCode::NOT_FOUND),
    )
    .await;
    let app = test_app(&registry.base_url);

    let (status, body) = request(&app, post("/tools/search_trials", json!({}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["errorCode"], "RATE_LIMIT");
}

#[tokio::test]
async fn test_search_rejects_page_size() {
    let app = test_app(&unreachable_registry().await);

    let (status, body) = request(
        &app,
        post("/tools/search_trials", json!({"pageSize": 500})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["errorCode"], "VALIDATION");
}

#[tokio::test]
async fn test_search_malformed_body() {
    let app = test_app(&unreachable_registry().await);

    let req = Request::builder()
        .method("POST")
        .uri("/tools/search_trials")
        .header("Content-Type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = request(&app, req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["errorCode"], "VALIDATION");
}

// ---------------------------------------------------------------------------
// Tests: get_study_details
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_details_not_found() {
    let registry = start_registry(
        Reply::ok(json!({"studies": []})),
        Reply::status(StatusCode::NOT_FOUND),
    )
    .await;
    let app = test_app(&registry.base_url);

    let (status, body) = request(
        &app,
        post("/tools/get_study_details", json!({"nctId": "NCT12345678"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["errorCode"], "NOT_FOUND");
    assert_eq!(body["error"], "Study NCT12345678 not found");
}

#[tokio::test]
async fn test_details_invalid_id_skips_registry() {
    let registry = start_registry(
        Reply::ok(json!({"studies": []})),
        Reply::ok(sample_study("NCT04000001")),
    )
    .await;
    let app = test_app(&registry.base_url);

    let (status, body) = request(
        &app,
        post("/tools/get_study_details", json!({"nctId": "12345"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["errorCode"], "VALIDATION");
    assert!(registry.lookups.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_details_registry_unreachable() {
    let app = test_app(&unreachable_registry().await);

    let (status, body) = request(
        &app,
        post("/tools/get_study_details", json!({"nctId": "NCT12345678"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["errorCode"], "NETWORK");
}

#[tokio::test]
async fn test_details_with_parsed_eligibility() {
    let registry = start_registry(
        Reply::ok(json!({"studies": []})),
        Reply::ok(json!({"studies": [sample_study("NCT04000001")]})),
    )
    .await;
    let app = test_app(&registry.base_url);

    let (status, body) = request(
        &app,
        post(
            "/tools/get_study_details",
            json!({"nctId": "nct04000001", "includeEligibilityParsed": true}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let study = &body["study"];
    assert_eq!(study["nctId"], "NCT04000001");
    assert_eq!(study["sponsor"]["leadSponsor"]["class"], "NIH");
    assert_eq!(
        study["eligibility"]["parsedCriteria"]["inclusion"],
        json!(["* HER2-positive disease", "* Age 18 or older"])
    );
    assert_eq!(study["eligibility"]["parsedCriteria"]["exclusion"], json!(["* Pregnant"]));
    assert_eq!(
        study["urls"]["clinicalTrialsGov"],
        "https://clinicaltrials.gov/study/NCT04000001"
    );
    assert!(study["urls"].get("resultsUrl").is_none());
    assert_eq!(study["locations"][2]["coordinates"]["latitude"], 42.3601);

    assert_eq!(registry.lookups.lock().unwrap().as_slice(), ["NCT04000001"]);
}

#[tokio::test]
async fn test_details_accepts_bare_study() {
    let registry = start_registry(
        Reply::ok(json!({"studies": []})),
        Reply::ok(sample_study("NCT04000002")),
    )
    .await;
    let app = test_app(&registry.base_url);

    let (_, body) = request(
        &app,
        post("/tools/get_study_details", json!({"nctId": "NCT04000002"})),
    )
    .await;

    assert_eq!(body["success"], true);
    assert_eq!(body["study"]["title"], "HER2+ Breast Cancer Study");
    assert!(body["study"]["eligibility"].get("parsedCriteria").is_none());
}

#[tokio::test]
async fn test_details_empty_wrapper_is_not_found() {
    let registry = start_registry(
        Reply::ok(json!({"studies": []})),
        Reply::ok(json!({"studies": []})),
    )
    .await;
    let app = test_app(&registry.base_url);

    let (_, body) = request(
        &app,
        post("/tools/get_study_details", json!({"nctId": "NCT04000003"})),
    )
    .await;

    assert_eq!(body["success"], false);
    assert_eq!(body["errorCode"], "NOT_FOUND");
}

// ---------------------------------------------------------------------------
// Tests: direct study route
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_direct_route_statuses() {
    let registry = start_registry(
        Reply::ok(json!({"studies": []})),
        Reply::status(StatusCode::NOT_FOUND),
    )
    .await;
    let app = test_app(&registry.base_url);

    let (status, body) = request(&app, get_req("/api/studies/NCT12345678")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["errorCode"], "NOT_FOUND");

    let (status, body) = request(&app, get_req("/api/studies/not-an-id")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errorCode"], "VALIDATION");
}

#[tokio::test]
async fn test_direct_route_malformed_query() {
    let registry = start_registry(
        Reply::ok(json!({"studies": []})),
        Reply::ok(sample_study("NCT12345678")),
    )
    .await;
    let app = test_app(&registry.base_url);

    let (status, body) = request(
        &app,
        get_req("/api/studies/NCT12345678?includeEligibilityParsed=yes"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["errorCode"], "VALIDATION");
    assert!(body["error"].as_str().unwrap().starts_with("Invalid input: "));
    assert!(registry.lookups.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_direct_route_success() {
    let registry = start_registry(
        Reply::ok(json!({"studies": []})),
        Reply::ok(sample_study("NCT04000001")),
    )
    .await;
    let app = test_app(&registry.base_url);

    let (status, body) = request(
        &app,
        get_req("/api/studies/NCT04000001?includeEligibilityParsed=true&fields=NCTId,BriefTitle"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["study"]["eligibility"]["parsedCriteria"]["exclusion"][0], "* Pregnant");
}

#[tokio::test]
async fn test_direct_route_upstream_failure() {
    let registry = start_registry(
        Reply::ok(json!({"studies": []})),
        Reply::status(StatusCode::INTERNAL_SERVER_ERROR),
    )
    .await;
    let app = test_app(&registry.base_url);

    let (status, body) = request(&app, get_req("/api/studies/NCT12345678")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["errorCode"], "API_ERROR");
}

// ---------------------------------------------------------------------------
// Tests: service endpoints
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_health() {
    let registry = start_registry(
        Reply::ok(json!({"studies": []})),
        Reply::status(StatusCode::NOT_FOUND),
    )
    .await;
    let app = test_app(&registry.base_url);

    let (status, body) = request(&app, get_req("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_health_registry_down() {
    let app = test_app(&unreachable_registry().await);

    let (status, body) = request(&app, get_req("/health")).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unhealthy");
}

#[tokio::test]
async fn test_tool_catalogue() {
    let app = test_app(&unreachable_registry().await);

    let (status, body) = request(&app, get_req("/tools")).await;

    assert_eq!(status, StatusCode::OK);
    let tools = body["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 2);
    assert_eq!(tools[0]["name"], "search_trials");
    assert_eq!(tools[1]["inputSchema"]["required"], json!(["nctId"]));
}

#[tokio::test]
async fn test_request_id_header() {
    let app = test_app(&unreachable_registry().await);

    let req = Request::builder()
        .uri("/tools")
        .header("X-Request-ID", "abc-123")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "abc-123");

    let response = app.clone().oneshot(get_req("/tools")).await.unwrap();
    let generated = response.headers()["x-request-id"].to_str().unwrap();
    assert_eq!(generated.len(), 36);
}

#[tokio::test]
async fn test_rate_limit() {
    let base_url = unreachable_registry().await;
    let config = Config {
        rate_limit_rps: 1,
        ..test_config(&base_url)
    };
    let app = trials_server::build_app(&config).unwrap();

    let (status, _) = request(&app, get_req("/tools")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = request(&app, get_req("/tools")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["success"], false);
    assert_eq!(body["errorCode"], "RATE_LIMIT");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = test_app(&unreachable_registry().await);

    let (status, _) = request(&app, get_req("/metrics")).await;
    assert_eq!(status, StatusCode::OK);
}
