//! Tool handlers and their published catalogue

pub mod get_study_details;
pub mod search_trials;

use serde::Serialize;
use serde_json::{Value as JsonValue, json};

pub use get_study_details::StudyDetailsInput;
pub use search_trials::SearchTrialsInput;

/// Tool definition as advertised to callers
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub name: String,
    pub description: String,
    pub input_schema: JsonValue,
}

/// Both tools with their JSON input schemas
pub fn catalogue() -> Vec<Tool> {
    vec![
        Tool {
            name: "search_trials".to_string(),
            description: "Search ClinicalTrials.gov for trials matching conditions, location, \
                          biomarkers, phases and sponsors"
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {"type": "string", "description": "General search query terms"},
                    "conditions": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Medical conditions, e.g. [\"breast cancer\"]"
                    },
                    "keywords": {"type": "array", "items": {"type": "string"}},
                    "location": {
                        "type": "object",
                        "properties": {
                            "city": {"type": "string"},
                            "state": {"type": "string"},
                            "country": {"type": "string"},
                            "latitude": {"type": "number"},
                            "longitude": {"type": "number"},
                            "distance": {"type": "number", "description": "Search radius in miles"}
                        }
                    },
                    "age": {"type": "integer", "minimum": 0},
                    "sex": {"type": "string", "enum": ["male", "female", "all"]},
                    "biomarkers": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "name": {"type": "string", "description": "e.g. HER2, EGFR, PD-L1"},
                                "status": {"type": "string", "description": "e.g. positive, mutated"}
                            },
                            "required": ["name"]
                        }
                    },
                    "interventions": {"type": "array", "items": {"type": "string"}},
                    "phases": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Trial phases, e.g. [\"1\", \"phase 2\"]"
                    },
                    "recruitingOnly": {"type": "boolean", "default": false},
                    "expandedAccessOnly": {"type": "boolean", "default": false},
                    "sponsorTypes": {
                        "type": "array",
                        "items": {"type": "string", "enum": ["industry", "nih", "academic", "other"]}
                    },
                    "specificSponsors": {"type": "array", "items": {"type": "string"}},
                    "pageSize": {"type": "integer", "minimum": 1, "maximum": 100, "default": 20},
                    "pageNumber": {"type": "integer", "minimum": 1, "default": 1},
                    "pageToken": {"type": "string"},
                    "fields": {"type": "array", "items": {"type": "string"}},
                    "sortField": {"type": "string"},
                    "sortOrder": {"type": "string", "enum": ["asc", "desc"], "default": "desc"}
                }
            }),
        },
        Tool {
            name: "get_study_details".to_string(),
            description: "Get the full record of one trial by its NCT identifier".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "nctId": {
                        "type": "string",
                        "pattern": "^[Nn][Cc][Tt][0-9]{8}$",
                        "description": "ClinicalTrials.gov identifier, e.g. NCT12345678"
                    },
                    "fields": {"type": "array", "items": {"type": "string"}},
                    "includeEligibilityParsed": {"type": "boolean", "default": false}
                },
                "required": ["nctId"]
            }),
        },
    ]
}
