//! trials-core: ClinicalTrials.gov query building and record normalization
//!
//! This crate holds the pure half of the trials service: vocabulary tables,
//! translation of search options into registry parameters, the raw registry
//! record types and their flattening into stable output shapes.

pub mod eligibility;
pub mod error;
pub mod geo;
pub mod nct_id;
pub mod query;
pub mod response;
pub mod study;
pub mod transform;
pub mod vocabulary;

pub use eligibility::{ParsedCriteria, parse_criteria};
pub use error::{ErrorCode, ErrorRecord, TrialsError};
pub use geo::distance_miles;
pub use nct_id::NctId;
pub use query::{
    Biomarker, Location, REGISTRY_PAGE_SIZE, RegistryQueryParams, SearchOptions, Sex, SortOrder,
    build_biomarker_query, build_search_params,
};
pub use response::{RADIUS_IGNORED_WARNING, SearchPage, SearchTrialsOutput, StudyDetailsOutput};
pub use study::RawStudy;
pub use transform::{DetailOptions, NormalizedStudy, NormalizedTrial, to_study_detail, to_trial_list};
pub use vocabulary::{InterventionType, SponsorType, Vocabulary};
