//! Translation of structured search options into registry query parameters

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::vocabulary::{InterventionType, SponsorType, Vocabulary};

/// Registry page size used when the caller does not set one
pub const REGISTRY_PAGE_SIZE: u32 = 100;

/// Biological sex requirement
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
    All,
}

/// Place name and/or coordinates with a radius in miles
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub distance: Option<f64>,
}

impl Location {
    /// Origin coordinates, when both are present
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Biomarker {
    pub name: String,
    pub status: Option<String>,
}

impl Biomarker {
    fn term(&self, name: &str) -> String {
        match &self.status {
            Some(status) => format!("{} {}", name, status),
            None => name.to_string(),
        }
    }
}

/// Caller-facing search criteria. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchOptions {
    pub conditions: Option<Vec<String>>,
    pub keywords: Option<Vec<String>>,
    pub location: Option<Location>,
    pub age: Option<u32>,
    pub sex: Option<Sex>,
    pub biomarkers: Option<Vec<Biomarker>>,
    pub interventions: Option<Vec<String>>,
    pub phases: Option<Vec<String>>,
    #[serde(default)]
    pub recruiting_only: bool,
    #[serde(default)]
    pub expanded_access_only: bool,
    pub sponsor_types: Option<Vec<SponsorType>>,
    pub specific_sponsors: Option<Vec<String>>,
}

impl SearchOptions {
    /// Origin coordinates for distance calculation
    pub fn origin(&self) -> Option<(f64, f64)> {
        self.location.as_ref().and_then(Location::coordinates)
    }

    /// A radius was given but there is no origin to measure it from
    pub fn radius_ignored(&self) -> bool {
        self.location
            .as_ref()
            .is_some_and(|l| l.distance.is_some() && l.coordinates().is_none())
    }
}

/// Recruitment statuses accepted by `filter.overallStatus`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverallStatus {
    Recruiting,
    NotYetRecruiting,
}

impl OverallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverallStatus::Recruiting => "RECRUITING",
            OverallStatus::NotYetRecruiting => "NOT_YET_RECRUITING",
        }
    }
}

/// Study types accepted by `filter.studyType`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StudyType {
    Interventional,
    Observational,
    ExpandedAccess,
}

impl StudyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StudyType::Interventional => "INTERVENTIONAL",
            StudyType::Observational => "OBSERVATIONAL",
            StudyType::ExpandedAccess => "EXPANDED_ACCESS",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Flat parameter set understood by the registry's `/studies` endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegistryQueryParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub status: Vec<OverallStatus>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub phase: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub study_type: Vec<StudyType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub intervention_type: Vec<InterventionType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sponsor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nct_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advanced_filter: Option<String>,
    pub page_size: u32,
    pub page_number: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
}

/// Build registry parameters from search options.
///
/// Never fails: unknown phases pass through upper-cased, unknown
/// interventions contribute no category, and empty inputs leave the
/// corresponding parameter unset.
pub fn build_search_params(options: &SearchOptions, vocab: &Vocabulary) -> RegistryQueryParams {
    let mut params = RegistryQueryParams {
        page_size: REGISTRY_PAGE_SIZE,
        page_number: 1,
        ..Default::default()
    };

    if let Some(conditions) = non_empty(&options.conditions) {
        params.condition = Some(condition_query(conditions, vocab));
    }

    let mut terms: Vec<String> = Vec::new();
    if let Some(keywords) = non_empty(&options.keywords) {
        terms.extend(keywords.iter().cloned());
    }
    if let Some(biomarkers) = non_empty(&options.biomarkers) {
        terms.extend(biomarkers.iter().map(|b| b.term(&b.name)));
    }
    if !terms.is_empty() {
        params.query = Some(terms.join(" OR "));
    }

    if let Some(location) = &options.location {
        match (location.latitude, location.longitude, location.distance) {
            (Some(lat), Some(lon), Some(radius)) => {
                params.location = Some(format!("distance({},{},{}mi)", lat, lon, radius));
                params.distance = Some(format!("{}mi", radius));
            }
            // A radius without coordinates is dropped; see `radius_ignored`.
            _ => {
                let place = [&location.city, &location.state, &location.country]
                    .into_iter()
                    .flatten()
                    .filter(|part| !part.is_empty())
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                if !place.is_empty() {
                    params.location = Some(place);
                }
            }
        }
    }

    if options.recruiting_only {
        params.status = vec![OverallStatus::Recruiting, OverallStatus::NotYetRecruiting];
    }

    if options.expanded_access_only {
        params.study_type = vec![StudyType::ExpandedAccess];
    }

    if let Some(phases) = non_empty(&options.phases) {
        params.phase = phases.iter().map(|p| vocab.normalize_phase(p)).collect();
    }

    if let Some(interventions) = non_empty(&options.interventions) {
        let kinds: BTreeSet<InterventionType> = interventions
            .iter()
            .flat_map(|i| vocab.intervention_types(i))
            .collect();
        params.intervention_type = kinds.into_iter().collect();
    }

    if options.sponsor_types.is_some() || options.specific_sponsors.is_some() {
        params.sponsor = sponsor_query(
            options.sponsor_types.as_deref().unwrap_or_default(),
            options.specific_sponsors.as_deref().unwrap_or_default(),
            vocab,
        );
    }

    params.advanced_filter = advanced_filter(options.sex, options.age);

    params
}

fn non_empty<T>(values: &Option<Vec<T>>) -> Option<&[T]> {
    values.as_deref().filter(|v| !v.is_empty())
}

/// Each condition followed by its variations, joined with `OR`
fn condition_query(conditions: &[String], vocab: &Vocabulary) -> String {
    let mut expanded = Vec::new();
    for condition in conditions {
        expanded.push(condition.clone());
        expanded.extend(vocab.condition_variations(condition));
    }
    expanded.join(" OR ")
}

fn sponsor_query(
    types: &[SponsorType],
    specific: &[String],
    vocab: &Vocabulary,
) -> Option<String> {
    let mut sponsors: Vec<String> = specific.to_vec();
    for sponsor_type in types {
        sponsors.extend(vocab.sponsor_names(*sponsor_type).iter().cloned());
    }
    if sponsors.is_empty() {
        None
    } else {
        Some(sponsors.join(" OR "))
    }
}

/// Essie `AREA[]` expression for sex and age eligibility
fn advanced_filter(sex: Option<Sex>, age: Option<u32>) -> Option<String> {
    let mut parts = Vec::new();
    match sex {
        Some(Sex::Male) => parts.push("AREA[Sex](MALE OR ALL)".to_string()),
        Some(Sex::Female) => parts.push("AREA[Sex](FEMALE OR ALL)".to_string()),
        Some(Sex::All) | None => {}
    }
    if let Some(age) = age {
        parts.push(format!(
            "AREA[MinimumAge]RANGE[MIN, {age} years] AND AREA[MaximumAge]RANGE[{age} years, MAX]"
        ));
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" AND "))
    }
}

/// Biomarker search term with known aliases expanded.
///
/// `HER2 positive` becomes `HER2 positive OR ERBB2 positive OR ...`.
pub fn build_biomarker_query(biomarkers: &[Biomarker], vocab: &Vocabulary) -> String {
    biomarkers
        .iter()
        .flat_map(|biomarker| {
            std::iter::once(biomarker.name.as_str())
                .chain(vocab.biomarker_aliases(&biomarker.name).iter().map(String::as_str))
                .map(|name| biomarker.term(name))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>()
        .join(" OR ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(options: &SearchOptions) -> RegistryQueryParams {
        build_search_params(options, &Vocabulary::new())
    }

    fn strings(items: &[&str]) -> Option<Vec<String>> {
        Some(items.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn empty_options_only_set_paging() {
        let params = build(&SearchOptions::default());
        assert_eq!(params.page_size, REGISTRY_PAGE_SIZE);
        assert_eq!(params.page_number, 1);
        assert!(params.query.is_none());
        assert!(params.condition.is_none());
        assert!(params.location.is_none());
        assert!(params.status.is_empty());
        assert!(params.phase.is_empty());
        assert!(params.sponsor.is_none());
        assert!(params.advanced_filter.is_none());
    }

    #[test]
    fn lung_cancer_condition_is_expanded() {
        let params = build(&SearchOptions {
            conditions: strings(&["lung cancer"]),
            ..Default::default()
        });
        let condition = params.condition.unwrap();
        assert!(condition.contains("lung cancer"));
        assert!(condition.contains("NSCLC"));
        assert_eq!(
            condition,
            "lung cancer OR NSCLC OR SCLC OR non-small cell lung OR small cell lung"
        );
    }

    #[test]
    fn conditions_across_inputs_share_one_term() {
        let params = build(&SearchOptions {
            conditions: strings(&["colorectal cancer", "multiple myeloma"]),
            ..Default::default()
        });
        assert_eq!(
            params.condition.unwrap(),
            "colorectal cancer OR colon OR rectal OR CRC OR multiple myeloma OR MM"
        );
    }

    #[test]
    fn keywords_and_biomarkers_form_query_term() {
        let params = build(&SearchOptions {
            keywords: strings(&["immunotherapy"]),
            biomarkers: Some(vec![
                Biomarker {
                    name: "HER2".to_string(),
                    status: Some("positive".to_string()),
                },
                Biomarker {
                    name: "KRAS".to_string(),
                    status: None,
                },
            ]),
            ..Default::default()
        });
        assert_eq!(
            params.query.unwrap(),
            "immunotherapy OR HER2 positive OR KRAS"
        );
        assert!(params.condition.is_none());
    }

    #[test]
    fn coordinates_with_radius_use_distance_function() {
        let params = build(&SearchOptions {
            location: Some(Location {
                city: Some("Boston".to_string()),
                latitude: Some(42.3601),
                longitude: Some(-71.0589),
                distance: Some(50.0),
                ..Default::default()
            }),
            ..Default::default()
        });
        assert_eq!(
            params.location.as_deref(),
            Some("distance(42.3601,-71.0589,50mi)")
        );
        assert_eq!(params.distance.as_deref(), Some("50mi"));
    }

    #[test]
    fn place_name_when_coordinates_incomplete() {
        let params = build(&SearchOptions {
            location: Some(Location {
                city: Some("Boston".to_string()),
                state: Some("MA".to_string()),
                country: Some("United States".to_string()),
                latitude: Some(42.3601),
                ..Default::default()
            }),
            ..Default::default()
        });
        assert_eq!(params.location.as_deref(), Some("Boston, MA, United States"));
        assert!(params.distance.is_none());
    }

    #[test]
    fn radius_without_coordinates_is_dropped() {
        let params = build(&SearchOptions {
            location: Some(Location {
                distance: Some(25.0),
                ..Default::default()
            }),
            ..Default::default()
        });
        assert!(params.location.is_none());
        assert!(params.distance.is_none());
    }

    #[test]
    fn radius_ignored_only_without_full_coordinates() {
        let with = |location: Location| SearchOptions {
            location: Some(location),
            ..Default::default()
        };

        assert!(with(Location { distance: Some(25.0), ..Default::default() }).radius_ignored());
        assert!(
            with(Location {
                latitude: Some(40.7),
                distance: Some(25.0),
                ..Default::default()
            })
            .radius_ignored()
        );
        assert!(
            !with(Location {
                latitude: Some(40.7),
                longitude: Some(-74.0),
                distance: Some(25.0),
                ..Default::default()
            })
            .radius_ignored()
        );
        assert!(!with(Location { city: Some("Boston".into()), ..Default::default() }).radius_ignored());
        assert!(!SearchOptions::default().radius_ignored());
    }

    #[test]
    fn recruiting_only_sets_open_statuses() {
        let params = build(&SearchOptions {
            recruiting_only: true,
            ..Default::default()
        });
        assert_eq!(
            params.status,
            vec![OverallStatus::Recruiting, OverallStatus::NotYetRecruiting]
        );
    }

    #[test]
    fn phases_are_normalized() {
        let params = build(&SearchOptions {
            phases: strings(&["phase 2", "PHASE II", "2", "pilot"]),
            ..Default::default()
        });
        assert_eq!(params.phase, vec!["PHASE2", "PHASE2", "PHASE2", "PILOT"]);
    }

    #[test]
    fn interventions_collapse_into_a_set() {
        let params = build(&SearchOptions {
            interventions: strings(&["antibody drug conjugate", "chemotherapy", "cancer vaccine"]),
            ..Default::default()
        });
        assert_eq!(
            params.intervention_type,
            vec![InterventionType::Drug, InterventionType::Biological]
        );
    }

    #[test]
    fn sponsors_combine_specific_and_typed_names() {
        let params = build(&SearchOptions {
            sponsor_types: Some(vec![SponsorType::Nih, SponsorType::Other]),
            specific_sponsors: strings(&["Dana-Farber"]),
            ..Default::default()
        });
        assert_eq!(
            params.sponsor.as_deref(),
            Some("Dana-Farber OR National Cancer Institute OR National Institutes of Health")
        );
    }

    #[test]
    fn other_sponsor_type_alone_leaves_sponsor_unset() {
        let params = build(&SearchOptions {
            sponsor_types: Some(vec![SponsorType::Other]),
            ..Default::default()
        });
        assert!(params.sponsor.is_none());
    }

    #[test]
    fn expanded_access_sets_study_type() {
        let params = build(&SearchOptions {
            expanded_access_only: true,
            ..Default::default()
        });
        assert_eq!(params.study_type, vec![StudyType::ExpandedAccess]);
    }

    #[test]
    fn sex_and_age_become_advanced_filter() {
        let params = build(&SearchOptions {
            sex: Some(Sex::Female),
            age: Some(45),
            ..Default::default()
        });
        assert_eq!(
            params.advanced_filter.as_deref(),
            Some(
                "AREA[Sex](FEMALE OR ALL) AND AREA[MinimumAge]RANGE[MIN, 45 years] AND AREA[MaximumAge]RANGE[45 years, MAX]"
            )
        );

        let params = build(&SearchOptions {
            sex: Some(Sex::All),
            ..Default::default()
        });
        assert!(params.advanced_filter.is_none());
    }

    #[test]
    fn biomarker_query_expands_aliases() {
        let vocab = Vocabulary::new();
        let query = build_biomarker_query(
            &[
                Biomarker {
                    name: "EGFR".to_string(),
                    status: Some("mutated".to_string()),
                },
                Biomarker {
                    name: "CDK4".to_string(),
                    status: None,
                },
            ],
            &vocab,
        );
        assert_eq!(
            query,
            "EGFR mutated OR ERBB1 mutated OR HER1 mutated OR CDK4"
        );
    }

    #[test]
    fn options_deserialize_from_camel_case() {
        let options: SearchOptions = serde_json::from_value(serde_json::json!({
            "conditions": ["breast cancer"],
            "recruitingOnly": true,
            "sponsorTypes": ["industry"],
            "sex": "female",
            "location": {"latitude": 40.7, "longitude": -74.0}
        }))
        .unwrap();
        assert!(options.recruiting_only);
        assert!(!options.expanded_access_only);
        assert_eq!(options.sponsor_types, Some(vec![SponsorType::Industry]));
        assert_eq!(options.origin(), Some((40.7, -74.0)));
    }
}
