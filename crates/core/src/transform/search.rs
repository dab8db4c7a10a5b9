//! Search result rows

use serde::{Deserialize, Serialize};

use super::{ContactInfo, Eligibility, Enrollment, InterventionInfo, SponsorInfo, StudyUrls, map_all};
use crate::geo::distance_miles;
use crate::query::SearchOptions;
use crate::study::{self, RawStudy};

/// One trial in a search response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedTrial {
    pub nct_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub official_title: Option<String>,
    pub status: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub study_type: Option<String>,
    pub conditions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interventions: Option<Vec<InterventionInfo>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub brief_summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detailed_description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub eligibility: Option<Eligibility>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrollment: Option<Enrollment>,

    pub sponsor: SponsorInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collaborators: Option<Vec<SponsorInfo>>,

    pub locations: Vec<TrialLocation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_completion_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_update_date: Option<String>,

    pub urls: StudyUrls,
}

/// A trial site with its distance from the caller and first listed contact
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrialLocation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facility: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Miles from the search origin
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<ContactInfo>,
}

/// Flatten raw studies into search rows, in registry order
pub fn to_trial_list(studies: &[RawStudy], options: &SearchOptions) -> Vec<NormalizedTrial> {
    let origin = options.origin();
    studies.iter().map(|s| to_trial(s, origin)).collect()
}

fn to_trial(raw: &RawStudy, origin: Option<(f64, f64)>) -> NormalizedTrial {
    let protocol = &raw.protocol_section;
    let identification = &protocol.identification_module;
    let status = &protocol.status_module;
    let sponsor = &protocol.sponsor_collaborators_module;
    let description = protocol.description_module.as_ref();
    let design = protocol.design_module.as_ref();

    let mut locations: Vec<TrialLocation> = protocol
        .contacts_locations_module
        .as_ref()
        .and_then(|m| m.locations.as_ref())
        .map(|locs| locs.iter().map(|l| to_location(l, origin)).collect())
        .unwrap_or_default();

    if origin.is_some() {
        // Stable, so equally distant sites keep registry order
        locations.sort_by_key(|l| l.distance.unwrap_or(u32::MAX));
    }

    NormalizedTrial {
        nct_id: identification.nct_id.clone(),
        title: identification.brief_title.clone(),
        official_title: identification.official_title.clone(),
        status: status.overall_status.clone(),

        phase: design.and_then(|d| d.phases.clone()),
        study_type: design.and_then(|d| d.study_type.clone()),
        conditions: protocol
            .conditions_module
            .as_ref()
            .and_then(|c| c.conditions.clone())
            .unwrap_or_default(),
        interventions: map_all(
            protocol
                .arms_interventions_module
                .as_ref()
                .and_then(|a| a.interventions.as_ref()),
            |i| InterventionInfo {
                intervention_type: i.intervention_type.clone(),
                name: i.name.clone(),
                description: i.description.clone(),
                ..Default::default()
            },
        ),

        brief_summary: description.and_then(|d| d.brief_summary.clone()),
        detailed_description: description.and_then(|d| d.detailed_description.clone()),

        eligibility: protocol.eligibility_module.as_ref().map(Eligibility::from),
        enrollment: design
            .and_then(|d| d.enrollment_info.as_ref())
            .map(Enrollment::from),

        sponsor: SponsorInfo::from(&sponsor.lead_sponsor),
        collaborators: map_all(sponsor.collaborators.as_ref(), |c| SponsorInfo::from(c)),

        locations,

        start_date: date(&status.start_date_struct),
        primary_completion_date: date(&status.primary_completion_date_struct),
        completion_date: date(&status.completion_date_struct),
        last_update_date: date(&status.last_update_post_date_struct),

        urls: StudyUrls {
            clinical_trials_gov: study::study_url(&identification.nct_id),
            results_url: None,
        },
    }
}

fn to_location(location: &study::StudyLocation, origin: Option<(f64, f64)>) -> TrialLocation {
    let distance = match (origin, location.geo_point) {
        (Some((lat, lon)), Some(point)) => Some(distance_miles(lat, lon, point.lat, point.lon)),
        _ => None,
    };

    let contact = location
        .contacts
        .as_ref()
        .and_then(|contacts| contacts.first())
        .map(|c| ContactInfo {
            name: c.name.clone(),
            phone: c.phone.clone(),
            email: c.email.clone(),
            ..Default::default()
        });

    TrialLocation {
        facility: location.facility.clone(),
        city: location.city.clone(),
        state: location.state.clone(),
        zip: location.zip.clone(),
        country: location.country.clone(),
        status: location.status.clone(),
        distance,
        contact,
    }
}

pub(super) fn date(value: &Option<study::DateStruct>) -> Option<String> {
    value.as_ref().map(|d| d.date.clone())
}
