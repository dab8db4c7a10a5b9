//! Single-study detail view

use serde::{Deserialize, Serialize};

use super::search::date;
use super::{ContactInfo, Eligibility, Enrollment, InterventionInfo, SponsorInfo, StudyUrls, map_all};
use crate::eligibility::parse_criteria;
use crate::study::{self, RawStudy};

/// Options that shape a detail response
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DetailOptions {
    #[serde(default)]
    pub include_eligibility_parsed: bool,
    /// Registry field list; consumed by the registry request, not here
    pub fields: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedStudy {
    pub nct_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub official_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acronym: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<OrganizationInfo>,

    pub status: StatusInfo,
    pub sponsor: SponsorDetail,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Description>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design: Option<Design>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arms: Option<Vec<Arm>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interventions: Option<Vec<InterventionInfo>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eligibility: Option<Eligibility>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcomes: Option<Outcomes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<SiteDetail>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub central_contacts: Option<Vec<ContactInfo>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_officials: Option<Vec<OfficialInfo>>,

    pub urls: StudyUrls,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_results: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_update_submit_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatusInfo {
    pub overall_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_verified_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_expanded_access: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_completion_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub study_first_post_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_update_post_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SponsorDetail {
    pub lead_sponsor: SponsorInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collaborators: Option<Vec<SponsorInfo>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsible_party: Option<ResponsiblePartyInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResponsiblePartyInfo {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub party_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub investigator_full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub investigator_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub investigator_affiliation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Description {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brief_summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detailed_description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Design {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub study_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phases: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allocation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intervention_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_purpose: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub masking: Option<Masking>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrollment: Option<Enrollment>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Masking {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub masking: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub who_masked: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Arm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub arm_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intervention_names: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Outcomes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary: Option<Vec<OutcomeInfo>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary: Option<Vec<OutcomeInfo>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measure: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_frame: Option<String>,
}

/// A trial site with its coordinates and every listed contact
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SiteDetail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facility: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contacts: Option<Vec<ContactInfo>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OfficialInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Flatten one raw study into the detail shape
pub fn to_study_detail(raw: &RawStudy, options: &DetailOptions) -> NormalizedStudy {
    let protocol = &raw.protocol_section;
    let identification = &protocol.identification_module;
    let status = &protocol.status_module;
    let sponsor = &protocol.sponsor_collaborators_module;
    let arms = protocol.arms_interventions_module.as_ref();
    let contacts = protocol.contacts_locations_module.as_ref();

    let eligibility = protocol.eligibility_module.as_ref().map(|module| {
        let mut eligibility = Eligibility::from(module);
        if options.include_eligibility_parsed {
            eligibility.parsed_criteria = module.eligibility_criteria.as_deref().map(parse_criteria);
        }
        eligibility
    });

    let has_results = raw.has_results.unwrap_or(false);

    NormalizedStudy {
        nct_id: identification.nct_id.clone(),
        title: identification.brief_title.clone(),
        official_title: identification.official_title.clone(),
        acronym: identification.acronym.clone(),
        organization: identification.organization.as_ref().map(|o| OrganizationInfo {
            full_name: o.full_name.clone(),
            class: o.class.clone(),
        }),

        status: StatusInfo {
            overall_status: status.overall_status.clone(),
            status_verified_date: status.status_verified_date.clone(),
            has_expanded_access: status
                .expanded_access_info
                .as_ref()
                .and_then(|e| e.has_expanded_access),
            start_date: date(&status.start_date_struct),
            primary_completion_date: date(&status.primary_completion_date_struct),
            completion_date: date(&status.completion_date_struct),
            study_first_post_date: date(&status.study_first_post_date_struct),
            last_update_post_date: date(&status.last_update_post_date_struct),
        },

        sponsor: SponsorDetail {
            lead_sponsor: SponsorInfo::from(&sponsor.lead_sponsor),
            collaborators: map_all(sponsor.collaborators.as_ref(), |c| SponsorInfo::from(c)),
            responsible_party: sponsor.responsible_party.as_ref().map(|p| ResponsiblePartyInfo {
                party_type: p.party_type.clone(),
                investigator_full_name: p.investigator_full_name.clone(),
                investigator_title: p.investigator_title.clone(),
                investigator_affiliation: p.investigator_affiliation.clone(),
            }),
        },

        description: protocol.description_module.as_ref().map(|d| Description {
            brief_summary: d.brief_summary.clone(),
            detailed_description: d.detailed_description.clone(),
        }),
        conditions: protocol
            .conditions_module
            .as_ref()
            .and_then(|c| c.conditions.clone()),
        keywords: protocol
            .conditions_module
            .as_ref()
            .and_then(|c| c.keywords.clone()),
        design: protocol.design_module.as_ref().map(to_design),

        arms: map_all(arms.and_then(|a| a.arm_groups.as_ref()), |arm| Arm {
            label: arm.label.clone(),
            arm_type: arm.arm_type.clone(),
            description: arm.description.clone(),
            intervention_names: arm.intervention_names.clone(),
        }),
        interventions: map_all(arms.and_then(|a| a.interventions.as_ref()), |i| {
            InterventionInfo {
                intervention_type: i.intervention_type.clone(),
                name: i.name.clone(),
                description: i.description.clone(),
                arm_group_labels: i.arm_group_labels.clone(),
                other_names: i.other_names.clone(),
            }
        }),

        eligibility,

        outcomes: protocol.outcomes_module.as_ref().map(|o| Outcomes {
            primary: map_all(o.primary_outcomes.as_ref(), to_outcome),
            secondary: map_all(o.secondary_outcomes.as_ref(), to_outcome),
        }),

        locations: map_all(contacts.and_then(|c| c.locations.as_ref()), to_site),
        central_contacts: map_all(contacts.and_then(|c| c.central_contacts.as_ref()), |c| {
            ContactInfo::from(c)
        }),
        overall_officials: map_all(contacts.and_then(|c| c.overall_officials.as_ref()), |o| {
            OfficialInfo {
                name: o.name.clone(),
                affiliation: o.affiliation.clone(),
                role: o.role.clone(),
            }
        }),

        urls: StudyUrls {
            clinical_trials_gov: study::study_url(&identification.nct_id),
            results_url: has_results.then(|| study::results_url(&identification.nct_id)),
        },
        has_results: raw.has_results,
        last_update_submit_date: status.last_update_submit_date.clone(),
    }
}

fn to_design(design: &study::DesignModule) -> Design {
    let info = design.design_info.as_ref();
    Design {
        study_type: design.study_type.clone(),
        phases: design.phases.clone(),
        allocation: info.and_then(|i| i.allocation.clone()),
        intervention_model: info.and_then(|i| i.intervention_model.clone()),
        primary_purpose: info.and_then(|i| i.primary_purpose.clone()),
        masking: info.and_then(|i| i.masking_info.as_ref()).map(|m| Masking {
            masking: m.masking.clone(),
            who_masked: m.who_masked.clone(),
        }),
        enrollment: design.enrollment_info.as_ref().map(Enrollment::from),
    }
}

fn to_outcome(outcome: &study::Outcome) -> OutcomeInfo {
    OutcomeInfo {
        measure: outcome.measure.clone(),
        description: outcome.description.clone(),
        time_frame: outcome.time_frame.clone(),
    }
}

fn to_site(location: &study::StudyLocation) -> SiteDetail {
    SiteDetail {
        facility: location.facility.clone(),
        status: location.status.clone(),
        city: location.city.clone(),
        state: location.state.clone(),
        zip: location.zip.clone(),
        country: location.country.clone(),
        coordinates: location.geo_point.map(|p| Coordinates {
            latitude: p.lat,
            longitude: p.lon,
        }),
        contacts: map_all(location.contacts.as_ref(), |c| ContactInfo::from(c)),
    }
}
