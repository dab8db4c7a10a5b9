//! Flattening of raw registry records into stable output shapes

pub mod detail;
pub mod search;

use serde::{Deserialize, Serialize};

use crate::eligibility::ParsedCriteria;
use crate::study;

pub use detail::{DetailOptions, NormalizedStudy, to_study_detail};
pub use search::{NormalizedTrial, to_trial_list};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SponsorInfo {
    pub name: String,
    pub class: String,
}

impl From<&study::Sponsor> for SponsorInfo {
    fn from(sponsor: &study::Sponsor) -> Self {
        Self {
            name: sponsor.name.clone(),
            class: sponsor.class.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InterventionInfo {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub intervention_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arm_group_labels: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_names: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Eligibility {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub criteria: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub healthy_volunteers: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_age: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_age: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub std_ages: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsed_criteria: Option<ParsedCriteria>,
}

impl From<&study::EligibilityModule> for Eligibility {
    fn from(module: &study::EligibilityModule) -> Self {
        Self {
            criteria: module.eligibility_criteria.clone(),
            healthy_volunteers: module.healthy_volunteers,
            sex: module.sex.clone(),
            minimum_age: module.minimum_age.clone(),
            maximum_age: module.maximum_age.clone(),
            std_ages: module.std_ages.clone(),
            parsed_criteria: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Enrollment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub enrollment_type: Option<String>,
}

impl From<&study::EnrollmentInfo> for Enrollment {
    fn from(info: &study::EnrollmentInfo) -> Self {
        Self {
            count: info.count,
            enrollment_type: info.enrollment_type.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_ext: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl From<&study::Contact> for ContactInfo {
    fn from(contact: &study::Contact) -> Self {
        Self {
            name: contact.name.clone(),
            role: contact.role.clone(),
            phone: contact.phone.clone(),
            phone_ext: contact.phone_ext.clone(),
            email: contact.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StudyUrls {
    pub clinical_trials_gov: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results_url: Option<String>,
}

fn map_all<T, U>(items: Option<&Vec<T>>, f: impl Fn(&T) -> U) -> Option<Vec<U>> {
    items.map(|items| items.iter().map(f).collect())
}
