//! Lookup tables used to expand and normalize search input
//!
//! A [`Vocabulary`] is built once at startup and shared read-only by the
//! query builder and the request handlers.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Intervention categories accepted by `filter.interventionType`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InterventionType {
    Drug,
    Procedure,
    Radiation,
    Device,
    Behavioral,
    Biological,
}

impl InterventionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterventionType::Drug => "DRUG",
            InterventionType::Procedure => "PROCEDURE",
            InterventionType::Radiation => "RADIATION",
            InterventionType::Device => "DEVICE",
            InterventionType::Behavioral => "BEHAVIORAL",
            InterventionType::Biological => "BIOLOGICAL",
        }
    }
}

/// Sponsor categories a caller can ask for
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SponsorType {
    Industry,
    Nih,
    Academic,
    Other,
}

/// Variation terms added when a condition mentions `marker`
#[derive(Debug, Clone)]
pub struct ConditionFamily {
    pub marker: String,
    pub variations: Vec<String>,
}

/// Immutable vocabulary tables
#[derive(Debug, Clone)]
pub struct Vocabulary {
    /// Words that make a condition eligible for family expansion
    pub cancer_triggers: Vec<String>,
    /// Checked in order, first match wins
    pub condition_families: Vec<ConditionFamily>,
    /// Keyed by the whole lower-cased condition name
    pub condition_abbreviations: HashMap<String, Vec<String>>,
    /// Keyed by the upper-cased biomarker name
    pub biomarker_aliases: HashMap<String, Vec<String>>,
    /// Keyed by the lower-cased, trimmed phase name
    pub phases: HashMap<String, String>,
    pub intervention_keywords: Vec<(InterventionType, Vec<String>)>,
    pub sponsors: HashMap<SponsorType, Vec<String>>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn table(entries: &[(&str, &[&str])]) -> HashMap<String, Vec<String>> {
    entries
        .iter()
        .map(|(key, values)| (key.to_string(), strings(values)))
        .collect()
}

impl Vocabulary {
    /// Tables for ClinicalTrials.gov search terms
    pub fn new() -> Self {
        let condition_families = vec![
            ConditionFamily {
                marker: "lung".to_string(),
                variations: strings(&["NSCLC", "SCLC", "non-small cell lung", "small cell lung"]),
            },
            ConditionFamily {
                marker: "breast".to_string(),
                variations: strings(&["mammary", "TNBC", "triple negative breast"]),
            },
            ConditionFamily {
                marker: "colorectal".to_string(),
                variations: strings(&["colon", "rectal", "CRC"]),
            },
        ];

        let condition_abbreviations = table(&[
            ("acute myeloid leukemia", &["AML"]),
            ("chronic myeloid leukemia", &["CML"]),
            ("acute lymphoblastic leukemia", &["ALL"]),
            ("chronic lymphocytic leukemia", &["CLL"]),
            ("non-hodgkin lymphoma", &["NHL"]),
            ("multiple myeloma", &["MM"]),
            ("glioblastoma multiforme", &["GBM"]),
            ("hepatocellular carcinoma", &["HCC"]),
            ("renal cell carcinoma", &["RCC"]),
        ]);

        let biomarker_aliases = table(&[
            ("HER2", &["ERBB2", "HER-2", "HER2/neu"]),
            ("PD-L1", &["PDL1", "PD-L1", "CD274"]),
            ("PD-1", &["PD1", "PDCD1"]),
            ("EGFR", &["ERBB1", "HER1"]),
            ("ALK", &["ALK1", "CD246"]),
            ("ROS1", &["ROS-1"]),
            ("BRAF", &["B-RAF"]),
            ("KRAS", &["K-RAS"]),
            ("NRAS", &["N-RAS"]),
            ("MSI", &["MSI-H", "microsatellite instability"]),
            ("TMB", &["tumor mutational burden"]),
            ("BRCA1", &["BRCA-1"]),
            ("BRCA2", &["BRCA-2"]),
        ]);

        let phases = [
            ("0", "EARLY_PHASE1"),
            ("1", "PHASE1"),
            ("2", "PHASE2"),
            ("3", "PHASE3"),
            ("4", "PHASE4"),
            ("early", "EARLY_PHASE1"),
            ("early phase 1", "EARLY_PHASE1"),
            ("phase 0", "EARLY_PHASE1"),
            ("phase 1", "PHASE1"),
            ("phase 2", "PHASE2"),
            ("phase 3", "PHASE3"),
            ("phase 4", "PHASE4"),
            ("phase i", "PHASE1"),
            ("phase ii", "PHASE2"),
            ("phase iii", "PHASE3"),
            ("phase iv", "PHASE4"),
            ("n/a", "NA"),
            ("not applicable", "NA"),
        ]
        .iter()
        .map(|(name, code)| (name.to_string(), code.to_string()))
        .collect();

        let intervention_keywords = vec![
            (
                InterventionType::Drug,
                strings(&["drug", "medication", "chemotherapy", "antibody"]),
            ),
            (InterventionType::Procedure, strings(&["surgery", "surgical"])),
            (InterventionType::Radiation, strings(&["radiation", "radiotherapy"])),
            (InterventionType::Device, strings(&["device"])),
            (InterventionType::Behavioral, strings(&["behavioral", "counseling"])),
            (InterventionType::Biological, strings(&["vaccine", "immunotherapy"])),
        ];

        let mut sponsors = HashMap::new();
        sponsors.insert(
            SponsorType::Industry,
            strings(&["Pfizer", "Roche", "Novartis", "Merck", "AstraZeneca"]),
        );
        sponsors.insert(
            SponsorType::Nih,
            strings(&["National Cancer Institute", "National Institutes of Health"]),
        );
        sponsors.insert(
            SponsorType::Academic,
            strings(&["University", "Medical Center", "Hospital"]),
        );
        sponsors.insert(SponsorType::Other, Vec::new());

        Self {
            cancer_triggers: strings(&["cancer", "carcinoma"]),
            condition_families,
            condition_abbreviations,
            biomarker_aliases,
            phases,
            intervention_keywords,
            sponsors,
        }
    }

    /// Variation terms for one condition (the condition itself excluded)
    pub fn condition_variations(&self, condition: &str) -> Vec<String> {
        let lower = condition.to_lowercase();
        let mut variations = Vec::new();

        if self.cancer_triggers.iter().any(|t| lower.contains(t.as_str())) {
            if let Some(family) = self
                .condition_families
                .iter()
                .find(|f| lower.contains(f.marker.as_str()))
            {
                variations.extend(family.variations.iter().cloned());
            }
        }

        if let Some(abbrev) = self.condition_abbreviations.get(&lower) {
            variations.extend(abbrev.iter().cloned());
        }

        variations
    }

    /// Known aliases for a biomarker name, case-insensitive
    pub fn biomarker_aliases(&self, name: &str) -> &[String] {
        self.biomarker_aliases
            .get(&name.to_uppercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Canonical phase code; unknown input is upper-cased verbatim
    pub fn normalize_phase(&self, phase: &str) -> String {
        let key = phase.trim().to_lowercase();
        match self.phases.get(&key) {
            Some(code) => code.clone(),
            None => phase.to_uppercase(),
        }
    }

    /// Every category whose keywords appear in the intervention text
    pub fn intervention_types(&self, intervention: &str) -> Vec<InterventionType> {
        let lower = intervention.to_lowercase();
        self.intervention_keywords
            .iter()
            .filter(|(_, words)| words.iter().any(|w| lower.contains(w.as_str())))
            .map(|(kind, _)| *kind)
            .collect()
    }

    pub fn sponsor_names(&self, sponsor_type: SponsorType) -> &[String] {
        self.sponsors
            .get(&sponsor_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new()
    }
}
