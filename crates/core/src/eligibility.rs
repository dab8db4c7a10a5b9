//! Line-oriented segmentation of eligibility criteria text

use serde::{Deserialize, Serialize};

/// Criteria lines split by section
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParsedCriteria {
    pub inclusion: Vec<String>,
    pub exclusion: Vec<String>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Inclusion,
    Exclusion,
}

/// Split criteria text into inclusion and exclusion lines.
///
/// Heading lines switch the current section and are dropped. Lines seen
/// before any heading count as inclusion criteria.
pub fn parse_criteria(criteria: &str) -> ParsedCriteria {
    let mut parsed = ParsedCriteria::default();
    let mut section = Section::None;

    for line in criteria.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let lower = line.to_lowercase();

        if lower.contains("inclusion criteria") || lower.contains("eligibility criteria") {
            section = Section::Inclusion;
            continue;
        }
        if lower.contains("exclusion criteria") {
            section = Section::Exclusion;
            continue;
        }

        // Headers and stray bullets
        if line.chars().count() < 3 || line.ends_with(':') {
            continue;
        }

        match section {
            Section::Exclusion => parsed.exclusion.push(line.to_string()),
            Section::Inclusion | Section::None => parsed.inclusion.push(line.to_string()),
        }
    }

    parsed
}
