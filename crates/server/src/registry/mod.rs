//! ClinicalTrials.gov registry access

pub mod client;

pub use client::{DEFAULT_FIELDS, DETAIL_FIELDS, RegistryClient, StudiesPage};
