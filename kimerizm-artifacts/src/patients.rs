//! Patient-list search, filtering and ordering.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use kimerizm_core::format::normalize_search_text;
use kimerizm_core::{Channel, PatientFeature, RiskDistribution, RiskLevel};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PatientSort {
    #[default]
    RiskDesc,
    RiskAsc,
    PatientAsc,
    PatientDesc,
    /// Last chimerism value, missing counted as 0.
    ChrDesc,
    ChrAsc,
}

/// List controls; an empty search and no risk level keep every patient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct PatientQuery {
    pub search: String,
    pub risk_level: Option<RiskLevel>,
    pub sort: PatientSort,
}

/// Applies search, risk filter and sort. Ties keep the artifact order.
pub fn query_patients<'a>(
    patients: &'a [PatientFeature],
    query: &PatientQuery,
) -> Vec<&'a PatientFeature> {
    let needle = normalize_search_text(query.search.trim());

    let mut rows: Vec<&PatientFeature> = patients
        .iter()
        .filter(|patient| {
            needle.is_empty() || normalize_search_text(&patient.patient_code).contains(&needle)
        })
        .filter(|patient| {
            query
                .risk_level
                .map_or(true, |level| patient.risk_level == level)
        })
        .collect();

    rows.sort_by(|a, b| compare(a, b, query.sort));
    rows
}

fn compare(a: &PatientFeature, b: &PatientFeature, sort: PatientSort) -> Ordering {
    let last_kmr = |patient: &PatientFeature| patient.last_value(Channel::Kmr).unwrap_or(0.0);
    match sort {
        PatientSort::RiskDesc => b.risk_score.total_cmp(&a.risk_score),
        PatientSort::RiskAsc => a.risk_score.total_cmp(&b.risk_score),
        PatientSort::PatientAsc => compare_codes(&a.patient_code, &b.patient_code),
        PatientSort::PatientDesc => compare_codes(&b.patient_code, &a.patient_code),
        PatientSort::ChrDesc => last_kmr(b).total_cmp(&last_kmr(a)),
        PatientSort::ChrAsc => last_kmr(a).total_cmp(&last_kmr(b)),
    }
}

fn compare_codes(a: &str, b: &str) -> Ordering {
    normalize_search_text(a)
        .cmp(&normalize_search_text(b))
        .then_with(|| a.cmp(b))
}

/// Patients per risk level.
pub fn risk_distribution(patients: &[PatientFeature]) -> RiskDistribution {
    patients
        .iter()
        .fold(RiskDistribution::default(), |mut distribution, patient| {
            distribution.record(patient.risk_level);
            distribution
        })
}
