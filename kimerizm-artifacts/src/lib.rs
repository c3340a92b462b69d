//! Static JSON artifacts to dashboard view models.
//!
//! Parsing entry points come in `_str` and `_value` pairs. Everything above
//! parsing (dashboard assembly, list queries, exports) works on the typed
//! records from `kimerizm-core`.

use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use kimerizm_core::{
    ChannelOverview, CohortTrajectory, DashboardError, DataSummary, LabCohortTrajectory,
    PatientFeatures, PatientRecord, ReferenceBand,
};

mod dashboard;
mod export;
mod overview;
mod patients;

pub use dashboard::{build_dashboard, DashboardSources, PatientDashboard};
pub use export::{export_csv, export_print_html, report_file_name, CSV_HEADERS};
pub use overview::{cohort_overview, ChannelCompleteness, CohortOverview, RiskShare};
pub use patients::{query_patients, risk_distribution, PatientQuery, PatientSort};

/// Every artifact the backend publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    ReferenceBand,
    PatientFeatures,
    DataSummary,
    Patient,
    ChannelOverview,
    CohortTrajectory,
    LabCohortTrajectory,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 7] = [
        ArtifactKind::ReferenceBand,
        ArtifactKind::PatientFeatures,
        ArtifactKind::DataSummary,
        ArtifactKind::Patient,
        ArtifactKind::ChannelOverview,
        ArtifactKind::CohortTrajectory,
        ArtifactKind::LabCohortTrajectory,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ArtifactKind::ReferenceBand => "reference_band",
            ArtifactKind::PatientFeatures => "patient_features",
            ArtifactKind::DataSummary => "data_summary",
            ArtifactKind::Patient => "patient",
            ArtifactKind::ChannelOverview => "channel_overview",
            ArtifactKind::CohortTrajectory => "cohort_trajectory",
            ArtifactKind::LabCohortTrajectory => "cohort_trajectory_lab",
        }
    }

    /// Path relative to the artifact root. Only [`ArtifactKind::Patient`]
    /// takes a patient id; it fails with `MissingData` without one.
    pub fn path(self, patient_id: Option<&str>) -> Result<String, DashboardError> {
        match self {
            ArtifactKind::Patient => {
                let id = patient_id
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .ok_or(DashboardError::MissingData)?;
                Ok(format!("/patients/{id}.json"))
            }
            other => Ok(format!("/{}.json", other.name())),
        }
    }

    /// Path prefixed with the deployment base path.
    pub fn url(self, base_path: &str, patient_id: Option<&str>) -> Result<String, DashboardError> {
        let path = self.path(patient_id)?;
        Ok(format!("{}{path}", base_path.trim_end_matches('/')))
    }

    /// How long a fetched copy may be served before refetching.
    pub fn stale_after(self) -> Duration {
        match self {
            ArtifactKind::PatientFeatures | ArtifactKind::Patient => Duration::minutes(2),
            _ => Duration::minutes(5),
        }
    }

    /// Whether a missing file stands for an empty artifact rather than an error.
    pub fn optional(self) -> bool {
        self == ArtifactKind::LabCohortTrajectory
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ArtifactKind {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().trim_start_matches('/').trim_end_matches(".json");
        ArtifactKind::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| DashboardError::UnknownArtifact(s.to_string()))
    }
}

fn read_str(kind: ArtifactKind, json: &str) -> Result<Value, DashboardError> {
    serde_json::from_str(json).map_err(|err| DashboardError::Parse(format!("{kind}: {err}")))
}

fn parse_str<T: DeserializeOwned>(kind: ArtifactKind, json: &str) -> Result<T, DashboardError> {
    parse_value(kind, &read_str(kind, json)?)
}

fn parse_value<T: DeserializeOwned>(kind: ArtifactKind, value: &Value) -> Result<T, DashboardError> {
    if !value.is_object() {
        return Err(DashboardError::Parse(format!(
            "{kind}: expected a JSON object"
        )));
    }
    let parsed = T::deserialize(value).map_err(|err| DashboardError::Parse(format!("{kind}: {err}")))?;
    tracing::debug!(artifact = %kind, "parsed artifact");
    Ok(parsed)
}

/// Parse `/patients/{id}.json`.
pub fn parse_patient_str(json: &str) -> Result<PatientRecord, DashboardError> {
    parse_str(ArtifactKind::Patient, json)
}

pub fn parse_patient_value(value: &Value) -> Result<PatientRecord, DashboardError> {
    parse_value(ArtifactKind::Patient, value)
}

pub fn parse_reference_band_str(json: &str) -> Result<ReferenceBand, DashboardError> {
    parse_str(ArtifactKind::ReferenceBand, json)
}

pub fn parse_reference_band_value(value: &Value) -> Result<ReferenceBand, DashboardError> {
    parse_value(ArtifactKind::ReferenceBand, value)
}

pub fn parse_cohort_str(json: &str) -> Result<CohortTrajectory, DashboardError> {
    parse_str(ArtifactKind::CohortTrajectory, json)
}

pub fn parse_cohort_value(value: &Value) -> Result<CohortTrajectory, DashboardError> {
    parse_value(ArtifactKind::CohortTrajectory, value)
}

/// Parse the lab cohort trajectory. `None` (the file was not published)
/// yields an empty trajectory.
pub fn parse_lab_cohort_str(json: Option<&str>) -> Result<LabCohortTrajectory, DashboardError> {
    match json {
        Some(json) => parse_str(ArtifactKind::LabCohortTrajectory, json),
        None => {
            tracing::debug!("lab cohort trajectory not published, using an empty one");
            Ok(LabCohortTrajectory::default())
        }
    }
}

pub fn parse_lab_cohort_value(value: &Value) -> Result<LabCohortTrajectory, DashboardError> {
    parse_value(ArtifactKind::LabCohortTrajectory, value)
}

pub fn parse_patient_features_str(json: &str) -> Result<PatientFeatures, DashboardError> {
    parse_str(ArtifactKind::PatientFeatures, json)
}

pub fn parse_patient_features_value(value: &Value) -> Result<PatientFeatures, DashboardError> {
    parse_value(ArtifactKind::PatientFeatures, value)
}

pub fn parse_data_summary_str(json: &str) -> Result<DataSummary, DashboardError> {
    parse_data_summary_value(&read_str(ArtifactKind::DataSummary, json)?)
}

/// Parse `/data_summary.json`. A risk distribution that does not add up to
/// the patient total is logged, not rejected.
pub fn parse_data_summary_value(value: &Value) -> Result<DataSummary, DashboardError> {
    let summary: DataSummary = parse_value(ArtifactKind::DataSummary, value)?;
    let classified = summary.risk_distribution.total();
    if classified != summary.totals.n_patients {
        tracing::warn!(
            classified,
            n_patients = summary.totals.n_patients,
            "risk distribution does not cover every patient"
        );
    }
    Ok(summary)
}

pub fn parse_channel_overview_str(json: &str) -> Result<ChannelOverview, DashboardError> {
    parse_str(ArtifactKind::ChannelOverview, json)
}

pub fn parse_channel_overview_value(value: &Value) -> Result<ChannelOverview, DashboardError> {
    parse_value(ArtifactKind::ChannelOverview, value)
}
