//! Reference bands and cohort trajectories produced by the backend.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

use crate::reindex::SeriesPoint;
use crate::Channel;

/// Provenance block shared by the statistical artifacts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ArtifactMetadata {
    #[serde(deserialize_with = "lenient_timestamp")]
    pub created_at: Option<NaiveDateTime>,
    pub schema_version: Option<String>,
    pub cohort_definition: Option<String>,
    pub improved_cohort_size: Option<u32>,
    pub improved_patients: Vec<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub n_patients: Option<u32>,
    pub n_time_points: Option<u32>,
    pub model: Option<String>,
}

/// Population statistic of one channel at one timepoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BandPoint {
    #[serde(default)]
    pub time_key: Option<String>,
    #[serde(default)]
    pub time_order: Option<u32>,
    pub median: f64,
    pub p25: f64,
    pub p75: f64,
    #[serde(default)]
    pub n_samples: Option<u32>,
    #[serde(default)]
    pub mean: Option<f64>,
    #[serde(default)]
    pub std: Option<f64>,
    #[serde(default)]
    pub p2_5: Option<f64>,
    #[serde(default)]
    pub p97_5: Option<f64>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

impl SeriesPoint for BandPoint {
    fn time_key(&self) -> Option<&str> {
        self.time_key.as_deref()
    }

    fn time_order(&self) -> Option<u32> {
        self.time_order
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ChannelBands {
    pub kmr: Vec<BandPoint>,
    pub kre: Vec<BandPoint>,
    pub gfr: Vec<BandPoint>,
}

impl ChannelBands {
    pub fn get(&self, channel: Channel) -> &[BandPoint] {
        match channel {
            Channel::Kmr => &self.kmr,
            Channel::Kre => &self.kre,
            Channel::Gfr => &self.gfr,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ReportedKmrThresholds {
    pub normal_lt: Option<f64>,
    pub dikkat_0_5_to_2: Option<bool>,
    pub kritik_2_to_5: Option<bool>,
    pub cok_kritik_gt: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ReportedKreThresholds {
    pub very_good_lt: Option<f64>,
    pub very_bad_gt: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ReportedGfrThresholds {
    pub very_good_ge: Option<f64>,
    pub very_bad_le: Option<f64>,
}

/// Threshold block echoed by the reference-band artifact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ReportedThresholds {
    pub kmr: ReportedKmrThresholds,
    pub kre: ReportedKreThresholds,
    pub gfr: ReportedGfrThresholds,
}

/// Normal envelope derived from the improved cohort.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ReferenceBand {
    pub metadata: ArtifactMetadata,
    pub bands: ChannelBands,
    pub clinical_thresholds: Option<ReportedThresholds>,
}

/// Expected KMR course of the improved cohort at one order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct CohortPoint {
    pub time_key: String,
    pub time_order: u32,
    pub pseudo_days: Option<f64>,
    pub expected_kmr: Option<f64>,
    pub cohort_mean: Option<f64>,
    pub cohort_median: Option<f64>,
    pub cohort_std: Option<f64>,
    pub bound_lower: Option<f64>,
    pub bound_upper: Option<f64>,
    pub iqr_lower: Option<f64>,
    pub iqr_upper: Option<f64>,
    pub ae_error: Option<f64>,
}

impl SeriesPoint for CohortPoint {
    fn time_key(&self) -> Option<&str> {
        Some(&self.time_key)
    }

    fn time_order(&self) -> Option<u32> {
        Some(self.time_order)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct CohortSummary {
    pub initial_kmr_median: Option<f64>,
    pub final_kmr_median: Option<f64>,
    pub reduction_percent: Option<f64>,
    pub time_to_stable: Option<String>,
}

/// "Similar patients" overlay for the KMR chart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct CohortTrajectory {
    pub metadata: ArtifactMetadata,
    pub trajectory: Vec<CohortPoint>,
    pub summary: CohortSummary,
}

/// Expected KRE/GFR course of the improved cohort at one lab timepoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct LabCohortPoint {
    pub time_key: String,
    pub time_order: u32,
    pub pseudo_days: Option<f64>,
    pub expected_kre: Option<f64>,
    pub expected_gfr: Option<f64>,
    pub cohort_kre_mean: Option<f64>,
    pub cohort_kre_median: Option<f64>,
    pub cohort_gfr_mean: Option<f64>,
    pub cohort_gfr_median: Option<f64>,
    pub bound_kre_lower: Option<f64>,
    pub bound_kre_upper: Option<f64>,
    pub bound_gfr_lower: Option<f64>,
    pub bound_gfr_upper: Option<f64>,
    pub iqr_kre_lower: Option<f64>,
    pub iqr_kre_upper: Option<f64>,
    pub iqr_gfr_lower: Option<f64>,
    pub iqr_gfr_upper: Option<f64>,
    pub ae_kre_error: Option<f64>,
    pub ae_gfr_error: Option<f64>,
}

impl LabCohortPoint {
    /// Expected lab value; KMR is not part of the lab cohort.
    pub fn expected(&self, channel: Channel) -> Option<f64> {
        match channel {
            Channel::Kmr => None,
            Channel::Kre => self.expected_kre,
            Channel::Gfr => self.expected_gfr,
        }
    }
}

impl SeriesPoint for LabCohortPoint {
    fn time_key(&self) -> Option<&str> {
        Some(&self.time_key)
    }

    fn time_order(&self) -> Option<u32> {
        Some(self.time_order)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct LabCohortSummary {
    pub initial_kre_median: Option<f64>,
    pub final_kre_median: Option<f64>,
    pub initial_gfr_median: Option<f64>,
    pub final_gfr_median: Option<f64>,
}

/// "Similar patients" overlay for the KRE/GFR chart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct LabCohortTrajectory {
    pub metadata: ArtifactMetadata,
    pub trajectory: Vec<LabCohortPoint>,
    pub summary: LabCohortSummary,
}

impl LabCohortTrajectory {
    /// True when at least one point carries an expected value for the channel.
    pub fn has_channel(&self, channel: Channel) -> bool {
        self.trajectory
            .iter()
            .any(|point| point.expected(channel).is_some())
    }
}

// Python writes naive ISO timestamps; anything unparseable is treated as absent.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|text| {
        text.parse::<NaiveDateTime>()
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(&text).ok().map(|dt| dt.naive_utc()))
    }))
}
