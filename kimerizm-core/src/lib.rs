//! Core data model and chart transformations for the chimerism dashboard.
//!
//! Everything in this crate is a pure function over immutable artifact data:
//! the unified time grid, band re-indexing, forecast splitting, pinned-point
//! projection and threshold classification.

use serde::{Deserialize, Deserializer, Serialize};

pub mod bands;
pub mod chart;
pub mod config;
pub mod format;
pub mod forecast;
pub mod grid;
pub mod notes;
pub mod pinned;
pub mod reindex;
pub mod severity;
pub mod stats;
pub mod summary;
pub mod time_keys;
pub mod view_state;

pub use bands::{
    ArtifactMetadata, BandPoint, ChannelBands, CohortPoint, CohortSummary, CohortTrajectory,
    LabCohortPoint, LabCohortSummary, LabCohortTrajectory, ReferenceBand, ReportedThresholds,
};
pub use chart::{compose_channel_chart, threshold_lines, ChannelChart, ChartInputs, ThresholdLine};
pub use config::{ClinicalThresholds, DashboardConfig};
pub use forecast::{
    channel_anchor, forecast_region, split_forecast, split_interval, BandPolygon, ForecastSplit,
    IntervalSplit,
};
pub use grid::{build_grid, build_grid_with, GridCell, TimelineGrid};
pub use notes::{clinical_notes, ClinicalNote, NoteContext, NoteFilter, NoteKind};
pub use pinned::{project, ChannelReading, NeighborPoint, PinnedPoint};
pub use reindex::{overlay, reindex, Aligned, KeyTranslation, SeriesPoint};
pub use severity::{classify, escalate_risk, Severity};
pub use stats::TimelineStats;
pub use summary::{
    ChannelCoverage, ChannelOverview, DataSummary, PatientFeature, PatientFeatures,
    RiskDistribution,
};
pub use time_keys::TimeKeyEntry;
pub use view_state::{ChannelLayers, Layer, LayerToggles, ViewAction, ViewState};

/// One of the three plotted clinical channels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Chimerism percentage.
    Kmr,
    /// Serum creatinine.
    Kre,
    /// Glomerular filtration rate.
    Gfr,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Kmr, Channel::Kre, Channel::Gfr];

    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Kmr => "kmr",
            Channel::Kre => "kre",
            Channel::Gfr => "gfr",
        }
    }
}

/// Composite risk level as written by the scoring backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RiskLevel {
    #[serde(rename = "Normal")]
    Normal,
    #[serde(rename = "Dikkat")]
    Attention,
    #[serde(rename = "Kritik")]
    Critical,
    #[serde(rename = "Çok Kritik")]
    VeryCritical,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 4] = [
        RiskLevel::Normal,
        RiskLevel::Attention,
        RiskLevel::Critical,
        RiskLevel::VeryCritical,
    ];

    /// Wire name, identical to the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Normal => "Normal",
            RiskLevel::Attention => "Dikkat",
            RiskLevel::Critical => "Kritik",
            RiskLevel::VeryCritical => "Çok Kritik",
        }
    }

    /// Display color used for risk badges.
    pub fn color(self) -> &'static str {
        match self {
            RiskLevel::Normal => "#22c55e",
            RiskLevel::Attention => "#f59e0b",
            RiskLevel::Critical => "#f97316",
            RiskLevel::VeryCritical => "#ef4444",
        }
    }
}

/// Breakdown of the composite risk score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct RiskComponents {
    pub kmr_level: f64,
    pub kmr_trend: f64,
    pub kmr_volatility: f64,
    pub kmr_ae: f64,
    pub kmr_residual: f64,
    pub lab_level: f64,
    pub lab_trend: f64,
}

/// Model prediction for one channel at one timepoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Prediction {
    pub value: Option<f64>,
    pub lo: Option<f64>,
    pub hi: Option<f64>,
}

/// Anomaly detector output for one channel at one timepoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Anomaly {
    pub flag: bool,
    pub score: Option<f64>,
}

/// One observed timepoint of a patient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct TimelinePoint {
    pub time_key: String,
    pub time_order: u32,
    pub pseudo_time_days: Option<f64>,
    pub kmr: Option<f64>,
    pub kre: Option<f64>,
    pub gfr: Option<f64>,
    pub kmr_pred: Option<f64>,
    pub kmr_pred_lo: Option<f64>,
    pub kmr_pred_hi: Option<f64>,
    pub kmr_pred_status: Option<String>,
    pub kre_pred: Option<f64>,
    pub kre_pred_lo: Option<f64>,
    pub kre_pred_hi: Option<f64>,
    pub kre_pred_status: Option<String>,
    pub gfr_pred: Option<f64>,
    pub gfr_pred_lo: Option<f64>,
    pub gfr_pred_hi: Option<f64>,
    pub gfr_pred_status: Option<String>,
    pub kmr_anomaly_score: Option<f64>,
    #[serde(deserialize_with = "null_as_false")]
    pub kmr_anomaly_flag: bool,
    pub kre_anomaly_score: Option<f64>,
    #[serde(deserialize_with = "null_as_false")]
    pub kre_anomaly_flag: bool,
    pub gfr_anomaly_score: Option<f64>,
    #[serde(deserialize_with = "null_as_false")]
    pub gfr_anomaly_flag: bool,
    pub kre_level_score: Option<f64>,
    pub gfr_level_score: Option<f64>,
    pub lab_trend_score: Option<f64>,
    pub risk_components: Option<RiskComponents>,
    pub risk_score: Option<f64>,
    pub risk_level: Option<RiskLevel>,
}

impl TimelinePoint {
    /// Measured value of a channel.
    pub fn value(&self, channel: Channel) -> Option<f64> {
        match channel {
            Channel::Kmr => self.kmr,
            Channel::Kre => self.kre,
            Channel::Gfr => self.gfr,
        }
    }

    pub fn prediction(&self, channel: Channel) -> Prediction {
        match channel {
            Channel::Kmr => Prediction {
                value: self.kmr_pred,
                lo: self.kmr_pred_lo,
                hi: self.kmr_pred_hi,
            },
            Channel::Kre => Prediction {
                value: self.kre_pred,
                lo: self.kre_pred_lo,
                hi: self.kre_pred_hi,
            },
            Channel::Gfr => Prediction {
                value: self.gfr_pred,
                lo: self.gfr_pred_lo,
                hi: self.gfr_pred_hi,
            },
        }
    }

    pub fn anomaly(&self, channel: Channel) -> Anomaly {
        match channel {
            Channel::Kmr => Anomaly {
                flag: self.kmr_anomaly_flag,
                score: self.kmr_anomaly_score,
            },
            Channel::Kre => Anomaly {
                flag: self.kre_anomaly_flag,
                score: self.kre_anomaly_score,
            },
            Channel::Gfr => Anomaly {
                flag: self.gfr_anomaly_flag,
                score: self.gfr_anomaly_score,
            },
        }
    }

    /// True when any channel carries an anomaly flag.
    pub fn has_anomaly(&self) -> bool {
        self.kmr_anomaly_flag || self.kre_anomaly_flag || self.gfr_anomaly_flag
    }
}

/// Demographic and coverage metadata of a patient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct PatientMeta {
    pub patient_code: String,
    pub age: Option<f64>,
    #[serde(rename = "BMI")]
    pub bmi: Option<f64>,
    pub gender: Option<String>,
    pub vital_status: Option<String>,
    pub blood_group: Option<String>,
    #[serde(deserialize_with = "null_as_false")]
    pub improved_proxy: bool,
    pub n_kmr_points: u32,
    pub n_kre_points: u32,
    pub n_gfr_points: u32,
}

/// Latest known status, including the forecast anchors per channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct LastStatus {
    pub last_time_key: Option<String>,
    pub last_time_order: Option<u32>,
    pub kmr_last: Option<f64>,
    pub kre_last: Option<f64>,
    pub gfr_last: Option<f64>,
    pub last_kmr_order: Option<u32>,
    pub last_kre_order: Option<u32>,
    pub last_gfr_order: Option<u32>,
    pub risk_last: Option<f64>,
    pub risk_level_last: Option<RiskLevel>,
}

impl LastStatus {
    /// Order of the last real measurement of a channel, as recorded by the backend.
    pub fn last_order(&self, channel: Channel) -> Option<u32> {
        match channel {
            Channel::Kmr => self.last_kmr_order,
            Channel::Kre => self.last_kre_order,
            Channel::Gfr => self.last_gfr_order,
        }
    }
}

/// Full per-patient artifact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PatientRecord {
    pub meta: PatientMeta,
    #[serde(default)]
    pub timeline: Vec<TimelinePoint>,
    #[serde(default)]
    pub last_status: LastStatus,
}

/// Errors raised while loading dashboard artifacts.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("Input is missing required data")]
    MissingData,
    #[error("Could not parse artifact: {0}")]
    Parse(String),
    #[error("Unknown artifact: {0}")]
    UnknownArtifact(String),
    #[error("Other error: {0}")]
    Other(String),
}

fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}
