//! Cohort-wide artifacts: patient list rows, totals and channel coverage.

use serde::{Deserialize, Serialize};

use crate::bands::ArtifactMetadata;
use crate::{Channel, RiskLevel};

/// One row of the patient list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientFeature {
    pub patient_code: String,
    #[serde(default)]
    pub age: Option<f64>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub vital_status: Option<String>,
    #[serde(default)]
    pub improved_proxy: bool,
    #[serde(default)]
    pub n_kmr_points: u32,
    #[serde(default)]
    pub n_kre_points: u32,
    #[serde(default)]
    pub n_gfr_points: u32,
    #[serde(default)]
    pub last_kmr: Option<f64>,
    #[serde(default)]
    pub last_kre: Option<f64>,
    #[serde(default)]
    pub last_gfr: Option<f64>,
    #[serde(default)]
    pub last_kmr_time_key: Option<String>,
    #[serde(default)]
    pub last_kre_time_key: Option<String>,
    #[serde(default)]
    pub last_gfr_time_key: Option<String>,
    #[serde(default)]
    pub last_kmr_time_order: Option<u32>,
    #[serde(default)]
    pub last_kre_time_order: Option<u32>,
    #[serde(default)]
    pub last_gfr_time_order: Option<u32>,
    #[serde(default)]
    pub kmr_slope: Option<f64>,
    #[serde(default)]
    pub kre_slope: Option<f64>,
    #[serde(default)]
    pub gfr_slope: Option<f64>,
    #[serde(default)]
    pub kmr_variability: Option<f64>,
    pub risk_score: f64,
    #[serde(default)]
    pub previous_risk_score: Option<f64>,
    #[serde(default)]
    pub risk_delta: Option<f64>,
    #[serde(default)]
    pub last_measurement_time_key: Option<String>,
    #[serde(default)]
    pub last_measurement_time_order: Option<u32>,
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub has_anomaly: bool,
    #[serde(default)]
    pub kmr_has_anomaly: bool,
    #[serde(default)]
    pub kre_has_anomaly: bool,
    #[serde(default)]
    pub gfr_has_anomaly: bool,
    #[serde(default)]
    pub kmr_threshold_breach: Option<bool>,
    #[serde(default)]
    pub kre_threshold_breach: Option<bool>,
    #[serde(default)]
    pub gfr_threshold_breach: Option<bool>,
    #[serde(default)]
    pub any_threshold_breach: Option<bool>,
}

impl PatientFeature {
    pub fn last_value(&self, channel: Channel) -> Option<f64> {
        match channel {
            Channel::Kmr => self.last_kmr,
            Channel::Kre => self.last_kre,
            Channel::Gfr => self.last_gfr,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct PatientFeatures {
    pub patients: Vec<PatientFeature>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct RiskDistribution {
    #[serde(rename = "Normal")]
    pub normal: usize,
    #[serde(rename = "Dikkat")]
    pub attention: usize,
    #[serde(rename = "Kritik")]
    pub critical: usize,
    #[serde(rename = "Çok Kritik")]
    pub very_critical: usize,
}

impl RiskDistribution {
    pub fn count(&self, level: RiskLevel) -> usize {
        match level {
            RiskLevel::Normal => self.normal,
            RiskLevel::Attention => self.attention,
            RiskLevel::Critical => self.critical,
            RiskLevel::VeryCritical => self.very_critical,
        }
    }

    pub fn record(&mut self, level: RiskLevel) {
        match level {
            RiskLevel::Normal => self.normal += 1,
            RiskLevel::Attention => self.attention += 1,
            RiskLevel::Critical => self.critical += 1,
            RiskLevel::VeryCritical => self.very_critical += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.normal + self.attention + self.critical + self.very_critical
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct SummaryTotals {
    pub n_patients: usize,
    pub improved_proxy_count: usize,
    pub patients_with_anomalies: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct SummaryAverages {
    pub risk_score: f64,
    pub kmr_last: Option<f64>,
    pub kre_last: Option<f64>,
    pub gfr_last: Option<f64>,
}

/// Dashboard KPIs computed by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct DataSummary {
    pub metadata: ArtifactMetadata,
    pub totals: SummaryTotals,
    pub risk_distribution: RiskDistribution,
    pub averages: SummaryAverages,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ChannelCoverage {
    pub time_keys: Vec<String>,
    pub n_measurements: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct CoverageByChannel {
    pub kmr: ChannelCoverage,
    pub kre: ChannelCoverage,
    pub gfr: ChannelCoverage,
}

impl CoverageByChannel {
    pub fn get(&self, channel: Channel) -> &ChannelCoverage {
        match channel {
            Channel::Kmr => &self.kmr,
            Channel::Kre => &self.kre,
            Channel::Gfr => &self.gfr,
        }
    }
}

/// Measurement coverage per channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ChannelOverview {
    pub metadata: ArtifactMetadata,
    pub metrics: Vec<String>,
    pub coverage: CoverageByChannel,
}
