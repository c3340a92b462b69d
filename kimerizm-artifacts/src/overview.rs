//! Cohort-wide KPIs for the home page.

use serde::Serialize;

use kimerizm_core::{Channel, ChannelOverview, DataSummary, RiskDistribution, RiskLevel};

/// Measurement coverage of one channel.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChannelCompleteness {
    pub channel: Channel,
    pub n_measurements: usize,
    pub n_time_keys: usize,
    /// Measurements over patients times schedule slots, in percent.
    pub percent: Option<f64>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct RiskShare {
    pub level: RiskLevel,
    pub count: usize,
    pub percent: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CohortOverview {
    pub n_patients: usize,
    pub improved_proxy_count: usize,
    pub patients_with_anomalies: usize,
    pub average_risk_score: f64,
    pub risk_distribution: RiskDistribution,
    pub risk_shares: Vec<RiskShare>,
    /// Empty when the channel overview was not loaded.
    pub completeness: Vec<ChannelCompleteness>,
}

pub fn cohort_overview(summary: &DataSummary, channels: Option<&ChannelOverview>) -> CohortOverview {
    let distribution = summary.risk_distribution;
    let classified = distribution.total();

    let risk_shares = RiskLevel::ALL
        .into_iter()
        .map(|level| {
            let count = distribution.count(level);
            let percent = if classified == 0 {
                0.0
            } else {
                count as f64 / classified as f64 * 100.0
            };
            RiskShare {
                level,
                count,
                percent,
            }
        })
        .collect();

    let n_patients = summary.totals.n_patients;
    let completeness = channels
        .map(|overview| {
            Channel::ALL
                .into_iter()
                .map(|channel| {
                    let coverage = overview.coverage.get(channel);
                    let slots = n_patients * coverage.time_keys.len();
                    ChannelCompleteness {
                        channel,
                        n_measurements: coverage.n_measurements,
                        n_time_keys: coverage.time_keys.len(),
                        percent: (slots > 0)
                            .then(|| coverage.n_measurements as f64 / slots as f64 * 100.0),
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    CohortOverview {
        n_patients,
        improved_proxy_count: summary.totals.improved_proxy_count,
        patients_with_anomalies: summary.totals.patients_with_anomalies,
        average_risk_score: summary.averages.risk_score,
        risk_distribution: distribution,
        risk_shares,
        completeness,
    }
}
