//! Threshold classification of channel values.

use serde::{Deserialize, Serialize};

use crate::config::ClinicalThresholds;
use crate::{Channel, RiskLevel};

/// Clinical severity of a single measurement, mildest first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Good,
    Borderline,
    Moderate,
    Critical,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Good => "good",
            Severity::Borderline => "borderline",
            Severity::Moderate => "moderate",
            Severity::Critical => "critical",
        }
    }
}

/// Classifies a value against the threshold table. Non-finite values are absent.
pub fn classify(channel: Channel, value: f64, thresholds: &ClinicalThresholds) -> Option<Severity> {
    if !value.is_finite() {
        return None;
    }

    let severity = match channel {
        Channel::Kmr => {
            if value > thresholds.kmr_critical_above {
                Severity::Critical
            } else if value > thresholds.kmr_moderate_above {
                Severity::Moderate
            } else if value >= thresholds.kmr_good_below {
                Severity::Borderline
            } else {
                Severity::Good
            }
        }
        Channel::Kre => {
            // Negative creatinine is an invalid measurement.
            if value > thresholds.kre_critical_above || value < 0.0 {
                Severity::Critical
            } else if value > thresholds.kre_moderate_above {
                Severity::Moderate
            } else if value >= thresholds.kre_good_below {
                Severity::Borderline
            } else {
                Severity::Good
            }
        }
        Channel::Gfr => {
            if value < thresholds.gfr_critical_below {
                Severity::Critical
            } else if value < thresholds.gfr_moderate_below {
                Severity::Moderate
            } else if value >= thresholds.gfr_good_from {
                Severity::Good
            } else {
                Severity::Borderline
            }
        }
    };

    Some(severity)
}

/// Raises a recorded risk level when a channel crosses a clinical threshold.
///
/// A critical channel forces `VeryCritical`; a moderate one lifts the level to
/// at least `Attention`. The level is never lowered.
pub fn escalate_risk<I>(recorded: Option<RiskLevel>, severities: I) -> RiskLevel
where
    I: IntoIterator<Item = Option<Severity>>,
{
    let floor = severities
        .into_iter()
        .flatten()
        .map(|severity| match severity {
            Severity::Critical => RiskLevel::VeryCritical,
            Severity::Moderate => RiskLevel::Attention,
            Severity::Good | Severity::Borderline => RiskLevel::Normal,
        })
        .max()
        .unwrap_or(RiskLevel::Normal);

    recorded.unwrap_or(RiskLevel::Normal).max(floor)
}
