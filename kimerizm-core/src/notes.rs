//! Plain-language clinical notes shown next to the charts.

use serde::{Deserialize, Serialize};

use crate::config::ClinicalThresholds;
use crate::pinned::PinnedPoint;
use crate::severity::{classify, Severity};
use crate::stats::TimelineStats;
use crate::{Channel, PatientRecord, RiskLevel};

const GFR_LOW_BELOW: f64 = 60.0;
const TREND_EPSILON: f64 = 0.05;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NoteKind {
    Success,
    Warning,
    Danger,
    Info,
}

/// Tab of the notes panel.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum NoteFilter {
    #[default]
    All,
    Action,
    Watch,
    Info,
}

impl NoteFilter {
    pub fn admits(self, kind: NoteKind) -> bool {
        match self {
            NoteFilter::All => true,
            NoteFilter::Action => kind == NoteKind::Danger,
            NoteFilter::Watch => kind == NoteKind::Warning,
            NoteFilter::Info => matches!(kind, NoteKind::Info | NoteKind::Success),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClinicalNote {
    pub kind: NoteKind,
    pub text: String,
}

impl ClinicalNote {
    fn new(kind: NoteKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// Values the notes are derived from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteContext {
    pub kmr: Option<f64>,
    pub kre: Option<f64>,
    pub gfr: Option<f64>,
    pub risk_level: Option<RiskLevel>,
    /// `Some` when a point is pinned; holds its anomaly state.
    pub pinned_anomaly: Option<bool>,
    pub kmr_trend: f64,
    pub anomaly_count: usize,
    pub improved_proxy: bool,
}

impl NoteContext {
    /// Pinned values where present, otherwise the latest status.
    pub fn new(
        record: &PatientRecord,
        stats: Option<&TimelineStats>,
        pinned: Option<&PinnedPoint>,
    ) -> Self {
        let last = &record.last_status;
        Self {
            kmr: pinned.and_then(|p| p.kmr.value).or(last.kmr_last),
            kre: pinned
                .and_then(|p| p.kre.value)
                .or_else(|| stats.and_then(|s| s.kre_last)),
            gfr: pinned
                .and_then(|p| p.gfr.value)
                .or_else(|| stats.and_then(|s| s.gfr_last)),
            risk_level: pinned.and_then(|p| p.risk_level).or(last.risk_level_last),
            pinned_anomaly: pinned.map(|p| p.any_anomaly),
            kmr_trend: stats.map_or(0.0, |s| s.kmr_trend),
            anomaly_count: stats.map_or(0, |s| s.anomaly_count),
            improved_proxy: record.meta.improved_proxy,
        }
    }
}

/// Builds the notes for the current focus, keeping only those the filter admits.
pub fn clinical_notes(
    context: &NoteContext,
    thresholds: &ClinicalThresholds,
    filter: NoteFilter,
) -> Vec<ClinicalNote> {
    let mut notes = Vec::new();

    if let Some(kmr) = context.kmr {
        match classify(Channel::Kmr, kmr, thresholds) {
            Some(Severity::Good) => notes.push(ClinicalNote::new(
                NoteKind::Success,
                format!("KMR within normal range ({kmr:.3}%)"),
            )),
            Some(Severity::Borderline) => notes.push(ClinicalNote::new(
                NoteKind::Warning,
                format!("KMR needs attention ({kmr:.3}%)"),
            )),
            Some(Severity::Moderate) => notes.push(ClinicalNote::new(
                NoteKind::Danger,
                format!("KMR at critical level ({kmr:.3}%)"),
            )),
            Some(Severity::Critical) => notes.push(ClinicalNote::new(
                NoteKind::Danger,
                format!("KMR very critical! ({kmr:.3}%)"),
            )),
            None => {}
        }
    }

    if let Some(kre) = context.kre {
        match classify(Channel::Kre, kre, thresholds) {
            Some(Severity::Critical) => notes.push(ClinicalNote::new(
                NoteKind::Danger,
                format!("Creatinine critically high ({kre:.2})"),
            )),
            Some(Severity::Moderate) => notes.push(ClinicalNote::new(
                NoteKind::Warning,
                format!("Creatinine elevated ({kre:.2})"),
            )),
            Some(Severity::Good) => notes.push(ClinicalNote::new(
                NoteKind::Success,
                format!("Creatinine within normal range ({kre:.2})"),
            )),
            Some(Severity::Borderline) | None => {}
        }
    }

    if let Some(gfr) = context.gfr {
        match classify(Channel::Gfr, gfr, thresholds) {
            Some(Severity::Critical) => notes.push(ClinicalNote::new(
                NoteKind::Danger,
                format!("GFR critically low, kidney failure ({gfr:.0})"),
            )),
            Some(Severity::Moderate) => notes.push(ClinicalNote::new(
                NoteKind::Danger,
                format!("GFR very low ({gfr:.0})"),
            )),
            Some(Severity::Borderline) if gfr < GFR_LOW_BELOW => notes.push(ClinicalNote::new(
                NoteKind::Warning,
                format!("GFR low ({gfr:.0})"),
            )),
            Some(Severity::Good) => notes.push(ClinicalNote::new(
                NoteKind::Success,
                format!("GFR within normal range ({gfr:.0})"),
            )),
            _ => {}
        }
    }

    match context.pinned_anomaly {
        None => {
            if context.kmr_trend < -TREND_EPSILON {
                notes.push(ClinicalNote::new(
                    NoteKind::Success,
                    "KMR trend is falling (improving)",
                ));
            } else if context.kmr_trend > TREND_EPSILON {
                notes.push(ClinicalNote::new(NoteKind::Danger, "KMR trend is rising"));
            }
            if context.anomaly_count > 0 {
                notes.push(ClinicalNote::new(
                    NoteKind::Warning,
                    format!("{} anomalies detected", context.anomaly_count),
                ));
            }
        }
        Some(true) => notes.push(ClinicalNote::new(
            NoteKind::Warning,
            "Anomaly detected at this point",
        )),
        Some(false) => {}
    }

    if context.risk_level == Some(RiskLevel::VeryCritical) {
        notes.push(ClinicalNote::new(
            NoteKind::Danger,
            "Urgent intervention may be required",
        ));
    }

    if context.improved_proxy {
        notes.push(ClinicalNote::new(
            NoteKind::Info,
            "Patient belongs to the improved cohort",
        ));
    }

    notes.retain(|note| filter.admits(note.kind));
    notes
}
