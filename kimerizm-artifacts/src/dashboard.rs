//! Assembly of the patient page from the loaded artifacts.

use serde::Serialize;

use kimerizm_core::{
    build_grid, clinical_notes, compose_channel_chart, overlay, project, reindex, Aligned,
    BandPoint, Channel, ChannelChart, ChartInputs, ClinicalNote, CohortTrajectory,
    DashboardConfig, KeyTranslation, LabCohortTrajectory, NoteContext, PatientMeta,
    PatientRecord, PinnedPoint, ReferenceBand, TimelineGrid, TimelineStats, ViewState,
};

/// Artifacts a patient page is built from.
#[derive(Debug, Clone, Copy)]
pub struct DashboardSources<'a> {
    pub patient: &'a PatientRecord,
    pub reference: &'a ReferenceBand,
    pub cohort: &'a CohortTrajectory,
    pub lab_cohort: &'a LabCohortTrajectory,
}

/// Everything the patient page renders for one view state.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PatientDashboard {
    pub patient: PatientMeta,
    pub grid: TimelineGrid,
    pub view: ViewState,
    pub kmr: ChannelChart,
    pub kre: ChannelChart,
    pub gfr: ChannelChart,
    pub stats: Option<TimelineStats>,
    /// Panel snapshot of the focused order (pinned, else the latest observation).
    pub focus: Option<PinnedPoint>,
    pub notes: Vec<ClinicalNote>,
    /// Differences between configured thresholds and the ones in the band artifact.
    pub threshold_warnings: Vec<String>,
}

impl PatientDashboard {
    pub fn chart(&self, channel: Channel) -> &ChannelChart {
        match channel {
            Channel::Kmr => &self.kmr,
            Channel::Kre => &self.kre,
            Channel::Gfr => &self.gfr,
        }
    }
}

pub fn build_dashboard(
    sources: DashboardSources<'_>,
    config: &DashboardConfig,
    view: &ViewState,
) -> PatientDashboard {
    let record = sources.patient;
    let thresholds = &config.thresholds;
    let bands = &sources.reference.bands;

    let grid = build_grid(&record.timeline, &bands.kmr, &sources.cohort.trajectory);
    tracing::debug!(
        patient = %record.meta.patient_code,
        cells = grid.len(),
        "built timeline grid"
    );

    let kmr_reference = reindex(&grid, &bands.kmr, KeyTranslation::Unified);
    let kre_reference = reindex(&grid, &bands.kre, KeyTranslation::Lab);
    let gfr_reference = reindex(&grid, &bands.gfr, KeyTranslation::Lab);

    let kmr_cohort = {
        let aligned = reindex(&grid, &sources.cohort.trajectory, KeyTranslation::Unified);
        overlay(&grid, &aligned, |point| point.expected_kmr)
    };
    let lab_aligned = reindex(&grid, &sources.lab_cohort.trajectory, KeyTranslation::Lab);
    let lab_cohort = |channel: Channel| {
        if sources.lab_cohort.has_channel(channel) {
            overlay(&grid, &lab_aligned, |point| point.expected(channel))
        } else {
            vec![None; grid.len()]
        }
    };
    let kre_cohort = lab_cohort(Channel::Kre);
    let gfr_cohort = lab_cohort(Channel::Gfr);

    let chart = |channel: Channel, reference: &[Aligned<BandPoint>], cohort: &[Option<f64>]| {
        let inputs = ChartInputs {
            reference,
            cohort,
            last_status: &record.last_status,
            thresholds,
        };
        compose_channel_chart(&grid, channel, inputs, view)
    };
    let kmr = chart(Channel::Kmr, &kmr_reference, &kmr_cohort);
    let kre = chart(Channel::Kre, &kre_reference, &kre_cohort);
    let gfr = chart(Channel::Gfr, &gfr_reference, &gfr_cohort);

    let focus = view
        .focus_order(&grid)
        .and_then(|order| project(&grid, order, thresholds));
    let pinned = focus.as_ref().filter(|_| view.is_pinned());

    let stats = TimelineStats::compute(&record.timeline, view.pinned);
    let context = NoteContext::new(record, stats.as_ref(), pinned);
    let notes = clinical_notes(&context, thresholds, view.note_filter);

    let threshold_warnings = sources
        .reference
        .clinical_thresholds
        .as_ref()
        .map(|reported| thresholds.disagreements(reported))
        .unwrap_or_default();
    for warning in &threshold_warnings {
        tracing::warn!(%warning, "configured threshold differs from the reference artifact");
    }

    PatientDashboard {
        patient: record.meta.clone(),
        grid,
        view: view.clone(),
        kmr,
        kre,
        gfr,
        stats,
        focus,
        notes,
        threshold_warnings,
    }
}
