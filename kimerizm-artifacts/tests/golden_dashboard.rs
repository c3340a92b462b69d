use std::fs;

use serde_json::{json, Value};
use kimerizm_artifacts::{
    build_dashboard, parse_cohort_str, parse_lab_cohort_str, parse_patient_str,
    parse_reference_band_str, DashboardSources,
};
use kimerizm_core::{Channel, ChannelChart, DashboardConfig, ViewAction, ViewState};

fn fixture_path(name: &str) -> String {
    format!("{}/tests/data/{name}", env!("CARGO_MANIFEST_DIR"))
}

fn read_fixture(name: &str) -> String {
    fs::read_to_string(fixture_path(name)).expect("Could not read fixture")
}

fn reference_orders(chart: &ChannelChart) -> Vec<u32> {
    chart.reference_median.iter().map(|(order, _)| *order).collect()
}

#[test]
fn pinned_dashboard_matches_golden() {
    let patient = parse_patient_str(&read_fixture("patient_P001.json")).expect("Invalid patient");
    let reference =
        parse_reference_band_str(&read_fixture("reference_band.json")).expect("Invalid band");
    let cohort = parse_cohort_str(&read_fixture("cohort_trajectory.json")).expect("Invalid cohort");
    let lab_json = read_fixture("cohort_trajectory_lab.json");
    let lab_cohort = parse_lab_cohort_str(Some(&lab_json)).expect("Invalid lab cohort");

    let config = DashboardConfig::default();
    let sources = DashboardSources {
        patient: &patient,
        reference: &reference,
        cohort: &cohort,
        lab_cohort: &lab_cohort,
    };

    let initial = build_dashboard(sources, &config, &ViewState::new(&config));
    let view = initial.view.apply(ViewAction::Select { order: 7 }, &initial.grid);
    let dashboard = build_dashboard(sources, &config, &view);

    let actual = json!({
        "patient_code": dashboard.patient.patient_code,
        "reference_created_at": reference.metadata.created_at,
        "lab_created_at": lab_cohort.metadata.created_at,
        "grid_orders": dashboard.grid.orders(),
        "observed_orders": dashboard
            .grid
            .observations()
            .map(|point| point.time_order)
            .collect::<Vec<_>>(),
        "kmr_reference_orders": reference_orders(dashboard.chart(Channel::Kmr)),
        "kre_reference_orders": reference_orders(dashboard.chart(Channel::Kre)),
        "gfr_reference_orders": reference_orders(dashboard.chart(Channel::Gfr)),
        "kmr_forecast_region": dashboard.kmr.forecast_region,
        "kre_forecast_region": dashboard.kre.forecast_region,
        "kmr_cohort": dashboard.kmr.cohort,
        "kre_cohort": dashboard.kre.cohort,
        "focus": dashboard.focus,
        "notes": dashboard.notes,
        "threshold_warnings": dashboard.threshold_warnings,
    });

    let expected: Value = serde_json::from_str(&read_fixture("P001_pinned_day7_snapshot.json"))
        .expect("Invalid golden");

    assert_eq!(actual, expected);
}

#[test]
fn unpinned_dashboard_focuses_latest_observation() {
    let patient = parse_patient_str(&read_fixture("patient_P001.json")).expect("Invalid patient");
    let reference =
        parse_reference_band_str(&read_fixture("reference_band.json")).expect("Invalid band");
    let cohort = parse_cohort_str(&read_fixture("cohort_trajectory.json")).expect("Invalid cohort");
    let lab_cohort = parse_lab_cohort_str(None).expect("Missing lab cohort is not an error");

    let config = DashboardConfig::default();
    let dashboard = build_dashboard(
        DashboardSources {
            patient: &patient,
            reference: &reference,
            cohort: &cohort,
            lab_cohort: &lab_cohort,
        },
        &config,
        &ViewState::new(&config),
    );

    assert_eq!(dashboard.focus.as_ref().map(|pinned| pinned.order), Some(12));
    assert!(dashboard.kre.cohort.is_none());
    assert!(dashboard.notes.iter().any(|note| note.text == "KMR trend is falling (improving)"));
    assert!(dashboard
        .notes
        .iter()
        .any(|note| note.text == "KMR within normal range (0.250%)"));
    let stats = dashboard.stats.expect("timeline is not empty");
    assert_eq!(stats.kmr_count, 3);
    assert_eq!(stats.gfr_last, Some(95.0));
}

#[test]
fn threshold_disagreements_are_reported() {
    let patient = parse_patient_str(&read_fixture("patient_P001.json")).expect("Invalid patient");
    let mut reference =
        parse_reference_band_str(&read_fixture("reference_band.json")).expect("Invalid band");
    if let Some(reported) = reference.clinical_thresholds.as_mut() {
        reported.gfr.very_bad_le = Some(10.0);
    }
    let cohort = parse_cohort_str(&read_fixture("cohort_trajectory.json")).expect("Invalid cohort");
    let lab_cohort = parse_lab_cohort_str(None).expect("empty lab cohort");

    let config = DashboardConfig::default();
    let dashboard = build_dashboard(
        DashboardSources {
            patient: &patient,
            reference: &reference,
            cohort: &cohort,
            lab_cohort: &lab_cohort,
        },
        &config,
        &ViewState::new(&config),
    );

    assert_eq!(dashboard.threshold_warnings.len(), 1);
    assert!(dashboard.threshold_warnings[0].starts_with("gfr.very_bad_le"));
}
