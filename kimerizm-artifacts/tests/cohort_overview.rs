use std::fs;

use kimerizm_artifacts::{
    build_dashboard, cohort_overview, parse_channel_overview_str, parse_cohort_str,
    parse_data_summary_str, parse_patient_features_str, parse_patient_str,
    parse_reference_band_str, risk_distribution, DashboardSources,
};
use kimerizm_core::{
    Channel, DashboardConfig, DashboardError, LabCohortPoint, LabCohortTrajectory, RiskLevel,
    ViewState,
};

fn read_fixture(name: &str) -> String {
    let path = format!("{}/tests/data/{name}", env!("CARGO_MANIFEST_DIR"));
    fs::read_to_string(path).expect("Could not read fixture")
}

#[test]
fn overview_shares_and_completeness() {
    let summary = parse_data_summary_str(&read_fixture("data_summary.json")).expect("Invalid summary");
    let channels =
        parse_channel_overview_str(&read_fixture("channel_overview.json")).expect("Invalid overview");

    let overview = cohort_overview(&summary, Some(&channels));
    assert_eq!(overview.n_patients, 4);
    assert_eq!(overview.improved_proxy_count, 1);
    assert_eq!(overview.average_risk_score, 47.5);

    let levels: Vec<RiskLevel> = overview.risk_shares.iter().map(|share| share.level).collect();
    assert_eq!(levels, RiskLevel::ALL.to_vec());
    assert!(overview.risk_shares.iter().all(|share| share.count == 1 && share.percent == 25.0));

    let percents: Vec<(Channel, Option<f64>)> = overview
        .completeness
        .iter()
        .map(|entry| (entry.channel, entry.percent))
        .collect();
    assert_eq!(
        percents,
        vec![
            (Channel::Kmr, Some(60.0)),
            (Channel::Kre, Some(100.0)),
            (Channel::Gfr, None),
        ]
    );

    assert!(cohort_overview(&summary, None).completeness.is_empty());
}

#[test]
fn summary_distribution_agrees_with_the_patient_list() {
    let summary = parse_data_summary_str(&read_fixture("data_summary.json")).expect("Invalid summary");
    let features = parse_patient_features_str(&read_fixture("patient_features.json"))
        .expect("Invalid patient features");

    assert_eq!(summary.risk_distribution, risk_distribution(&features.patients));
    assert_eq!(summary.risk_distribution.total(), summary.totals.n_patients);
}

#[test]
fn empty_distribution_has_zero_shares() {
    let summary = parse_data_summary_str("{}").expect("every field has a default");
    let overview = cohort_overview(&summary, None);
    assert!(overview.risk_shares.iter().all(|share| share.percent == 0.0));

    match parse_data_summary_str("[1, 2]") {
        Err(DashboardError::Parse(message)) => assert!(message.starts_with("data_summary")),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn lab_cohort_without_gfr_draws_no_gfr_overlay() {
    let patient = parse_patient_str(&read_fixture("patient_P001.json")).expect("Invalid patient");
    let reference =
        parse_reference_band_str(&read_fixture("reference_band.json")).expect("Invalid band");
    let cohort = parse_cohort_str(&read_fixture("cohort_trajectory.json")).expect("Invalid cohort");
    let lab_cohort = LabCohortTrajectory {
        trajectory: vec![LabCohortPoint {
            time_key: "Day_7_KRE".to_string(),
            expected_kre: Some(1.4),
            ..LabCohortPoint::default()
        }],
        ..LabCohortTrajectory::default()
    };
    assert!(lab_cohort.has_channel(Channel::Kre));
    assert!(!lab_cohort.has_channel(Channel::Gfr));

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

    let kre = dashboard.kre.cohort.expect("KRE overlay drawn");
    assert_eq!(kre[6], Some(1.4));
    assert!(dashboard.gfr.cohort.is_none());
}
