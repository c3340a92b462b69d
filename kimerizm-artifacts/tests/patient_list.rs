use std::fs;

use chrono::NaiveDate;
use kimerizm_artifacts::{
    export_csv, export_print_html, parse_patient_features_str, query_patients, report_file_name,
    risk_distribution, ArtifactKind, PatientQuery, PatientSort,
};
use kimerizm_core::{DashboardError, PatientFeature, RiskLevel};

fn patients() -> Vec<PatientFeature> {
    let path = format!("{}/tests/data/patient_features.json", env!("CARGO_MANIFEST_DIR"));
    let json = fs::read_to_string(path).expect("Could not read fixture");
    parse_patient_features_str(&json)
        .expect("Invalid patient features")
        .patients
}

fn codes(rows: &[&PatientFeature]) -> Vec<String> {
    rows.iter().map(|patient| patient.patient_code.clone()).collect()
}

#[test]
fn search_ignores_case_and_turkish_letters() {
    let patients = patients();
    let query = PatientQuery {
        search: "sK-".to_string(),
        sort: PatientSort::PatientAsc,
        ..PatientQuery::default()
    };
    assert_eq!(codes(&query_patients(&patients, &query)), vec!["sk-007", "ŞK-104"]);
}

#[test]
fn default_query_sorts_by_risk_descending_with_stable_ties() {
    let patients = patients();
    let rows = query_patients(&patients, &PatientQuery::default());
    assert_eq!(codes(&rows), vec!["ŞK-104", "sk-007", "P002<b>", "P001"]);
}

#[test]
fn last_kmr_sort_counts_missing_as_zero() {
    let patients = patients();
    let query = PatientQuery {
        sort: PatientSort::ChrAsc,
        ..PatientQuery::default()
    };
    assert_eq!(codes(&query_patients(&patients, &query)), vec!["sk-007", "P001", "P002<b>", "ŞK-104"]);
}

#[test]
fn risk_filter_and_distribution() {
    let patients = patients();
    let query = PatientQuery {
        risk_level: Some(RiskLevel::Attention),
        ..PatientQuery::default()
    };
    assert_eq!(codes(&query_patients(&patients, &query)), vec!["sk-007"]);

    let distribution = risk_distribution(&patients);
    assert_eq!(distribution.count(RiskLevel::Normal), 1);
    assert_eq!(distribution.count(RiskLevel::VeryCritical), 1);
    assert_eq!(distribution.total(), patients.len());
}

#[test]
fn csv_export_layout() {
    let patients = patients();
    let rows: Vec<&PatientFeature> = patients.iter().collect();
    let csv = export_csv(&rows);

    assert!(csv.starts_with('\u{feff}'));
    let lines: Vec<&str> = csv.trim_start_matches('\u{feff}').split('\n').collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(
        lines[0],
        "Patient code;Gender;Age;Status;Last KMR (%);Last KRE;Last GFR;KMR Trend;Risk Score;Risk Level;Anomaly;Measurement count"
    );
    assert_eq!(
        lines[1],
        "ŞK-104;Female;55;Alive;6.2500;2.50;28;Rising;88.3;Çok Kritik;Yes;8"
    );
    assert_eq!(
        lines[3],
        "sk-007;Unknown;-;Deceased;-;1.75;61;Stable;45.0;Dikkat;No;5"
    );
    assert_eq!(lines[4].split(';').nth(2), Some("37.5"));
}

#[test]
fn print_html_escapes_codes_and_adds_summary_for_selection() {
    let patients = patients();
    let selected: Vec<&PatientFeature> = patients
        .iter()
        .filter(|patient| patient.patient_code == "P002<b>")
        .collect();
    let generated_at = NaiveDate::from_ymd_opt(2025, 3, 1)
        .and_then(|date| date.and_hms_opt(9, 15, 0))
        .expect("valid timestamp");

    let html = export_print_html(&selected, Some("P002<b>"), generated_at);

    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("P002&lt;b&gt;"));
    assert!(!html.contains("P002<b>"));
    assert!(html.contains("summary-box\">"));
    assert!(html.contains("class=\"risk-kritik\""));
    assert!(html.contains("2.5000%"));
    assert!(html.contains("2025-03-01 09:15"));
}

#[test]
fn report_names_and_artifact_catalogue() {
    let date = NaiveDate::from_ymd_opt(2025, 3, 1).expect("valid date");
    assert_eq!(report_file_name(None, date, "csv"), "Report_AllPatients_2025-03-01.csv");
    assert_eq!(report_file_name(Some("P001"), date, "pdf"), "Report_P001_2025-03-01.pdf");

    assert_eq!(
        ArtifactKind::Patient.url("/kimerizm/", Some("P001")).expect("patient path"),
        "/kimerizm/patients/P001.json"
    );
    assert!(matches!(
        ArtifactKind::Patient.path(None),
        Err(DashboardError::MissingData)
    ));
    assert_eq!(
        "cohort_trajectory_lab.json".parse::<ArtifactKind>().expect("known artifact"),
        ArtifactKind::LabCohortTrajectory
    );
    assert!(matches!(
        "nope".parse::<ArtifactKind>(),
        Err(DashboardError::UnknownArtifact(_))
    ));
    assert_eq!(ArtifactKind::Patient.stale_after().num_minutes(), 2);
    assert_eq!(ArtifactKind::ReferenceBand.stale_after().num_minutes(), 5);
    assert!(ArtifactKind::LabCohortTrajectory.optional());
}

#[test]
fn malformed_artifacts_name_the_artifact() {
    match parse_patient_features_str("[]") {
        Err(DashboardError::Parse(message)) => assert!(message.starts_with("patient_features")),
        other => panic!("unexpected result: {other:?}"),
    }
    match parse_patient_features_str("{\"patients\": [{\"patient_code\": \"X\"}]}") {
        Err(DashboardError::Parse(message)) => assert!(message.contains("risk_score")),
        other => panic!("unexpected result: {other:?}"),
    }
}
