//! Spreadsheet and printable exports of the patient list.

use chrono::{NaiveDate, NaiveDateTime};

use kimerizm_core::format::{
    format_channel, format_gender, format_number, format_vital_status, Trend, MISSING,
};
use kimerizm_core::{Channel, PatientFeature, RiskLevel};

pub const CSV_HEADERS: [&str; 12] = [
    "Patient code",
    "Gender",
    "Age",
    "Status",
    "Last KMR (%)",
    "Last KRE",
    "Last GFR",
    "KMR Trend",
    "Risk Score",
    "Risk Level",
    "Anomaly",
    "Measurement count",
];

const BOM: char = '\u{feff}';
const DELIMITER: &str = ";";

/// Spreadsheet-friendly CSV: UTF-8 BOM, `;` separated, `\n` between rows.
pub fn export_csv(patients: &[&PatientFeature]) -> String {
    let mut lines = Vec::with_capacity(patients.len() + 1);
    lines.push(CSV_HEADERS.join(DELIMITER));

    for patient in patients {
        let row = [
            csv_field(&patient.patient_code),
            format_gender(patient.gender.as_deref()).to_string(),
            format_age(patient.age),
            format_vital_status(patient.vital_status.as_deref()).to_string(),
            format_number(patient.last_kmr, 4),
            format_number(patient.last_kre, 2),
            format_number(patient.last_gfr, 0),
            Trend::from_slope(patient.kmr_slope).label().to_string(),
            format_number(Some(patient.risk_score), 1),
            patient.risk_level.as_str().to_string(),
            if patient.has_anomaly { "Yes" } else { "No" }.to_string(),
            patient.n_kmr_points.to_string(),
        ];
        lines.push(row.join(DELIMITER));
    }

    format!("{BOM}{}", lines.join("\n"))
}

/// `Report_<scope>_<date>.<extension>`.
pub fn report_file_name(selected: Option<&str>, date: NaiveDate, extension: &str) -> String {
    let scope = selected.unwrap_or("AllPatients");
    format!("Report_{scope}_{}.{extension}", date.format("%Y-%m-%d"))
}

/// Self-contained printable HTML report. A summary block is added when the
/// report covers a single selected patient.
pub fn export_print_html(
    patients: &[&PatientFeature],
    selected: Option<&str>,
    generated_at: NaiveDateTime,
) -> String {
    let title = report_file_name(selected, generated_at.date(), "pdf");
    let scope = match selected {
        Some(code) => format!("Patient: {}", escape_html(code)),
        None => "All patients".to_string(),
    };

    let summary = selected
        .and_then(|code| patients.iter().find(|patient| patient.patient_code == code))
        .map(|patient| summary_block(patient))
        .unwrap_or_default();

    let rows: String = patients.iter().map(|patient| table_row(patient)).collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>Chimerism Report - {title}</title>
<style>
body {{ font-family: Arial, sans-serif; margin: 20px; font-size: 12px; }}
h1 {{ color: #1e40af; border-bottom: 2px solid #1e40af; padding-bottom: 10px; }}
table {{ border-collapse: collapse; width: 100%; margin-top: 10px; }}
th, td {{ border: 1px solid #d1d5db; padding: 8px; text-align: left; }}
th {{ background-color: #f3f4f6; }}
.risk-normal {{ color: {normal}; }}
.risk-dikkat {{ color: {attention}; }}
.risk-kritik {{ color: {critical}; }}
.risk-cok-kritik {{ color: {very_critical}; }}
.summary-box {{ background: #f0f9ff; border: 1px solid #0ea5e9; padding: 15px; border-radius: 8px; }}
@media print {{ body {{ margin: 0; }} }}
</style>
</head>
<body>
<h1>Chimerism Monitoring - Patient Report</h1>
<div class="header-info">
<p><strong>Generated:</strong> {generated}</p>
<p><strong>Scope:</strong> {scope}</p>
<p><strong>Total patients:</strong> {total}</p>
</div>
{summary}<table>
<thead>
<tr><th>Patient code</th><th>Gender</th><th>Age</th><th>Status</th><th>Last KMR</th><th>Last KRE</th><th>Last GFR</th><th>Risk</th><th>Level</th></tr>
</thead>
<tbody>
{rows}</tbody>
</table>
<p class="footer">Decision support only. Clinical decisions require specialist assessment.</p>
</body>
</html>
"#,
        title = escape_html(&title),
        normal = RiskLevel::Normal.color(),
        attention = RiskLevel::Attention.color(),
        critical = RiskLevel::Critical.color(),
        very_critical = RiskLevel::VeryCritical.color(),
        generated = generated_at.format("%Y-%m-%d %H:%M"),
        total = patients.len(),
    )
}

fn summary_block(patient: &PatientFeature) -> String {
    format!(
        "<div class=\"summary-box\">\n<h2>Patient summary: {code}</h2>\n\
         <p>Gender: {gender} | Age: {age} | Status: {status}</p>\n\
         <p>Last KMR: {kmr} | Last KRE: {kre} | Last GFR: {gfr}</p>\n\
         <p>Risk score: {score} | Risk level: {level}</p>\n\
         <p>KMR trend: {trend} | Anomaly: {anomaly}</p>\n</div>\n",
        code = escape_html(&patient.patient_code),
        gender = format_gender(patient.gender.as_deref()),
        age = format_age(patient.age),
        status = format_vital_status(patient.vital_status.as_deref()),
        kmr = format_channel(Channel::Kmr, patient.last_kmr),
        kre = format_channel(Channel::Kre, patient.last_kre),
        gfr = format_channel(Channel::Gfr, patient.last_gfr),
        score = format_number(Some(patient.risk_score), 1),
        level = escape_html(patient.risk_level.as_str()),
        trend = Trend::from_slope(patient.kmr_slope).label(),
        anomaly = if patient.has_anomaly { "Yes" } else { "No" },
    )
}

fn table_row(patient: &PatientFeature) -> String {
    format!(
        "<tr><td><strong>{code}</strong></td><td>{gender}</td><td>{age}</td><td>{status}</td>\
         <td>{kmr}</td><td>{kre}</td><td>{gfr}</td><td>{score}</td>\
         <td class=\"{class}\">{level}</td></tr>\n",
        code = escape_html(&patient.patient_code),
        gender = format_gender(patient.gender.as_deref()),
        age = format_age(patient.age),
        status = format_vital_status(patient.vital_status.as_deref()),
        kmr = format_channel(Channel::Kmr, patient.last_kmr),
        kre = format_channel(Channel::Kre, patient.last_kre),
        gfr = format_channel(Channel::Gfr, patient.last_gfr),
        score = format_number(Some(patient.risk_score), 1),
        class = risk_class(patient.risk_level),
        level = escape_html(patient.risk_level.as_str()),
    )
}

fn risk_class(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Normal => "risk-normal",
        RiskLevel::Attention => "risk-dikkat",
        RiskLevel::Critical => "risk-kritik",
        RiskLevel::VeryCritical => "risk-cok-kritik",
    }
}

// Whole ages print without decimals.
fn format_age(age: Option<f64>) -> String {
    match age {
        Some(age) if age.is_finite() && age.fract() == 0.0 => format!("{age:.0}"),
        Some(age) if age.is_finite() => age.to_string(),
        _ => MISSING.to_string(),
    }
}

// Patient codes are free text; keep the delimiter out of the field.
fn csv_field(value: &str) -> String {
    if value.contains([';', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
