use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use kimerizm_artifacts::{
    build_dashboard, cohort_overview, export_csv, export_print_html, parse_channel_overview_str,
    parse_cohort_str, parse_data_summary_str, parse_lab_cohort_str, parse_patient_features_str,
    parse_patient_str, parse_reference_band_str, query_patients, report_file_name, ArtifactKind,
    DashboardSources, PatientQuery, PatientSort,
};
use kimerizm_core::format::format_channel;
use kimerizm_core::{Channel, DashboardConfig, RiskLevel, TimelineGrid, ViewAction, ViewState};

mod logging;

#[derive(Parser, Debug)]
#[command(
    name = "kimerizm-cli",
    about = "Inspect chimerism dashboard artifacts from the command line."
)]
struct Args {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize the unified time grid of a patient.
    Grid(PatientFiles),
    /// Show the analysis panel for one timepoint.
    Pin {
        #[command(flatten)]
        files: PatientFiles,
        /// Grid order to pin; the highest-risk observation when omitted.
        #[arg(short, long)]
        order: Option<u32>,
        /// Also print the snapshot as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Export the patient list as CSV or printable HTML.
    Export {
        /// Path to patient_features.json.
        #[arg(short, long)]
        features: PathBuf,
        #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,
        /// Output file; defaults to the conventional report name.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Patient code search (case and diacritic insensitive).
        #[arg(long, default_value = "")]
        search: String,
        /// Risk level filter, e.g. "Kritik" or "critical".
        #[arg(long, value_parser = parse_risk_level)]
        risk: Option<RiskLevel>,
        #[arg(long, value_enum, default_value_t = SortArg::RiskDesc)]
        sort: SortArg,
    },
    /// Print cohort KPIs from the aggregate artifacts.
    Summary {
        /// Path to data_summary.json.
        #[arg(short, long)]
        summary: PathBuf,
        /// Path to channel_overview.json.
        #[arg(long)]
        channels: Option<PathBuf>,
    },
    /// Print the fetch URL and cache lifetime of an artifact.
    Url {
        /// Artifact name, e.g. reference_band or patient.
        artifact: String,
        #[arg(long)]
        patient: Option<String>,
        #[arg(long, default_value = "")]
        base_path: String,
    },
}

#[derive(ClapArgs, Debug)]
struct PatientFiles {
    /// Path to patients/<id>.json.
    #[arg(short, long)]
    patient: PathBuf,
    /// Path to reference_band.json.
    #[arg(short, long)]
    reference: PathBuf,
    /// Path to cohort_trajectory.json.
    #[arg(short, long)]
    cohort: PathBuf,
    /// Path to cohort_trajectory_lab.json; an empty trajectory when omitted.
    #[arg(long)]
    lab_cohort: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ExportFormat {
    Csv,
    Html,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SortArg {
    RiskDesc,
    RiskAsc,
    PatientAsc,
    PatientDesc,
    KmrDesc,
    KmrAsc,
}

impl From<SortArg> for PatientSort {
    fn from(sort: SortArg) -> Self {
        match sort {
            SortArg::RiskDesc => PatientSort::RiskDesc,
            SortArg::RiskAsc => PatientSort::RiskAsc,
            SortArg::PatientAsc => PatientSort::PatientAsc,
            SortArg::PatientDesc => PatientSort::PatientDesc,
            SortArg::KmrDesc => PatientSort::ChrDesc,
            SortArg::KmrAsc => PatientSort::ChrAsc,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init_logging(args.verbose);

    match args.command {
        Command::Grid(files) => print_grid(&files),
        Command::Pin { files, order, json } => print_pinned(&files, order, json),
        Command::Export {
            features,
            format,
            output,
            search,
            risk,
            sort,
        } => {
            let query = PatientQuery {
                search,
                risk_level: risk,
                sort: sort.into(),
            };
            export(&features, format, output, &query)
        }
        Command::Summary { summary, channels } => print_summary(&summary, channels.as_deref()),
        Command::Url {
            artifact,
            patient,
            base_path,
        } => {
            let kind: ArtifactKind = artifact.parse()?;
            let url = kind.url(&base_path, patient.as_deref())?;
            println!(
                "{url}\nStale after: {} min{}",
                kind.stale_after().num_minutes(),
                if kind.optional() { " (optional)" } else { "" }
            );
            Ok(())
        }
    }
}

struct Loaded {
    patient: kimerizm_core::PatientRecord,
    reference: kimerizm_core::ReferenceBand,
    cohort: kimerizm_core::CohortTrajectory,
    lab_cohort: kimerizm_core::LabCohortTrajectory,
}

impl Loaded {
    fn sources(&self) -> DashboardSources<'_> {
        DashboardSources {
            patient: &self.patient,
            reference: &self.reference,
            cohort: &self.cohort,
            lab_cohort: &self.lab_cohort,
        }
    }
}

fn read(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Could not read file {path:?}"))
}

fn load(files: &PatientFiles) -> anyhow::Result<Loaded> {
    let lab_json = files.lab_cohort.as_deref().map(read).transpose()?;
    Ok(Loaded {
        patient: parse_patient_str(&read(&files.patient)?)
            .with_context(|| format!("Invalid patient artifact {:?}", files.patient))?,
        reference: parse_reference_band_str(&read(&files.reference)?)
            .with_context(|| format!("Invalid reference band {:?}", files.reference))?,
        cohort: parse_cohort_str(&read(&files.cohort)?)
            .with_context(|| format!("Invalid cohort trajectory {:?}", files.cohort))?,
        lab_cohort: parse_lab_cohort_str(lab_json.as_deref())
            .context("Invalid lab cohort trajectory")?,
    })
}

fn print_grid(files: &PatientFiles) -> anyhow::Result<()> {
    let loaded = load(files)?;
    let config = DashboardConfig::default();
    let dashboard = build_dashboard(loaded.sources(), &config, &ViewState::new(&config));

    println!(
        "Patient: {}\nGrid orders: {}..={}\nObservations: {}",
        dashboard.patient.patient_code,
        dashboard.grid.min_order(),
        dashboard.grid.max_order(),
        dashboard.grid.observations().count(),
    );
    for channel in Channel::ALL {
        let chart = dashboard.chart(channel);
        let measured = chart.actual.iter().filter(|value| value.is_some()).count();
        let region = chart
            .forecast_region
            .map(|(start, end)| format!("{start}..{end}"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{}: {measured} measured, {} reference points, forecast region {region}",
            channel.as_str().to_uppercase(),
            chart.reference_median.len(),
        );
    }
    for warning in &dashboard.threshold_warnings {
        println!("Threshold mismatch: {warning}");
    }
    Ok(())
}

fn print_pinned(files: &PatientFiles, order: Option<u32>, json: bool) -> anyhow::Result<()> {
    let loaded = load(files)?;
    let config = DashboardConfig::default();
    let initial = build_dashboard(loaded.sources(), &config, &ViewState::new(&config));
    let view = pin_view(&initial.view, &initial.grid, order)?;

    let dashboard = build_dashboard(loaded.sources(), &config, &view);
    let pinned = dashboard
        .focus
        .as_ref()
        .context("Pinned order has no panel snapshot")?;

    println!(
        "{} (order {}), risk {}{}",
        pinned.time_key.as_deref().unwrap_or("-"),
        pinned.order,
        pinned.effective_risk_level.as_str(),
        if pinned.risk_escalated { " (raised by thresholds)" } else { "" }
    );
    for channel in Channel::ALL {
        let reading = pinned.reading(channel);
        println!(
            "  {}: {} predicted {} severity {}",
            channel.as_str().to_uppercase(),
            format_channel(channel, reading.value),
            format_channel(channel, reading.prediction.value),
            reading.severity.map_or("-", |severity| severity.as_str()),
        );
    }
    for note in &dashboard.notes {
        println!("  - {}", note.text);
    }
    if json {
        println!("{}", serde_json::to_string_pretty(pinned)?);
    }
    Ok(())
}

fn print_summary(summary: &Path, channels: Option<&Path>) -> anyhow::Result<()> {
    let summary = parse_data_summary_str(&read(summary)?)
        .with_context(|| format!("Invalid data summary {summary:?}"))?;
    let channels = channels
        .map(|path| {
            parse_channel_overview_str(&read(path)?)
                .with_context(|| format!("Invalid channel overview {path:?}"))
        })
        .transpose()?;
    let overview = cohort_overview(&summary, channels.as_ref());

    println!(
        "Patients: {} ({} improved, {} with anomalies)\nAverage risk: {:.1}",
        overview.n_patients,
        overview.improved_proxy_count,
        overview.patients_with_anomalies,
        overview.average_risk_score,
    );
    for share in &overview.risk_shares {
        println!("  {}: {} ({:.1}%)", share.level.as_str(), share.count, share.percent);
    }
    for entry in &overview.completeness {
        println!(
            "{}: {} measurements over {} timepoints, completeness {}",
            entry.channel.as_str().to_uppercase(),
            entry.n_measurements,
            entry.n_time_keys,
            entry
                .percent
                .map_or_else(|| "-".to_string(), |percent| format!("{percent:.1}%")),
        );
    }
    Ok(())
}

/// Pins `order`, or the highest-risk observation when no order is given.
fn pin_view(view: &ViewState, grid: &TimelineGrid, order: Option<u32>) -> anyhow::Result<ViewState> {
    let action = match order {
        Some(order) => ViewAction::Select { order },
        None => ViewAction::MaxRisk,
    };
    let pinned = view.apply(action, grid);
    if pinned.is_pinned() {
        return Ok(pinned);
    }
    Err(match order {
        Some(order) => anyhow!("Order {order} is outside the grid 1..={}", grid.max_order()),
        None => anyhow!("Patient has no observations to pin"),
    })
}

fn export(
    features: &Path,
    format: ExportFormat,
    output: Option<PathBuf>,
    query: &PatientQuery,
) -> anyhow::Result<()> {
    let features = parse_patient_features_str(&read(features)?)
        .with_context(|| format!("Invalid patient features {features:?}"))?;
    let rows = query_patients(&features.patients, query);
    let now = chrono::Local::now().naive_local();

    let (body, extension) = match format {
        ExportFormat::Csv => (export_csv(&rows), "csv"),
        ExportFormat::Html => (export_print_html(&rows, None, now), "html"),
    };
    let output =
        output.unwrap_or_else(|| PathBuf::from(report_file_name(None, now.date(), extension)));

    std::fs::write(&output, body).with_context(|| format!("Could not write {output:?}"))?;
    tracing::info!(rows = rows.len(), path = ?output, "export written");
    println!("Wrote {} patients to {}", rows.len(), output.display());
    Ok(())
}

fn parse_risk_level(value: &str) -> Result<RiskLevel, String> {
    let wanted = value.trim().to_lowercase();
    RiskLevel::ALL
        .into_iter()
        .find(|level| {
            level.as_str().to_lowercase() == wanted || format!("{level:?}").to_lowercase() == wanted
        })
        .ok_or_else(|| format!("unknown risk level {value:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kimerizm_core::{build_grid, BandPoint, CohortPoint, TimelinePoint};

    fn grid(timeline: &[TimelinePoint]) -> TimelineGrid {
        build_grid::<BandPoint, CohortPoint>(timeline, &[], &[])
    }

    #[test]
    fn pin_reports_why_nothing_was_pinned() {
        let empty = grid(&[]);
        let view = ViewState::default();

        let err = pin_view(&view, &empty, None).expect_err("nothing to pin");
        assert_eq!(err.to_string(), "Patient has no observations to pin");

        let err = pin_view(&view, &empty, Some(5)).expect_err("outside the grid");
        assert_eq!(err.to_string(), "Order 5 is outside the grid 1..=1");
    }

    #[test]
    fn pin_defaults_to_the_highest_risk_observation() {
        let timeline = vec![
            TimelinePoint {
                time_key: "Day_1".to_string(),
                time_order: 1,
                risk_score: Some(20.0),
                ..TimelinePoint::default()
            },
            TimelinePoint {
                time_key: "Day_3".to_string(),
                time_order: 3,
                risk_score: Some(70.0),
                ..TimelinePoint::default()
            },
        ];
        let view = pin_view(&ViewState::default(), &grid(&timeline), None).expect("pinned");
        assert_eq!(view.pinned, Some(3));
    }

    #[test]
    fn risk_levels_accept_wire_and_english_names() {
        assert_eq!(parse_risk_level("kritik"), Ok(RiskLevel::Critical));
        assert_eq!(parse_risk_level("VeryCritical"), Ok(RiskLevel::VeryCritical));
        assert!(parse_risk_level("unknown").is_err());
    }
}
