//! Framework-neutral WASM <-> JavaScript bridge.
//!
//! Every function takes the raw artifact JSON as fetched by the page and
//! returns plain JS objects; no state is kept on the Rust side.

use serde::Deserialize;
use serde_json::Value;
use serde_wasm_bindgen::{from_value, to_value};
use kimerizm_artifacts::{
    build_dashboard, cohort_overview, export_csv, parse_channel_overview_value,
    parse_cohort_value, parse_data_summary_value, parse_lab_cohort_value,
    parse_patient_features_value, parse_patient_value, parse_reference_band_value,
    query_patients, ArtifactKind, DashboardSources, PatientQuery,
};
use kimerizm_core::{
    build_grid, project, ClinicalThresholds, CohortTrajectory, DashboardConfig, DashboardError,
    LabCohortTrajectory, LayerToggles, PatientRecord, ReferenceBand, TimelineGrid, ViewAction,
    ViewState,
};
use wasm_bindgen::prelude::*;

#[derive(Deserialize)]
struct JsDashboardConfig {
    #[serde(default)]
    thresholds: Option<ClinicalThresholds>,
    #[serde(default)]
    base_path: Option<String>,
    #[serde(default)]
    default_layers: Option<LayerToggles>,
    #[serde(default)]
    show_moderate_thresholds: Option<bool>,
}

impl From<JsDashboardConfig> for DashboardConfig {
    fn from(cfg: JsDashboardConfig) -> Self {
        let mut base = DashboardConfig::default();
        if let Some(thresholds) = cfg.thresholds {
            base.thresholds = thresholds;
        }
        if let Some(base_path) = cfg.base_path {
            base.base_path = base_path;
        }
        if let Some(layers) = cfg.default_layers {
            base.default_layers = layers;
        }
        if let Some(show) = cfg.show_moderate_thresholds {
            base.show_moderate_thresholds = show;
        }
        base
    }
}

struct Sources {
    patient: PatientRecord,
    reference: ReferenceBand,
    cohort: CohortTrajectory,
    lab_cohort: LabCohortTrajectory,
}

impl Sources {
    fn read(
        patient: JsValue,
        reference: JsValue,
        cohort: JsValue,
        lab_cohort: Option<JsValue>,
    ) -> Result<Self, JsValue> {
        let lab_cohort = match lab_cohort.filter(|value| !value.is_null() && !value.is_undefined()) {
            Some(value) => {
                parse_lab_cohort_value(&read_json(value, "lab cohort")?).map_err(dashboard_error)?
            }
            None => LabCohortTrajectory::default(),
        };
        let patient = parse_patient_value(&read_json(patient, "patient")?).map_err(dashboard_error)?;
        let reference = parse_reference_band_value(&read_json(reference, "reference band")?)
            .map_err(dashboard_error)?;
        let cohort = parse_cohort_value(&read_json(cohort, "cohort trajectory")?)
            .map_err(dashboard_error)?;

        Ok(Self {
            patient,
            reference,
            cohort,
            lab_cohort,
        })
    }

    fn as_sources(&self) -> DashboardSources<'_> {
        DashboardSources {
            patient: &self.patient,
            reference: &self.reference,
            cohort: &self.cohort,
            lab_cohort: &self.lab_cohort,
        }
    }

    fn grid(&self) -> TimelineGrid {
        build_grid(
            &self.patient.timeline,
            &self.reference.bands.kmr,
            &self.cohort.trajectory,
        )
    }
}

/// Builds the full patient page for the given view state (initial state when omitted).
#[wasm_bindgen]
pub fn build_patient_dashboard(
    patient: JsValue,
    reference: JsValue,
    cohort: JsValue,
    lab_cohort: Option<JsValue>,
    view: Option<JsValue>,
    config: Option<JsValue>,
) -> Result<JsValue, JsValue> {
    install_panic_hook();

    let cfg = read_config(config)?;
    let sources = Sources::read(patient, reference, cohort, lab_cohort)?;
    let view = match view {
        Some(js_view) => from_value::<ViewState>(js_view)
            .map_err(|err| JsValue::from_str(&format!("Could not read view state: {err}")))?,
        None => ViewState::new(&cfg),
    };

    let dashboard = build_dashboard(sources.as_sources(), &cfg, &view);
    to_value(&dashboard)
        .map_err(|err| JsValue::from_str(&format!("Could not serialize dashboard: {err}")))
}

/// Returns the view state after `action`.
#[wasm_bindgen]
pub fn apply_view_action(
    view: JsValue,
    action: JsValue,
    patient: JsValue,
    reference: JsValue,
    cohort: JsValue,
) -> Result<JsValue, JsValue> {
    install_panic_hook();

    let view: ViewState = from_value(view)
        .map_err(|err| JsValue::from_str(&format!("Could not read view state: {err}")))?;
    let action: ViewAction = from_value(action)
        .map_err(|err| JsValue::from_str(&format!("Could not read view action: {err}")))?;
    let sources = Sources::read(patient, reference, cohort, None)?;

    let next = view.apply(action, &sources.grid());
    to_value(&next)
        .map_err(|err| JsValue::from_str(&format!("Could not serialize view state: {err}")))
}

/// Panel snapshot at `order`; `null` when the order is outside the grid.
#[wasm_bindgen]
pub fn project_pinned_point(
    patient: JsValue,
    reference: JsValue,
    cohort: JsValue,
    order: u32,
    config: Option<JsValue>,
) -> Result<JsValue, JsValue> {
    install_panic_hook();

    let cfg = read_config(config)?;
    let sources = Sources::read(patient, reference, cohort, None)?;
    match project(&sources.grid(), order, &cfg.thresholds) {
        Some(pinned) => to_value(&pinned)
            .map_err(|err| JsValue::from_str(&format!("Could not serialize pinned point: {err}"))),
        None => Ok(JsValue::NULL),
    }
}

/// Filtered and sorted patient list.
#[wasm_bindgen]
pub fn query_patient_list(features: JsValue, query: Option<JsValue>) -> Result<JsValue, JsValue> {
    install_panic_hook();

    let features = parse_patient_features_value(&read_json(features, "patient features")?)
        .map_err(dashboard_error)?;
    let query = read_query(query)?;
    let rows = query_patients(&features.patients, &query);
    to_value(&rows)
        .map_err(|err| JsValue::from_str(&format!("Could not serialize patients: {err}")))
}

/// Home-page KPIs from `data_summary.json` and, when loaded, `channel_overview.json`.
#[wasm_bindgen]
pub fn build_cohort_overview(summary: JsValue, channels: Option<JsValue>) -> Result<JsValue, JsValue> {
    install_panic_hook();

    let summary =
        parse_data_summary_value(&read_json(summary, "data summary")?).map_err(dashboard_error)?;
    let channels = match channels.filter(|value| !value.is_null() && !value.is_undefined()) {
        Some(value) => Some(
            parse_channel_overview_value(&read_json(value, "channel overview")?)
                .map_err(dashboard_error)?,
        ),
        None => None,
    };
    to_value(&cohort_overview(&summary, channels.as_ref()))
        .map_err(|err| JsValue::from_str(&format!("Could not serialize overview: {err}")))
}

/// CSV text of the patient list after applying `query`.
#[wasm_bindgen]
pub fn export_patients_csv(features: JsValue, query: Option<JsValue>) -> Result<String, JsValue> {
    install_panic_hook();

    let features = parse_patient_features_value(&read_json(features, "patient features")?)
        .map_err(dashboard_error)?;
    let query = read_query(query)?;
    Ok(export_csv(&query_patients(&features.patients, &query)))
}

/// Fetch URL and cache lifetime of an artifact.
#[wasm_bindgen]
pub fn artifact_location(
    name: &str,
    patient_id: Option<String>,
    config: Option<JsValue>,
) -> Result<JsValue, JsValue> {
    let cfg = read_config(config)?;
    let kind: ArtifactKind = name.parse().map_err(dashboard_error)?;
    let url = kind
        .url(&cfg.base_path, patient_id.as_deref())
        .map_err(dashboard_error)?;
    let location = serde_json::json!({
        "url": url,
        "stale_after_ms": kind.stale_after().num_milliseconds(),
        "optional": kind.optional(),
    });
    to_value(&location)
        .map_err(|err| JsValue::from_str(&format!("Could not serialize location: {err}")))
}

fn install_panic_hook() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

fn read_json(value: JsValue, what: &str) -> Result<Value, JsValue> {
    from_value::<Value>(value)
        .map_err(|err| JsValue::from_str(&format!("Could not read {what} JSON: {err}")))
}

fn read_config(config: Option<JsValue>) -> Result<DashboardConfig, JsValue> {
    match config {
        Some(js_cfg) => {
            let cfg: JsDashboardConfig = from_value(js_cfg)
                .map_err(|err| JsValue::from_str(&format!("Could not read config: {err}")))?;
            Ok(DashboardConfig::from(cfg))
        }
        None => Ok(DashboardConfig::default()),
    }
}

fn read_query(query: Option<JsValue>) -> Result<PatientQuery, JsValue> {
    match query {
        Some(js_query) => from_value(js_query)
            .map_err(|err| JsValue::from_str(&format!("Could not read patient query: {err}"))),
        None => Ok(PatientQuery::default()),
    }
}

fn dashboard_error(err: DashboardError) -> JsValue {
    JsValue::from_str(&format!("Dashboard error: {err}"))
}
