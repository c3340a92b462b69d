//! Pinned-point analysis panel for the WebAssembly build.

#[cfg(target_arch = "wasm32")]
mod styles;

#[cfg(target_arch = "wasm32")]
mod wasm_ui {
    use std::rc::Rc;

    use crate::styles;
    use kimerizm_artifacts::{build_dashboard, DashboardSources, PatientDashboard};
    use kimerizm_core::format::{channel_decimals, format_channel, format_number, MISSING};
    use kimerizm_core::{
        build_grid, Channel, ChannelReading, ClinicalNote, CohortTrajectory, DashboardConfig,
        LabCohortTrajectory, NoteFilter, NoteKind, PatientRecord, PinnedPoint, ReferenceBand,
        TimelineGrid, ViewAction, ViewState,
    };
    use serde_wasm_bindgen::from_value;
    use wasm_bindgen::prelude::*;
    use web_sys::{console, Document, Element, Window};
    use yew::prelude::*;

    #[derive(Properties, PartialEq)]
    pub struct PatientPanelProps {
        pub patient: PatientRecord,
        pub reference: ReferenceBand,
        pub cohort: CohortTrajectory,
        pub lab_cohort: LabCohortTrajectory,
        pub config: DashboardConfig,
    }

    /// Reducer state: the grid actions are resolved against plus the view.
    #[derive(PartialEq)]
    struct PanelState {
        grid: TimelineGrid,
        view: ViewState,
    }

    impl Reducible for PanelState {
        type Action = ViewAction;

        fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
            let view = self.view.apply(action, &self.grid);
            if view == self.view {
                return self;
            }
            Rc::new(PanelState {
                grid: self.grid.clone(),
                view,
            })
        }
    }

    #[function_component(PatientPanel)]
    fn patient_panel(props: &PatientPanelProps) -> Html {
        use_effect_with((), |_| {
            if let Some(window) = web_sys::window() {
                if let Some(document) = window.document() {
                    if let Err(err) = styles::ensure_styles(&document) {
                        console::error_1(&err);
                    }
                }
            }
            || ()
        });

        let state = {
            let grid = build_grid(
                &props.patient.timeline,
                &props.reference.bands.kmr,
                &props.cohort.trajectory,
            );
            let view = ViewState::new(&props.config);
            use_reducer(move || PanelState { grid, view })
        };

        let dashboard = build_dashboard(
            DashboardSources {
                patient: &props.patient,
                reference: &props.reference,
                cohort: &props.cohort,
                lab_cohort: &props.lab_cohort,
            },
            &props.config,
            &state.view,
        );

        let dispatch = |action: ViewAction| {
            let state = state.clone();
            Callback::from(move |_: MouseEvent| state.dispatch(action))
        };

        let pinned = state.view.pinned;
        let at_start = pinned.is_some_and(|order| state.grid.previous_observation(order).is_none());
        let at_end = pinned.is_some_and(|order| state.grid.next_observation(order).is_none());

        html! {
            <section class="kimerizm-panel" aria-live="polite">
                { render_header(&dashboard) }
                <nav class="panel-nav" aria-label="Timepoint navigation">
                    <button type="button" onclick={dispatch(ViewAction::First)}>{"First"}</button>
                    <button type="button" onclick={dispatch(ViewAction::Previous)} disabled={pinned.is_none() || at_start}>{"Previous"}</button>
                    <button type="button" onclick={dispatch(ViewAction::Next)} disabled={pinned.is_none() || at_end}>{"Next"}</button>
                    <button type="button" onclick={dispatch(ViewAction::Last)}>{"Last"}</button>
                    <button type="button" onclick={dispatch(ViewAction::MaxRisk)}>{"Highest risk"}</button>
                    <button type="button" onclick={dispatch(ViewAction::Clear)} disabled={pinned.is_none()}>{"Clear"}</button>
                    <button type="button" onclick={dispatch(ViewAction::ToggleModerateThresholds)} aria-pressed={dashboard.view.show_moderate_thresholds.to_string()}>
                        {"Moderate thresholds"}
                    </button>
                </nav>
                <div class="order-strip" role="group" aria-label="Timepoints">
                    {
                        for state.grid.cells().iter().map(|cell| {
                            let label = cell.time_key.clone().unwrap_or_else(|| cell.order.to_string());
                            html! {
                                <button
                                    type="button"
                                    data-observed={cell.observation.is_some().to_string()}
                                    aria-pressed={(pinned == Some(cell.order)).to_string()}
                                    onclick={dispatch(ViewAction::Select { order: cell.order })}
                                >
                                    { label }
                                </button>
                            }
                        })
                    }
                </div>
                { render_readings(dashboard.focus.as_ref()) }
                <div class="note-tabs" role="tablist">
                    {
                        for [
                            (NoteFilter::All, "All"),
                            (NoteFilter::Action, "Action"),
                            (NoteFilter::Watch, "Watch"),
                            (NoteFilter::Info, "Info"),
                        ].into_iter().map(|(filter, label)| html! {
                            <button
                                type="button"
                                role="tab"
                                aria-pressed={(dashboard.view.note_filter == filter).to_string()}
                                onclick={dispatch(ViewAction::SetNoteFilter { filter })}
                            >
                                { label }
                            </button>
                        })
                    }
                </div>
                { render_notes(&dashboard.notes) }
            </section>
        }
    }

    fn render_header(dashboard: &PatientDashboard) -> Html {
        let focus = dashboard.focus.as_ref();
        let focus_label = match focus {
            Some(point) if dashboard.view.is_pinned() => {
                format!("Pinned: {}", point.time_key.as_deref().unwrap_or(MISSING))
            }
            Some(point) => format!("Latest: {}", point.time_key.as_deref().unwrap_or(MISSING)),
            None => "No measurements".to_string(),
        };

        html! {
            <header class="panel-header">
                <div>
                    <h2>{ format!("Patient {}", dashboard.patient.patient_code) }</h2>
                    <span class="panel-focus">{ focus_label }</span>
                </div>
                {
                    match focus {
                        Some(point) => html! {
                            <span
                                class="risk-badge"
                                style={format!("background: {}", point.effective_risk_level.color())}
                                data-escalated={point.risk_escalated.to_string()}
                                title={format!("Risk score {}", format_number(point.risk_score, 1))}
                            >
                                { point.effective_risk_level.as_str() }
                            </span>
                        },
                        None => html! {},
                    }
                }
            </header>
        }
    }

    fn render_readings(focus: Option<&PinnedPoint>) -> Html {
        let Some(point) = focus else {
            return html! { <p class="panel-empty">{"No timepoint to analyse."}</p> };
        };

        html! {
            <table class="readings">
                <thead>
                    <tr>
                        <th>{"Channel"}</th>
                        <th>{"Value"}</th>
                        <th>{"Predicted"}</th>
                        <th>{"Change"}</th>
                        <th>{"Anomaly"}</th>
                    </tr>
                </thead>
                <tbody>
                    { for Channel::ALL.into_iter().map(|channel| render_reading(point.reading(channel))) }
                </tbody>
            </table>
        }
    }

    fn render_reading(reading: &ChannelReading) -> Html {
        let decimals = channel_decimals(reading.channel);
        let severity = reading.severity.map_or("none", |severity| severity.as_str());
        let anomaly = if reading.anomaly.flag {
            format!("Yes ({})", format_number(reading.anomaly.score, 2))
        } else {
            "No".to_string()
        };

        html! {
            <tr>
                <th scope="row">{ reading.channel.as_str().to_uppercase() }</th>
                <td data-severity={severity}>{ format_channel(reading.channel, reading.value) }</td>
                <td>{ format_channel(reading.channel, reading.prediction.value) }</td>
                <td>{ format_number(reading.delta, decimals) }</td>
                <td>{ anomaly }</td>
            </tr>
        }
    }

    fn render_notes(notes: &[ClinicalNote]) -> Html {
        if notes.is_empty() {
            return html! { <p class="panel-empty">{"No notes for this filter."}</p> };
        }

        html! {
            <ul class="notes">
                {
                    for notes.iter().map(|note| html! {
                        <li data-kind={note_kind(note.kind)}>{ note.text.clone() }</li>
                    })
                }
            </ul>
        }
    }

    fn note_kind(kind: NoteKind) -> &'static str {
        match kind {
            NoteKind::Success => "success",
            NoteKind::Warning => "warning",
            NoteKind::Danger => "danger",
            NoteKind::Info => "info",
        }
    }

    #[wasm_bindgen]
    pub fn mount_patient_panel(
        selector: &str,
        patient: JsValue,
        reference: JsValue,
        cohort: JsValue,
        lab_cohort: JsValue,
        config: JsValue,
    ) -> Result<(), JsValue> {
        let window: Window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;
        let document: Document = window
            .document()
            .ok_or_else(|| JsValue::from_str("No document available"))?;

        let target: Element = document
            .query_selector(selector)
            .map_err(|err| JsValue::from_str(&format!("Invalid selector: {err:?}")))?
            .ok_or_else(|| JsValue::from_str("No element matches the selector"))?;

        let lab_cohort = if lab_cohort.is_null() || lab_cohort.is_undefined() {
            LabCohortTrajectory::default()
        } else {
            from_value(lab_cohort)?
        };
        let config = if config.is_null() || config.is_undefined() {
            DashboardConfig::default()
        } else {
            from_value(config)?
        };

        let props = PatientPanelProps {
            patient: from_value(patient)?,
            reference: from_value(reference)?,
            cohort: from_value(cohort)?,
            lab_cohort,
            config,
        };

        yew::Renderer::<PatientPanel>::with_root_and_props(target, props).render();
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm_ui::mount_patient_panel;

#[cfg(not(target_arch = "wasm32"))]
pub fn mount_patient_panel(
    _: &str,
    _: wasm_bindgen::JsValue,
    _: wasm_bindgen::JsValue,
    _: wasm_bindgen::JsValue,
    _: wasm_bindgen::JsValue,
    _: wasm_bindgen::JsValue,
) -> Result<(), wasm_bindgen::JsValue> {
    Err(wasm_bindgen::JsValue::from_str(
        "kimerizm-ui only supports the wasm32 target",
    ))
}
