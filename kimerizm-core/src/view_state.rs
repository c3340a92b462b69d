//! Session-local view state of the patient page, driven by discrete actions.

use serde::{Deserialize, Serialize};

use crate::config::DashboardConfig;
use crate::grid::TimelineGrid;
use crate::notes::NoteFilter;
use crate::{Channel, TimelinePoint};

/// Toggleable chart layer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Reference,
    Prediction,
    PredictionBand,
    Cohort,
    Thresholds,
}

/// Visible layers of one channel chart.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChannelLayers {
    pub reference: bool,
    pub prediction: bool,
    pub prediction_band: bool,
    pub cohort: bool,
    pub thresholds: bool,
}

impl Default for ChannelLayers {
    fn default() -> Self {
        Self {
            reference: true,
            prediction: true,
            prediction_band: true,
            cohort: true,
            thresholds: true,
        }
    }
}

impl ChannelLayers {
    pub fn is_on(&self, layer: Layer) -> bool {
        match layer {
            Layer::Reference => self.reference,
            Layer::Prediction => self.prediction,
            Layer::PredictionBand => self.prediction_band,
            Layer::Cohort => self.cohort,
            Layer::Thresholds => self.thresholds,
        }
    }

    fn toggle(&mut self, layer: Layer) {
        let flag = match layer {
            Layer::Reference => &mut self.reference,
            Layer::Prediction => &mut self.prediction,
            Layer::PredictionBand => &mut self.prediction_band,
            Layer::Cohort => &mut self.cohort,
            Layer::Thresholds => &mut self.thresholds,
        };
        *flag = !*flag;
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct LayerToggles {
    pub kmr: ChannelLayers,
    pub kre: ChannelLayers,
    pub gfr: ChannelLayers,
}

impl LayerToggles {
    pub fn get(&self, channel: Channel) -> &ChannelLayers {
        match channel {
            Channel::Kmr => &self.kmr,
            Channel::Kre => &self.kre,
            Channel::Gfr => &self.gfr,
        }
    }

    fn get_mut(&mut self, channel: Channel) -> &mut ChannelLayers {
        match channel {
            Channel::Kmr => &mut self.kmr,
            Channel::Kre => &mut self.kre,
            Channel::Gfr => &mut self.gfr,
        }
    }
}

/// User interaction on the patient page.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewAction {
    /// Click on a plotted point.
    Select { order: u32 },
    Clear,
    First,
    Last,
    Previous,
    Next,
    MaxRisk,
    ToggleLayer { channel: Channel, layer: Layer },
    ToggleModerateThresholds,
    SetNoteFilter { filter: NoteFilter },
}

/// Pinned selection and layer switches; replaced wholesale on every action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ViewState {
    pub pinned: Option<u32>,
    pub layers: LayerToggles,
    pub show_moderate_thresholds: bool,
    pub note_filter: NoteFilter,
}

impl ViewState {
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            pinned: None,
            layers: config.default_layers,
            show_moderate_thresholds: config.show_moderate_thresholds,
            note_filter: NoteFilter::default(),
        }
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned.is_some()
    }

    /// Order the analysis panel describes: the pinned one, else the latest observation.
    pub fn focus_order(&self, grid: &TimelineGrid) -> Option<u32> {
        self.pinned
            .or_else(|| grid.last_observation().map(|point| point.time_order))
    }

    /// Returns the state after `action`. Navigation that has nowhere to go
    /// leaves the state unchanged.
    pub fn apply(&self, action: ViewAction, grid: &TimelineGrid) -> ViewState {
        let mut next = self.clone();

        match action {
            ViewAction::Select { order } => {
                if grid.contains(order) {
                    next.pinned = Some(order);
                }
            }
            ViewAction::Clear => next.pinned = None,
            ViewAction::First => {
                if let Some(point) = grid.first_observation() {
                    next.pinned = Some(point.time_order);
                }
            }
            ViewAction::Last => {
                if let Some(point) = grid.last_observation() {
                    next.pinned = Some(point.time_order);
                }
            }
            ViewAction::Previous => {
                if let Some(point) = self.pinned.and_then(|order| grid.previous_observation(order)) {
                    next.pinned = Some(point.time_order);
                }
            }
            ViewAction::Next => {
                if let Some(point) = self.pinned.and_then(|order| grid.next_observation(order)) {
                    next.pinned = Some(point.time_order);
                }
            }
            ViewAction::MaxRisk => {
                if let Some(point) = max_risk_observation(grid) {
                    next.pinned = Some(point.time_order);
                }
            }
            ViewAction::ToggleLayer { channel, layer } => {
                next.layers.get_mut(channel).toggle(layer);
            }
            ViewAction::ToggleModerateThresholds => {
                next.show_moderate_thresholds = !next.show_moderate_thresholds;
            }
            ViewAction::SetNoteFilter { filter } => next.note_filter = filter,
        }

        next
    }
}

// Earliest observation with the highest risk score; scored points beat unscored ones.
fn max_risk_observation(grid: &TimelineGrid) -> Option<&TimelinePoint> {
    grid.observations().fold(None, |best: Option<&TimelinePoint>, point| match best {
        None => Some(point),
        Some(current) => match (point.risk_score, current.risk_score) {
            (Some(candidate), Some(leader)) if candidate > leader => Some(point),
            (Some(_), None) => Some(point),
            _ => Some(current),
        },
    })
}
