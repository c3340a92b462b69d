//! Snapshot of a user-selected timepoint for the analysis panel.

use serde::{Deserialize, Serialize};

use crate::config::ClinicalThresholds;
use crate::grid::TimelineGrid;
use crate::severity::{classify, escalate_risk, Severity};
use crate::{Anomaly, Channel, Prediction, RiskLevel, TimelinePoint};

/// Everything the panel shows about one channel at the pinned order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChannelReading {
    pub channel: Channel,
    pub value: Option<f64>,
    pub prediction: Prediction,
    pub anomaly: Anomaly,
    pub severity: Option<Severity>,
    /// Change against the previous observation.
    pub delta: Option<f64>,
}

/// Position of an adjacent observation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NeighborPoint {
    pub order: u32,
    pub time_key: String,
}

impl NeighborPoint {
    fn of(point: &TimelinePoint) -> Self {
        Self {
            order: point.time_order,
            time_key: point.time_key.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PinnedPoint {
    pub order: u32,
    pub time_key: Option<String>,
    /// False when the pinned cell is a gap in the patient's timeline.
    pub has_observation: bool,
    pub kmr: ChannelReading,
    pub kre: ChannelReading,
    pub gfr: ChannelReading,
    pub previous: Option<NeighborPoint>,
    pub next: Option<NeighborPoint>,
    /// Measured KMR minus predicted KMR.
    pub prediction_error: Option<f64>,
    pub risk_score: Option<f64>,
    pub risk_level: Option<RiskLevel>,
    /// Recorded level raised by channel thresholds.
    pub effective_risk_level: RiskLevel,
    pub risk_escalated: bool,
    pub any_anomaly: bool,
}

impl PinnedPoint {
    pub fn reading(&self, channel: Channel) -> &ChannelReading {
        match channel {
            Channel::Kmr => &self.kmr,
            Channel::Kre => &self.kre,
            Channel::Gfr => &self.gfr,
        }
    }
}

/// Projects the grid cell at `order` into a panel snapshot.
///
/// Returns `None` only when `order` lies outside the grid.
pub fn project(grid: &TimelineGrid, order: u32, thresholds: &ClinicalThresholds) -> Option<PinnedPoint> {
    let cell = grid.cell(order)?;
    let observation = cell.observation.as_ref();
    let previous = grid.previous_observation(order);
    let next = grid.next_observation(order);

    let reading = |channel: Channel| {
        let value = observation.and_then(|point| point.value(channel));
        let delta = match (value, previous.and_then(|point| point.value(channel))) {
            (Some(current), Some(before)) => Some(current - before),
            _ => None,
        };
        ChannelReading {
            channel,
            value,
            prediction: observation
                .map(|point| point.prediction(channel))
                .unwrap_or_default(),
            anomaly: observation
                .map(|point| point.anomaly(channel))
                .unwrap_or_default(),
            severity: value.and_then(|value| classify(channel, value, thresholds)),
            delta,
        }
    };

    let kmr = reading(Channel::Kmr);
    let kre = reading(Channel::Kre);
    let gfr = reading(Channel::Gfr);

    let risk_level = observation.and_then(|point| point.risk_level);
    let effective_risk_level = escalate_risk(risk_level, [kmr.severity, kre.severity, gfr.severity]);
    let prediction_error = match (kmr.value, kmr.prediction.value) {
        (Some(actual), Some(predicted)) => Some(actual - predicted),
        _ => None,
    };

    Some(PinnedPoint {
        order,
        time_key: cell.time_key.clone(),
        has_observation: observation.is_some(),
        previous: previous.map(NeighborPoint::of),
        next: next.map(NeighborPoint::of),
        prediction_error,
        risk_score: observation.and_then(|point| point.risk_score),
        risk_level,
        effective_risk_level,
        risk_escalated: effective_risk_level > risk_level.unwrap_or(RiskLevel::Normal),
        any_anomaly: observation.is_some_and(TimelinePoint::has_anomaly),
        kmr,
        kre,
        gfr,
    })
}
