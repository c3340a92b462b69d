//! Composition of every display series of one channel chart.

use serde::{Deserialize, Serialize};

use crate::bands::BandPoint;
use crate::config::ClinicalThresholds;
use crate::forecast::{
    channel_anchor, forecast_region, split_forecast, split_interval, BandPolygon, ForecastSplit,
    IntervalSplit,
};
use crate::grid::TimelineGrid;
use crate::reindex::Aligned;
use crate::severity::Severity;
use crate::view_state::{Layer, ViewState};
use crate::{Channel, LastStatus};

/// Horizontal reference line at a clinical cut-off.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThresholdLine {
    pub value: f64,
    pub severity: Severity,
    pub label: String,
}

/// Threshold lines of a channel; moderate lines only when requested.
pub fn threshold_lines(
    channel: Channel,
    thresholds: &ClinicalThresholds,
    include_moderate: bool,
) -> Vec<ThresholdLine> {
    let (critical, moderate, critical_label, moderate_label) = match channel {
        Channel::Kmr => (
            thresholds.kmr_critical_above,
            thresholds.kmr_moderate_above,
            format!("KMR >{}% critical", thresholds.kmr_critical_above),
            format!("KMR >{}% moderate", thresholds.kmr_moderate_above),
        ),
        Channel::Kre => (
            thresholds.kre_critical_above,
            thresholds.kre_moderate_above,
            format!("KRE >{} critical", thresholds.kre_critical_above),
            format!("KRE >{} moderate", thresholds.kre_moderate_above),
        ),
        Channel::Gfr => (
            thresholds.gfr_critical_below,
            thresholds.gfr_moderate_below,
            format!("GFR <{} critical", thresholds.gfr_critical_below),
            format!("GFR <{} moderate", thresholds.gfr_moderate_below),
        ),
    };

    let mut lines = vec![ThresholdLine {
        value: critical,
        severity: Severity::Critical,
        label: critical_label,
    }];
    if include_moderate {
        lines.push(ThresholdLine {
            value: moderate,
            severity: Severity::Moderate,
            label: moderate_label,
        });
    }
    lines
}

/// External data a channel chart is drawn against.
#[derive(Debug, Clone, Copy)]
pub struct ChartInputs<'a> {
    /// Reference band already aligned on the grid.
    pub reference: &'a [Aligned<BandPoint>],
    /// Cohort overlay, one slot per grid cell.
    pub cohort: &'a [Option<f64>],
    pub last_status: &'a LastStatus,
    pub thresholds: &'a ClinicalThresholds,
}

/// Display-ready series of one channel; disabled layers are `None`/empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChannelChart {
    pub channel: Channel,
    pub orders: Vec<u32>,
    pub actual: Vec<Option<f64>>,
    /// Orders whose observation is flagged anomalous for this channel.
    pub anomalies: Vec<u32>,
    pub prediction: Option<ForecastSplit>,
    pub prediction_band: Option<IntervalSplit>,
    pub forecast_region: Option<(f64, f64)>,
    pub reference_iqr: Option<BandPolygon>,
    pub reference_median: Vec<(u32, f64)>,
    pub cohort: Option<Vec<Option<f64>>>,
    pub thresholds: Vec<ThresholdLine>,
}

impl ChannelChart {
    /// True when the patient has at least one measurement of the channel.
    pub fn has_data(&self) -> bool {
        self.actual.iter().any(Option::is_some)
    }
}

pub fn compose_channel_chart(
    grid: &TimelineGrid,
    channel: Channel,
    inputs: ChartInputs<'_>,
    view: &ViewState,
) -> ChannelChart {
    let layers = view.layers.get(channel);
    let anchor = channel_anchor(grid, inputs.last_status, channel);

    let anomalies = grid
        .observations()
        .filter(|point| point.anomaly(channel).flag)
        .map(|point| point.time_order)
        .collect();

    // A forecast without a measured history has nothing to hang from; not drawn.
    let prediction = (layers.is_on(Layer::Prediction) && anchor.is_some())
        .then(|| {
            let series = grid.series(|point| point.prediction(channel).value);
            split_forecast(grid, &series, anchor)
        })
        .filter(|split| split.has_past() || split.has_future());

    let prediction_band = layers.is_on(Layer::PredictionBand).then(|| {
        let lower = grid.series(|point| point.prediction(channel).lo);
        let upper = grid.series(|point| point.prediction(channel).hi);
        split_interval(grid, &lower, &upper, anchor)
    });

    let forecast_region = prediction
        .as_ref()
        .and_then(|split| forecast_region(grid, split));

    let (reference_iqr, reference_median) = if layers.is_on(Layer::Reference) {
        let bounds: Vec<(u32, f64, f64)> = inputs
            .reference
            .iter()
            .map(|entry| (entry.order, entry.point.p25, entry.point.p75))
            .collect();
        let median = inputs
            .reference
            .iter()
            .map(|entry| (entry.order, entry.point.median))
            .collect();
        (BandPolygon::from_bounds(&bounds), median)
    } else {
        (None, Vec::new())
    };

    let cohort = (layers.is_on(Layer::Cohort) && inputs.cohort.iter().any(Option::is_some))
        .then(|| inputs.cohort.to_vec());

    let thresholds = if layers.is_on(Layer::Thresholds) {
        threshold_lines(channel, inputs.thresholds, view.show_moderate_thresholds)
    } else {
        Vec::new()
    };

    ChannelChart {
        channel,
        orders: grid.orders(),
        actual: grid.channel_values(channel),
        anomalies,
        prediction,
        prediction_band,
        forecast_region,
        reference_iqr,
        reference_median,
        cohort,
        thresholds,
    }
}
