//! Splitting prediction series at the last real measurement.

use serde::{Deserialize, Serialize};

use crate::grid::TimelineGrid;
use crate::{Channel, LastStatus};

/// A prediction series cut in two at the forecast anchor.
///
/// Both halves have one slot per grid cell so that they render as separate
/// line segments; a slot is filled in exactly one of them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastSplit {
    pub anchor: Option<u32>,
    pub past: Vec<Option<f64>>,
    pub future: Vec<Option<f64>>,
}

impl ForecastSplit {
    pub fn has_past(&self) -> bool {
        self.past.iter().any(Option::is_some)
    }

    pub fn has_future(&self) -> bool {
        self.future.iter().any(Option::is_some)
    }

    /// Re-joins both halves into the original series.
    pub fn merged(&self) -> Vec<Option<f64>> {
        self.past
            .iter()
            .zip(&self.future)
            .map(|(past, future)| past.or(*future))
            .collect()
    }
}

/// Splits a grid-aligned series into values up to and after `anchor`.
///
/// Without an anchor there is no history to attach to, so everything is future;
/// whether to draw such a line is up to the caller.
pub fn split_forecast(grid: &TimelineGrid, series: &[Option<f64>], anchor: Option<u32>) -> ForecastSplit {
    let mut past = Vec::with_capacity(grid.len());
    let mut future = Vec::with_capacity(grid.len());

    for (index, cell) in grid.cells().iter().enumerate() {
        let value = series.get(index).copied().flatten();
        let is_past = anchor.is_some_and(|anchor| cell.order <= anchor);
        if is_past {
            past.push(value);
            future.push(None);
        } else {
            past.push(None);
            future.push(value);
        }
    }

    ForecastSplit {
        anchor,
        past,
        future,
    }
}

/// Order of the last real measurement of a channel.
///
/// The backend's `last_status` wins; otherwise the latest observation with a
/// value is used.
pub fn channel_anchor(grid: &TimelineGrid, last_status: &LastStatus, channel: Channel) -> Option<u32> {
    last_status
        .last_order(channel)
        .or_else(|| grid.last_observed_order(channel))
}

/// Closed polygon tracing an upper bound forward and a lower bound back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BandPolygon {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl BandPolygon {
    /// Polygon over `(order, lower, upper)` triples; needs at least two points.
    pub fn from_bounds(points: &[(u32, f64, f64)]) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }

        let x = points
            .iter()
            .map(|(order, _, _)| f64::from(*order))
            .chain(points.iter().rev().map(|(order, _, _)| f64::from(*order)))
            .collect();
        let y = points
            .iter()
            .map(|(_, _, upper)| *upper)
            .chain(points.iter().rev().map(|(_, lower, _)| *lower))
            .collect();

        Some(Self { x, y })
    }
}

/// Prediction-interval polygons before and after the anchor.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct IntervalSplit {
    pub past: Option<BandPolygon>,
    pub future: Option<BandPolygon>,
}

/// Splits a prediction interval at the anchor. Nothing is produced without an
/// anchor or when fewer than two cells carry both bounds.
pub fn split_interval(
    grid: &TimelineGrid,
    lower: &[Option<f64>],
    upper: &[Option<f64>],
    anchor: Option<u32>,
) -> IntervalSplit {
    let Some(anchor) = anchor else {
        return IntervalSplit::default();
    };

    let bounded: Vec<(u32, f64, f64)> = grid
        .cells()
        .iter()
        .enumerate()
        .filter_map(|(index, cell)| {
            let lo = lower.get(index).copied().flatten()?;
            let hi = upper.get(index).copied().flatten()?;
            Some((cell.order, lo, hi))
        })
        .collect();

    if bounded.len() < 2 {
        return IntervalSplit::default();
    }

    let (past, future): (Vec<_>, Vec<_>) = bounded
        .into_iter()
        .partition(|(order, _, _)| *order <= anchor);

    IntervalSplit {
        past: BandPolygon::from_bounds(&past),
        future: BandPolygon::from_bounds(&future),
    }
}

/// Shaded x-range after the anchor, present only when there is a forecast to show.
pub fn forecast_region(grid: &TimelineGrid, split: &ForecastSplit) -> Option<(f64, f64)> {
    let anchor = split.anchor?;
    if !split.has_future() {
        return None;
    }
    Some((f64::from(anchor) + 0.5, f64::from(grid.max_order()) + 0.5))
}
