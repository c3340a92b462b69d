//! Dense, contiguous time grid shared by every chart of a patient.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::reindex::{KeyTranslation, SeriesPoint};
use crate::time_keys;
use crate::{Channel, TimelinePoint};

/// First order of every grid (`Day_1`).
pub const GRID_START: u32 = 1;

/// Largest order a grid will stretch to. Orders past the registry are still
/// drawn, but nothing beyond this is taken as a real timepoint.
pub const MAX_GRID_ORDER: u32 = 120;

/// One integer order of the grid, with the patient's observation if any.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GridCell {
    pub order: u32,
    pub time_key: Option<String>,
    pub observation: Option<TimelinePoint>,
}

/// Cells for every order from [`GRID_START`] to the largest order of any source.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(transparent)]
pub struct TimelineGrid {
    cells: Vec<GridCell>,
}

impl TimelineGrid {
    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false; an empty input still yields the `Day_1` cell.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn min_order(&self) -> u32 {
        GRID_START
    }

    pub fn max_order(&self) -> u32 {
        self.cells.last().map_or(GRID_START, |cell| cell.order)
    }

    pub fn contains(&self, order: u32) -> bool {
        (GRID_START..=self.max_order()).contains(&order)
    }

    pub fn cell(&self, order: u32) -> Option<&GridCell> {
        if !self.contains(order) {
            return None;
        }
        self.cells.get((order - GRID_START) as usize)
    }

    pub fn orders(&self) -> Vec<u32> {
        self.cells.iter().map(|cell| cell.order).collect()
    }

    /// Observations in order, skipping empty cells.
    pub fn observations(&self) -> impl Iterator<Item = &TimelinePoint> + '_ {
        self.cells
            .iter()
            .filter_map(|cell| cell.observation.as_ref())
    }

    /// One value per cell extracted from the observation, `None` on gaps.
    pub fn series<F>(&self, value: F) -> Vec<Option<f64>>
    where
        F: Fn(&TimelinePoint) -> Option<f64>,
    {
        self.cells
            .iter()
            .map(|cell| cell.observation.as_ref().and_then(&value))
            .collect()
    }

    pub fn channel_values(&self, channel: Channel) -> Vec<Option<f64>> {
        self.series(|point| point.value(channel))
    }

    pub fn first_observation(&self) -> Option<&TimelinePoint> {
        self.observations().next()
    }

    pub fn last_observation(&self) -> Option<&TimelinePoint> {
        self.observations().last()
    }

    /// Closest observation strictly before `order`.
    pub fn previous_observation(&self, order: u32) -> Option<&TimelinePoint> {
        self.observations()
            .take_while(|point| point.time_order < order)
            .last()
    }

    /// Closest observation strictly after `order`.
    pub fn next_observation(&self, order: u32) -> Option<&TimelinePoint> {
        self.observations().find(|point| point.time_order > order)
    }

    /// Last observation carrying a value for the channel.
    pub fn last_observed_order(&self, channel: Channel) -> Option<u32> {
        self.observations()
            .filter(|point| point.value(channel).is_some())
            .map(|point| point.time_order)
            .last()
    }
}

/// Builds the grid with the conventional translations. Both the reference band
/// and the cohort trajectory are placed by unified key: the cohort's raw orders
/// skip `Week_4` and run one short from `Month_1` on.
pub fn build_grid<B, C>(timeline: &[TimelinePoint], band: &[B], cohort: &[C]) -> TimelineGrid
where
    B: SeriesPoint,
    C: SeriesPoint,
{
    build_grid_with(
        timeline,
        band,
        KeyTranslation::Unified,
        cohort,
        KeyTranslation::Unified,
    )
}

/// Builds the unified grid over a patient timeline and two overlay series.
///
/// The upper bound is the largest order found in any of the three sources.
/// Observations with order 0 (the backend's marker for an unknown key) have
/// no cell and are skipped, as is anything beyond [`MAX_GRID_ORDER`]. Never fails.
pub fn build_grid_with<B, C>(
    timeline: &[TimelinePoint],
    band: &[B],
    band_translation: KeyTranslation,
    cohort: &[C],
    cohort_translation: KeyTranslation,
) -> TimelineGrid
where
    B: SeriesPoint,
    C: SeriesPoint,
{
    let mut by_order: BTreeMap<u32, &TimelinePoint> = BTreeMap::new();
    for point in timeline {
        if point.time_order < GRID_START {
            tracing::warn!(
                time_key = %point.time_key,
                "skipping observation without a grid order"
            );
            continue;
        }
        if point.time_order > MAX_GRID_ORDER {
            tracing::warn!(
                time_key = %point.time_key,
                order = point.time_order,
                "skipping observation beyond the last grid order"
            );
            continue;
        }
        if by_order.insert(point.time_order, point).is_some() {
            tracing::warn!(
                order = point.time_order,
                "duplicate observation order, keeping the last one"
            );
        }
    }

    let patient_max = by_order.keys().next_back().copied().unwrap_or(0);
    let band_max = band
        .iter()
        .filter_map(|point| band_translation.resolve(point))
        .filter_map(|order| within_grid_bound(order, "reference band"))
        .max()
        .unwrap_or(0);
    let cohort_max = cohort
        .iter()
        .filter_map(|point| cohort_translation.resolve(point))
        .filter_map(|order| within_grid_bound(order, "cohort trajectory"))
        .max()
        .unwrap_or(0);
    let max_order = patient_max.max(band_max).max(cohort_max).max(GRID_START);

    let cells = (GRID_START..=max_order)
        .map(|order| {
            let observation = by_order.get(&order).map(|point| (*point).clone());
            let time_key = observation
                .as_ref()
                .map(|point| point.time_key.clone())
                .filter(|key| !key.is_empty())
                .or_else(|| time_keys::unified_key(order).map(str::to_string));
            GridCell {
                order,
                time_key,
                observation,
            }
        })
        .collect();

    TimelineGrid { cells }
}

fn within_grid_bound(order: u32, source: &str) -> Option<u32> {
    if order > MAX_GRID_ORDER {
        tracing::warn!(order, source, "order beyond the last grid order, not extending the grid");
        return None;
    }
    Some(order)
}
