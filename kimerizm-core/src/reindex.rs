//! Alignment of sparse external series onto the unified grid.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::grid::TimelineGrid;
use crate::time_keys;

/// An entry of an externally produced series, keyed by symbol and/or order.
pub trait SeriesPoint {
    fn time_key(&self) -> Option<&str>;
    fn time_order(&self) -> Option<u32>;
}

/// How a series spells its timepoints.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum KeyTranslation {
    /// Unified registry key, falling back to the raw order.
    Unified,
    /// Lab-schedule key only; entries with unknown keys are dropped.
    Lab,
    /// The entry's own order, keys ignored.
    RawOrder,
}

impl KeyTranslation {
    /// Unified order of an entry, `None` when it cannot be placed.
    pub fn resolve<P: SeriesPoint + ?Sized>(self, point: &P) -> Option<u32> {
        let order = match self {
            KeyTranslation::Unified => point
                .time_key()
                .and_then(time_keys::unified_order)
                .or_else(|| point.time_order()),
            KeyTranslation::Lab => point.time_key().and_then(time_keys::lab_order),
            KeyTranslation::RawOrder => point.time_order(),
        };
        order.filter(|order| *order > 0)
    }
}

/// A series entry together with the grid order it was placed on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Aligned<T> {
    pub order: u32,
    pub point: T,
}

impl<T: SeriesPoint> SeriesPoint for Aligned<T> {
    fn time_key(&self) -> Option<&str> {
        self.point.time_key()
    }

    fn time_order(&self) -> Option<u32> {
        Some(self.order)
    }
}

/// Places every entry of `series` on `grid`.
///
/// The result is strictly increasing by order with at most one entry per
/// order; when several entries translate to the same order the last one wins.
/// Entries that cannot be translated or fall outside the grid are dropped.
pub fn reindex<P>(grid: &TimelineGrid, series: &[P], translation: KeyTranslation) -> Vec<Aligned<P>>
where
    P: SeriesPoint + Clone,
{
    let mut by_order: BTreeMap<u32, &P> = BTreeMap::new();

    for point in series {
        let Some(order) = translation.resolve(point) else {
            tracing::debug!(
                key = point.time_key().unwrap_or("-"),
                raw_order = ?point.time_order(),
                ?translation,
                "dropping series entry without a unified order"
            );
            continue;
        };

        if !grid.contains(order) {
            tracing::debug!(order, "dropping series entry outside the grid");
            continue;
        }

        if by_order.insert(order, point).is_some() {
            tracing::debug!(order, "duplicate series entry, keeping the last one");
        }
    }

    by_order
        .into_iter()
        .map(|(order, point)| Aligned {
            order,
            point: point.clone(),
        })
        .collect()
}

/// One value per grid cell, `None` where the aligned series has no entry.
pub fn overlay<P, F>(grid: &TimelineGrid, aligned: &[Aligned<P>], value: F) -> Vec<Option<f64>>
where
    F: Fn(&P) -> Option<f64>,
{
    let lookup: BTreeMap<u32, &P> = aligned
        .iter()
        .map(|entry| (entry.order, &entry.point))
        .collect();

    grid.cells()
        .iter()
        .map(|cell| lookup.get(&cell.order).and_then(|point| value(*point)))
        .collect()
}
