use kimerizm_core::{
    build_grid, project, reindex, split_forecast, BandPoint, CohortPoint, ClinicalThresholds,
    KeyTranslation, TimelinePoint,
};
use proptest::prelude::*;

fn timeline_from(orders: &[u32], values: &[f64]) -> Vec<TimelinePoint> {
    orders
        .iter()
        .zip(values)
        .map(|(order, value)| TimelinePoint {
            time_key: format!("T{order}"),
            time_order: *order,
            kmr: Some(*value),
            kmr_pred: Some(value * 0.9),
            ..TimelinePoint::default()
        })
        .collect()
}

fn cohort_from(orders: &[u32]) -> Vec<CohortPoint> {
    orders
        .iter()
        .map(|order| CohortPoint {
            time_key: format!("T{order}"),
            time_order: *order,
            expected_kmr: Some(1.0),
            ..CohortPoint::default()
        })
        .collect()
}

proptest! {
    #[test]
    fn grid_is_dense_and_covers_every_source(
        patient in prop::collection::vec(1_u32..40, 0..12),
        values in prop::collection::vec(0.0_f64..10.0, 12),
        cohort in prop::collection::vec(1_u32..40, 0..12),
    ) {
        let timeline = timeline_from(&patient, &values);
        let cohort = cohort_from(&cohort);
        let grid = build_grid::<BandPoint, CohortPoint>(&timeline, &[], &cohort);

        let orders = grid.orders();
        prop_assert_eq!(orders.first().copied(), Some(1));
        for pair in orders.windows(2) {
            prop_assert_eq!(pair[1], pair[0] + 1);
        }
        for order in patient.iter().chain(cohort.iter().map(|point| &point.time_order)) {
            prop_assert!(grid.contains(*order));
        }
    }

    #[test]
    fn reindex_is_sorted_unique_and_idempotent(
        grid_orders in prop::collection::vec(1_u32..30, 1..8),
        series_orders in prop::collection::vec(0_u32..40, 0..20),
    ) {
        let grid = build_grid::<BandPoint, CohortPoint>(&timeline_from(&grid_orders, &[1.0; 8]), &[], &[]);
        let series = cohort_from(&series_orders);

        let once = reindex(&grid, &series, KeyTranslation::RawOrder);
        for pair in once.windows(2) {
            prop_assert!(pair[0].order < pair[1].order);
        }
        for entry in &once {
            prop_assert!(grid.contains(entry.order));
        }

        let twice = reindex(&grid, &once, KeyTranslation::RawOrder);
        let first: Vec<u32> = once.iter().map(|entry| entry.order).collect();
        let second: Vec<u32> = twice.iter().map(|entry| entry.order).collect();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn forecast_split_loses_nothing(
        orders in prop::collection::vec(1_u32..25, 1..10),
        values in prop::collection::vec(0.0_f64..10.0, 10),
        anchor in prop::option::of(0_u32..30),
    ) {
        let grid = build_grid::<BandPoint, CohortPoint>(&timeline_from(&orders, &values), &[], &[]);
        let series = grid.series(|point| point.kmr_pred);
        let split = split_forecast(&grid, &series, anchor);

        prop_assert_eq!(split.merged(), series);
        for (past, future) in split.past.iter().zip(&split.future) {
            prop_assert!(past.is_none() || future.is_none());
        }
    }

    #[test]
    fn every_grid_order_projects(
        orders in prop::collection::vec(1_u32..25, 1..10),
        values in prop::collection::vec(0.0_f64..10.0, 10),
    ) {
        let grid = build_grid::<BandPoint, CohortPoint>(&timeline_from(&orders, &values), &[], &[]);
        let thresholds = ClinicalThresholds::default();
        for order in grid.orders() {
            let pinned = project(&grid, order, &thresholds);
            prop_assert!(pinned.is_some());
            prop_assert_eq!(pinned, project(&grid, order, &thresholds));
        }
        prop_assert!(project(&grid, grid.max_order() + 1, &thresholds).is_none());
    }
}
