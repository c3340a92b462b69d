use kimerizm_core::grid::MAX_GRID_ORDER;
use kimerizm_core::time_keys::{self, UNIFIED_TIME_KEYS};
use kimerizm_core::{
    build_grid, overlay, reindex, BandPoint, CohortPoint, KeyTranslation, LabCohortPoint,
    TimelinePoint,
};

fn observation(key: &str, order: u32, kmr: Option<f64>) -> TimelinePoint {
    TimelinePoint {
        time_key: key.to_string(),
        time_order: order,
        kmr,
        ..TimelinePoint::default()
    }
}

fn band_point(key: &str, median: f64) -> BandPoint {
    BandPoint {
        time_key: Some(key.to_string()),
        time_order: None,
        median,
        p25: median - 0.1,
        p75: median + 0.1,
        n_samples: Some(12),
        mean: None,
        std: None,
        p2_5: None,
        p97_5: None,
        min: None,
        max: None,
    }
}

fn cohort_point(order: u32, expected: f64) -> CohortPoint {
    CohortPoint {
        time_key: time_keys::unified_key(order).unwrap_or("unknown").to_string(),
        time_order: order,
        expected_kmr: Some(expected),
        ..CohortPoint::default()
    }
}

fn full_band() -> Vec<BandPoint> {
    UNIFIED_TIME_KEYS
        .iter()
        .map(|entry| band_point(entry.key, f64::from(entry.order) / 10.0))
        .collect()
}

fn sparse_patient() -> Vec<TimelinePoint> {
    vec![
        observation("Day_1", 1, Some(4.2)),
        observation("Day_7", 7, Some(1.1)),
        observation("Month_12", 22, Some(0.3)),
    ]
}

#[test]
fn grid_spans_every_order_up_to_the_largest_source() {
    let cohort: Vec<CohortPoint> = (1..=16).map(|order| cohort_point(order, 1.0)).collect();
    let grid = build_grid(&sparse_patient(), &full_band(), &cohort);

    assert_eq!(grid.len(), 22);
    assert_eq!(grid.orders(), (1..=22).collect::<Vec<_>>());
    assert_eq!(grid.min_order(), 1);
    assert_eq!(grid.max_order(), 22);

    let observed: Vec<u32> = grid.observations().map(|point| point.time_order).collect();
    assert_eq!(observed, vec![1, 7, 22]);

    let gap = grid.cell(10).expect("order 10 is on the grid");
    assert!(gap.observation.is_none());
    assert_eq!(gap.time_key.as_deref(), Some("Week_4"));

    let band = reindex(&grid, &full_band(), KeyTranslation::Unified);
    let band_orders: Vec<u32> = band.iter().map(|entry| entry.order).collect();
    assert_eq!(band_orders, (1..=22).collect::<Vec<_>>());

    let aligned = reindex(&grid, &cohort, KeyTranslation::Unified);
    let expected = overlay(&grid, &aligned, |point| point.expected_kmr);
    assert_eq!(expected.len(), 22);
    assert!(expected[..16].iter().all(Option::is_some));
    assert!(expected[16..].iter().all(Option::is_none));
}

#[test]
fn cohort_orders_without_week_four_land_on_their_unified_keys() {
    // Cohort artifacts number Month_1 as 10 and Month_12 as 21.
    let cohort = vec![
        CohortPoint {
            time_key: "Month_1".to_string(),
            time_order: 10,
            expected_kmr: Some(0.5),
            ..CohortPoint::default()
        },
        CohortPoint {
            time_key: "Month_12".to_string(),
            time_order: 21,
            expected_kmr: Some(0.1),
            ..CohortPoint::default()
        },
    ];
    let band = vec![band_point("Month_1", 0.6), band_point("Month_12", 0.2)];
    let patient = vec![observation("Month_1", 11, Some(0.7))];

    let grid = build_grid::<BandPoint, CohortPoint>(&patient, &[], &cohort);
    assert_eq!(grid.max_order(), 22);

    let band_orders: Vec<u32> = reindex(&grid, &band, KeyTranslation::Unified)
        .iter()
        .map(|entry| entry.order)
        .collect();
    let aligned = reindex(&grid, &cohort, KeyTranslation::Unified);
    let cohort_orders: Vec<u32> = aligned.iter().map(|entry| entry.order).collect();
    assert_eq!(cohort_orders, band_orders);
    assert_eq!(cohort_orders, vec![11, 22]);

    let values = overlay(&grid, &aligned, |point| point.expected_kmr);
    assert_eq!(values[9], None);
    assert_eq!(values[10], Some(0.5));
}

#[test]
fn runaway_orders_do_not_stretch_the_grid() {
    let band = vec![BandPoint {
        time_key: Some("Garbled".to_string()),
        time_order: Some(u32::MAX - 1),
        ..band_point("Garbled", 1.0)
    }];
    let patient = vec![
        observation("Day_2", 2, Some(1.0)),
        observation("Garbled", MAX_GRID_ORDER + 1, Some(9.0)),
    ];
    let grid = build_grid::<BandPoint, CohortPoint>(&patient, &band, &[]);

    assert_eq!(grid.max_order(), 2);
    assert_eq!(grid.observations().count(), 1);
}

#[test]
fn band_longer_than_patient_extends_the_grid() {
    let patient = vec![observation("Day_1", 1, Some(2.0)), observation("Day_3", 3, Some(1.5))];
    let grid = build_grid::<BandPoint, CohortPoint>(&patient, &full_band(), &[]);
    assert_eq!(grid.max_order(), 22);
    assert!(grid.cell(22).is_some_and(|cell| cell.observation.is_none()));
}

#[test]
fn empty_inputs_still_yield_the_first_cell() {
    let grid = build_grid::<BandPoint, CohortPoint>(&[], &[], &[]);
    assert_eq!(grid.len(), 1);
    assert_eq!(grid.max_order(), 1);
    assert!(grid.first_observation().is_none());
}

#[test]
fn unknown_order_observations_are_left_off_the_grid() {
    let patient = vec![observation("Mystery", 0, Some(9.0)), observation("Day_2", 2, Some(1.0))];
    let grid = build_grid::<BandPoint, CohortPoint>(&patient, &[], &[]);
    assert_eq!(grid.len(), 2);
    assert_eq!(grid.observations().count(), 1);
}

#[test]
fn duplicate_observation_orders_keep_the_last() {
    let patient = vec![observation("Day_2", 2, Some(1.0)), observation("Day_2", 2, Some(3.0))];
    let grid = build_grid::<BandPoint, CohortPoint>(&patient, &[], &[]);
    assert_eq!(grid.channel_values(kimerizm_core::Channel::Kmr), vec![None, Some(3.0)]);
}

#[test]
fn unified_band_alignment_drops_keys_outside_the_grid() {
    let patient = vec![observation("Month_1", 11, Some(0.8))];
    let grid = build_grid::<BandPoint, CohortPoint>(&patient, &[], &[]);
    let aligned = reindex(&grid, &full_band(), KeyTranslation::Unified);

    assert_eq!(aligned.len(), 11);
    assert_eq!(aligned.first().map(|entry| entry.order), Some(1));
    assert_eq!(aligned.last().map(|entry| entry.order), Some(11));
}

#[test]
fn lab_keys_translate_with_suffix_and_month_twelve_lands_on_22() {
    let band = vec![
        band_point("Day_7_KRE", 1.4),
        band_point("Month_6_KRE", 1.2),
        band_point("Month_12_KRE", 1.1),
        band_point("Day_2_KRE", 2.0),
    ];
    let patient = vec![observation("Month_12", 22, Some(0.2))];
    let grid = build_grid::<BandPoint, CohortPoint>(&patient, &[], &[]);

    let aligned = reindex(&grid, &band, KeyTranslation::Lab);
    let orders: Vec<u32> = aligned.iter().map(|entry| entry.order).collect();
    assert_eq!(orders, vec![7, 16, 22]);
    assert_eq!(time_keys::lab_order("Month_12_GFR"), Some(22));
    assert_eq!(time_keys::lab_order("Week_4"), None);
}

#[test]
fn reindexing_aligned_output_is_stable() {
    let grid = build_grid::<BandPoint, CohortPoint>(&sparse_patient(), &full_band(), &[]);
    let once = reindex(&grid, &full_band(), KeyTranslation::Unified);
    let twice = reindex(&grid, &once, KeyTranslation::RawOrder);

    assert_eq!(twice.len(), once.len());
    for (first, second) in once.iter().zip(&twice) {
        assert_eq!(first.order, second.order);
        assert_eq!(first.point, second.point.point);
    }
}

#[test]
fn reindexing_with_the_same_translation_is_idempotent() {
    let grid = build_grid::<BandPoint, CohortPoint>(&sparse_patient(), &full_band(), &[]);

    let once = reindex(&grid, &full_band(), KeyTranslation::Unified);
    let twice = reindex(&grid, &once, KeyTranslation::Unified);
    let orders: Vec<u32> = once.iter().map(|entry| entry.order).collect();
    assert_eq!(twice.iter().map(|entry| entry.order).collect::<Vec<_>>(), orders);
    assert!(once.iter().zip(&twice).all(|(first, second)| *first == second.point));

    let lab_band = vec![
        band_point("Day_7_GFR", 70.0),
        band_point("Week_3_GFR", 75.0),
        band_point("Month_12_GFR", 88.0),
    ];
    let once = reindex(&grid, &lab_band, KeyTranslation::Lab);
    let twice = reindex(&grid, &once, KeyTranslation::Lab);
    let orders: Vec<u32> = once.iter().map(|entry| entry.order).collect();
    assert_eq!(orders, vec![7, 9, 22]);
    assert_eq!(twice.iter().map(|entry| entry.order).collect::<Vec<_>>(), orders);
    assert!(once.iter().zip(&twice).all(|(first, second)| *first == second.point));
}

#[test]
fn duplicate_series_entries_keep_the_last() {
    let grid = build_grid::<BandPoint, CohortPoint>(&sparse_patient(), &[], &[]);
    let band = vec![band_point("Day_7", 1.0), band_point("Day_7", 2.0)];
    let aligned = reindex(&grid, &band, KeyTranslation::Unified);
    assert_eq!(aligned.len(), 1);
    assert_eq!(aligned[0].point.median, 2.0);
}

#[test]
fn lab_cohort_overlay_fills_only_lab_slots() {
    let grid = build_grid::<BandPoint, CohortPoint>(&sparse_patient(), &[], &[]);
    let trajectory = vec![
        LabCohortPoint {
            time_key: "Day_7_KRE".to_string(),
            time_order: 1,
            expected_kre: Some(1.3),
            ..LabCohortPoint::default()
        },
        LabCohortPoint {
            time_key: "Month_12_KRE".to_string(),
            time_order: 10,
            expected_kre: Some(1.0),
            ..LabCohortPoint::default()
        },
    ];

    let aligned = reindex(&grid, &trajectory, KeyTranslation::Lab);
    let values = overlay(&grid, &aligned, |point| point.expected(kimerizm_core::Channel::Kre));

    assert_eq!(values.len(), 22);
    assert_eq!(values[6], Some(1.3));
    assert_eq!(values[21], Some(1.0));
    assert_eq!(values.iter().filter(|value| value.is_some()).count(), 2);
}
