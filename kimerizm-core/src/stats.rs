//! Descriptive statistics of a patient timeline.

use serde::{Deserialize, Serialize};

use crate::TimelinePoint;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimelineStats {
    pub kmr_min: Option<f64>,
    pub kmr_max: Option<f64>,
    pub kmr_mean: Option<f64>,
    /// Population standard deviation.
    pub kmr_std: Option<f64>,
    /// Coefficient of variation, 0 when the mean is not positive.
    pub kmr_cv: Option<f64>,
    /// Least-squares slope of KMR over measurement index.
    pub kmr_trend: f64,
    pub risk_mean: f64,
    pub anomaly_count: usize,
    pub kmr_count: usize,
    pub kre_count: usize,
    pub gfr_count: usize,
    pub kre_last: Option<f64>,
    pub gfr_last: Option<f64>,
}

impl TimelineStats {
    /// Statistics over observations up to and including `up_to` (all when `None`).
    /// Returns `None` for an empty timeline.
    pub fn compute(timeline: &[TimelinePoint], up_to: Option<u32>) -> Option<Self> {
        if timeline.is_empty() {
            return None;
        }

        let mut points: Vec<&TimelinePoint> = timeline
            .iter()
            .filter(|point| up_to.map_or(true, |limit| point.time_order <= limit))
            .collect();
        points.sort_by_key(|point| point.time_order);

        let kmr: Vec<f64> = points.iter().filter_map(|point| point.kmr).collect();
        let kre: Vec<f64> = points.iter().filter_map(|point| point.kre).collect();
        let gfr: Vec<f64> = points.iter().filter_map(|point| point.gfr).collect();
        let risk: Vec<f64> = points.iter().filter_map(|point| point.risk_score).collect();

        let kmr_mean = mean(&kmr);
        let kmr_std = kmr_mean.map(|mean| {
            let variance = kmr.iter().map(|value| (value - mean).powi(2)).sum::<f64>() / kmr.len() as f64;
            variance.sqrt()
        });
        let kmr_cv = match (kmr_mean, kmr_std) {
            (Some(mean), Some(std)) if mean > 0.0 => Some(std / mean),
            (Some(_), Some(_)) => Some(0.0),
            _ => None,
        };

        Some(Self {
            kmr_min: kmr.iter().copied().reduce(f64::min),
            kmr_max: kmr.iter().copied().reduce(f64::max),
            kmr_mean,
            kmr_std,
            kmr_cv,
            kmr_trend: slope(&kmr),
            risk_mean: mean(&risk).unwrap_or(0.0),
            anomaly_count: points.iter().filter(|point| point.kmr_anomaly_flag).count(),
            kmr_count: kmr.len(),
            kre_count: kre.len(),
            gfr_count: gfr.len(),
            kre_last: kre.last().copied(),
            gfr_last: gfr.last().copied(),
        })
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn slope(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let x_mean = (n - 1.0) / 2.0;
    let y_mean = values.iter().sum::<f64>() / n;
    let (num, den) = values
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(num, den), (index, y)| {
            let dx = index as f64 - x_mean;
            (num + dx * (y - y_mean), den + dx * dx)
        });
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kmr_point(order: u32, kmr: Option<f64>, flagged: bool) -> TimelinePoint {
        TimelinePoint {
            time_key: format!("T{order}"),
            time_order: order,
            kmr,
            kmr_anomaly_flag: flagged,
            risk_score: Some(f64::from(order) * 10.0),
            ..TimelinePoint::default()
        }
    }

    #[test]
    fn statistics_respect_the_pinned_limit() {
        let timeline = vec![
            kmr_point(7, Some(1.0), false),
            kmr_point(1, Some(3.0), true),
            kmr_point(3, Some(2.0), false),
            kmr_point(11, None, true),
        ];

        let all = TimelineStats::compute(&timeline, None).expect("non-empty");
        assert_eq!(all.kmr_count, 3);
        assert_eq!(all.anomaly_count, 2);
        assert_eq!(all.kmr_min, Some(1.0));
        assert_eq!(all.kmr_max, Some(3.0));
        assert!((all.kmr_trend + 1.0).abs() < 1e-12);
        assert!((all.risk_mean - 55.0).abs() < 1e-12);

        let pinned = TimelineStats::compute(&timeline, Some(3)).expect("non-empty");
        assert_eq!(pinned.kmr_count, 2);
        assert_eq!(pinned.anomaly_count, 1);
        assert_eq!(pinned.kmr_mean, Some(2.5));
    }

    #[test]
    fn empty_timeline_has_no_statistics() {
        assert!(TimelineStats::compute(&[], None).is_none());
    }
}
