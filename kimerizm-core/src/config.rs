//! Dashboard configuration and the clinical threshold table.

use serde::{Deserialize, Serialize};

use crate::bands::ReportedThresholds;
use crate::view_state::LayerToggles;

/// Clinical cut-offs per channel.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClinicalThresholds {
    /// KMR below this is good.
    pub kmr_good_below: f64,
    /// KMR above this is moderate.
    pub kmr_moderate_above: f64,
    /// KMR above this is critical.
    pub kmr_critical_above: f64,
    pub kre_good_below: f64,
    pub kre_moderate_above: f64,
    pub kre_critical_above: f64,
    /// GFR at or above this is good.
    pub gfr_good_from: f64,
    /// GFR below this is moderate.
    pub gfr_moderate_below: f64,
    /// GFR below this is critical.
    pub gfr_critical_below: f64,
}

impl Default for ClinicalThresholds {
    fn default() -> Self {
        Self {
            kmr_good_below: 0.5,
            kmr_moderate_above: 2.0,
            kmr_critical_above: 5.0,
            kre_good_below: 1.2,
            kre_moderate_above: 2.0,
            kre_critical_above: 4.5,
            gfr_good_from: 90.0,
            gfr_moderate_below: 30.0,
            gfr_critical_below: 15.0,
        }
    }
}

impl ClinicalThresholds {
    /// Cut-offs that differ from the ones echoed in the reference-band artifact.
    pub fn disagreements(&self, reported: &ReportedThresholds) -> Vec<String> {
        let checks = [
            ("kmr.normal_lt", reported.kmr.normal_lt, self.kmr_good_below),
            ("kmr.cok_kritik_gt", reported.kmr.cok_kritik_gt, self.kmr_critical_above),
            ("kre.very_good_lt", reported.kre.very_good_lt, self.kre_good_below),
            ("kre.very_bad_gt", reported.kre.very_bad_gt, self.kre_critical_above),
            ("gfr.very_good_ge", reported.gfr.very_good_ge, self.gfr_good_from),
            ("gfr.very_bad_le", reported.gfr.very_bad_le, self.gfr_critical_below),
        ];

        checks
            .into_iter()
            .filter_map(|(name, reported, configured)| {
                let reported = reported?;
                ((reported - configured).abs() > f64::EPSILON)
                    .then(|| format!("{name}: artifact {reported}, configured {configured}"))
            })
            .collect()
    }
}

/// Settings shared by the wasm bridge, the UI and the CLI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    pub thresholds: ClinicalThresholds,
    /// Prefix for artifact URLs (static hosting under a sub-path).
    pub base_path: String,
    /// Chart layers visible when a patient page opens.
    pub default_layers: LayerToggles,
    pub show_moderate_thresholds: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            thresholds: ClinicalThresholds::default(),
            base_path: String::new(),
            default_layers: LayerToggles::default(),
            show_moderate_thresholds: false,
        }
    }
}
