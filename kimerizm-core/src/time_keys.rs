//! Registry of clinical time keys and their positions on the unified grid.

use serde::Serialize;

/// A symbolic time label pinned to an order on the unified grid.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct TimeKeyEntry {
    pub key: &'static str,
    pub order: u32,
    pub pseudo_days: u32,
}

const fn entry(key: &'static str, order: u32, pseudo_days: u32) -> TimeKeyEntry {
    TimeKeyEntry {
        key,
        order,
        pseudo_days,
    }
}

/// Primary schedule shared by every chart.
pub const UNIFIED_TIME_KEYS: [TimeKeyEntry; 22] = [
    entry("Day_1", 1, 1),
    entry("Day_2", 2, 2),
    entry("Day_3", 3, 3),
    entry("Day_4", 4, 4),
    entry("Day_5", 5, 5),
    entry("Day_6", 6, 6),
    entry("Day_7", 7, 7),
    entry("Week_2", 8, 14),
    entry("Week_3", 9, 21),
    entry("Week_4", 10, 28),
    entry("Month_1", 11, 30),
    entry("Month_2", 12, 60),
    entry("Month_3", 13, 90),
    entry("Month_4", 14, 120),
    entry("Month_5", 15, 150),
    entry("Month_6", 16, 180),
    entry("Month_7", 17, 210),
    entry("Month_8", 18, 240),
    entry("Month_9", 19, 270),
    entry("Month_10", 20, 300),
    entry("Month_11", 21, 330),
    entry("Month_12", 22, 365),
];

/// Sparse lab (KRE/GFR) schedule translated onto unified orders.
///
/// Fixed backend convention: `Month_12` lands on 22, not on the slot after
/// `Month_6`. Needs confirming against the backend's time-mapping table.
pub const LAB_TO_UNIFIED: [TimeKeyEntry; 10] = [
    entry("Day_7", 7, 7),
    entry("Week_2", 8, 14),
    entry("Week_3", 9, 21),
    entry("Month_1", 11, 30),
    entry("Month_2", 12, 60),
    entry("Month_3", 13, 90),
    entry("Month_4", 14, 120),
    entry("Month_5", 15, 150),
    entry("Month_6", 16, 180),
    entry("Month_12", 22, 365),
];

const LAB_SUFFIXES: [&str; 2] = ["_KRE", "_GFR"];

/// Order of a key on the unified schedule.
pub fn unified_order(key: &str) -> Option<u32> {
    UNIFIED_TIME_KEYS
        .iter()
        .find(|entry| entry.key == key)
        .map(|entry| entry.order)
}

/// Key registered for a unified order.
pub fn unified_key(order: u32) -> Option<&'static str> {
    UNIFIED_TIME_KEYS
        .iter()
        .find(|entry| entry.order == order)
        .map(|entry| entry.key)
}

/// Removes the `_KRE` / `_GFR` column suffix used by lab artifacts.
pub fn strip_lab_suffix(key: &str) -> &str {
    LAB_SUFFIXES
        .iter()
        .find_map(|suffix| key.strip_suffix(suffix))
        .unwrap_or(key)
}

/// Unified order of a lab-schedule key, suffix tolerated.
pub fn lab_order(key: &str) -> Option<u32> {
    let base = strip_lab_suffix(key);
    LAB_TO_UNIFIED
        .iter()
        .find(|entry| entry.key == base)
        .map(|entry| entry.order)
}
