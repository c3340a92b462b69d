//! Display formatting shared by the panel and the exports.

use crate::Channel;

/// Placeholder for absent values.
pub const MISSING: &str = "-";

const UNKNOWN: &str = "Unknown";
const STABLE_SLOPE: f64 = 0.001;

/// Gender label; accepts English and Turkish spellings in any case.
pub fn format_gender(value: Option<&str>) -> &'static str {
    match value.map(|text| text.trim().to_lowercase()).as_deref() {
        Some("male" | "m" | "erkek") => "Male",
        Some("female" | "f" | "kadın" | "kadin") => "Female",
        _ => UNKNOWN,
    }
}

pub fn format_vital_status(value: Option<&str>) -> &'static str {
    match value.map(|text| text.trim().to_lowercase()).as_deref() {
        Some("living" | "alive" | "yaşıyor" | "yasiyor") => "Alive",
        Some("dead" | "deceased" | "vefat") => "Deceased",
        _ => UNKNOWN,
    }
}

/// Fixed-decimal number, [`MISSING`] when absent or not finite.
pub fn format_number(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(value) if value.is_finite() => format!("{value:.decimals$}"),
        _ => MISSING.to_string(),
    }
}

/// Channel value at its conventional precision; KMR carries a percent sign.
pub fn format_channel(channel: Channel, value: Option<f64>) -> String {
    let text = format_number(value, channel_decimals(channel));
    if channel == Channel::Kmr && text != MISSING {
        format!("{text}%")
    } else {
        text
    }
}

pub fn channel_decimals(channel: Channel) -> usize {
    match channel {
        Channel::Kmr => 4,
        Channel::Kre => 2,
        Channel::Gfr => 0,
    }
}

/// Direction of a slope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    NoData,
    Stable,
    Rising,
    Falling,
}

impl Trend {
    pub fn from_slope(slope: Option<f64>) -> Self {
        match slope {
            Some(slope) if slope.is_finite() => {
                if slope.abs() < STABLE_SLOPE {
                    Trend::Stable
                } else if slope > 0.0 {
                    Trend::Rising
                } else {
                    Trend::Falling
                }
            }
            _ => Trend::NoData,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Trend::NoData => "No data",
            Trend::Stable => "Stable",
            Trend::Rising => "Rising",
            Trend::Falling => "Falling",
        }
    }
}

/// Lower-cases and strips Turkish diacritics so that searches match
/// regardless of keyboard layout.
pub fn normalize_search_text(value: &str) -> String {
    value
        .chars()
        .flat_map(char::to_lowercase)
        .map(|ch| match ch {
            'ı' | 'i' | 'î' => 'i',
            'ş' => 's',
            'ğ' => 'g',
            'ü' | 'û' => 'u',
            'ö' => 'o',
            'ç' => 'c',
            'â' => 'a',
            other => other,
        })
        // Lower-casing 'İ' leaves a combining dot above.
        .filter(|ch| *ch != '\u{0307}')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_use_fixed_decimals_and_dash_for_absent() {
        assert_eq!(format_number(Some(1.23456), 2), "1.23");
        assert_eq!(format_number(Some(f64::NAN), 2), MISSING);
        assert_eq!(format_number(None, 0), MISSING);
        assert_eq!(format_channel(Channel::Kmr, Some(0.5)), "0.5000%");
        assert_eq!(format_channel(Channel::Gfr, Some(61.6)), "62");
        assert_eq!(format_channel(Channel::Kmr, None), MISSING);
    }

    #[test]
    fn trend_thresholds() {
        assert_eq!(Trend::from_slope(None), Trend::NoData);
        assert_eq!(Trend::from_slope(Some(0.0009)), Trend::Stable);
        assert_eq!(Trend::from_slope(Some(-0.0009)), Trend::Stable);
        assert_eq!(Trend::from_slope(Some(0.001)), Trend::Rising);
        assert_eq!(Trend::from_slope(Some(-0.2)), Trend::Falling);
    }

    #[test]
    fn demographics_accept_both_languages() {
        assert_eq!(format_gender(Some(" Erkek ")), "Male");
        assert_eq!(format_gender(Some("F")), "Female");
        assert_eq!(format_gender(Some("")), "Unknown");
        assert_eq!(format_vital_status(Some("Vefat")), "Deceased");
        assert_eq!(format_vital_status(None), "Unknown");
    }

    #[test]
    fn search_text_folds_turkish_letters() {
        assert_eq!(normalize_search_text("İŞÇĞÜÖ"), "iscguo");
        assert_eq!(normalize_search_text("Iğdır"), "igdir");
    }
}
