//! Severity tiers for fire detections.
//!
//! Classification is a pure function of brightness and the feed's
//! confidence label. The thresholds are fixed constants.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Brightness (Kelvin) above which a high-confidence detection is HIGH.
pub const HIGH_BRIGHTNESS_K: f64 = 340.0;

/// Brightness (Kelvin) above which any detection is at least MEDIUM.
pub const MEDIUM_BRIGHTNESS_K: f64 = 320.0;

/// Severity tier of a fire detection.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// Bright and high-confidence. Raises an alert.
    High,
    /// Either bright or at least nominal confidence.
    Medium,
    /// Everything else.
    Low,
}

impl Severity {
    /// Display color (CSS hex) for this tier.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::High => "#dc2626",
            Self::Medium => "#f97316",
            Self::Low => "#eab308",
        }
    }

    /// Icon glyph for this tier.
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::High => "🔴",
            Self::Medium => "🟠",
            Self::Low => "🟡",
        }
    }

    /// Whether detections in this tier should raise an alert.
    #[must_use]
    pub const fn alert(self) -> bool {
        matches!(self, Self::High)
    }
}

/// Result of classifying a detection, with its display attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// Severity tier.
    pub severity: Severity,
    /// Display color.
    pub color: &'static str,
    /// Icon glyph.
    pub icon: &'static str,
    /// Alert flag (true only for [`Severity::High`]).
    pub alert: bool,
}

impl From<Severity> for Classification {
    fn from(severity: Severity) -> Self {
        Self {
            severity,
            color: severity.color(),
            icon: severity.icon(),
            alert: severity.alert(),
        }
    }
}

/// Classifies a detection by brightness and confidence label.
///
/// The confidence label is compared case-insensitively. HIGH is checked
/// before the broader MEDIUM condition so a bright, high-confidence
/// detection never lands in MEDIUM.
#[must_use]
pub fn classify(brightness: f64, confidence: &str) -> Classification {
    let confidence = confidence.trim().to_lowercase();

    let severity = if brightness > HIGH_BRIGHTNESS_K && confidence == "high" {
        Severity::High
    } else if brightness > MEDIUM_BRIGHTNESS_K || confidence == "high" || confidence == "nominal"
    {
        Severity::Medium
    } else {
        Severity::Low
    };

    severity.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bright_high_confidence_is_high_with_alert() {
        let c = classify(350.0, "high");
        assert_eq!(c.severity, Severity::High);
        assert!(c.alert);
        assert_eq!(c.color, "#dc2626");
        assert_eq!(c.icon, "🔴");
    }

    #[test]
    fn bright_nominal_confidence_is_medium() {
        let c = classify(345.0, "nominal");
        assert_eq!(c.severity, Severity::Medium);
        assert!(!c.alert);
    }

    #[test]
    fn high_confidence_below_threshold_is_medium() {
        assert_eq!(classify(300.0, "high").severity, Severity::Medium);
        assert_eq!(classify(340.0, "high").severity, Severity::Medium);
    }

    #[test]
    fn bright_low_confidence_is_medium() {
        assert_eq!(classify(325.0, "low").severity, Severity::Medium);
    }

    #[test]
    fn dim_low_confidence_is_low() {
        let c = classify(310.0, "low");
        assert_eq!(c.severity, Severity::Low);
        assert_eq!(c.color, "#eab308");
        assert!(!c.alert);
    }

    #[test]
    fn numeric_confidence_falls_through_to_brightness() {
        assert_eq!(classify(330.0, "85").severity, Severity::Medium);
        assert_eq!(classify(300.0, "85").severity, Severity::Low);
    }

    #[test]
    fn confidence_is_case_insensitive() {
        assert_eq!(classify(350.0, "HIGH").severity, Severity::High);
        assert_eq!(classify(300.0, " Nominal ").severity, Severity::Medium);
    }

    #[test]
    fn classification_is_deterministic() {
        for _ in 0..3 {
            assert_eq!(classify(341.5, "High"), classify(341.5, "High"));
        }
    }

    #[test]
    fn severity_serializes_screaming() {
        assert_eq!(Severity::Medium.to_string(), "MEDIUM");
        assert_eq!("LOW".parse::<Severity>().unwrap(), Severity::Low);
    }
}
