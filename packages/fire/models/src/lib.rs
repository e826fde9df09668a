#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Fire detection types shared across the fire monitor.
//!
//! A [`Detection`] is one parsed row of the satellite feed. Once it has
//! passed the geofence and been named and classified it becomes a
//! [`Fire`], and one pipeline run aggregates fires into a [`Snapshot`].

pub mod severity;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Timelike as _, Utc};
use serde::{Deserialize, Serialize};

pub use severity::{Classification, Severity, classify};

/// One satellite fire observation, as decoded from the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// Radiometric brightness temperature in Kelvin.
    pub brightness: f64,
    /// Fire radiative power in megawatts.
    pub frp: f64,
    /// Acquisition date (UTC).
    pub acq_date: NaiveDate,
    /// Acquisition time, normalized to four digits (`HHMM`, UTC).
    pub acq_time: String,
    /// Satellite identifier (e.g. `"N"` for Suomi NPP).
    pub satellite: Option<String>,
    /// Confidence label as reported by the feed.
    pub confidence: Option<String>,
    /// Acquisition timestamp derived from date and time.
    pub datetime_utc: NaiveDateTime,
}

impl Detection {
    /// Composite identity of the physical event.
    ///
    /// Two detections with the same rounded coordinates, date, and time
    /// are the same observation.
    #[must_use]
    pub fn id(&self) -> String {
        format!(
            "{:.5}_{:.5}_{}_{}",
            self.latitude, self.longitude, self.acq_date, self.acq_time
        )
    }
}

/// A geofenced, named, and classified detection as published in a
/// [`Snapshot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fire {
    /// See [`Detection::id`].
    pub id: String,
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// Brightness in Kelvin, rounded to two decimals.
    pub brightness: f64,
    /// Fire radiative power, rounded to two decimals.
    pub frp: f64,
    /// Acquisition date.
    pub acq_date: NaiveDate,
    /// Acquisition time (`HHMM`).
    pub acq_time: String,
    /// Acquisition timestamp in UTC.
    pub datetime_utc: NaiveDateTime,
    /// Acquisition time in the region's local display zone.
    pub datetime_ist: String,
    /// Satellite identifier.
    pub satellite: Option<String>,
    /// Confidence label.
    pub confidence: Option<String>,
    /// Human-readable place name.
    pub location: String,
    /// Severity tier.
    pub severity: Severity,
    /// Display color for the tier.
    pub color: String,
    /// Icon glyph for the tier.
    pub icon: String,
    /// Whether this fire raises an alert.
    pub alert: bool,
}

impl Fire {
    /// Builds a published fire from a detection and its derived attributes.
    ///
    /// Brightness and FRP are rounded to two decimals before
    /// classification, so the published value is the one that was
    /// classified.
    #[must_use]
    pub fn new(detection: Detection, location: String, local_time: String) -> Self {
        let brightness = round2(detection.brightness);
        let frp = round2(detection.frp);
        let class = classify(brightness, detection.confidence.as_deref().unwrap_or_default());
        let id = detection.id();

        Self {
            id,
            latitude: detection.latitude,
            longitude: detection.longitude,
            brightness,
            frp,
            acq_date: detection.acq_date,
            acq_time: detection.acq_time,
            datetime_utc: detection.datetime_utc,
            datetime_ist: local_time,
            satellite: detection.satellite,
            confidence: detection.confidence,
            location,
            severity: class.severity,
            color: class.color.to_string(),
            icon: class.icon.to_string(),
            alert: class.alert,
        }
    }
}

/// The aggregated output of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Number of accepted fires.
    pub total: usize,
    /// All accepted fires, most recent acquisition first.
    pub fires: Vec<Fire>,
    /// HIGH tier, in the same order as `fires`.
    pub high: Vec<Fire>,
    /// MEDIUM tier, in the same order as `fires`.
    pub medium: Vec<Fire>,
    /// LOW tier, in the same order as `fires`.
    pub low: Vec<Fire>,
    /// When this snapshot was generated.
    pub last_updated: DateTime<Utc>,
}

impl Snapshot {
    /// A snapshot with no fires.
    #[must_use]
    pub const fn empty(last_updated: DateTime<Utc>) -> Self {
        Self {
            total: 0,
            fires: Vec::new(),
            high: Vec::new(),
            medium: Vec::new(),
            low: Vec::new(),
            last_updated,
        }
    }

    /// Partitions ordered fires into tiers, preserving their order.
    #[must_use]
    pub fn from_fires(fires: Vec<Fire>, last_updated: DateTime<Utc>) -> Self {
        let mut high = Vec::new();
        let mut medium = Vec::new();
        let mut low = Vec::new();

        for fire in &fires {
            match fire.severity {
                Severity::High => high.push(fire.clone()),
                Severity::Medium => medium.push(fire.clone()),
                Severity::Low => low.push(fire.clone()),
            }
        }

        Self {
            total: fires.len(),
            fires,
            high,
            medium,
            low,
            last_updated,
        }
    }
}

/// Formats a UTC timestamp as a 12-hour clock time in a fixed-offset zone,
/// e.g. `"6:30 AM IST"`.
#[must_use]
pub fn format_local_time(utc: NaiveDateTime, offset_minutes: i64, label: &str) -> String {
    let local = utc + Duration::minutes(offset_minutes);
    let (is_pm, hour12) = local.hour12();
    let meridiem = if is_pm { "PM" } else { "AM" };
    format!("{hour12}:{:02} {meridiem} {label}", local.minute())
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detection(date: &str, time: &str, brightness: f64, confidence: &str) -> Detection {
        let acq_date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        let hour = time[..2].parse().unwrap();
        let minute = time[2..].parse().unwrap();
        Detection {
            latitude: 30.066_753,
            longitude: 79.019_3,
            brightness,
            frp: 4.567,
            acq_date,
            acq_time: time.to_string(),
            satellite: Some("N".to_string()),
            confidence: Some(confidence.to_string()),
            datetime_utc: acq_date.and_hms_opt(hour, minute, 0).unwrap(),
        }
    }

    #[test]
    fn detection_id_rounds_coordinates() {
        let d = detection("2024-01-02", "0100", 330.0, "nominal");
        assert_eq!(d.id(), "30.06675_79.01930_2024-01-02_0100");
    }

    #[test]
    fn fire_rounds_and_classifies() {
        let d = detection("2024-01-02", "0100", 350.456, "high");
        let fire = Fire::new(d, "Chamoli".to_string(), "6:30 AM IST".to_string());
        assert!((fire.brightness - 350.46).abs() < 1e-9);
        assert!((fire.frp - 4.57).abs() < 1e-9);
        assert_eq!(fire.severity, Severity::High);
        assert!(fire.alert);
        assert_eq!(fire.location, "Chamoli");
    }

    #[test]
    fn snapshot_partitions_preserving_order() {
        let now = Utc::now();
        let fires = vec![
            Fire::new(detection("2024-01-03", "0100", 350.0, "high"), "A".into(), String::new()),
            Fire::new(detection("2024-01-02", "0100", 300.0, "low"), "B".into(), String::new()),
            Fire::new(detection("2024-01-01", "0100", 360.0, "high"), "C".into(), String::new()),
            Fire::new(detection("2023-12-31", "0100", 330.0, "low"), "D".into(), String::new()),
        ];

        let snapshot = Snapshot::from_fires(fires, now);
        assert_eq!(snapshot.total, 4);
        let high: Vec<&str> = snapshot.high.iter().map(|f| f.location.as_str()).collect();
        assert_eq!(high, ["A", "C"]);
        assert_eq!(snapshot.medium.len(), 1);
        assert_eq!(snapshot.low[0].location, "B");
    }

    #[test]
    fn empty_snapshot_serializes_all_keys() {
        let value = serde_json::to_value(Snapshot::empty(Utc::now())).unwrap();
        assert_eq!(value["total"], 0);
        for key in ["fires", "high", "medium", "low"] {
            assert_eq!(value[key], serde_json::json!([]), "{key}");
        }
        assert!(value["last_updated"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn formats_ist_times() {
        let utc = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(1, 0, 0)
            .unwrap();
        assert_eq!(format_local_time(utc, 330, "IST"), "6:30 AM IST");

        let noon = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(6, 30, 0)
            .unwrap();
        assert_eq!(format_local_time(noon, 330, "IST"), "12:00 PM IST");

        let late = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(20, 5, 0)
            .unwrap();
        assert_eq!(format_local_time(late, 330, "IST"), "1:35 AM IST");
    }
}
