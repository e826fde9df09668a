#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Region configuration for the fire monitor.
//!
//! The monitored region is defined in a TOML file under `regions/` and
//! embedded at compile time. It carries everything region-specific: the
//! display name and historical aliases used to validate reverse-geocode
//! responses, the feed bounding box, the geofence buffer, the local display
//! timezone, and the upstream service endpoints.
//!
//! Secrets and deployment knobs come from the environment instead (see
//! [`firms_api_key`] and [`paths`]).

pub mod paths;

use serde::Deserialize;
use thiserror::Error;

/// Environment variable holding the NASA FIRMS map key.
pub const FIRMS_API_KEY_ENV: &str = "FIRMS_API_KEY";

/// Errors from region configuration parsing.
#[derive(Debug, Error)]
pub enum RegionError {
    /// TOML parsing failed.
    #[error("Invalid region config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// A monitored region.
#[derive(Debug, Clone, Deserialize)]
pub struct RegionConfig {
    /// Unique identifier (e.g., `"uttarakhand"`), used in file names.
    pub id: String,
    /// Human-readable name; also the fallback place name.
    pub name: String,
    /// Country, used when searching for the boundary polygon.
    pub country: String,
    /// Alternative names the geocoder may report for this region.
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Positive buffer applied to the boundary polygon, in degrees.
    pub buffer_degrees: f64,
    /// Feed query bounding box.
    pub bbox: BoundingBox,
    /// Local display timezone.
    pub display: DisplayConfig,
    /// Fire detection feed settings.
    pub feed: FeedConfig,
    /// Reverse geocoder settings.
    pub geocoder: GeocoderConfig,
}

/// Geographic bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct BoundingBox {
    /// Western longitude.
    pub west: f64,
    /// Southern latitude.
    pub south: f64,
    /// Eastern longitude.
    pub east: f64,
    /// Northern latitude.
    pub north: f64,
}

impl BoundingBox {
    /// Center point as `(lat, lon)`.
    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        (
            f64::midpoint(self.south, self.north),
            f64::midpoint(self.west, self.east),
        )
    }
}

impl std::fmt::Display for BoundingBox {
    /// Formats as `west,south,east,north`, the order the FIRMS area API
    /// expects. Whole degrees keep their `.0` (`81.0`, not `81`).
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:?},{:?},{:?},{:?}",
            self.west, self.south, self.east, self.north
        )
    }
}

/// Local display timezone as a fixed offset.
#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    /// Label appended to formatted times (e.g. `"IST"`).
    pub timezone: String,
    /// Offset from UTC in minutes.
    pub utc_offset_minutes: i64,
}

/// NASA FIRMS area API settings.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// API base URL.
    pub base_url: String,
    /// Sensor product (e.g. `"VIIRS_SNPP_NRT"`).
    pub product: String,
    /// Look-back window used when none is requested.
    pub default_days: u32,
    /// Largest look-back window the API accepts.
    pub max_days: u32,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

/// Nominatim settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocoderConfig {
    /// Reverse geocoding endpoint.
    pub reverse_url: String,
    /// Search endpoint, used to acquire the boundary polygon.
    pub search_url: String,
    /// `User-Agent` sent with every request, per Nominatim usage policy.
    pub user_agent: String,
    /// Reverse geocoding detail level.
    pub zoom: u8,
    /// Minimum delay between requests in milliseconds.
    pub rate_limit_ms: u64,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl RegionConfig {
    /// Parses a region definition from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`RegionError`] if the TOML is malformed or incomplete.
    pub fn from_toml(toml_str: &str) -> Result<Self, RegionError> {
        Ok(toml::de::from_str(toml_str)?)
    }

    /// Whether an administrative name reported by a geocoder refers to this
    /// region. Matches the name or any alias, case-insensitively, as a
    /// substring (so `"State of Uttarakhand"` matches).
    #[must_use]
    pub fn matches_name(&self, reported: &str) -> bool {
        let reported = reported.to_lowercase();
        if reported.is_empty() {
            return false;
        }
        std::iter::once(&self.name)
            .chain(&self.aliases)
            .any(|name| reported.contains(&name.to_lowercase()))
    }

    /// Clamps a requested look-back window to what the feed accepts.
    #[must_use]
    pub fn clamp_days(&self, days: u32) -> u32 {
        days.clamp(1, self.feed.max_days)
    }
}

// ── Compile-time embedded TOML ──────────────────────────────────────

const REGION_TOML: &str = include_str!("../regions/uttarakhand.toml");

/// Returns the monitored region.
///
/// # Panics
///
/// Panics if the embedded TOML is malformed (this is a compile-time
/// guarantee since the config is embedded and covered by tests).
#[must_use]
pub fn region() -> RegionConfig {
    RegionConfig::from_toml(REGION_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse embedded region config: {e}"))
}

/// Reads the FIRMS map key from the environment.
///
/// Returns `None` when unset or blank.
#[must_use]
pub fn firms_api_key() -> Option<String> {
    std::env::var(FIRMS_API_KEY_ENV)
        .ok()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_region_parses() {
        let region = region();
        assert_eq!(region.id, "uttarakhand");
        assert_eq!(region.name, "Uttarakhand");
        assert!((region.buffer_degrees - 0.02).abs() < f64::EPSILON);
        assert_eq!(region.display.utc_offset_minutes, 330);
        assert_eq!(region.geocoder.rate_limit_ms, 1000);
        assert!(!region.geocoder.user_agent.is_empty());
    }

    #[test]
    fn bbox_formats_in_feed_order() {
        assert_eq!(region().bbox.to_string(), "77.5,28.5,81.0,31.5");
    }

    #[test]
    fn bbox_keeps_decimal_point_on_whole_degrees() {
        let bbox = BoundingBox {
            west: -10.0,
            south: 0.0,
            east: 12.25,
            north: 45.0,
        };
        assert_eq!(bbox.to_string(), "-10.0,0.0,12.25,45.0");
    }

    #[test]
    fn bbox_center() {
        let (lat, lon) = region().bbox.center();
        assert!((lat - 30.0).abs() < f64::EPSILON);
        assert!((lon - 79.25).abs() < f64::EPSILON);
    }

    #[test]
    fn matches_name_and_alias_case_insensitively() {
        let region = region();
        assert!(region.matches_name("Uttarakhand"));
        assert!(region.matches_name("UTTARAKHAND"));
        assert!(region.matches_name("uttaranchal"));
        assert!(!region.matches_name("Himachal Pradesh"));
        assert!(!region.matches_name(""));
    }

    #[test]
    fn clamps_days_to_feed_range() {
        let region = region();
        assert_eq!(region.clamp_days(0), 1);
        assert_eq!(region.clamp_days(7), 7);
        assert_eq!(region.clamp_days(30), 10);
    }

    #[test]
    fn rejects_incomplete_toml() {
        assert!(RegionConfig::from_toml("id = \"x\"").is_err());
    }
}
