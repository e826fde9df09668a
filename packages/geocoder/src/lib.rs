#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Reverse geocoding for fire detections.
//!
//! Converts a detection's coordinates to a human-readable place name using
//! Nominatim / `OpenStreetMap`, with three layers around the raw client:
//!
//! 1. A persistent [`cache::GeocodeCache`] keyed by coordinates rounded to
//!    five decimals. Both names and "outside region" verdicts are cached,
//!    so a resolved coordinate is never queried twice.
//! 2. A [`rate_limit::RateLimiter`] enforcing Nominatim's one request per
//!    second usage policy. Only real requests consume it.
//! 3. Region validation in [`reverse::ReverseGeocoder`]: a response whose
//!    `state` is not the monitored region is recorded as outside it.
//!
//! The external service sits behind the [`ReverseProvider`] trait so the
//! cache and pacing contracts can be exercised without a network.

pub mod cache;
pub mod nominatim;
pub mod rate_limit;
pub mod reverse;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

pub use reverse::ReverseGeocoder;

/// Errors from geocoding operations.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Cache file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Cache serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The address components of a reverse geocoding result that matter for
/// naming a place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Address {
    /// Village or hamlet-level settlement.
    pub village: Option<String>,
    /// Town.
    pub town: Option<String>,
    /// City.
    pub city: Option<String>,
    /// County / tehsil.
    pub county: Option<String>,
    /// District.
    pub state_district: Option<String>,
    /// First-level administrative region.
    pub state: Option<String>,
}

impl Address {
    /// Most specific place name available, in settlement > town > city >
    /// county > district order. Blank values are skipped.
    #[must_use]
    pub fn best_name(&self) -> Option<&str> {
        [
            &self.village,
            &self.town,
            &self.city,
            &self.county,
            &self.state_district,
        ]
        .into_iter()
        .filter_map(Option::as_deref)
        .map(str::trim)
        .find(|name| !name.is_empty())
    }
}

/// A reverse geocoding backend.
#[async_trait]
pub trait ReverseProvider: Send + Sync {
    /// Looks up the address at a coordinate.
    ///
    /// A location the provider cannot name (open water, no data) yields an
    /// empty [`Address`], not an error.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the request fails or the response cannot
    /// be parsed.
    async fn reverse(&self, lat: f64, lon: f64) -> Result<Address, GeocodeError>;
}
