//! Nominatim / `OpenStreetMap` client.
//!
//! Two endpoints are used: `/reverse` to name a detection's coordinates and
//! `/search` with `polygon_geojson=1` to acquire the region's boundary.
//! The public instance allows **1 request per second** and requires an
//! identifying `User-Agent`; [`NominatimClient::new`] sets the latter and
//! [`crate::ReverseGeocoder`] enforces the former.
//!
//! See <https://nominatim.org/release-docs/develop/api/Reverse/>

use std::time::Duration;

use async_trait::async_trait;
use fire_monitor_region::GeocoderConfig;

use crate::{Address, GeocodeError, ReverseProvider};

/// Reverse geocodes a single coordinate.
///
/// The caller is responsible for rate limiting.
///
/// # Errors
///
/// Returns [`GeocodeError`] if the HTTP request fails, the server responds
/// with a non-success status, or the body is not a Nominatim response.
pub async fn reverse(
    client: &reqwest::Client,
    base_url: &str,
    lat: f64,
    lon: f64,
    zoom: u8,
) -> Result<Address, GeocodeError> {
    let resp = client
        .get(base_url)
        .query(&[
            ("lat", lat.to_string()),
            ("lon", lon.to_string()),
            ("format", "jsonv2".to_string()),
            ("zoom", zoom.to_string()),
            ("addressdetails", "1".to_string()),
        ])
        .send()
        .await?;

    if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(GeocodeError::RateLimited);
    }

    let body: serde_json::Value = resp.error_for_status()?.json().await?;
    parse_reverse_response(&body)
}

/// Searches for a named area and returns the first result's boundary
/// geometry as raw `GeoJSON`.
///
/// Returns `Ok(None)` when no result carries a polygon.
///
/// # Errors
///
/// Returns [`GeocodeError`] if the HTTP request or response parsing fails.
pub async fn search_polygon(
    client: &reqwest::Client,
    base_url: &str,
    query: &str,
) -> Result<Option<serde_json::Value>, GeocodeError> {
    let resp = client
        .get(base_url)
        .query(&[
            ("q", query),
            ("polygon_geojson", "1"),
            ("format", "jsonv2"),
        ])
        .send()
        .await?;

    if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(GeocodeError::RateLimited);
    }

    let body: serde_json::Value = resp.error_for_status()?.json().await?;
    parse_search_polygon(&body)
}

/// Parses a Nominatim reverse response.
///
/// A response without an `address` object (Nominatim answers
/// `{"error": "Unable to geocode"}` for open water) is an empty address.
fn parse_reverse_response(body: &serde_json::Value) -> Result<Address, GeocodeError> {
    if !body.is_object() {
        return Err(GeocodeError::Parse {
            message: "Nominatim reverse response is not an object".to_string(),
        });
    }

    match body.get("address") {
        Some(address) => {
            serde_json::from_value(address.clone()).map_err(|e| GeocodeError::Parse {
                message: format!("Invalid address in Nominatim response: {e}"),
            })
        }
        None => {
            if let Some(error) = body.get("error").and_then(serde_json::Value::as_str) {
                log::debug!("Nominatim reverse: {error}");
            }
            Ok(Address::default())
        }
    }
}

fn parse_search_polygon(body: &serde_json::Value) -> Result<Option<serde_json::Value>, GeocodeError> {
    let results = body.as_array().ok_or_else(|| GeocodeError::Parse {
        message: "Nominatim search response is not an array".to_string(),
    })?;

    Ok(results
        .iter()
        .filter_map(|rec| rec.get("geojson"))
        .find(|geom| geom.is_object())
        .cloned())
}

/// [`ReverseProvider`] backed by a Nominatim instance.
pub struct NominatimClient {
    client: reqwest::Client,
    reverse_url: String,
    search_url: String,
    zoom: u8,
}

impl NominatimClient {
    /// Builds a client with the configured `User-Agent` and timeout.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &GeocoderConfig) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            reverse_url: config.reverse_url.clone(),
            search_url: config.search_url.clone(),
            zoom: config.zoom,
        })
    }

    /// Searches for a named area's boundary polygon.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the request fails.
    pub async fn search_polygon(
        &self,
        query: &str,
    ) -> Result<Option<serde_json::Value>, GeocodeError> {
        search_polygon(&self.client, &self.search_url, query).await
    }
}

#[async_trait]
impl ReverseProvider for NominatimClient {
    async fn reverse(&self, lat: f64, lon: f64) -> Result<Address, GeocodeError> {
        reverse(&self.client, &self.reverse_url, lat, lon, self.zoom).await
    }
}
