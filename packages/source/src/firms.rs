//! NASA FIRMS area API client.
//!
//! The area endpoint returns every detection for a product inside a
//! bounding box over the past 1 to 10 days:
//!
//! ```text
//! {base_url}/area/csv/{MAP_KEY}/{PRODUCT}/{west,south,east,north}/{DAYS}
//! ```

use std::time::Duration;

use async_trait::async_trait;
use fire_monitor_region::{BoundingBox, RegionConfig};

use crate::{FeedProvider, SourceError, retry};

/// Placeholder substituted for the map key in logged URLs.
const REDACTED: &str = "***";

/// Fetches the region's detections from FIRMS.
pub struct FirmsFeed {
    client: reqwest::Client,
    base_url: String,
    product: String,
    bbox: BoundingBox,
    api_key: Option<String>,
}

impl FirmsFeed {
    /// Creates a client for `region` with an optional map key.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be built.
    pub fn new(region: &RegionConfig, api_key: Option<String>) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(region.feed.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: region.feed.base_url.trim_end_matches('/').to_string(),
            product: region.feed.product.clone(),
            bbox: region.bbox,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    /// Creates a client reading the map key from `FIRMS_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be built.
    pub fn from_env(region: &RegionConfig) -> Result<Self, SourceError> {
        Self::new(region, fire_monitor_region::firms_api_key())
    }

    /// Area query URL for a `days` look-back window, with the given key.
    #[must_use]
    pub fn area_url(&self, key: &str, days: u32) -> String {
        format!(
            "{}/area/csv/{key}/{}/{}/{days}",
            self.base_url, self.product, self.bbox
        )
    }
}

#[async_trait]
impl FeedProvider for FirmsFeed {
    async fn fetch(&self, days: u32) -> Result<String, SourceError> {
        let Some(key) = self.api_key.as_deref() else {
            return Err(SourceError::Config {
                message: format!("{} is not set", fire_monitor_region::FIRMS_API_KEY_ENV),
            });
        };

        let url = self.area_url(key, days);
        log::info!("Fetching FIRMS detections: {}", self.area_url(REDACTED, days));

        let text = retry::send_text(|| self.client.get(&url)).await?;
        log::debug!("FIRMS returned {} bytes", text.len());
        Ok(text)
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_area_url_in_feed_order() {
        let feed = FirmsFeed::new(&fire_monitor_region::region(), Some("abc".into())).unwrap();
        assert_eq!(
            feed.area_url("abc", 3),
            "https://firms.modaps.eosdis.nasa.gov/api/area/csv/abc/VIIRS_SNPP_NRT/77.5,28.5,81.0,31.5/3"
        );
    }

    #[test]
    fn blank_key_is_unconfigured() {
        let feed = FirmsFeed::new(&fire_monitor_region::region(), Some("  ".into())).unwrap();
        assert!(!feed.is_configured());
    }

    #[tokio::test]
    async fn fetch_without_key_is_config_error() {
        let feed = FirmsFeed::new(&fire_monitor_region::region(), None).unwrap();
        assert!(matches!(
            feed.fetch(1).await,
            Err(SourceError::Config { .. })
        ));
    }
}
