//! Region-aware, cached reverse geocoding.

use std::time::Duration;

use fire_monitor_region::RegionConfig;

use crate::cache::{GeocodeCache, cache_key};
use crate::rate_limit::RateLimiter;
use crate::{GeocodeError, ReverseProvider};

/// How long to hold off after the service reports HTTP 429.
const RATE_LIMIT_BACKOFF: Duration = Duration::from_secs(60);

/// Resolves coordinates to place names within the monitored region.
///
/// Owns the [`GeocodeCache`] (write-through: every verdict from the
/// provider is recorded before returning) and the [`RateLimiter`] pacing
/// requests to the provider.
pub struct ReverseGeocoder {
    provider: Box<dyn ReverseProvider>,
    cache: GeocodeCache,
    limiter: RateLimiter,
    region: RegionConfig,
    requests: u64,
}

impl ReverseGeocoder {
    /// Creates a geocoder for `region`.
    #[must_use]
    pub fn new(
        provider: Box<dyn ReverseProvider>,
        cache: GeocodeCache,
        limiter: RateLimiter,
        region: RegionConfig,
    ) -> Self {
        Self {
            provider,
            cache,
            limiter,
            region,
            requests: 0,
        }
    }

    /// Resolves a coordinate to a place name.
    ///
    /// - `Ok(Some(name))`: inside the region; `name` is the most specific
    ///   settlement available, or the region name if the response has none.
    /// - `Ok(None)`: the provider places the coordinate outside the region.
    ///
    /// Cached verdicts (including `Ok(None)`) return without a request.
    /// Failures are not cached, so the coordinate is retried next time.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the provider request fails.
    pub async fn resolve(&mut self, lat: f64, lon: f64) -> Result<Option<String>, GeocodeError> {
        let key = cache_key(lat, lon);
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached.map(str::to_string));
        }

        self.limiter.acquire().await;
        self.requests += 1;

        let address = match self.provider.reverse(lat, lon).await {
            Ok(address) => address,
            Err(e) => {
                if matches!(e, GeocodeError::RateLimited) {
                    log::warn!(
                        "Rate limited by geocoder, holding off {}s",
                        RATE_LIMIT_BACKOFF.as_secs()
                    );
                    self.limiter.back_off(RATE_LIMIT_BACKOFF);
                }
                return Err(e);
            }
        };

        let state = address.state.as_deref().unwrap_or_default();
        if !self.region.matches_name(state) {
            log::debug!(
                "({lat}, {lon}) geocodes to state {state:?}, outside {}",
                self.region.name
            );
            self.cache.insert(key, None);
            return Ok(None);
        }

        let name = address
            .best_name()
            .unwrap_or(self.region.name.as_str())
            .to_string();
        self.cache.insert(key, Some(name.clone()));
        Ok(Some(name))
    }

    /// Name used when a detection cannot be named.
    #[must_use]
    pub fn fallback_name(&self) -> &str {
        &self.region.name
    }

    /// Number of provider requests issued so far.
    #[must_use]
    pub const fn requests(&self) -> u64 {
        self.requests
    }

    /// The underlying cache.
    #[must_use]
    pub const fn cache(&self) -> &GeocodeCache {
        &self.cache
    }

    /// Persists the cache.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the cache file cannot be written.
    pub fn save_cache(&mut self) -> Result<(), GeocodeError> {
        self.cache.save()
    }
}
