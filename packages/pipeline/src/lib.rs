#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Fire detection pipeline.
//!
//! [`FireService`] turns one feed fetch into a [`Snapshot`]: parse rows,
//! drop detections outside the region boundary, name each survivor by
//! reverse geocoding, classify severity, and partition into tiers. A run
//! never fails; every external failure degrades to fewer fires or a
//! fallback place name and is logged.

pub mod progress;

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use fire_monitor_fire_models::{Fire, Snapshot, format_local_time};
use fire_monitor_geocoder::cache::GeocodeCache;
use fire_monitor_geocoder::nominatim::NominatimClient;
use fire_monitor_geocoder::rate_limit::RateLimiter;
use fire_monitor_geocoder::{GeocodeError, ReverseGeocoder};
use fire_monitor_region::{RegionConfig, paths};
use fire_monitor_source::firms::FirmsFeed;
use fire_monitor_source::parsing::parse_feed;
use fire_monitor_source::{FeedProvider, SourceError};
use fire_monitor_spatial::Boundary;
use thiserror::Error;

use crate::progress::ProgressCallback;

/// Errors from setting up the pipeline or writing its output.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Feed client setup failed.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Geocoder setup failed.
    #[error(transparent)]
    Geocode(#[from] GeocodeError),

    /// File I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Counters collected during one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Non-blank data rows in the feed.
    pub feed_rows: usize,
    /// Rows the parser could not decode.
    pub skipped: usize,
    /// Detections dropped by the boundary test.
    pub outside_boundary: usize,
    /// Accepted fires that got the region name instead of a place name.
    pub fallbacks: usize,
    /// Fires in the snapshot.
    pub accepted: usize,
    /// Reverse geocode requests issued during the run.
    pub geocode_requests: u64,
}

/// Runs the pipeline for one region.
pub struct FireService {
    feed: Box<dyn FeedProvider>,
    boundary: Option<Boundary>,
    geocoder: ReverseGeocoder,
    region: RegionConfig,
    progress: Arc<dyn ProgressCallback>,
}

impl FireService {
    /// Assembles a service from its parts.
    ///
    /// A `None` boundary disables geofencing (every detection passes).
    #[must_use]
    pub fn new(
        feed: Box<dyn FeedProvider>,
        boundary: Option<Boundary>,
        geocoder: ReverseGeocoder,
        region: RegionConfig,
    ) -> Self {
        Self {
            feed,
            boundary,
            geocoder,
            region,
            progress: progress::null_progress(),
        }
    }

    /// Builds the production service: FIRMS feed keyed from the
    /// environment, boundary and geocode cache from the data directory,
    /// and Nominatim paced at the region's rate limit.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if an HTTP client cannot be built.
    pub fn from_env() -> Result<Self, PipelineError> {
        let region = fire_monitor_region::region();

        let feed = FirmsFeed::from_env(&region)?;
        if !feed.is_configured() {
            log::warn!(
                "{} is not set; runs will return no fires",
                fire_monitor_region::FIRMS_API_KEY_ENV
            );
        }

        let boundary = fire_monitor_spatial::load_boundary(
            &paths::boundary_path(&region.id),
            region.buffer_degrees,
        );

        let geocoder = ReverseGeocoder::new(
            Box::new(NominatimClient::new(&region.geocoder)?),
            GeocodeCache::load(paths::geocode_cache_path()),
            RateLimiter::new(Duration::from_millis(region.geocoder.rate_limit_ms)),
            region.clone(),
        );

        Ok(Self::new(Box::new(feed), boundary, geocoder, region))
    }

    /// Replaces the progress reporter.
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressCallback>) -> Self {
        self.progress = progress;
        self
    }

    /// The monitored region.
    #[must_use]
    pub const fn region(&self) -> &RegionConfig {
        &self.region
    }

    /// Whether the feed has the credentials it needs.
    #[must_use]
    pub fn is_feed_configured(&self) -> bool {
        self.feed.is_configured()
    }

    /// Whether a boundary polygon is loaded.
    #[must_use]
    pub const fn has_boundary(&self) -> bool {
        self.boundary.is_some()
    }

    /// Produces a snapshot of fires detected in the past `days` days.
    pub async fn run(&mut self, days: u32) -> Snapshot {
        self.run_with_stats(days).await.0
    }

    /// Like [`Self::run`], also returning the run's counters.
    ///
    /// `days` is clamped to the range the feed accepts.
    pub async fn run_with_stats(&mut self, days: u32) -> (Snapshot, RunStats) {
        let start = Instant::now();
        let days = self.region.clamp_days(days);
        let requests_before = self.geocoder.requests();
        let mut stats = RunStats::default();

        let text = match self.feed.fetch(days).await {
            Ok(text) => text,
            Err(e) => {
                log::error!("Feed fetch failed: {e}");
                return self.empty(stats);
            }
        };

        if text.lines().filter(|l| !l.trim().is_empty()).count() <= 1 {
            log::info!("No fire detections in the past {days} day(s)");
            return self.empty(stats);
        }

        let report = match parse_feed(&text) {
            Ok(report) => report,
            Err(e) => {
                log::error!("Feed could not be parsed: {e}");
                return self.empty(stats);
            }
        };
        stats.feed_rows = report.total_rows;
        stats.skipped = report.skipped;

        self.progress.set_total(report.detections.len() as u64);
        self.progress.set_message("Geocoding detections".to_string());

        let mut fires = Vec::with_capacity(report.detections.len());
        for detection in report.detections {
            self.progress.inc(1);
            let (lat, lon) = (detection.latitude, detection.longitude);

            if !fire_monitor_spatial::contains(lat, lon, self.boundary.as_ref()) {
                stats.outside_boundary += 1;
                continue;
            }

            let location = match self.geocoder.resolve(lat, lon).await {
                Ok(Some(name)) => name,
                Ok(None) => {
                    stats.fallbacks += 1;
                    self.geocoder.fallback_name().to_string()
                }
                Err(e) => {
                    log::warn!("Reverse geocode failed for ({lat}, {lon}): {e}");
                    stats.fallbacks += 1;
                    self.geocoder.fallback_name().to_string()
                }
            };

            let local_time = format_local_time(
                detection.datetime_utc,
                self.region.display.utc_offset_minutes,
                &self.region.display.timezone,
            );
            fires.push(Fire::new(detection, location, local_time));
        }

        if let Err(e) = self.geocoder.save_cache() {
            log::warn!("Failed to save geocode cache: {e}");
        }

        let snapshot = Snapshot::from_fires(fires, Utc::now());
        stats.accepted = snapshot.total;
        stats.geocode_requests = self.geocoder.requests() - requests_before;

        self.progress
            .finish(format!("{} fires in {}", snapshot.total, self.region.name));
        log::info!(
            "Run complete in {:.1}s: {} rows, {} skipped, {} outside boundary, \
             {} geocode requests, {} fallbacks, {} accepted \
             ({} high, {} medium, {} low)",
            start.elapsed().as_secs_f64(),
            stats.feed_rows,
            stats.skipped,
            stats.outside_boundary,
            stats.geocode_requests,
            stats.fallbacks,
            stats.accepted,
            snapshot.high.len(),
            snapshot.medium.len(),
            snapshot.low.len(),
        );

        (snapshot, stats)
    }

    fn empty(&self, stats: RunStats) -> (Snapshot, RunStats) {
        self.progress.finish(format!("No fires in {}", self.region.name));
        (Snapshot::empty(Utc::now()), stats)
    }
}

/// Writes a snapshot as pretty-printed JSON, creating parent directories.
///
/// # Errors
///
/// Returns [`PipelineError`] if serialization or the write fails.
pub fn write_snapshot(path: &Path, snapshot: &Snapshot) -> Result<(), PipelineError> {
    paths::ensure_parent(path)?;
    let json = serde_json::to_string_pretty(snapshot)?;
    std::fs::write(path, json)?;
    log::info!("Wrote {} fires to {}", snapshot.total, path.display());
    Ok(())
}
