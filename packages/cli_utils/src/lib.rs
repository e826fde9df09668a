#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Terminal helpers for the `fire_monitor` binary.
//!
//! [`IndicatifProgress`] renders the pipeline's geocoding loop, and
//! [`init_logger`] routes `log` output through the same [`MultiProgress`]
//! so log lines print above the bar instead of tearing it.

use std::sync::Arc;
use std::time::Duration;

use fire_monitor_pipeline::progress::ProgressCallback;
use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;

pub use indicatif::MultiProgress;

/// Shown while the feed is being fetched and parsed.
const FETCH_TEMPLATE: &str = "{spinner:.red} {msg} ({elapsed})";

/// Shown once the number of detections to geocode is known.
const GEOCODE_TEMPLATE: &str =
    "🔥 {msg} {wide_bar:.red/yellow} {pos}/{len} detections [{elapsed}<{eta}]";

const BAR_CHARS: &str = "█▓░";

/// Log level applied when `RUST_LOG` is unset.
const DEFAULT_LEVEL: LevelFilter = LevelFilter::Info;

fn fetch_style() -> ProgressStyle {
    ProgressStyle::with_template(FETCH_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn geocode_style() -> ProgressStyle {
    ProgressStyle::with_template(GEOCODE_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars(BAR_CHARS)
}

/// Pipeline progress drawn with `indicatif`.
///
/// Starts as a spinner; [`ProgressCallback::set_total`] swaps in the
/// per-detection bar.
pub struct IndicatifProgress {
    bar: ProgressBar,
}

impl IndicatifProgress {
    /// Adds a detections bar to `multi`, spinning with `message` until the
    /// feed has been parsed.
    #[must_use]
    pub fn detections_bar(multi: &MultiProgress, message: &str) -> Arc<dyn ProgressCallback> {
        let bar = multi.add(ProgressBar::new_spinner());
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_style(fetch_style());
        bar.set_message(message.to_string());
        Arc::new(Self { bar })
    }
}

impl ProgressCallback for IndicatifProgress {
    fn set_total(&self, total: u64) {
        self.bar.set_length(total);
        self.bar.set_position(0);
        self.bar.set_style(geocode_style());
    }

    fn inc(&self, delta: u64) {
        self.bar.inc(delta);
    }

    fn set_message(&self, msg: String) {
        self.bar.set_message(msg);
    }

    fn finish(&self, msg: String) {
        self.bar.finish_with_message(msg);
    }
}

/// Installs `pretty_env_logger` behind `indicatif-log-bridge` and returns
/// the [`MultiProgress`] every bar must be added to.
///
/// Logs at `info` unless `RUST_LOG` says otherwise. A second call keeps the
/// first logger.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let logger = pretty_env_logger::formatted_builder()
        .filter_level(DEFAULT_LEVEL)
        .parse_env("RUST_LOG")
        .build();
    let level = logger.filter();

    if indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .is_ok()
    {
        log::set_max_level(level);
    }

    multi
}
