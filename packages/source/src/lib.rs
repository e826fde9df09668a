#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Fire detection feed: fetching and parsing.
//!
//! The upstream feed is NASA FIRMS' area API, which returns delimited text
//! with a header row. [`FeedProvider`] abstracts the fetch so the pipeline
//! can be driven by canned text in tests; [`parsing`] turns the text into
//! typed [`fire_monitor_fire_models::Detection`]s.

pub mod firms;
pub mod parsing;
pub mod retry;

use async_trait::async_trait;

/// Errors that can occur while fetching or decoding the feed.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a status that will not succeed on retry.
    #[error("HTTP status error: {message}")]
    Status {
        /// Status and context.
        message: String,
    },

    /// The feed is not usable without configuration (e.g. a missing key).
    #[error("Feed not configured: {message}")]
    Config {
        /// What is missing.
        message: String,
    },

    /// The header row lacks columns needed to decode any row.
    #[error("Feed schema error: {message}")]
    Schema {
        /// Description of the missing columns.
        message: String,
    },
}

/// A source of raw fire detection text.
#[async_trait]
pub trait FeedProvider: Send + Sync {
    /// Fetches detections from the past `days` days within the region's
    /// bounding box, as header-prefixed delimited text.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the feed cannot be fetched.
    async fn fetch(&self, days: u32) -> Result<String, SourceError>;

    /// Whether the provider has the credentials it needs.
    fn is_configured(&self) -> bool;
}
