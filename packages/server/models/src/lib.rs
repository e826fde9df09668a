#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the fire monitor server.
//!
//! Field names are `snake_case` to match the published snapshot file, so a
//! client can consume either interchangeably.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use fire_monitor_fire_models::Snapshot;
use serde::{Deserialize, Serialize};

/// Response for `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiRoot {
    /// Service name.
    pub message: String,
    /// Always `"active"`.
    pub status: String,
    /// Endpoint name to path.
    pub endpoints: BTreeMap<String, String>,
}

/// Response for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiHealth {
    /// Always `"healthy"`.
    pub status: String,
    /// Server time.
    pub timestamp: DateTime<Utc>,
}

impl ApiHealth {
    /// A healthy response stamped `now`.
    #[must_use]
    pub fn healthy(now: DateTime<Utc>) -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: now,
        }
    }
}

/// Response for `GET /api/config`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Whether the FIRMS map key is configured.
    pub nasa_firms_key_set: bool,
    /// Feed bounding box as `west,south,east,north`.
    pub bbox: String,
    /// Look-back window used when `days` is omitted.
    pub default_days: u32,
    /// Server time.
    pub timestamp: DateTime<Utc>,
}

/// Response for `GET /api/fires`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiFires {
    /// The run's snapshot, flattened into the response object.
    #[serde(flatten)]
    pub snapshot: Snapshot,
    /// Whether the FIRMS map key is configured. When `false` the snapshot
    /// is always empty.
    pub api_key_set: bool,
}

/// Query parameters for `GET /api/fires`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FiresQueryParams {
    /// Look-back window in days.
    pub days: Option<u32>,
}
