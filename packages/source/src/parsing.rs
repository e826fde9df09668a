//! Tolerant decoding of the delimited detection feed.
//!
//! The header row is resolved once into a [`FeedSchema`] of column
//! indexes; each data row is then decoded positionally into a
//! [`Detection`] or a [`ParseError`]. Splitting is a plain split on the
//! delimiter with no quote handling, which the FIRMS format never needs.
//!
//! Missing or empty numeric values default to zero. A row with a value
//! that is present but unusable is skipped and counted; it never aborts
//! the batch.

use chrono::{NaiveDate, NaiveTime};
use fire_monitor_fire_models::Detection;
use thiserror::Error;

use crate::SourceError;

/// Field delimiter of the feed.
pub const DELIMITER: char = ',';

/// Brightness column names, in preference order. VIIRS products report
/// the I-4 channel temperature as `bright_ti4`; MODIS uses `brightness`.
const BRIGHTNESS_COLUMNS: &[&str] = &["bright_ti4", "brightness"];

/// Row-level decoding errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// A numeric field is present but not a number.
    #[error("invalid {field} value {value:?}")]
    InvalidNumber {
        /// Column name.
        field: &'static str,
        /// Raw value.
        value: String,
    },

    /// A numeric field parsed to NaN or infinity.
    #[error("non-finite {field} value {value:?}")]
    NonFinite {
        /// Column name.
        field: &'static str,
        /// Raw value.
        value: String,
    },

    /// The acquisition date is missing or not `YYYY-MM-DD`.
    #[error("invalid acquisition date {value:?}")]
    InvalidDate {
        /// Raw value.
        value: String,
    },

    /// The acquisition time does not describe a valid `HHMM`.
    #[error("invalid acquisition time {value:?}")]
    InvalidTime {
        /// Raw value.
        value: String,
    },
}

/// Column positions resolved from the header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSchema {
    latitude: usize,
    longitude: usize,
    acq_date: usize,
    brightness: Option<usize>,
    frp: Option<usize>,
    acq_time: Option<usize>,
    satellite: Option<usize>,
    confidence: Option<usize>,
}

impl FeedSchema {
    /// Resolves column positions from a header row.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Schema`] if `latitude`, `longitude`, or
    /// `acq_date` is missing, since no row could be decoded without them.
    pub fn from_header(header: &str) -> Result<Self, SourceError> {
        let columns: Vec<String> = header
            .split(DELIMITER)
            .map(|c| c.trim().to_lowercase())
            .collect();
        let find = |name: &str| columns.iter().position(|c| c == name);

        let required = |name: &str| {
            find(name).ok_or_else(|| SourceError::Schema {
                message: format!("missing column {name:?} in header {header:?}"),
            })
        };

        Ok(Self {
            latitude: required("latitude")?,
            longitude: required("longitude")?,
            acq_date: required("acq_date")?,
            brightness: BRIGHTNESS_COLUMNS.iter().find_map(|name| find(name)),
            frp: find("frp"),
            acq_time: find("acq_time"),
            satellite: find("satellite"),
            confidence: find("confidence"),
        })
    }

    /// Decodes one data row.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if a present value cannot be interpreted.
    pub fn decode(&self, row: &str) -> Result<Detection, ParseError> {
        let values: Vec<&str> = row.split(DELIMITER).map(str::trim).collect();
        let get = |idx: Option<usize>| {
            idx.and_then(|i| values.get(i))
                .copied()
                .filter(|v| !v.is_empty())
        };

        let latitude = parse_number("latitude", get(Some(self.latitude)))?;
        let longitude = parse_number("longitude", get(Some(self.longitude)))?;
        let brightness = parse_number("brightness", get(self.brightness))?;
        let frp = parse_number("frp", get(self.frp))?;

        let date_str = get(Some(self.acq_date)).unwrap_or_default();
        let acq_date =
            NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|_| ParseError::InvalidDate {
                value: date_str.to_string(),
            })?;

        let (acq_time, time) = normalize_acq_time(get(self.acq_time).unwrap_or_default())?;

        Ok(Detection {
            latitude,
            longitude,
            brightness,
            frp,
            acq_date,
            acq_time,
            satellite: get(self.satellite).map(str::to_string),
            confidence: get(self.confidence).map(str::to_string),
            datetime_utc: acq_date.and_time(time),
        })
    }
}

/// Result of parsing a whole feed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseReport {
    /// Decoded detections, most recent first.
    pub detections: Vec<Detection>,
    /// Rows that could not be decoded.
    pub skipped: usize,
    /// Non-blank data rows seen (`detections.len() + skipped`).
    pub total_rows: usize,
}

/// Parses feed text into detections, most recent acquisition first.
///
/// Blank lines are ignored. Rows that fail to decode are logged with their
/// 1-based index and skipped.
///
/// # Errors
///
/// Returns [`SourceError::Schema`] if the header lacks required columns.
pub fn parse_feed(text: &str) -> Result<ParseReport, SourceError> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());
    let Some(header) = lines.next() else {
        return Ok(ParseReport::default());
    };
    let schema = FeedSchema::from_header(header)?;

    let mut report = ParseReport::default();
    for (idx, line) in lines.enumerate() {
        report.total_rows += 1;
        match schema.decode(line) {
            Ok(detection) => report.detections.push(detection),
            Err(e) => {
                report.skipped += 1;
                log::warn!("Skipping feed row {}: {e}", idx + 1);
            }
        }
    }

    report
        .detections
        .sort_by(|a, b| b.datetime_utc.cmp(&a.datetime_utc));

    Ok(report)
}

/// Normalizes a raw acquisition time to four `HHMM` digits.
///
/// Non-digits are stripped, the result is left-padded with zeros, and the
/// last four digits are kept: `"5"` -> `"0005"`, `"12:30"` -> `"1230"`.
///
/// # Errors
///
/// Returns [`ParseError::InvalidTime`] if the digits are not a valid time
/// of day.
pub fn normalize_acq_time(raw: &str) -> Result<(String, NaiveTime), ParseError> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    let padded = format!("{digits:0>4}");
    let hhmm = &padded[padded.len() - 4..];

    let invalid = || ParseError::InvalidTime {
        value: raw.to_string(),
    };
    let hour: u32 = hhmm[..2].parse().map_err(|_| invalid())?;
    let minute: u32 = hhmm[2..].parse().map_err(|_| invalid())?;
    let time = NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)?;

    Ok((hhmm.to_string(), time))
}

fn parse_number(field: &'static str, value: Option<&str>) -> Result<f64, ParseError> {
    let Some(value) = value else {
        return Ok(0.0);
    };
    let number: f64 = value.parse().map_err(|_| ParseError::InvalidNumber {
        field,
        value: value.to_string(),
    })?;
    if !number.is_finite() {
        return Err(ParseError::NonFinite {
            field,
            value: value.to_string(),
        });
    }
    Ok(number)
}
