//! Event timestamp parsing and formatting

use crate::error::{Error, Result};
use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat};

/// Layouts tried after RFC 3339, in order
const FALLBACK_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%z"];

/// Layout for timestamps without an offset; interpreted as UTC
const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parse an event or filter timestamp
///
/// Accepts RFC 3339 (fractional seconds optional), `YYYY-MM-DDTHH:MM:SS±hhmm`
/// and offset-less `YYYY-MM-DDTHH:MM:SS`, which is taken as UTC.
pub fn parse_time(value: &str) -> Result<DateTime<FixedOffset>> {
    let value = value.trim();

    if let Ok(t) = DateTime::parse_from_rfc3339(value) {
        return Ok(t);
    }

    for format in FALLBACK_FORMATS {
        if let Ok(t) = DateTime::parse_from_str(value, format) {
            return Ok(t);
        }
    }

    NaiveDateTime::parse_from_str(value, NAIVE_FORMAT)
        .map(|naive| naive.and_utc().fixed_offset())
        .map_err(|e| Error::invalid_time(value, e.to_string()))
}

/// Format a timestamp as RFC 3339, keeping sub-second precision when present
pub fn format_time(time: &DateTime<FixedOffset>) -> String {
    time.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Serde adapter for the `eventTime` field
pub(crate) mod event_time {
    use chrono::{DateTime, FixedOffset};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        time: &DateTime<FixedOffset>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_time(time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<FixedOffset>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_time(&raw).map_err(serde::de::Error::custom)
    }
}
