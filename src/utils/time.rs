//! Strict ISO-8601 timestamp handling
//!
//! The API emits UTC timestamps with exactly millisecond precision
//! (`2024-01-01T12:00:00.000Z`). Anything else is rejected rather than
//! loosely parsed.

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;

/// Wire format for API timestamps
pub const ISO_MILLIS_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

static ISO_MILLIS_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}\.\d{3}Z$").expect("valid timestamp pattern")
});

/// Whether `value` matches the strict millisecond-precision UTC pattern
pub fn is_iso_millis(value: &str) -> bool {
    ISO_MILLIS_PATTERN.is_match(value)
}

/// Serde adapter for `DateTime<Utc>` fields in the strict wire format
pub mod iso_millis {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    use super::{is_iso_millis, NaiveDateTime, ISO_MILLIS_FORMAT};

    /// Format a timestamp in the strict wire format
    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(ISO_MILLIS_FORMAT).to_string())
    }

    /// Parse a timestamp, rejecting anything outside the strict pattern
    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        if !is_iso_millis(&value) {
            return Err(de::Error::custom(format!(
                "expected an ISO-8601 millisecond UTC timestamp, got {value:?}"
            )));
        }

        NaiveDateTime::parse_from_str(&value, ISO_MILLIS_FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(de::Error::custom)
    }
}
