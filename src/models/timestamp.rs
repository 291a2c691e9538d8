//! Timestamp parsing shared by request payloads and report windows

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

const LOCAL_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parse RFC 3339, an offset-less `YYYY-MM-DDTHH:MM[:SS]` (read as UTC) or a
/// bare `YYYY-MM-DD`. A bare date resolves to midnight, or to the last
/// millisecond of the day when `end_of_day` is set.
pub fn parse(value: &str, end_of_day: bool) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Some(timestamp.with_timezone(&Utc));
    }

    if let Some(local) = LOCAL_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
    {
        return Some(local.and_utc());
    }

    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    let time = if end_of_day {
        date.and_hms_milli_opt(23, 59, 59, 999)
    } else {
        date.and_hms_opt(0, 0, 0)
    };
    time.map(|t| t.and_utc())
}

/// `deserialize_with` helper for optional timestamps; blank strings count as absent
pub fn deserialize_optional<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(value) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if value.trim().is_empty() {
        return Ok(None);
    }
    parse(&value, false)
        .map(Some)
        .ok_or_else(|| serde::de::Error::custom(format!("Invalid date: {}", value)))
}
