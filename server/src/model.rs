//! The to-do record and its wire format.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A single to-do item.
///
/// Records are immutable once stored. The `id` is chosen by the caller and is
/// not checked for uniqueness.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i32,
    pub name: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub due_date: DateTime<Utc>,
    pub is_completed: bool,
}

/// Parses an ISO-8601 timestamp.
///
/// Accepts RFC 3339 (`2030-01-01T09:00:00Z`, `2030-01-01T09:00:00+02:00`),
/// offset-less date-times (`2030-01-01T09:00:00`) and bare dates
/// (`2030-01-01`). Values without an offset are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")?;
    Ok(date.and_time(NaiveTime::MIN).and_utc())
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .map_err(|e| serde::de::Error::custom(format!("invalid timestamp `{raw}`: {e}")))
}
