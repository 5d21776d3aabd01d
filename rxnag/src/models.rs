//! Data models
//!
//! Plain records for medications plus the derived display state.
//! Persisted fields are read leniently so that files written by older
//! versions (naive ISO timestamps, missing `muted`) still load.

use crate::config::{DEFAULT_INTERVAL_HOURS, MIN_INTERVAL_HOURS};
use chrono::{DateTime, Local, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Naive timestamp layouts accepted on read, interpreted as local time
const NAIVE_TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// A medication the user wants to be reminded about
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MedicationRecord {
    pub name: String,
    /// `None` means never taken; such a record is due immediately
    #[serde(serialize_with = "serialize_last_taken")]
    pub last_taken: Option<DateTime<Utc>>,
    #[serde(rename = "interval")]
    pub interval_hours: u32,
    pub muted: bool,
}

impl MedicationRecord {
    /// A freshly added medication counts as taken right now
    pub fn new(name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            last_taken: Some(now),
            interval_hours: DEFAULT_INTERVAL_HOURS,
            muted: false,
        }
    }

    /// Build a record from one persisted JSON entry.
    ///
    /// Returns `None` when the entry has no usable name. Every other field
    /// falls back to its default or is clamped.
    pub fn from_value(value: &Value) -> Option<Self> {
        let name = value.get("name").and_then(Value::as_str)?.trim();
        if name.is_empty() {
            return None;
        }

        let last_taken = value.get("last_taken").and_then(parse_last_taken);
        let interval_hours = value
            .get("interval")
            .and_then(value_as_i64)
            .map(clamp_interval)
            .unwrap_or(DEFAULT_INTERVAL_HOURS);
        let muted = value.get("muted").and_then(Value::as_bool).unwrap_or(false);

        Some(Self {
            name: name.to_string(),
            last_taken,
            interval_hours,
            muted,
        })
    }
}

/// Clamp a user or file supplied interval to the valid range
pub fn clamp_interval(hours: i64) -> u32 {
    hours.clamp(MIN_INTERVAL_HOURS as i64, u32::MAX as i64) as u32
}

/// Read an integer, accepting floats by truncation
pub(crate) fn value_as_i64(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
}

/// Parse a persisted `last_taken` value.
///
/// Accepts epoch seconds (0 = never), RFC 3339, naive ISO-8601 in local
/// time, and `null`. Anything unparseable is treated as never taken.
pub fn parse_last_taken(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(_) => {
            let secs = value_as_i64(value)?;
            if secs == 0 {
                None
            } else {
                DateTime::from_timestamp(secs, 0)
            }
        }
        Value::String(s) => parse_timestamp_str(s),
        _ => None,
    }
}

/// Parse a timestamp string in any of the accepted layouts
pub fn parse_timestamp_str(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        .map(|dt| dt.with_timezone(&Utc))
}

fn serialize_last_taken<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(dt) => serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        None => serializer.serialize_i64(0),
    }
}

/// A record that needs a notification this cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueAlert {
    /// Position in the medication list (0-based)
    pub index: usize,
    pub name: String,
}

/// Display state for one record, recomputed on every tick and mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MedicationStatus {
    /// 1-based position as shown to the user
    pub position: usize,
    pub name: String,
    pub due: bool,
    pub muted: bool,
    pub interval_hours: u32,
    pub last_taken_text: String,
    pub next_due: Option<DateTime<Utc>>,
}

/// Human readable "Last taken" line
pub fn last_taken_text(last_taken: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(taken) = last_taken else {
        return "Last taken: Never".to_string();
    };

    let elapsed = (now - taken).num_seconds().max(0);
    let hours = elapsed / 3600;
    if hours < 1 {
        format!("Last taken: {} mins ago", elapsed / 60)
    } else {
        format!("Last taken: {} hours ago", hours)
    }
}
