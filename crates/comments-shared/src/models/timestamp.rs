use std::fmt;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Naive ISO layouts accepted when the server omits the offset; read as UTC
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Server-assigned creation time, kept for display only.
///
/// A value that does not parse as a date is kept verbatim instead of failing
/// the whole response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Timestamp {
    Utc(DateTime<Utc>),
    Raw(String),
}

impl Timestamp {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return Timestamp::Utc(dt.with_timezone(&Utc));
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
            .map(|naive| Timestamp::Utc(Utc.from_utc_datetime(&naive)))
            .unwrap_or_else(|| Timestamp::Raw(raw.to_string()))
    }

    pub fn as_utc(&self) -> Option<DateTime<Utc>> {
        match self {
            Timestamp::Utc(dt) => Some(*dt),
            Timestamp::Raw(_) => None,
        }
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Timestamp::Utc(dt)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timestamp::Utc(dt) => f.write_str(&dt.to_rfc3339()),
            Timestamp::Raw(raw) => f.write_str(raw),
        }
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Timestamp::parse(&raw))
    }
}
