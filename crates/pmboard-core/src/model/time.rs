//! Lenient timestamp decoding for backend payloads.
//!
//! The backend serializes dates in more than one shape depending on the
//! entity: RFC 3339 with offset, naive `YYYY-MM-DDTHH:MM:SS[.fff]`, a bare
//! date, epoch milliseconds, or Jackson's `[y, m, d, h, min, s, nanos]`
//! array. Any other JSON value decodes to `None` so one odd field never fails
//! a whole list.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Millis(i64),
    Text(String),
    Parts(Vec<i64>),
    Other(serde_json::Value),
}

fn from_parts(parts: &[i64]) -> Option<NaiveDateTime> {
    let field = |i: usize| parts.get(i).copied().unwrap_or(0);
    let date = NaiveDate::from_ymd_opt(
        i32::try_from(*parts.first()?).ok()?,
        u32::try_from(*parts.get(1)?).ok()?,
        u32::try_from(*parts.get(2)?).ok()?,
    )?;
    date.and_hms_nano_opt(
        u32::try_from(field(3)).ok()?,
        u32::try_from(field(4)).ok()?,
        u32::try_from(field(5)).ok()?,
        u32::try_from(field(6)).ok()?,
    )
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    // Java's default Date format: 2024-03-01T10:00:00.000+0000
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    parse_date(raw).and_then(|d| d.and_hms_opt(0, 0, 0).map(|n| Utc.from_utc_datetime(&n)))
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let head = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

pub mod timestamp {
    use super::*;

    pub fn deserialize<'de, D>(de: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<RawTimestamp> = Option::deserialize(de)?;
        Ok(match raw {
            Some(RawTimestamp::Millis(ms)) => Utc.timestamp_millis_opt(ms).single(),
            Some(RawTimestamp::Text(s)) => parse_timestamp(&s),
            Some(RawTimestamp::Parts(parts)) => {
                from_parts(&parts).map(|n| Utc.from_utc_datetime(&n))
            }
            Some(RawTimestamp::Other(v)) => {
                tracing::debug!(value = %v, "unrecognized timestamp");
                None
            }
            None => None,
        })
    }

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, ser: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => ser.serialize_str(&dt.to_rfc3339()),
            None => ser.serialize_none(),
        }
    }
}

pub mod date {
    use super::*;

    pub fn deserialize<'de, D>(de: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<RawTimestamp> = Option::deserialize(de)?;
        Ok(match raw {
            Some(RawTimestamp::Millis(ms)) => {
                Utc.timestamp_millis_opt(ms).single().map(|dt| dt.date_naive())
            }
            Some(RawTimestamp::Text(s)) => parse_date(&s),
            Some(RawTimestamp::Parts(parts)) => from_parts(&parts).map(|n| n.date()),
            Some(RawTimestamp::Other(v)) => {
                tracing::debug!(value = %v, "unrecognized timestamp");
                None
            }
            None => None,
        })
    }

    pub fn serialize<S>(value: &Option<NaiveDate>, ser: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(d) => ser.serialize_str(&d.format("%Y-%m-%d").to_string()),
            None => ser.serialize_none(),
        }
    }
}
