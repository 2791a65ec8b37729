//! Serde codec for backend timestamps.
//!
//! The API emits both zoned RFC 3339 strings and naive ISO-8601 strings
//! (SQL `TIMESTAMP` columns without a zone). Zoned values are normalised to
//! UTC and stored naive; naive values are taken as UTC already.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serializer};

// The last two are what a `datetime-local` input produces.
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];
const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parse any timestamp shape the backend is known to send. Bare dates map to midnight.
pub fn parse(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(zoned) = DateTime::parse_from_rfc3339(raw) {
        return Some(zoned.naive_utc());
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

pub fn format(value: &NaiveDateTime) -> String {
    value.format(WIRE_FORMAT).to_string()
}

pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format(value))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("unrecognised timestamp: {raw}")))
}

/// Serializer for a doubly optional payload field; pair with
/// `skip_serializing_if = "Option::is_none"` so only `Some(..)` reaches it.
pub fn nullable<S: Serializer>(
    value: &Option<Option<NaiveDateTime>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    option::serialize(&value.flatten(), serializer)
}

pub mod option {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.serialize_str(&super::format(v)),
            None => serializer.serialize_none(),
        }
    }

    /// Unparseable values degrade to `None`; a bad deadline should not sink a whole list.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(|r| {
            let parsed = parse(r);
            if parsed.is_none() && !r.trim().is_empty() {
                tracing::debug!(value = %r, "Ignoring unparseable timestamp");
            }
            parsed
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_naive_iso() {
        let ts = parse("2025-03-01T09:30:00").unwrap();
        assert_eq!(ts.hour(), 9);
        assert_eq!(ts.minute(), 30);
    }

    #[test]
    fn test_parse_naive_with_fraction() {
        let ts = parse("2025-03-01T09:30:00.123456").unwrap();
        assert_eq!(ts.day(), 1);
    }

    #[test]
    fn test_parse_minute_precision() {
        let ts = parse("2025-03-01T17:45").unwrap();
        assert_eq!((ts.hour(), ts.minute(), ts.second()), (17, 45, 0));
    }

    #[test]
    fn test_parse_zoned_normalises_to_utc() {
        let ts = parse("2025-03-01T09:30:00+02:00").unwrap();
        assert_eq!(ts.hour(), 7);
    }

    #[test]
    fn test_parse_bare_date_is_midnight() {
        let ts = parse("2025-12-24").unwrap();
        assert_eq!(ts.hour(), 0);
        assert_eq!(ts.month(), 12);
    }

    #[test]
    fn test_parse_garbage_is_none() {
        assert!(parse("next tuesday").is_none());
        assert!(parse("").is_none());
    }
}
