use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::errors::{Error, Result};

/// Accepts an RFC 3339 instant, a naive `YYYY-MM-DDTHH:MM[:SS]` timestamp or a
/// bare date. Values without an offset are taken as UTC.
pub fn parse_expiry(value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Ok(instant.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    Err(Error::InvalidExpiry(value.to_string()))
}
