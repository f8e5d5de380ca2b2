//! Lenient timestamp parsing for request payloads.
//!
//! Admin forms submit production and harvest dates either as full RFC 3339
//! timestamps or as bare `YYYY-MM-DD` dates. Bare dates resolve to midnight
//! UTC.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};

/// Parse an RFC 3339 timestamp or a `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns a message naming the accepted formats when neither parses.
pub fn parse_flexible(s: &str) -> Result<DateTime<Utc>, String> {
    let s = s.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("invalid date '{s}': expected RFC 3339 or YYYY-MM-DD"))
}

/// `#[serde(deserialize_with = "flexible")]` for required timestamps.
///
/// # Errors
///
/// Fails when the value is not a string in an accepted format.
pub fn flexible<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_flexible(&s).map_err(serde::de::Error::custom)
}

/// `#[serde(default, deserialize_with = "flexible_opt")]` for optional timestamps.
///
/// # Errors
///
/// Fails when a present value is not in an accepted format.
pub fn flexible_opt<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|s| parse_flexible(&s).map_err(serde::de::Error::custom))
        .transpose()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use serde::Deserialize;

    #[test]
    fn test_parse_bare_date() {
        let ts = parse_flexible("2023-04-15").unwrap();
        assert_eq!((ts.year(), ts.month(), ts.day()), (2023, 4, 15));
        assert_eq!(ts.hour(), 0);
    }

    #[test]
    fn test_parse_rfc3339_converts_to_utc() {
        let ts = parse_flexible("2023-04-15T10:00:00+02:00").unwrap();
        assert_eq!(ts.hour(), 8);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_flexible("15/04/2023").is_err());
    }

    #[derive(Deserialize)]
    struct Form {
        #[serde(deserialize_with = "flexible")]
        produced: DateTime<Utc>,
        #[serde(default, deserialize_with = "flexible_opt")]
        harvested: Option<DateTime<Utc>>,
    }

    #[test]
    fn test_serde_helpers() {
        let form: Form = serde_json::from_str(r#"{"produced":"2023-05-01"}"#).unwrap();
        assert_eq!(form.produced.month(), 5);
        assert!(form.harvested.is_none());

        let form: Form =
            serde_json::from_str(r#"{"produced":"2023-05-01","harvested":null}"#).unwrap();
        assert!(form.harvested.is_none());

        let form: Form = serde_json::from_str(
            r#"{"produced":"2023-05-01","harvested":"2023-01-10T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(form.harvested.unwrap().month(), 1);
    }
}
