use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use tracing::warn;

use crate::error::{Error, Result};

/// Validated value of the `--duration` argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DurationArg {
    /// No duration given (or the literal `default`); the default window applies
    Default,
    /// On until disabled by hand; only valid together with `--force`
    Forever,
    /// On for this many seconds from now
    Seconds(i64),
    /// On until this instant
    Until(DateTime<Utc>),
}

impl DurationArg {
    /// Parse the raw `--duration` value against the current time.
    ///
    /// An absent value means `default`; an empty one too, but with a
    /// warning since the user probably meant to pass something.
    pub fn parse(raw: Option<&str>, now: DateTime<Utc>) -> Result<Self> {
        let Some(raw) = raw.map(str::trim) else {
            return Ok(Self::Default);
        };
        if raw.is_empty() {
            warn!("Empty --duration value, falling back to the default duration");
            return Ok(Self::Default);
        }

        match raw {
            "default" => Ok(Self::Default),
            "forever" => Ok(Self::Forever),
            _ => Self::parse_explicit(raw, now),
        }
    }

    fn parse_explicit(raw: &str, now: DateTime<Utc>) -> Result<Self> {
        if let Ok(secs) = raw.parse::<i64>() {
            if secs <= 0 {
                return Err(Error::Validation(format!(
                    "duration must be a positive number of seconds, got {secs}"
                )));
            }
            return Ok(Self::Seconds(secs));
        }

        let Some(until) = parse_datetime(raw) else {
            return Err(Error::Validation(format!(
                "cannot interpret {raw:?} as `default`, `forever`, a number of seconds or a date/time"
            )));
        };
        if until <= now {
            return Err(Error::Validation(format!(
                "{raw:?} lies in the past, maintenance end must be in the future"
            )));
        }
        Ok(Self::Until(until))
    }

    /// The instant maintenance mode should expire, `None` for `forever`.
    pub fn expires_at(
        &self,
        default_duration: Duration,
        now: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        match self {
            Self::Default => Some(now + default_duration),
            Self::Forever => None,
            // clamp far-off expiries to chrono's representable range
            Self::Seconds(secs) => Some(
                now.checked_add_signed(Duration::milliseconds(secs.saturating_mul(1000)))
                    .unwrap_or(DateTime::<Utc>::MAX_UTC),
            ),
            Self::Until(until) => Some(*until),
        }
    }
}

/// Accepts RFC 3339 plus a handful of common spellings; naive values are
/// interpreted in local time, a bare date as local midnight.
fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    const FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%d.%m.%Y %H:%M",
        "%m/%d/%Y %H:%M",
    ];
    for fmt in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return local_to_utc(dt);
        }
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    local_to_utc(date.and_hms_opt(0, 0, 0)?)
}

fn local_to_utc(dt: NaiveDateTime) -> Option<DateTime<Utc>> {
    Local
        .from_local_datetime(&dt)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::DurationArg;
    use crate::error::Error;

    fn now() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn absent_and_default_and_empty_mean_default() {
        assert_eq!(DurationArg::parse(None, now()).unwrap(), DurationArg::Default);
        assert_eq!(
            DurationArg::parse(Some("default"), now()).unwrap(),
            DurationArg::Default
        );
        assert_eq!(
            DurationArg::parse(Some("  "), now()).unwrap(),
            DurationArg::Default
        );
    }

    #[test]
    fn seconds_must_be_positive() {
        assert_eq!(
            DurationArg::parse(Some("3600"), now()).unwrap(),
            DurationArg::Seconds(3600)
        );
        assert!(matches!(
            DurationArg::parse(Some("0"), now()),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            DurationArg::parse(Some("-5"), now()),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn unparseable_value_is_rejected() {
        assert!(matches!(
            DurationArg::parse(Some("next tuesday"), now()),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn rfc3339_in_the_future_is_accepted() {
        let arg = DurationArg::parse(Some("2024-05-01T13:00:00+00:00"), now()).unwrap();
        assert_eq!(
            arg,
            DurationArg::Until(Utc.with_ymd_and_hms(2024, 5, 1, 13, 0, 0).unwrap())
        );
    }

    #[test]
    fn datetime_in_the_past_is_rejected() {
        assert!(matches!(
            DurationArg::parse(Some("2024-05-01T11:00:00+00:00"), now()),
            Err(Error::Validation(_))
        ));
        // the boundary counts as past, the end must be strictly later
        assert!(matches!(
            DurationArg::parse(Some("2024-05-01T12:00:00+00:00"), now()),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn expiry_computation() {
        let now = now();
        assert_eq!(
            DurationArg::Default.expires_at(Duration::seconds(600), now),
            Some(now + Duration::seconds(600))
        );
        assert_eq!(
            DurationArg::Seconds(42).expires_at(Duration::seconds(600), now),
            Some(now + Duration::seconds(42))
        );
        assert_eq!(DurationArg::Forever.expires_at(Duration::seconds(600), now), None);
    }

    #[test]
    fn huge_second_counts_do_not_overflow() {
        let expiry = DurationArg::Seconds(i64::MAX)
            .expires_at(Duration::seconds(600), now())
            .unwrap();
        assert!(expiry > now());
    }
}
