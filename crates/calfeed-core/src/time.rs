//! Resolution of calendar date/time values to UTC.
//!
//! iCalendar values come in four shapes: UTC datetimes, datetimes with a
//! `TZID`, floating datetimes and plain dates. Every helper here maps one of
//! them to a `DateTime<Utc>` without consulting the process local zone.
//!
//! - Plain dates resolve to midnight UTC.
//! - Floating datetimes are read as UTC.
//! - `TZID` datetimes are resolved through the IANA database in `chrono-tz`.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use thiserror::Error;

/// Errors raised while resolving calendar time values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeError {
    /// The `TZID` is not an IANA time zone name.
    #[error("unknown time zone {0:?}")]
    UnknownTimeZone(String),

    /// The local time could not be placed on the zone's timeline.
    #[error("local time {date_time} cannot be resolved in {tzid}")]
    Unresolvable {
        /// The local datetime.
        date_time: NaiveDateTime,
        /// The zone it was expressed in.
        tzid: String,
    },

    /// A `DURATION` value did not follow RFC 5545 syntax.
    #[error("invalid duration {0:?}")]
    InvalidDuration(String),
}

/// Resolves an all-day date to midnight UTC.
pub fn date_to_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Resolves a floating datetime, reading it as UTC.
pub fn floating_to_utc(date_time: NaiveDateTime) -> DateTime<Utc> {
    date_time.and_utc()
}

/// Resolves a datetime expressed in the zone named by `tzid`.
///
/// Ambiguous local times (clocks going back) resolve to the earlier instant.
/// Local times inside a gap (clocks going forward) keep the offset in force
/// before the gap, which moves them forward by the gap length.
pub fn zoned_to_utc(date_time: NaiveDateTime, tzid: &str) -> Result<DateTime<Utc>, TimeError> {
    let name = tzid.trim().trim_matches('"');
    let tz: Tz = name
        .parse()
        .map_err(|_| TimeError::UnknownTimeZone(name.to_string()))?;

    if let Some(resolved) = tz.from_local_datetime(&date_time).earliest() {
        return Ok(resolved.with_timezone(&Utc));
    }

    let unresolvable = || TimeError::Unresolvable {
        date_time,
        tzid: name.to_string(),
    };
    let before_gap = date_time
        .checked_sub_signed(Duration::days(1))
        .ok_or_else(unresolvable)?;
    let offset = tz
        .offset_from_local_datetime(&before_gap)
        .earliest()
        .ok_or_else(unresolvable)?
        .fix();

    date_time
        .checked_sub_signed(Duration::seconds(i64::from(offset.local_minus_utc())))
        .map(|naive| naive.and_utc())
        .ok_or_else(unresolvable)
}

/// Parses an RFC 5545 `DURATION` value such as `PT1H30M`, `P1D` or `-P2W`.
pub fn parse_duration(value: &str) -> Result<Duration, TimeError> {
    let invalid = || TimeError::InvalidDuration(value.to_string());
    let s = value.trim();

    let (sign, rest) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let rest = rest
        .strip_prefix('P')
        .or_else(|| rest.strip_prefix('p'))
        .ok_or_else(invalid)?;

    let mut seconds: i64 = 0;
    let mut digits = String::new();
    let mut in_time = false;
    let mut has_component = false;
    let mut has_time_component = false;

    for c in rest.chars().map(|c| c.to_ascii_uppercase()) {
        let unit = match c {
            '0'..='9' => {
                digits.push(c);
                continue;
            }
            'T' if !in_time && digits.is_empty() => {
                in_time = true;
                continue;
            }
            'W' | 'D' if !in_time => {
                if c == 'W' {
                    604_800
                } else {
                    86_400
                }
            }
            'H' if in_time => 3_600,
            'M' if in_time => 60,
            'S' if in_time => 1,
            _ => return Err(invalid()),
        };

        let amount: i64 = digits.parse().map_err(|_| invalid())?;
        seconds = amount
            .checked_mul(unit)
            .and_then(|part| seconds.checked_add(part))
            .ok_or_else(invalid)?;
        digits.clear();
        has_component = true;
        has_time_component |= in_time;
    }

    if !digits.is_empty() || !has_component || (in_time && !has_time_component) {
        return Err(invalid());
    }

    Duration::try_seconds(sign * seconds).ok_or_else(invalid)
}
