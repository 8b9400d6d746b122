//! `VEVENT` to [`Event`] normalization.
//!
//! The normalization process:
//! 1. Resolves `DTSTART` to UTC (required)
//! 2. Resolves the end: `DTEND`, else `DTSTART + DURATION`, else the start
//!    itself (one day later for all-day events)
//! 3. Copies summary, description and location unchanged
//! 4. Flags the event as past against the caller's reference instant

use calfeed_core::{Event, date_to_utc, floating_to_utc, parse_duration, zoned_to_utc};
use chrono::{DateTime, Duration, Utc};
use icalendar::{CalendarDateTime, Component, DatePerhapsTime, EventLike};
use tracing::trace;

use crate::error::CreationError;
use crate::ics::EventComponent;

/// A `DTSTART`/`DTEND` value resolved to UTC.
#[derive(Debug, Clone, Copy)]
struct Resolved {
    instant: DateTime<Utc>,
    all_day: bool,
}

/// Converts one event component into an [`Event`].
///
/// `now` is the reference instant the past/future flag is computed against.
///
/// # Errors
///
/// Returns [`CreationError`] when `DTSTART` is missing, when a date
/// property or `DURATION` cannot be parsed, or when a `TZID` is unknown.
pub fn create_event(component: &EventComponent, now: DateTime<Utc>) -> Result<Event, CreationError> {
    let source = component.event();

    let start = resolve_property(source.get_start(), source.property_value("DTSTART"), "DTSTART")?
        .ok_or_else(|| {
            if source.property_value("DTEND").is_none() {
                CreationError::new("DTSTART and DTEND are missing")
            } else {
                CreationError::new("DTSTART is missing")
            }
        })?;

    let duration = source
        .property_value("DURATION")
        .map(|value| {
            parse_duration(value).map_err(|e| {
                CreationError::new(format!("DURATION could not be parsed: {}", e)).with_source(e)
            })
        })
        .transpose()?;

    let end = match resolve_property(source.get_end(), source.property_value("DTEND"), "DTEND")? {
        Some(end) => end.instant,
        None => implied_end(start, duration)?,
    };

    let mut event = Event::new(start.instant, end, now, component.raw());

    if let Some(duration) = duration {
        event = event.with_duration(duration);
    }

    if let Some(summary) = source.get_summary() {
        event = event.with_summary(summary);
    }

    if let Some(description) = source.get_description() {
        event = event.with_description(description);
    }

    if let Some(location) = source.get_location() {
        event = event.with_location(location);
    }

    trace!(
        summary = ?event.summary,
        start = %event.start_date,
        end = %event.end_date,
        is_past = event.is_past,
        "Created event"
    );

    Ok(event)
}

/// Resolves an optional date property, telling a missing property apart
/// from one whose value did not parse.
fn resolve_property(
    value: Option<DatePerhapsTime>,
    raw: Option<&str>,
    name: &str,
) -> Result<Option<Resolved>, CreationError> {
    match (value, raw) {
        (Some(value), _) => resolve(value, name).map(Some),
        (None, Some(raw)) => Err(CreationError::new(format!(
            "{} value {:?} is not a valid date or date-time",
            name, raw
        ))),
        (None, None) => Ok(None),
    }
}

fn resolve(value: DatePerhapsTime, name: &str) -> Result<Resolved, CreationError> {
    let instant = match value {
        DatePerhapsTime::Date(date) => {
            return Ok(Resolved {
                instant: date_to_utc(date),
                all_day: true,
            });
        }
        DatePerhapsTime::DateTime(CalendarDateTime::Utc(dt)) => dt,
        DatePerhapsTime::DateTime(CalendarDateTime::Floating(naive)) => floating_to_utc(naive),
        DatePerhapsTime::DateTime(CalendarDateTime::WithTimezone { date_time, tzid }) => {
            zoned_to_utc(date_time, &tzid).map_err(|e| {
                CreationError::new(format!("{} could not be resolved: {}", name, e)).with_source(e)
            })?
        }
    };

    Ok(Resolved {
        instant,
        all_day: false,
    })
}

/// The end of an event without `DTEND` (RFC 5545 section 3.6.1).
fn implied_end(start: Resolved, duration: Option<Duration>) -> Result<DateTime<Utc>, CreationError> {
    let length = match duration {
        Some(duration) => duration,
        None if start.all_day => Duration::days(1),
        None => return Ok(start.instant),
    };

    start
        .instant
        .checked_add_signed(length)
        .ok_or_else(|| CreationError::new("event end is out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ics::parse_calendar;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    /// Wraps VEVENT properties in a calendar and returns its only component.
    fn component(properties: &str) -> EventComponent {
        let ics = format!(
            "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Test//Test//EN\r\n\
             BEGIN:VEVENT\r\nUID:test@example.com\r\n{}\r\nEND:VEVENT\r\nEND:VCALENDAR",
            properties.trim_end().replace('\n', "\r\n")
        );
        parse_calendar(&ics).unwrap().remove(0)
    }

    fn now() -> DateTime<Utc> {
        utc(2023, 1, 1, 0, 0)
    }

    #[test]
    fn copies_descriptive_fields() {
        let component = component(
            "DTSTART:20220102T090000Z\n\
             DTEND:20220102T100000Z\n\
             SUMMARY:Test Event\n\
             DESCRIPTION:This is a test event\n\
             LOCATION:Test Location",
        );

        let event = create_event(&component, now()).unwrap();
        assert_eq!(event.start_date, utc(2022, 1, 2, 9, 0));
        assert_eq!(event.end_date, utc(2022, 1, 2, 10, 0));
        assert_eq!(event.summary.as_deref(), Some("Test Event"));
        assert_eq!(event.description.as_deref(), Some("This is a test event"));
        assert_eq!(event.location.as_deref(), Some("Test Location"));
        assert_eq!(event.duration, Duration::hours(1));
        assert!(event.is_past);
        assert_eq!(event.ics, component.raw());
    }

    #[test]
    fn absent_fields_are_none() {
        let event = create_event(&component("DTSTART:20230102T090000Z"), now()).unwrap();
        assert!(event.summary.is_none());
        assert!(event.description.is_none());
        assert!(event.location.is_none());
        assert!(!event.is_past);
    }

    #[test]
    fn boundary_at_reference_instant() {
        let component = component("DTSTART:20230101T090000Z\nDTEND:20230101T100000Z");

        let at_end = create_event(&component, utc(2023, 1, 1, 10, 0)).unwrap();
        assert!(!at_end.is_past);

        let minute_later = create_event(&component, utc(2023, 1, 1, 10, 1)).unwrap();
        assert!(minute_later.is_past);
    }

    #[test]
    fn tzid_values_resolve_to_utc() {
        let component = component(
            "DTSTART;TZID=Europe/Berlin:20230110T100000\n\
             DTEND;TZID=America/New_York:20230110T060000",
        );

        let event = create_event(&component, now()).unwrap();
        assert_eq!(event.start_date, utc(2023, 1, 10, 9, 0));
        assert_eq!(event.end_date, utc(2023, 1, 10, 11, 0));
    }

    #[test]
    fn floating_values_read_as_utc() {
        let event = create_event(
            &component("DTSTART:20230110T100000\nDTEND:20230110T113000"),
            now(),
        )
        .unwrap();
        assert_eq!(event.start_date, utc(2023, 1, 10, 10, 0));
        assert_eq!(event.end_date, utc(2023, 1, 10, 11, 30));
    }

    #[test]
    fn all_day_without_end_lasts_one_day() {
        let event = create_event(&component("DTSTART;VALUE=DATE:20230110"), now()).unwrap();
        assert_eq!(event.start_date, utc(2023, 1, 10, 0, 0));
        assert_eq!(event.end_date, utc(2023, 1, 11, 0, 0));
        assert_eq!(event.duration, Duration::days(1));
    }

    #[test]
    fn end_from_duration() {
        let event = create_event(
            &component("DTSTART:20230110T100000Z\nDURATION:PT1H30M"),
            now(),
        )
        .unwrap();
        assert_eq!(event.end_date, utc(2023, 1, 10, 11, 30));
        assert_eq!(event.duration, Duration::minutes(90));
    }

    #[test]
    fn lowercase_property_names() {
        let event = create_event(
            &component("dtstart:20230110T100000Z\nduration:PT1H\nsummary:Lower"),
            now(),
        )
        .unwrap();
        assert_eq!(event.start_date, utc(2023, 1, 10, 10, 0));
        assert_eq!(event.end_date, utc(2023, 1, 10, 11, 0));
        assert_eq!(event.summary.as_deref(), Some("Lower"));
    }

    #[test]
    fn timed_event_without_end_is_instantaneous() {
        let event = create_event(&component("DTSTART:20230110T100000Z"), now()).unwrap();
        assert_eq!(event.end_date, event.start_date);
        assert_eq!(event.duration, Duration::zero());
    }

    #[test]
    fn end_before_start_is_kept() {
        let event = create_event(
            &component("DTSTART:20230110T100000Z\nDTEND:20230110T090000Z"),
            now(),
        )
        .unwrap();
        assert_eq!(event.duration, Duration::hours(-1));
    }

    #[test]
    fn missing_start_and_end_fails() {
        let component = component("SUMMARY:Test Event");
        let err = create_event(&component, now()).unwrap_err();
        assert_eq!(err.message(), "DTSTART and DTEND are missing");
    }

    #[test]
    fn missing_start_fails() {
        let err = create_event(&component("DTEND:20230110T100000Z"), now()).unwrap_err();
        assert_eq!(err.message(), "DTSTART is missing");
    }

    #[test]
    fn built_component_without_dates_fails() {
        let event = icalendar::Event::new().summary("Test Event").done();
        let err = create_event(&EventComponent::new(event), now()).unwrap_err();
        assert!(err.to_string().starts_with("error creating event:"));
    }

    #[test]
    fn malformed_start_fails() {
        let err = create_event(&component("DTSTART:not-a-date"), now()).unwrap_err();
        assert!(err.message().contains("not-a-date"));
    }

    #[test]
    fn unknown_tzid_fails() {
        let err = create_event(
            &component("DTSTART;TZID=Nowhere/Special:20230110T100000"),
            now(),
        )
        .unwrap_err();
        assert!(err.message().contains("Nowhere/Special"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn malformed_duration_fails() {
        let err = create_event(
            &component("DTSTART:20230110T100000Z\nDURATION:one hour"),
            now(),
        )
        .unwrap_err();
        assert!(err.message().starts_with("DURATION could not be parsed"));
    }
}
