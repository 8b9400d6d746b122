//! ICS/iCalendar parsing.
//!
//! The grammar itself is handled by the `icalendar` crate. This module
//! checks that the text is a calendar at all, rejects lines that are not
//! `NAME[;PARAM=VALUE]:VALUE` content lines, upper-cases property and
//! parameter names, extracts the `VEVENT` components and pairs each one
//! with the raw text block it came from.

use icalendar::{Calendar, CalendarComponent, Event};
use tracing::debug;

use crate::error::ParseError;

/// A parsed `VEVENT` component together with its raw text.
#[derive(Debug, Clone)]
pub struct EventComponent {
    event: Event,
    raw: String,
}

impl EventComponent {
    /// Wraps a component built in code; its raw text is its own
    /// serialization.
    pub fn new(event: Event) -> Self {
        let raw = serialize_event(&event);
        Self { event, raw }
    }

    /// Wraps a parsed component and the text block it was parsed from.
    pub fn from_parts(event: Event, raw: impl Into<String>) -> Self {
        Self {
            event,
            raw: raw.into(),
        }
    }

    /// Returns the structured component.
    pub fn event(&self) -> &Event {
        &self.event
    }

    /// Returns the raw `BEGIN:VEVENT` ... `END:VEVENT` text.
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

/// Parses calendar text and returns its event components in feed order.
///
/// A calendar without events yields an empty list.
///
/// # Errors
///
/// Returns [`ParseError::Grammar`] when the text does not start with
/// `BEGIN:VCALENDAR`, contains a line that is not a content line, or the
/// grammar parser rejects it.
pub fn parse_calendar(text: &str) -> Result<Vec<EventComponent>, ParseError> {
    let text = text.trim_start_matches('\u{feff}');

    match text.lines().map(str::trim).find(|line| !line.is_empty()) {
        Some(line) if line.eq_ignore_ascii_case("BEGIN:VCALENDAR") => {}
        Some(line) => {
            return Err(ParseError::Grammar(format!(
                "invalid line, expected BEGIN:VCALENDAR: {:?}",
                preview(line)
            )));
        }
        None => return Err(ParseError::Grammar("input is empty".to_string())),
    }

    let calendar: Calendar = normalize_content(text)?
        .parse()
        .map_err(|e| ParseError::Grammar(format!("{}", e)))?;

    let events: Vec<Event> = calendar
        .iter()
        .filter_map(|component| match component {
            CalendarComponent::Event(event) => Some(event.clone()),
            _ => None,
        })
        .collect();
    let blocks = event_blocks(text);

    if events.len() != blocks.len() {
        return Err(ParseError::Grammar(format!(
            "found {} VEVENT blocks but parsed {} events",
            blocks.len(),
            events.len()
        )));
    }

    debug!(events = events.len(), "Parsed ICS content");

    Ok(events
        .into_iter()
        .zip(blocks)
        .map(|(event, raw)| EventComponent::from_parts(event, raw))
        .collect())
}

/// Unfolds the text into logical content lines, validates each one and
/// upper-cases its names. Blank lines are dropped.
fn normalize_content(text: &str) -> Result<String, ParseError> {
    let mut logical: Vec<String> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }

        match line.strip_prefix([' ', '\t']) {
            Some(rest) => match logical.last_mut() {
                Some(previous) => previous.push_str(rest),
                None => {
                    return Err(ParseError::Grammar(format!(
                        "continuation line without a content line: {:?}",
                        preview(line)
                    )));
                }
            },
            None => logical.push(line.to_string()),
        }
    }

    let lines = logical
        .iter()
        .enumerate()
        .map(|(idx, line)| {
            normalize_line(line).ok_or_else(|| {
                ParseError::Grammar(format!(
                    "content line {} has no NAME:VALUE form: {:?}",
                    idx + 1,
                    preview(line)
                ))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(lines.join("\r\n"))
}

/// Upper-cases the property and parameter names of one unfolded content
/// line. Parameter values, quoted or not, and the property value are kept,
/// except the component name after `BEGIN`/`END`.
///
/// Returns `None` when the line has no `:` outside quotes or its name is
/// not made of letters, digits and dashes.
fn normalize_line(line: &str) -> Option<String> {
    let mut head = String::with_capacity(line.len());
    let mut in_quotes = false;
    let mut in_param_value = false;

    for (idx, ch) in line.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ':' if !in_quotes => return finish_line(head, &line[idx + 1..]),
            ';' if !in_quotes => in_param_value = false,
            '=' if !in_quotes => in_param_value = true,
            _ => {}
        }

        if in_quotes || in_param_value {
            head.push(ch);
        } else {
            head.push(ch.to_ascii_uppercase());
        }
    }

    None
}

fn finish_line(head: String, value: &str) -> Option<String> {
    let name = head.split(';').next().unwrap_or_default();
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return None;
    }

    if name == "BEGIN" || name == "END" {
        Some(format!("{}:{}", head, value.to_ascii_uppercase()))
    } else {
        Some(format!("{}:{}", head, value))
    }
}

/// Splits out the top-level `VEVENT` blocks of a calendar, nested
/// components (alarms) included, joined with CRLF. Folded lines are kept
/// as they appear in the feed.
fn event_blocks(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut lines: Vec<&str> = Vec::new();
    let mut depth = 0usize;

    for line in text.lines() {
        let marker = line.trim_end();

        if depth == 0 {
            if marker.eq_ignore_ascii_case("BEGIN:VEVENT") {
                depth = 1;
                lines.push(line);
            }
            continue;
        }

        lines.push(line);
        if has_prefix(marker, "BEGIN:") {
            depth += 1;
        } else if has_prefix(marker, "END:") {
            depth -= 1;
            if depth == 0 {
                blocks.push(lines.join("\r\n"));
                lines.clear();
            }
        }
    }

    blocks
}

fn has_prefix(line: &str, prefix: &str) -> bool {
    line.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

fn serialize_event(event: &Event) -> String {
    let mut calendar = Calendar::new();
    calendar.push(event.clone());
    event_blocks(&calendar.to_string())
        .into_iter()
        .next()
        .unwrap_or_default()
}

fn preview(line: &str) -> String {
    const MAX: usize = 60;
    match line.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &line[..idx]),
        None => line.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use icalendar::Component;

    fn empty_calendar() -> &'static str {
        "BEGIN:VCALENDAR\r\n\
         VERSION:2.0\r\n\
         PRODID:-//Test//Test//EN\r\n\
         END:VCALENDAR"
    }

    fn two_events() -> &'static str {
        "BEGIN:VCALENDAR\r\n\
         VERSION:2.0\r\n\
         PRODID:-//Test//Test//EN\r\n\
         BEGIN:VEVENT\r\n\
         UID:first@example.com\r\n\
         DTSTART:20220102T090000Z\r\n\
         DTEND:20220102T100000Z\r\n\
         SUMMARY:First\r\n\
         BEGIN:VALARM\r\n\
         ACTION:DISPLAY\r\n\
         TRIGGER:-PT15M\r\n\
         END:VALARM\r\n\
         END:VEVENT\r\n\
         BEGIN:VEVENT\r\n\
         UID:second@example.com\r\n\
         DTSTART:20220103T090000Z\r\n\
         DTEND:20220103T100000Z\r\n\
         SUMMARY:Second\r\n\
         END:VEVENT\r\n\
         END:VCALENDAR"
    }

    #[test]
    fn calendar_without_events() {
        let components = parse_calendar(empty_calendar()).unwrap();
        assert!(components.is_empty());
    }

    #[test]
    fn events_keep_feed_order_and_raw_text() {
        let components = parse_calendar(two_events()).unwrap();
        assert_eq!(components.len(), 2);

        assert_eq!(components[0].event().get_summary(), Some("First"));
        assert_eq!(components[1].event().get_summary(), Some("Second"));

        let raw = components[0].raw();
        assert!(raw.starts_with("BEGIN:VEVENT\r\nUID:first@example.com"));
        assert!(raw.contains("BEGIN:VALARM"));
        assert!(raw.ends_with("END:VALARM\r\nEND:VEVENT"));
        assert!(!raw.contains("Second"));
    }

    #[test]
    fn leading_bom_and_blank_lines_are_accepted() {
        let text = format!("\u{feff}\r\n{}", two_events());
        assert_eq!(parse_calendar(&text).unwrap().len(), 2);
    }

    #[test]
    fn non_calendar_text_is_rejected() {
        let err = parse_calendar("Invalid ICS data").unwrap_err();
        assert!(matches!(err, ParseError::Grammar(_)));
        assert!(err.to_string().contains("Invalid ICS data"));
    }

    #[test]
    fn stray_text_inside_calendar_is_rejected() {
        let err =
            parse_calendar("BEGIN:VCALENDAR\r\nthis is not ics\r\nEND:VCALENDAR").unwrap_err();
        assert!(matches!(err, ParseError::Grammar(_)));
        assert!(err.to_string().contains("this is not ics"));
    }

    #[test]
    fn stray_text_before_event_is_rejected() {
        let text = two_events().replace(
            "BEGIN:VEVENT\r\nUID:second",
            "garbage\r\nBEGIN:VEVENT\r\nUID:second",
        );
        let err = parse_calendar(&text).unwrap_err();
        assert!(err.to_string().contains("garbage"));
    }

    #[test]
    fn lowercase_names_are_accepted() {
        let text = "begin:vcalendar\r\n\
             version:2.0\r\n\
             begin:vevent\r\n\
             uid:lower@example.com\r\n\
             dtstart;tzid=Europe/Berlin:20230110T100000\r\n\
             summary:Lower Case\r\n\
             end:vevent\r\n\
             end:vcalendar";

        let components = parse_calendar(text).unwrap();
        assert_eq!(components.len(), 1);
        let event = components[0].event();
        assert_eq!(event.get_summary(), Some("Lower Case"));
        assert_eq!(event.property_value("DTSTART"), Some("20230110T100000"));
        assert!(components[0].raw().starts_with("begin:vevent\r\nuid:lower@example.com"));
    }

    #[test]
    fn folded_lines_are_unfolded_for_parsing_and_kept_raw() {
        let text = two_events().replace("SUMMARY:Second", "SUMMARY:Long\r\n  title");

        let components = parse_calendar(&text).unwrap();
        assert_eq!(components[1].event().get_summary(), Some("Long title"));
        assert!(components[1].raw().contains("SUMMARY:Long\r\n  title"));
    }

    #[test]
    fn normalize_line_upper_cases_names_only() {
        assert_eq!(
            normalize_line(r#"x-wr-calname;x-note="a:b;c";value=text:My Cal"#).as_deref(),
            Some(r#"X-WR-CALNAME;X-NOTE="a:b;c";VALUE=text:My Cal"#)
        );
        assert_eq!(normalize_line("end:valarm").as_deref(), Some("END:VALARM"));
        assert_eq!(normalize_line("no separator"), None);
        assert_eq!(normalize_line(":value"), None);
        assert_eq!(normalize_line("two words:value"), None);
    }

    #[test]
    fn empty_text_is_rejected() {
        assert!(matches!(
            parse_calendar("  \r\n").unwrap_err(),
            ParseError::Grammar(_)
        ));
    }

    #[test]
    fn event_blocks_handle_lf_and_lowercase() {
        let text = "BEGIN:VCALENDAR\nbegin:vevent\nSUMMARY:x\nend:vevent\nEND:VCALENDAR\n";
        assert_eq!(
            event_blocks(text),
            vec!["begin:vevent\r\nSUMMARY:x\r\nend:vevent".to_string()]
        );
    }

    #[test]
    fn built_component_serializes_itself() {
        let event = Event::new().summary("Built in code").done();
        let component = EventComponent::new(event);
        assert!(component.raw().starts_with("BEGIN:VEVENT"));
        assert!(component.raw().contains("SUMMARY:Built in code"));
        assert!(component.raw().ends_with("END:VEVENT"));
    }

    #[test]
    fn preview_truncates_long_lines() {
        let long = "x".repeat(100);
        assert_eq!(preview(&long).len(), 63);
        assert_eq!(preview("short"), "short");
    }
}
