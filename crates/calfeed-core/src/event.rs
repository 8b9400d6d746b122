//! The normalized calendar event.
//!
//! An [`Event`] is built once from a parsed `VEVENT` component and never
//! mutated afterwards. All instants are stored in UTC and the past/future
//! flag is a snapshot taken against the reference instant of the operation
//! that produced the event.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Returns whether an event ending at `end_date` counts as past at `now`.
///
/// The comparison is strict: an event ending exactly at `now` is still
/// current.
pub fn ends_before(end_date: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    end_date < now
}

/// A calendar event normalized to UTC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// When the event starts.
    pub start_date: DateTime<Utc>,

    /// When the event ends. Not guaranteed to be after `start_date`.
    pub end_date: DateTime<Utc>,

    /// The event title.
    pub summary: Option<String>,

    /// The event description.
    pub description: Option<String>,

    /// The event location.
    pub location: Option<String>,

    /// The event duration, serialized as whole seconds.
    #[serde(with = "duration_seconds")]
    pub duration: Duration,

    /// Whether the event had ended at the reference instant.
    pub is_past: bool,

    /// The raw `VEVENT` block this event was built from.
    pub ics: String,
}

impl Event {
    /// Creates an event from resolved instants.
    ///
    /// `is_past` is computed against `now` and the duration defaults to
    /// `end_date - start_date`.
    pub fn new(
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        now: DateTime<Utc>,
        ics: impl Into<String>,
    ) -> Self {
        Self {
            start_date,
            end_date,
            summary: None,
            description: None,
            location: None,
            duration: end_date - start_date,
            is_past: ends_before(end_date, now),
            ics: ics.into(),
        }
    }

    /// Returns the effective title, falling back to "(No title)" if empty.
    pub fn effective_title(&self) -> &str {
        self.summary
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or("(No title)")
    }

    /// Builder method to set the summary.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Builder method to set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builder method to set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Builder method to override the duration.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

mod duration_seconds {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(duration.num_seconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let seconds = i64::deserialize(deserializer)?;
        Duration::try_seconds(seconds)
            .ok_or_else(|| D::Error::custom(format!("duration of {seconds}s is out of range")))
    }
}
