//! Past/future classification and final ordering.
//!
//! [`assemble_events`] turns a batch of normalized events into the list
//! shown to callers: every future event first, earliest start first, then
//! the retained past events, most recently ended first.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::event::Event;

/// A retention count that is neither `-1` nor non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid past event retention {0}: expected -1 (unbounded) or a non-negative count")]
pub struct InvalidRetention(pub i64);

/// How many past events to keep in an assembled list.
///
/// Configuration files and the command line use the integer form: `-1`
/// keeps every past event, `n >= 0` keeps the `n` most recently ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum PastRetention {
    /// Keep all past events.
    #[default]
    Unbounded,
    /// Keep at most this many past events.
    AtMost(usize),
}

impl PastRetention {
    /// The integer sentinel for [`PastRetention::Unbounded`].
    pub const UNBOUNDED: i64 = -1;

    /// Converts the integer form.
    pub fn from_amount(amount: i64) -> Result<Self, InvalidRetention> {
        match amount {
            Self::UNBOUNDED => Ok(Self::Unbounded),
            n if n >= 0 => usize::try_from(n)
                .map(Self::AtMost)
                .map_err(|_| InvalidRetention(n)),
            n => Err(InvalidRetention(n)),
        }
    }

    /// Returns the integer form.
    pub fn as_amount(&self) -> i64 {
        match self {
            Self::Unbounded => Self::UNBOUNDED,
            Self::AtMost(n) => i64::try_from(*n).unwrap_or(i64::MAX),
        }
    }

    /// Returns the bound, or `None` when unbounded.
    pub fn limit(&self) -> Option<usize> {
        match self {
            Self::Unbounded => None,
            Self::AtMost(n) => Some(*n),
        }
    }
}

impl TryFrom<i64> for PastRetention {
    type Error = InvalidRetention;

    fn try_from(amount: i64) -> Result<Self, Self::Error> {
        Self::from_amount(amount)
    }
}

impl From<PastRetention> for i64 {
    fn from(retention: PastRetention) -> Self {
        retention.as_amount()
    }
}

/// Orders a batch of events and applies the past-event bound.
///
/// Events are split on their precomputed `is_past` flag, so the result is
/// consistent with the reference instant used at normalization. Future
/// events are sorted by ascending `start_date`, past events by descending
/// `end_date`; both sorts are stable. Future events always come first, even
/// when a retained past event started later.
pub fn assemble_events(events: Vec<Event>, retention: PastRetention) -> Vec<Event> {
    let (mut past, mut future): (Vec<Event>, Vec<Event>) =
        events.into_iter().partition(|event| event.is_past);

    future.sort_by_key(|event| event.start_date);
    past.sort_by(|a, b| b.end_date.cmp(&a.end_date));

    let past_total = past.len();
    if let Some(limit) = retention.limit() {
        past.truncate(limit);
    }

    debug!(
        future = future.len(),
        past = past.len(),
        past_dropped = past_total - past.len(),
        "Assembled events"
    );

    future.extend(past);
    future
}
