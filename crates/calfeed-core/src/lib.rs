//! Core types: events, UTC resolution, past/future assembly, tracing

pub mod assemble;
pub mod event;
pub mod time;
pub mod tracing;

pub use assemble::{InvalidRetention, PastRetention, assemble_events};
pub use event::{Event, ends_before};
pub use time::{TimeError, date_to_utc, floating_to_utc, parse_duration, zoned_to_utc};
pub use crate::tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
