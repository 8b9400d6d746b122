//! Calendar feed fetching for calfeed.
//!
//! This crate turns a calendar URL into an ordered list of
//! [`calfeed_core::Event`]s:
//!
//! - [`source`]: where the raw ICS text comes from (HTTP, local files)
//! - [`ics`]: grammar parsing through the `icalendar` crate
//! - [`normalize`]: one `VEVENT` to one UTC [`calfeed_core::Event`]
//! - [`fetcher`]: the [`CalendarFetcher`] facade tying the stages together
//!
//! # Example
//!
//! ```no_run
//! use calfeed_providers::{CalendarFetcher, FetcherConfig};
//!
//! # async fn run() -> Result<(), calfeed_providers::FetcherError> {
//! let config = FetcherConfig::new("https://example.com/calendar.ics")
//!     .with_amount_of_past_events(5)
//!     .expect("valid retention");
//! let fetcher = CalendarFetcher::new(config)?;
//!
//! for event in fetcher.fetch_events().await? {
//!     println!("{} {}", event.start_date, event.effective_title());
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod fetcher;
pub mod ics;
pub mod normalize;
pub mod source;

pub use error::{BoxError, CreationError, ErrorKind, FetchError, FetcherError, ParseError};
pub use fetcher::{CalendarFetcher, FetcherConfig, default_user_agent, parse_events};
pub use ics::{EventComponent, parse_calendar};
pub use normalize::create_event;
pub use source::{BoxFuture, CalendarSource, FileSource, HttpSource};
