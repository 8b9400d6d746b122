//! The fetcher facade: retrieve, parse, normalize, assemble.

use std::time::Duration;

use calfeed_core::{Event, InvalidRetention, PastRetention, assemble_events};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::error::{FetcherError, ParseError};
use crate::ics::parse_calendar;
use crate::normalize::create_event;
use crate::source::{CalendarSource, HttpSource};

/// Configuration for a [`CalendarFetcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetcherConfig {
    /// Where the feed lives. Passed to the source as-is.
    pub url: String,

    /// How many past events to keep.
    pub past_retention: PastRetention,

    /// Request timeout for the HTTP source.
    pub timeout: Duration,

    /// User agent sent by the HTTP source.
    pub user_agent: String,
}

impl FetcherConfig {
    /// Default request timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Creates a configuration for `url` keeping every past event.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            past_retention: PastRetention::default(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: default_user_agent(),
        }
    }

    /// Sets the past retention.
    pub fn with_past_retention(mut self, retention: PastRetention) -> Self {
        self.past_retention = retention;
        self
    }

    /// Sets the past retention from its integer form (`-1` is unbounded).
    pub fn with_amount_of_past_events(self, amount: i64) -> Result<Self, InvalidRetention> {
        Ok(self.with_past_retention(PastRetention::from_amount(amount)?))
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// The user agent sent when none is configured.
pub fn default_user_agent() -> String {
    format!("calfeed/{}", env!("CARGO_PKG_VERSION"))
}

/// Fetches a calendar feed and turns it into an ordered event list.
///
/// The fetcher holds no mutable state and can be shared across tasks.
pub struct CalendarFetcher {
    config: FetcherConfig,
    source: Box<dyn CalendarSource>,
}

impl std::fmt::Debug for CalendarFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalendarFetcher")
            .field("config", &self.config)
            .field("source", &self.source.name())
            .finish()
    }
}

impl CalendarFetcher {
    /// Creates a fetcher that retrieves the feed over HTTP.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: FetcherConfig) -> Result<Self, FetcherError> {
        let source = HttpSource::new(config.timeout, &config.user_agent)?;
        Ok(Self::with_source(config, source))
    }

    /// Creates a fetcher with a custom source.
    pub fn with_source(config: FetcherConfig, source: impl CalendarSource + 'static) -> Self {
        Self {
            config,
            source: Box::new(source),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// Fetches and parses the feed, classifying events against the current
    /// time.
    pub async fn fetch_events(&self) -> Result<Vec<Event>, FetcherError> {
        let text = self.retrieve().await?;
        Ok(self.parse_at(&text, Utc::now())?)
    }

    /// Fetches and parses the feed, classifying events against `now`.
    pub async fn fetch_events_at(&self, now: DateTime<Utc>) -> Result<Vec<Event>, FetcherError> {
        let text = self.retrieve().await?;
        Ok(self.parse_at(&text, now)?)
    }

    /// Parses feed text, classifying events against the current time.
    pub fn parse(&self, ics: &str) -> Result<Vec<Event>, ParseError> {
        self.parse_at(ics, Utc::now())
    }

    /// Parses feed text, classifying events against `now`.
    pub fn parse_at(&self, ics: &str, now: DateTime<Utc>) -> Result<Vec<Event>, ParseError> {
        parse_events(ics, now, self.config.past_retention)
    }

    async fn retrieve(&self) -> Result<String, FetcherError> {
        debug!(source = self.source.name(), url = %self.config.url, "Fetching calendar feed");

        self.source
            .fetch_text(&self.config.url)
            .await
            .map_err(|e| {
                warn!(source = self.source.name(), error = %e, "Calendar fetch failed");
                FetcherError::Fetch(e)
            })
    }
}

/// Parses feed text into an ordered event list.
///
/// Every event is classified against the same `now`. The first event that
/// fails to normalize aborts the whole batch.
///
/// # Errors
///
/// Returns [`ParseError::Grammar`] for text that is not a calendar and
/// [`ParseError::Event`] when an event cannot be normalized.
pub fn parse_events(
    ics: &str,
    now: DateTime<Utc>,
    retention: PastRetention,
) -> Result<Vec<Event>, ParseError> {
    let components = parse_calendar(ics).inspect_err(|e| {
        warn!(error = %e, "Calendar text could not be parsed");
    })?;

    let events = components
        .iter()
        .map(|component| create_event(component, now))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            warn!(error = %e, "Event could not be normalized");
            ParseError::from(e)
        })?;

    let parsed = events.len();
    let past = events.iter().filter(|e| e.is_past).count();
    let events = assemble_events(events, retention);

    info!(
        parsed,
        past,
        kept = events.len(),
        now = %now,
        "Parsed calendar feed"
    );

    Ok(events)
}
