//! The default command: fetch the feed and print its events.

use std::path::PathBuf;

use calfeed_core::PastRetention;
use calfeed_providers::{CalendarFetcher, FileSource};
use tracing::debug;

use crate::cli::Cli;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::render::{OutputFormat, render};

/// Where the feed is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedLocation {
    /// Fetched over HTTP(S).
    Url(String),
    /// Read from a local file.
    File(PathBuf),
}

/// Settings for one run, after flags have been applied over the file.
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Where the feed is read from.
    pub location: FeedLocation,
    /// Settings the fetcher is built from.
    pub config: ClientConfig,
}

impl RunSettings {
    /// Applies command-line overrides on top of the configuration file.
    pub fn resolve(cli: &Cli, config: &ClientConfig) -> ClientResult<Self> {
        let mut config = config.clone();

        if let Some(amount) = cli.past {
            config.amount_of_past_events =
                PastRetention::from_amount(amount).map_err(|e| ClientError::Config(e.to_string()))?;
        }
        if let Some(timeout) = cli.timeout {
            config.timeout = timeout;
        }

        let location = match (&cli.file, &cli.url) {
            (Some(path), _) => FeedLocation::File(path.clone()),
            (None, Some(url)) => FeedLocation::Url(url.clone()),
            (None, None) => match config.url {
                Some(ref url) => FeedLocation::Url(url.clone()),
                None => {
                    return Err(ClientError::Config(format!(
                        "no feed URL configured, pass --url or set `url` in {}",
                        ClientConfig::default_path().display()
                    )));
                }
            },
        };

        Ok(Self { location, config })
    }

    /// Builds the fetcher for these settings.
    pub fn fetcher(&self) -> ClientResult<CalendarFetcher> {
        match self.location {
            FeedLocation::Url(ref url) => Ok(CalendarFetcher::new(self.config.fetcher_config(url))?),
            FeedLocation::File(ref path) => {
                let path = path.to_str().ok_or_else(|| {
                    ClientError::Config(format!(
                        "feed file path is not valid UTF-8: {}",
                        path.display()
                    ))
                })?;
                Ok(CalendarFetcher::with_source(
                    self.config.fetcher_config(path),
                    FileSource::new(),
                ))
            }
        }
    }
}

/// Fetches the feed and prints its events.
pub async fn show(settings: &RunSettings, format: OutputFormat) -> ClientResult<()> {
    let fetcher = settings.fetcher()?;
    debug!(location = ?settings.location, retention = ?settings.config.amount_of_past_events, "Fetching events");

    let events = fetcher.fetch_events().await?;

    println!("{}", render(&events, format)?);
    Ok(())
}
