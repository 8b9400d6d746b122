//! Calendar sources: where the raw ICS text comes from.
//!
//! A [`CalendarSource`] turns a locator into the full text of a feed or a
//! [`FetchError`]. It does not parse anything.
//!
//! - [`HttpSource`] - `GET` over HTTP(S) with reqwest
//! - [`FileSource`] - local files, as plain paths or `file://` URLs

mod file;
mod http;

use std::future::Future;
use std::pin::Pin;

use crate::error::FetchError;

pub use file::FileSource;
pub use http::HttpSource;

/// A boxed future for async trait methods.
///
/// Boxing keeps [`CalendarSource`] object-safe so the fetcher can hold a
/// `Box<dyn CalendarSource>`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Retrieves raw calendar text.
///
/// Implementations perform a single attempt: no retries, no caching.
/// Cancellation is up to the caller, who may drop the returned future.
pub trait CalendarSource: Send + Sync {
    /// Returns the name of this source (e.g., "http", "file").
    fn name(&self) -> &str;

    /// Fetches the full feed text found at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Transport`] when the feed could not be read and
    /// [`FetchError::Status`] when the server answered with a non-success
    /// status.
    fn fetch_text<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<String, FetchError>>;
}
