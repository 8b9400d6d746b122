//! Error types for the fetch pipeline.
//!
//! Each stage of the pipeline has its own error kind:
//!
//! - [`FetchError`]: the calendar source could not deliver the feed
//! - [`ParseError`]: the feed text could not be turned into events
//! - [`CreationError`]: a single `VEVENT` could not be normalized
//!
//! [`FetcherError`] is what the full fetch operation returns.

use std::fmt;
use thiserror::Error;

/// A boxed underlying cause.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The category of a pipeline error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Retrieval failed.
    Fetch,
    /// The feed could not be parsed.
    Parse,
    /// A single event could not be normalized.
    Creation,
}

impl ErrorKind {
    /// Returns a stable name for this error kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fetch => "fetch_error",
            Self::Parse => "parse_error",
            Self::Creation => "creation_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Retrieval of the calendar feed failed.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request could not be completed (network, I/O, bad URL).
    #[error("failed to fetch calendar events: {message}")]
    Transport {
        /// What went wrong.
        message: String,
        /// The underlying cause, if any.
        #[source]
        source: Option<BoxError>,
    },

    /// The request completed but reported a non-success status.
    #[error("failed to fetch calendar events: status {status}, check the URL or CORS settings")]
    Status {
        /// The HTTP status code.
        status: u16,
    },
}

impl FetchError {
    /// Creates a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a status error.
    pub fn status(status: u16) -> Self {
        Self::Status { status }
    }

    /// Sets the source error. Has no effect on status errors.
    pub fn with_source<E>(self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        match self {
            Self::Transport { message, .. } => Self::Transport {
                message,
                source: Some(Box::new(source)),
            },
            status => status,
        }
    }

    /// Returns the status code for status errors.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status } => Some(*status),
            Self::Transport { .. } => None,
        }
    }
}

/// A single event component could not be normalized.
#[derive(Debug, Error)]
#[error("error creating event: {message}")]
pub struct CreationError {
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl CreationError {
    /// Creates a creation error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Sets the source error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// The feed text could not be turned into events.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The text is not valid iCalendar.
    #[error("error parsing ICS data, the data might be malformed or corrupted: {0}")]
    Grammar(String),

    /// One of the events in the batch could not be normalized.
    #[error("error parsing ICS data: {0}")]
    Event(#[from] CreationError),
}

/// Error returned by a full fetch: retrieval or parsing.
#[derive(Debug, Error)]
pub enum FetcherError {
    /// Retrieval failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Parsing failed.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl FetchError {
    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Fetch
    }
}

impl ParseError {
    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Parse
    }
}

impl CreationError {
    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Creation
    }
}

impl FetcherError {
    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Fetch(e) => e.kind(),
            Self::Parse(e) => e.kind(),
        }
    }
}
