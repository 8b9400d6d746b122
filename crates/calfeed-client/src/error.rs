//! Client error types.

use std::fmt;

use calfeed_providers::FetcherError;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug)]
pub enum ClientError {
    /// Configuration error.
    Config(String),
    /// Fetching or parsing the feed failed.
    Fetch(FetcherError),
    /// Output could not be rendered.
    Render(String),
}

impl ClientError {
    /// Returns the prefix printed before the error message.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config_error",
            Self::Fetch(err) => err.kind().as_str(),
            Self::Render(_) => "render_error",
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::Fetch(err) => write!(f, "{}", err),
            Self::Render(msg) => write!(f, "failed to render output: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Fetch(err) => Some(err),
            _ => None,
        }
    }
}

impl From<FetcherError> for ClientError {
    fn from(err: FetcherError) -> Self {
        Self::Fetch(err)
    }
}
