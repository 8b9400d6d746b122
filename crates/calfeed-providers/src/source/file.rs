//! Local file calendar source.

use std::path::PathBuf;

use tracing::debug;
use url::Url;

use crate::error::FetchError;

use super::{BoxFuture, CalendarSource};

/// Reads calendar feeds from the local filesystem.
///
/// Accepts plain paths as well as `file://` URLs.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSource;

impl FileSource {
    /// Creates a file source.
    pub fn new() -> Self {
        Self
    }

    /// Resolves a locator to a filesystem path.
    fn resolve_path(locator: &str) -> Result<PathBuf, FetchError> {
        if !locator.starts_with("file:") {
            return Ok(PathBuf::from(locator));
        }

        let url = Url::parse(locator).map_err(|e| {
            FetchError::transport(format!("invalid file URL {}: {}", locator, e)).with_source(e)
        })?;
        url.to_file_path()
            .map_err(|_| FetchError::transport(format!("not a local file URL: {}", locator)))
    }

    async fn read(&self, locator: &str) -> Result<String, FetchError> {
        let path = Self::resolve_path(locator)?;
        debug!(path = %path.display(), "Reading calendar file");

        tokio::fs::read_to_string(&path).await.map_err(|e| {
            FetchError::transport(format!("failed to read {}: {}", path.display(), e)).with_source(e)
        })
    }
}

impl CalendarSource for FileSource {
    fn name(&self) -> &str {
        "file"
    }

    fn fetch_text<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<String, FetchError>> {
        Box::pin(self.read(url))
    }
}
