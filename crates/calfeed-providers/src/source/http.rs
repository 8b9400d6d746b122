//! HTTP calendar source.

use std::time::Duration;

use reqwest::{Client, Response};
use tracing::{debug, trace, warn};

use crate::error::FetchError;

use super::{BoxFuture, CalendarSource};

/// Fetches calendar feeds with a plain `GET`.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    /// Creates a source with the given request timeout and user agent.
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| {
                FetchError::transport(format!("failed to create HTTP client: {}", e)).with_source(e)
            })?;

        Ok(Self { client })
    }

    async fn get(&self, url: &str) -> Result<String, FetchError> {
        trace!(url = %url, "Sending request");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::transport(format!("request failed: {}", e)).with_source(e))?;

        self.handle_response(response).await
    }

    async fn handle_response(&self, response: Response) -> Result<String, FetchError> {
        let status = response.status();
        trace!(status = %status, "Received response");

        if !status.is_success() {
            warn!(status = %status, url = %response.url(), "Calendar source answered with an error status");
            return Err(FetchError::status(status.as_u16()));
        }

        let body = response.text().await.map_err(|e| {
            FetchError::transport(format!("failed to read response: {}", e)).with_source(e)
        })?;

        debug!(bytes = body.len(), "Fetched calendar feed");
        Ok(body)
    }
}

impl CalendarSource for HttpSource {
    fn name(&self) -> &str {
        "http"
    }

    fn fetch_text<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<String, FetchError>> {
        Box::pin(self.get(url))
    }
}
