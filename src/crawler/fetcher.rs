//! HTTP fetcher: the default [`Fetcher`] implementation over reqwest
//!
//! Maps transport-level outcomes onto the engine's error taxonomy:
//! timeouts, non-success statuses and connection failures all come back as
//! `FetchError` values for the retry policy, never as panics.

use crate::crawler::{FetchError, FetchedContent, Fetcher};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Builds a fetcher with the given user agent and request timeout
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedContent, FetchError> {
        let response = self.client.get(url).send().await.map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let body = response.text().await.map_err(classify)?;

        Ok(FetchedContent {
            final_url,
            status: status.as_u16(),
            content_type,
            body,
        })
    }
}

/// Maps a reqwest error onto the engine's fetch error taxonomy
fn classify(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else if let Some(status) = e.status() {
        FetchError::HttpStatus(status.as_u16())
    } else {
        FetchError::Transport(e.to_string())
    }
}
