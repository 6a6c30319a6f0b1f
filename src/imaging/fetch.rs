//! Network fetch capability used by the loader.

use std::fmt;

use async_trait::async_trait;
use log::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Transport-level failure (DNS, connect, body read).
    Network(String),
    /// The server answered with a non-2xx status.
    Status(u16),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Network(msg) => write!(f, "network error: {msg}"),
            FetchError::Status(status) => write!(f, "HTTP {status}"),
        }
    }
}

impl std::error::Error for FetchError {}

#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Fetches the raw bytes of the resource at `url`.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Single GET per request, no retry, reqwest's default timeouts.
pub struct HttpImageFetcher {
    client: reqwest::Client,
}

impl Default for HttpImageFetcher {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

impl HttpImageFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        debug!("Image response status for {}: {}", url, response.status());
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}
