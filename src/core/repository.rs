//! # Article Repository
//!
//! The narrow contract the list flow fetches through, plus the HTTP
//! implementation against the NYT Most Popular API:
//!
//! ```text
//! GET {base_url}/svc/mostpopular/v2/{endpoint}/{days}.json?api-key={key}
//! ```

use std::fmt;

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::Deserialize;

use super::article::{Article, Filter, Media};

pub const DEFAULT_BASE_URL: &str = "https://api.nytimes.com";

/// Errors that can occur while fetching articles.
#[derive(Debug)]
pub enum RepositoryError {
    /// Missing API key or unusable base URL.
    Config(String),
    /// Could not reach the server at all (DNS, connect, timeout).
    Offline(String),
    /// The API answered with a non-success status.
    Api { status: u16, message: String },
    /// The response body was not the expected JSON.
    Parse(String),
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepositoryError::Config(msg) => write!(f, "config error: {msg}"),
            RepositoryError::Offline(msg) => write!(f, "offline: {msg}"),
            RepositoryError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            RepositoryError::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for RepositoryError {}

impl From<reqwest::Error> for RepositoryError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() {
            RepositoryError::Offline(e.to_string())
        } else if e.is_decode() {
            RepositoryError::Parse(e.to_string())
        } else {
            RepositoryError::Offline(e.to_string())
        }
    }
}

#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Fetches the articles selected by `filter`.
    async fn fetch(&self, filter: Filter) -> Result<Vec<Article>, RepositoryError>;
}

// ============================================================================
// Most Popular API wire types
// ============================================================================

#[derive(Deserialize, Debug)]
struct MostPopularResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    results: Vec<ArticleDto>,
}

#[derive(Deserialize, Debug)]
struct ArticleDto {
    id: u64,
    #[serde(default)]
    url: String,
    #[serde(default)]
    published_date: String,
    #[serde(default)]
    byline: String,
    #[serde(default)]
    title: String,
    #[serde(rename = "abstract", default)]
    abstract_text: String,
    #[serde(default)]
    section: String,
    #[serde(default)]
    media: Vec<MediaDto>,
}

#[derive(Deserialize, Debug)]
struct MediaDto {
    #[serde(rename = "media-metadata", default)]
    metadata: Vec<MediaMetadata>,
}

#[derive(Deserialize, Debug)]
struct MediaMetadata {
    url: String,
    #[serde(default)]
    width: u32,
}

impl From<ArticleDto> for Article {
    fn from(dto: ArticleDto) -> Self {
        // Each media item ships several renditions; keep the widest one.
        let media = dto
            .media
            .into_iter()
            .filter_map(|m| m.metadata.into_iter().max_by_key(|r| r.width))
            .map(|r| Media { url: r.url })
            .collect();

        Article {
            id: dto.id,
            title: dto.title,
            byline: dto.byline,
            published_date: dto.published_date,
            abstract_text: dto.abstract_text,
            section: dto.section,
            url: dto.url,
            media,
        }
    }
}

// ============================================================================
// HTTP implementation
// ============================================================================

/// Fetches articles from the NYT Most Popular API.
pub struct NytArticlesRepository {
    api_key: Option<String>,
    base_url: String,
    client: reqwest::Client,
}

impl NytArticlesRepository {
    pub fn new(api_key: Option<String>, base_url: Option<String>) -> Self {
        Self {
            api_key,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn endpoint_url(&self, filter: Filter) -> String {
        format!(
            "{}/svc/mostpopular/v2/{}/{}.json",
            self.base_url,
            filter.endpoint.path(),
            filter.period.days()
        )
    }
}

#[async_trait]
impl ArticleRepository for NytArticlesRepository {
    async fn fetch(&self, filter: Filter) -> Result<Vec<Article>, RepositoryError> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| RepositoryError::Config("NYT API key is not set".to_string()))?;

        let url = self.endpoint_url(filter);
        info!("Fetching articles: {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[("api-key", api_key)])
            .send()
            .await?;

        debug!("Most Popular response status: {}", response.status());

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("Most Popular API error: {} - {}", status, message);
            return Err(RepositoryError::Api { status, message });
        }

        let body = response.text().await?;
        let parsed: MostPopularResponse =
            serde_json::from_str(&body).map_err(|e| RepositoryError::Parse(e.to_string()))?;

        if !parsed.status.is_empty() && parsed.status != "OK" {
            warn!("Most Popular API reported status {}", parsed.status);
        }

        let articles: Vec<Article> = parsed.results.into_iter().map(Article::from).collect();
        info!("Fetched {} articles for {:?}", articles.len(), filter);
        Ok(articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::article::{Endpoint, Period};

    #[test]
    fn test_endpoint_url_shape() {
        let repo = NytArticlesRepository::new(Some("k".into()), Some("http://host/".into()));
        let url = repo.endpoint_url(Filter::new(Endpoint::Shared, Period::Week));
        assert_eq!(url, "http://host/svc/mostpopular/v2/shared/7.json");
    }

    #[test]
    fn test_dto_keeps_widest_rendition() {
        let json = r#"{
            "id": 5,
            "title": "Hello",
            "abstract": "World",
            "media": [{
                "type": "image",
                "media-metadata": [
                    {"url": "https://x/thumb.jpg", "format": "Standard Thumbnail", "width": 75, "height": 75},
                    {"url": "https://x/large.jpg", "format": "mediumThreeByTwo440", "width": 440, "height": 293}
                ]
            }]
        }"#;
        let dto: ArticleDto = serde_json::from_str(json).unwrap();
        let article = Article::from(dto);
        assert_eq!(article.id, 5);
        assert_eq!(article.abstract_text, "World");
        assert_eq!(article.image_url(), Some("https://x/large.jpg"));
    }

    #[test]
    fn test_media_without_renditions_is_dropped() {
        let json = r#"{"id": 1, "media": [{"media-metadata": []}]}"#;
        let dto: ArticleDto = serde_json::from_str(json).unwrap();
        assert!(Article::from(dto).media.is_empty());
    }

    #[tokio::test]
    async fn test_missing_api_key_is_config_error() {
        let repo = NytArticlesRepository::new(None, None);
        let result = repo.fetch(Filter::default()).await;
        assert!(matches!(result, Err(RepositoryError::Config(_))));
    }
}
