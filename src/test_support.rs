//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

use crate::core::article::{Article, Filter, Media};
use crate::core::repository::{ArticleRepository, RepositoryError};
use crate::imaging::{FetchError, ImageFetcher};

/// An article with predictable field values.
pub fn sample_article(id: u64) -> Article {
    Article {
        id,
        title: format!("Article {id}"),
        byline: "By Test Author".to_string(),
        published_date: "2025-07-12".to_string(),
        abstract_text: format!("Abstract for article {id}."),
        section: "Test".to_string(),
        url: format!("https://example.com/{id}"),
        media: vec![Media {
            url: format!("https://example.com/{id}.png"),
        }],
    }
}

/// Encodes a solid-colour PNG.
pub fn png_bytes(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    let bitmap = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(rgb)));
    let mut out = Cursor::new(Vec::new());
    bitmap
        .write_to(&mut out, ImageFormat::Png)
        .expect("encoding a PNG in memory cannot fail");
    out.into_inner()
}

type ErrorFactory = Box<dyn Fn() -> RepositoryError + Send + Sync>;

/// Repository that records every filter it is asked for.
pub struct FakeRepository {
    articles: Vec<Article>,
    error: Option<ErrorFactory>,
    requests: Mutex<Vec<Filter>>,
}

impl FakeRepository {
    pub fn succeeding(articles: Vec<Article>) -> Self {
        Self {
            articles,
            error: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: impl Fn() -> RepositoryError + Send + Sync + 'static) -> Self {
        Self {
            articles: Vec::new(),
            error: Some(Box::new(error)),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<Filter> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArticleRepository for FakeRepository {
    async fn fetch(&self, filter: Filter) -> Result<Vec<Article>, RepositoryError> {
        self.requests.lock().unwrap().push(filter);
        match &self.error {
            Some(make) => Err(make()),
            None => Ok(self.articles.clone()),
        }
    }
}

/// Fetcher serving canned bodies, with optional per-URL latency.
#[derive(Default)]
pub struct FakeFetcher {
    bodies: HashMap<String, Vec<u8>>,
    failure: Option<FetchError>,
    delay: Duration,
    delays: HashMap<String, Duration>,
    calls: Mutex<HashMap<String, usize>>,
}

impl FakeFetcher {
    pub fn serving(url: &str, body: Vec<u8>) -> Self {
        Self::default().and_serving(url, body)
    }

    pub fn failing(error: FetchError) -> Self {
        Self {
            failure: Some(error),
            ..Default::default()
        }
    }

    pub fn and_serving(mut self, url: &str, body: Vec<u8>) -> Self {
        self.bodies.insert(url.to_string(), body);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_delay_for(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }

    pub fn calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }
}

#[async_trait]
impl ImageFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        *self.calls.lock().unwrap().entry(url.to_string()).or_default() += 1;

        let delay = self.delays.get(url).copied().unwrap_or(self.delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        self.bodies
            .get(url)
            .cloned()
            .ok_or(FetchError::Status(404))
    }
}

/// Shared repository + loader dependencies for navigation tests.
pub fn test_dependencies(articles: Vec<Article>) -> crate::navigation::FlowDependencies {
    crate::navigation::FlowDependencies {
        repository: Arc::new(FakeRepository::succeeding(articles)),
        images: None,
        placeholder: None,
        default_filter: Filter::default(),
    }
}
