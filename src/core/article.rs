//! # Article Domain Types
//!
//! The values the data layer hands to the core: articles, the filter that
//! selects them, and the `ViewState` the list presentation renders.
//!
//! ```text
//! Filter ──► ArticleRepository::fetch() ──► Vec<Article>
//!                                              │
//!                                              ▼
//!                              ViewState::Success(articles)
//! ```

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// One rendition of an article's lead image.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Media {
    pub url: String,
}

/// A single "most popular" article.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub id: u64,
    pub title: String,
    pub byline: String,
    pub published_date: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub section: String,
    pub url: String,
    #[serde(default)]
    pub media: Vec<Media>,
}

impl Article {
    /// URL of the first media rendition, used for thumbnails and the detail hero image.
    pub fn image_url(&self) -> Option<&str> {
        self.media.first().map(|m| m.url.as_str())
    }
}

/// Which "most popular" list to browse.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    #[default]
    Viewed,
    Emailed,
    Shared,
}

impl Endpoint {
    pub const ALL: [Endpoint; 3] = [Endpoint::Viewed, Endpoint::Emailed, Endpoint::Shared];

    /// Path segment used by the Most Popular API.
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Viewed => "viewed",
            Endpoint::Emailed => "emailed",
            Endpoint::Shared => "shared",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Endpoint::Viewed => "Viewed",
            Endpoint::Emailed => "Emailed",
            Endpoint::Shared => "Shared",
        }
    }

    /// Cycles Viewed → Emailed → Shared → Viewed.
    pub fn next(self) -> Self {
        match self {
            Endpoint::Viewed => Endpoint::Emailed,
            Endpoint::Emailed => Endpoint::Shared,
            Endpoint::Shared => Endpoint::Viewed,
        }
    }
}

/// Look-back window for the popularity ranking.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Day,
    Week,
    Month,
}

impl Period {
    pub const ALL: [Period; 3] = [Period::Day, Period::Week, Period::Month];

    /// Number of days the API expects in the URL.
    pub fn days(self) -> u8 {
        match self {
            Period::Day => 1,
            Period::Week => 7,
            Period::Month => 30,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Period::Day => "Today",
            Period::Week => "This Week",
            Period::Month => "This Month",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Period::Day => Period::Week,
            Period::Week => Period::Month,
            Period::Month => Period::Day,
        }
    }
}

/// The request shape for the article list.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Filter {
    pub endpoint: Endpoint,
    pub period: Period,
}

impl Filter {
    pub fn new(endpoint: Endpoint, period: Period) -> Self {
        Self { endpoint, period }
    }

    /// Returns a copy with only the provided components replaced.
    pub fn with(self, endpoint: Option<Endpoint>, period: Option<Period>) -> Self {
        Self {
            endpoint: endpoint.unwrap_or(self.endpoint),
            period: period.unwrap_or(self.period),
        }
    }
}

/// What the list presentation should currently show.
///
/// Produced by `ArticleListViewModel`; the navigation core only routes it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewState {
    #[default]
    Idle,
    Loading,
    Success(Vec<Article>),
    Offline,
    Failure(String),
}

impl ViewState {
    pub fn is_busy(&self) -> bool {
        matches!(self, ViewState::Idle | ViewState::Loading)
    }
}
