//! # View Models
//!
//! `ArticleListViewModel` owns the list's `ViewState` and `Filter` and
//! publishes both through `tokio::sync::watch`, so the presentation layer can
//! re-render whenever either changes:
//!
//! ```text
//! update_filter() ──► fetch task ──► repository.fetch()
//!        │                                 │
//!        ▼                                 ▼
//!   filter channel                   state channel ──► list screen
//! ```
//!
//! `ArticleDetailViewModel` is an immutable wrapper around the selected
//! article with display helpers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use log::{debug, info, warn};
use tokio::sync::watch;
use tokio::task::AbortHandle;

use super::article::{Article, Endpoint, Filter, Period, ViewState};
use super::repository::{ArticleRepository, RepositoryError};

pub struct ArticleListViewModel {
    repository: Arc<dyn ArticleRepository>,
    state: Arc<watch::Sender<ViewState>>,
    filter: watch::Sender<Filter>,
    default_filter: Filter,
    /// Bumped on every request; only the latest request may publish its result.
    generation: Arc<AtomicU64>,
    in_flight: Mutex<Option<AbortHandle>>,
}

impl ArticleListViewModel {
    pub fn new(repository: Arc<dyn ArticleRepository>, default_filter: Filter) -> Self {
        let (state, _) = watch::channel(ViewState::Idle);
        let (filter, _) = watch::channel(default_filter);
        Self {
            repository,
            state: Arc::new(state),
            filter,
            default_filter,
            generation: Arc::new(AtomicU64::new(0)),
            in_flight: Mutex::new(None),
        }
    }

    pub fn state(&self) -> ViewState {
        self.state.borrow().clone()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }

    pub fn filter(&self) -> Filter {
        *self.filter.borrow()
    }

    pub fn subscribe_filter(&self) -> watch::Receiver<Filter> {
        self.filter.subscribe()
    }

    /// Replaces whichever filter components are provided and refetches.
    /// A `None` component keeps its current value.
    pub fn update_filter(&self, endpoint: Option<Endpoint>, period: Option<Period>) {
        let next = self.filter().with(endpoint, period);
        self.filter.send_replace(next);
        self.fetch(next);
    }

    /// Restores the configured default filter and refetches.
    pub fn reset_filter(&self) {
        self.filter.send_replace(self.default_filter);
        self.fetch(self.default_filter);
    }

    /// Re-issues the request for the current filter.
    pub fn retry(&self) {
        self.fetch(self.filter());
    }

    /// Fetches only if nothing has been requested yet.
    pub fn load_if_idle(&self) {
        if matches!(*self.state.borrow(), ViewState::Idle) {
            self.fetch(self.filter());
        }
    }

    fn fetch(&self, filter: Filter) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = in_flight.take() {
            debug!("Aborting in-flight article request");
            previous.abort();
        }

        let request_id = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_replace(ViewState::Loading);
        info!("Requesting articles for {:?} (request {})", filter, request_id);

        let repository = self.repository.clone();
        let state = self.state.clone();
        let generation = self.generation.clone();

        let handle = tokio::spawn(async move {
            let next = match repository.fetch(filter).await {
                Ok(articles) => ViewState::Success(articles),
                Err(RepositoryError::Offline(msg)) => {
                    warn!("Article request failed, offline: {}", msg);
                    ViewState::Offline
                }
                Err(e) => {
                    warn!("Article request failed: {}", e);
                    ViewState::Failure(e.to_string())
                }
            };

            let published = state.send_if_modified(|current| {
                if generation.load(Ordering::SeqCst) != request_id {
                    return false;
                }
                *current = next;
                true
            });
            if !published {
                debug!("Dropping stale article response (request {})", request_id);
            }
        });

        *in_flight = Some(handle.abort_handle());
    }
}

/// Display wrapper for the detail screen.
#[derive(Debug, Clone)]
pub struct ArticleDetailViewModel {
    article: Article,
}

impl ArticleDetailViewModel {
    pub fn new(article: Article) -> Self {
        Self { article }
    }

    pub fn article(&self) -> &Article {
        &self.article
    }

    pub fn title(&self) -> &str {
        &self.article.title
    }

    pub fn abstract_text(&self) -> &str {
        &self.article.abstract_text
    }

    pub fn byline(&self) -> &str {
        &self.article.byline
    }

    pub fn section_tag(&self) -> String {
        self.article.section.to_uppercase()
    }

    /// "2025-07-12" → "Jul 12, 2025". Unparseable dates are shown as-is.
    pub fn formatted_date(&self) -> String {
        NaiveDate::parse_from_str(&self.article.published_date, "%Y-%m-%d")
            .map(|d| d.format("%b %-d, %Y").to_string())
            .unwrap_or_else(|_| self.article.published_date.clone())
    }

    pub fn link(&self) -> &str {
        &self.article.url
    }

    pub fn image_url(&self) -> Option<&str> {
        self.article.image_url()
    }
}
