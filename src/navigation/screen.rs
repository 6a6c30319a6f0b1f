//! Screens the coordinators present into the host.
//!
//! A screen carries what its view needs and nothing about navigation: it
//! never learns whether it was dismissed by `finish()` or by a back gesture.

use std::ops::Range;
use std::sync::Arc;

use tokio::sync::watch;

use crate::core::article::{Article, ViewState};
use crate::core::view_model::{ArticleDetailViewModel, ArticleListViewModel};
use crate::imaging::{Image, ImageLoader, ImageSlot};

pub enum AppScreen {
    ArticleList(ArticleListScreen),
    ArticleDetail(ArticleDetailScreen),
}

impl AppScreen {
    pub fn title(&self) -> &str {
        match self {
            AppScreen::ArticleList(_) => "Most Popular",
            AppScreen::ArticleDetail(screen) => screen.view_model.title(),
        }
    }
}

pub struct ArticleListScreen {
    pub view_model: Arc<ArticleListViewModel>,
    images: Option<Arc<ImageLoader>>,
    placeholder: Option<Image>,
    rows: Vec<RowThumbnail>,
}

/// One reusable image slot per visible list row.
struct RowThumbnail {
    slot: ImageSlot,
    updates: watch::Receiver<Option<Image>>,
    article_index: Option<usize>,
    key: Option<String>,
}

impl RowThumbnail {
    fn new() -> Self {
        let slot = ImageSlot::new();
        let updates = slot.subscribe();
        Self {
            slot,
            updates,
            article_index: None,
            key: None,
        }
    }
}

impl ArticleListScreen {
    pub fn new(
        view_model: Arc<ArticleListViewModel>,
        images: Option<Arc<ImageLoader>>,
        placeholder: Option<Image>,
    ) -> Self {
        Self {
            view_model,
            images,
            placeholder,
            rows: Vec::new(),
        }
    }

    /// Called whenever the list becomes the visible screen.
    pub fn did_appear(&self) {
        self.view_model.load_if_idle();
    }

    /// The article the user picked, if the list is showing articles.
    pub fn article_at(&self, index: usize) -> Option<Article> {
        match self.view_model.state() {
            ViewState::Success(articles) => articles.get(index).cloned(),
            _ => None,
        }
    }

    pub fn thumbnails_enabled(&self) -> bool {
        self.images.is_some()
    }

    /// Points the row slots at the articles in `visible`.
    ///
    /// Row `i` shows article `visible.start + i`. A row whose article changed
    /// (scrolling, or a new result set) starts a fresh load into the same
    /// slot, so a late image for the previous article is discarded.
    pub fn sync_thumbnails(&mut self, visible: Range<usize>) {
        let Some(loader) = self.images.clone() else {
            return;
        };
        let articles = match self.view_model.state() {
            ViewState::Success(articles) => articles,
            _ => Vec::new(),
        };
        let end = visible.end.min(articles.len());
        let start = visible.start.min(end);
        let wanted = end - start;
        while self.rows.len() < wanted {
            self.rows.push(RowThumbnail::new());
        }

        for (offset, row) in self.rows.iter_mut().enumerate() {
            let index = start + offset;
            let article = match articles.get(index) {
                Some(article) if offset < wanted => article,
                _ => {
                    row.article_index = None;
                    row.key = None;
                    continue;
                }
            };
            let key = article.image_url().map(str::to_string);
            if row.article_index == Some(index) && row.key == key {
                continue;
            }
            row.article_index = Some(index);
            match &key {
                Some(url) => drop(loader.load(url, self.placeholder.clone(), &row.slot)),
                None => row.slot.show(self.placeholder.clone()),
            }
            row.key = key;
        }
    }

    /// The image currently shown for article `index`, if its row is visible.
    pub fn thumbnail_for(&self, index: usize) -> Option<Image> {
        self.rows
            .iter()
            .find(|row| row.article_index == Some(index))
            .and_then(|row| row.slot.current())
    }

    /// True once per batch of slot updates since the last call.
    pub fn thumbnails_changed(&mut self) -> bool {
        let mut changed = false;
        for row in &mut self.rows {
            if row.updates.has_changed().unwrap_or(false) {
                row.updates.borrow_and_update();
                changed = true;
            }
        }
        changed
    }
}

pub struct ArticleDetailScreen {
    pub view_model: ArticleDetailViewModel,
    pub image: ImageSlot,
    images: Option<Arc<ImageLoader>>,
    placeholder: Option<Image>,
    image_requested: bool,
}

impl ArticleDetailScreen {
    pub fn new(
        view_model: ArticleDetailViewModel,
        images: Option<Arc<ImageLoader>>,
        placeholder: Option<Image>,
    ) -> Self {
        Self {
            view_model,
            image: ImageSlot::new(),
            images,
            placeholder,
            image_requested: false,
        }
    }

    /// Kicks off the hero image load the first time the screen is shown.
    pub fn did_appear(&mut self) {
        if self.image_requested {
            return;
        }
        self.image_requested = true;
        if let (Some(loader), Some(url)) = (&self.images, self.view_model.image_url()) {
            // Delivery lands in `self.image`; the handle is not needed.
            drop(loader.load(url, self.placeholder.clone(), &self.image));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::article::Filter;
    use crate::imaging::MemoryImageCache;
    use crate::test_support::{FakeFetcher, FakeRepository, png_bytes, sample_article};
    use std::time::Duration;

    const RED: [u8; 3] = [255, 0, 0];
    const BLUE: [u8; 3] = [0, 0, 255];

    fn loader(fetcher: FakeFetcher) -> Arc<ImageLoader> {
        Arc::new(ImageLoader::new(
            Arc::new(MemoryImageCache::new()),
            Arc::new(fetcher),
        ))
    }

    async fn loaded_list(images: Option<Arc<ImageLoader>>) -> ArticleListScreen {
        let repo = Arc::new(FakeRepository::succeeding(vec![
            sample_article(1),
            sample_article(2),
        ]));
        let vm = Arc::new(ArticleListViewModel::new(repo, Filter::default()));
        let screen = ArticleListScreen::new(vm, images, Some(Image::solid(1, 1, [9, 9, 9])));
        screen.did_appear();
        let mut rx = screen.view_model.subscribe_state();
        rx.wait_for(|state| matches!(state, ViewState::Success(_)))
            .await
            .unwrap();
        screen
    }

    async fn wait_for_colour(screen: &ArticleListScreen, row: usize, rgb: [u8; 3]) {
        let mut rx = screen.rows[row].slot.subscribe();
        rx.wait_for(|image| image.as_ref().is_some_and(|img| img.rgb_at(0, 0) == rgb))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_visible_rows_load_thumbnails() {
        let images = loader(
            FakeFetcher::serving("https://example.com/1.png", png_bytes(1, 1, RED))
                .and_serving("https://example.com/2.png", png_bytes(1, 1, BLUE)),
        );
        let mut screen = loaded_list(Some(images)).await;

        screen.sync_thumbnails(0..2);
        wait_for_colour(&screen, 0, RED).await;
        wait_for_colour(&screen, 1, BLUE).await;

        assert_eq!(screen.thumbnail_for(0).unwrap().rgb_at(0, 0), RED);
        assert_eq!(screen.thumbnail_for(1).unwrap().rgb_at(0, 0), BLUE);
        assert!(screen.thumbnails_changed());
        assert!(!screen.thumbnails_changed());
    }

    #[tokio::test]
    async fn test_reused_row_shows_new_article_image() {
        let images = loader(
            FakeFetcher::serving("https://example.com/1.png", png_bytes(1, 1, RED))
                .and_serving("https://example.com/2.png", png_bytes(1, 1, BLUE)),
        );
        let mut screen = loaded_list(Some(images)).await;

        screen.sync_thumbnails(0..1);
        wait_for_colour(&screen, 0, RED).await;

        // Scrolling by one reuses the same row for article 2.
        screen.sync_thumbnails(1..2);
        wait_for_colour(&screen, 0, BLUE).await;

        assert_eq!(screen.rows.len(), 1);
        assert!(screen.thumbnail_for(0).is_none());
        assert_eq!(screen.thumbnail_for(1).unwrap().rgb_at(0, 0), BLUE);
    }

    #[tokio::test]
    async fn test_reused_row_drops_late_image_for_previous_article() {
        let slow = "https://example.com/1.png";
        let images = loader(
            FakeFetcher::serving(slow, png_bytes(1, 1, RED))
                .and_serving("https://example.com/2.png", png_bytes(1, 1, BLUE))
                .with_delay_for(slow, Duration::from_millis(80)),
        );
        let mut screen = loaded_list(Some(images)).await;

        screen.sync_thumbnails(0..1);
        screen.sync_thumbnails(1..2);
        wait_for_colour(&screen, 0, BLUE).await;
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(screen.thumbnail_for(1).unwrap().rgb_at(0, 0), BLUE);
    }

    #[tokio::test]
    async fn test_unchanged_rows_do_not_refetch() {
        let fetcher = Arc::new(FakeFetcher::serving(
            "https://example.com/1.png",
            png_bytes(1, 1, RED),
        ));
        let images = Arc::new(ImageLoader::new(
            Arc::new(MemoryImageCache::new()),
            fetcher.clone(),
        ));
        let mut screen = loaded_list(Some(images)).await;

        screen.sync_thumbnails(0..1);
        wait_for_colour(&screen, 0, RED).await;
        screen.sync_thumbnails(0..1);
        screen.sync_thumbnails(0..1);

        assert_eq!(fetcher.calls("https://example.com/1.png"), 1);
    }

    #[tokio::test]
    async fn test_thumbnails_disabled_without_loader() {
        let mut screen = loaded_list(None).await;
        screen.sync_thumbnails(0..2);

        assert!(!screen.thumbnails_enabled());
        assert!(screen.thumbnail_for(0).is_none());
        assert!(!screen.thumbnails_changed());
    }

    #[tokio::test]
    async fn test_detail_loads_image_once_on_appear() {
        let fetcher = Arc::new(FakeFetcher::serving(
            "https://example.com/4.png",
            png_bytes(1, 1, BLUE),
        ));
        let images = Arc::new(ImageLoader::new(
            Arc::new(MemoryImageCache::new()),
            fetcher.clone(),
        ));
        let mut screen = ArticleDetailScreen::new(
            ArticleDetailViewModel::new(sample_article(4)),
            Some(images),
            None,
        );

        screen.did_appear();
        screen.did_appear();
        let mut rx = screen.image.subscribe();
        rx.wait_for(|image| image.is_some()).await.unwrap();

        assert_eq!(screen.image.current().unwrap().rgb_at(0, 0), BLUE);
        assert_eq!(fetcher.calls("https://example.com/4.png"), 1);
    }
}
