//! # Image Loader
//!
//! Delivery is a side-effecting assignment into an `ImageSlot`, never a
//! return value: `load()` assigns the placeholder right away, then a spawned
//! task assigns the final image when one arrives.
//!
//! Two guarantees on top of plain cache-aside:
//! - concurrent loads of the same key share one fetch (in-flight map of
//!   `Shared` futures, entries removed when the fetch settles)
//! - every `load()` into a slot takes a new ticket, and a delivery carrying a
//!   stale ticket is dropped, so a reused slot never shows the previous key

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use log::{debug, warn};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use super::{Image, ImageCache, ImageFetcher};

/// Diagnostics for loads whose failures never reach the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadEvent {
    CacheHit { key: String },
    Fetched { key: String },
    FetchFailed { key: String, error: String },
    DecodeFailed { key: String, error: String },
    /// The slot was reloaded before this result arrived.
    Superseded { key: String },
}

struct SlotInner {
    ticket: AtomicU64,
    image: watch::Sender<Option<Image>>,
}

/// Where a load delivers. Cheap to clone; clones share the same cell.
#[derive(Clone)]
pub struct ImageSlot {
    inner: Arc<SlotInner>,
}

impl Default for ImageSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageSlot {
    pub fn new() -> Self {
        let (image, _) = watch::channel(None);
        Self {
            inner: Arc::new(SlotInner {
                ticket: AtomicU64::new(0),
                image,
            }),
        }
    }

    pub fn current(&self) -> Option<Image> {
        self.inner.image.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Image>> {
        self.inner.image.subscribe()
    }

    /// Shows `image` directly. Any load still pending for this slot is dropped.
    pub fn show(&self, image: Option<Image>) {
        self.begin(image);
    }

    /// Starts a new load: invalidates older tickets and shows the placeholder.
    fn begin(&self, placeholder: Option<Image>) -> u64 {
        let ticket = self.inner.ticket.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.image.send_replace(placeholder);
        ticket
    }

    /// Assigns `image` if `ticket` is still the latest. Returns whether it was applied.
    fn deliver(&self, ticket: u64, image: Image) -> bool {
        self.inner.image.send_if_modified(|current| {
            if self.inner.ticket.load(Ordering::SeqCst) != ticket {
                return false;
            }
            *current = Some(image);
            true
        })
    }
}

type SharedFetch = Shared<BoxFuture<'static, Option<Image>>>;

pub struct ImageLoader {
    cache: Arc<dyn ImageCache>,
    fetcher: Arc<dyn ImageFetcher>,
    in_flight: Arc<Mutex<HashMap<String, SharedFetch>>>,
    events: Option<mpsc::UnboundedSender<LoadEvent>>,
}

impl ImageLoader {
    pub fn new(cache: Arc<dyn ImageCache>, fetcher: Arc<dyn ImageFetcher>) -> Self {
        Self {
            cache,
            fetcher,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            events: None,
        }
    }

    /// Routes `LoadEvent`s to `sender` in addition to the log.
    pub fn with_events(mut self, sender: mpsc::UnboundedSender<LoadEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    pub fn cache(&self) -> &Arc<dyn ImageCache> {
        &self.cache
    }

    /// Shows `placeholder` in `slot` now, and the image for `key` once it is
    /// available from the cache or the network. Failures leave the
    /// placeholder in place.
    pub fn load(&self, key: &str, placeholder: Option<Image>, slot: &ImageSlot) -> JoinHandle<()> {
        let ticket = slot.begin(placeholder);
        let key = key.to_string();
        let slot = slot.clone();
        let cache = self.cache.clone();
        let fetcher = self.fetcher.clone();
        let in_flight = self.in_flight.clone();
        let events = self.events.clone();

        tokio::spawn(async move {
            if let Some(image) = cache.get(&key).await {
                debug!("Image cache hit: {}", key);
                emit(&events, LoadEvent::CacheHit { key: key.clone() });
                apply(&slot, ticket, image, &key, &events);
                return;
            }

            let shared = {
                let mut pending = in_flight.lock().unwrap_or_else(|e| e.into_inner());
                pending
                    .entry(key.clone())
                    .or_insert_with(|| {
                        fetch_and_store(
                            key.clone(),
                            cache.clone(),
                            fetcher.clone(),
                            in_flight.clone(),
                            events.clone(),
                        )
                    })
                    .clone()
            };

            if let Some(image) = shared.await {
                apply(&slot, ticket, image, &key, &events);
            }
        })
    }
}

fn emit(events: &Option<mpsc::UnboundedSender<LoadEvent>>, event: LoadEvent) {
    if let Some(sender) = events {
        let _ = sender.send(event);
    }
}

fn apply(
    slot: &ImageSlot,
    ticket: u64,
    image: Image,
    key: &str,
    events: &Option<mpsc::UnboundedSender<LoadEvent>>,
) {
    if !slot.deliver(ticket, image) {
        debug!("Slot was reloaded, dropping image for {}", key);
        emit(events, LoadEvent::Superseded { key: key.to_string() });
    }
}

/// Decoding is CPU-bound, so it runs on the blocking pool.
async fn decode_off_runtime(bytes: Vec<u8>) -> Result<Image, String> {
    match tokio::task::spawn_blocking(move || Image::decode(&bytes)).await {
        Ok(decoded) => decoded.map_err(|e| e.to_string()),
        Err(e) => Err(format!("decode task failed: {e}")),
    }
}

/// One network fetch for `key`, shared by every load waiting on it.
/// Removes itself from the in-flight map once settled.
fn fetch_and_store(
    key: String,
    cache: Arc<dyn ImageCache>,
    fetcher: Arc<dyn ImageFetcher>,
    in_flight: Arc<Mutex<HashMap<String, SharedFetch>>>,
    events: Option<mpsc::UnboundedSender<LoadEvent>>,
) -> SharedFetch {
    async move {
        let result = match fetcher.fetch(&key).await {
            Ok(bytes) => match decode_off_runtime(bytes).await {
                Ok(image) => {
                    cache.set(&key, image.clone()).await;
                    debug!("Fetched and cached image: {}", key);
                    emit(&events, LoadEvent::Fetched { key: key.clone() });
                    Some(image)
                }
                Err(error) => {
                    warn!("Image decode failed for {}: {}", key, error);
                    emit(
                        &events,
                        LoadEvent::DecodeFailed {
                            key: key.clone(),
                            error,
                        },
                    );
                    None
                }
            },
            Err(e) => {
                warn!("Image download failed for {}: {}", key, e);
                emit(
                    &events,
                    LoadEvent::FetchFailed {
                        key: key.clone(),
                        error: e.to_string(),
                    },
                );
                None
            }
        };

        in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&key);
        result
    }
    .boxed()
    .shared()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::{FetchError, MemoryImageCache};
    use crate::test_support::{FakeFetcher, png_bytes};
    use std::time::Duration;

    const URL: &str = "https://x/img.png";

    fn loader_with(fetcher: Arc<FakeFetcher>) -> (ImageLoader, Arc<MemoryImageCache>) {
        let cache = Arc::new(MemoryImageCache::new());
        (ImageLoader::new(cache.clone(), fetcher), cache)
    }

    #[tokio::test]
    async fn test_placeholder_then_image_then_cache_hit() {
        let fetcher = Arc::new(FakeFetcher::serving(URL, png_bytes(2, 2, [200, 0, 0])));
        let (loader, _cache) = loader_with(fetcher.clone());
        let placeholder = Image::solid(1, 1, [9, 9, 9]);
        let slot = ImageSlot::new();

        let handle = loader.load(URL, Some(placeholder.clone()), &slot);
        assert!(slot.current().unwrap().ptr_eq(&placeholder));

        handle.await.unwrap();
        let loaded = slot.current().unwrap();
        assert_eq!((loaded.width(), loaded.height()), (2, 2));
        assert_eq!(loaded.rgb_at(0, 0), [200, 0, 0]);

        let second = ImageSlot::new();
        loader.load(URL, None, &second).await.unwrap();
        assert!(second.current().unwrap().ptr_eq(&loaded));
        assert_eq!(fetcher.calls(URL), 1);
    }

    #[tokio::test]
    async fn test_cached_image_skips_network() {
        let fetcher = Arc::new(FakeFetcher::failing(FetchError::Status(500)));
        let (loader, cache) = loader_with(fetcher.clone());
        let cached = Image::solid(3, 3, [0, 0, 255]);
        cache.set(URL, cached.clone()).await;

        let slot = ImageSlot::new();
        loader.load(URL, None, &slot).await.unwrap();

        assert!(slot.current().unwrap().ptr_eq(&cached));
        assert_eq!(fetcher.calls(URL), 0);
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_placeholder() {
        let fetcher = Arc::new(FakeFetcher::failing(FetchError::Network("refused".into())));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (loader, cache) = loader_with(fetcher);
        let loader = loader.with_events(tx);
        let placeholder = Image::solid(1, 1, [1, 2, 3]);
        let slot = ImageSlot::new();

        loader.load(URL, Some(placeholder.clone()), &slot).await.unwrap();

        assert!(slot.current().unwrap().ptr_eq(&placeholder));
        assert!(cache.get(URL).await.is_none());
        assert!(matches!(rx.recv().await, Some(LoadEvent::FetchFailed { .. })));
    }

    #[tokio::test]
    async fn test_fetch_failure_without_placeholder_stays_empty() {
        let fetcher = Arc::new(FakeFetcher::failing(FetchError::Status(404)));
        let (loader, _cache) = loader_with(fetcher);
        let slot = ImageSlot::new();

        loader.load(URL, None, &slot).await.unwrap();
        assert!(slot.current().is_none());
    }

    #[tokio::test]
    async fn test_decode_failure_keeps_placeholder_and_skips_cache() {
        let fetcher = Arc::new(FakeFetcher::serving(URL, b"<html>nope</html>".to_vec()));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (loader, cache) = loader_with(fetcher);
        let loader = loader.with_events(tx);
        let placeholder = Image::solid(1, 1, [5, 5, 5]);
        let slot = ImageSlot::new();

        loader.load(URL, Some(placeholder.clone()), &slot).await.unwrap();

        assert!(slot.current().unwrap().ptr_eq(&placeholder));
        assert!(cache.get(URL).await.is_none());
        assert!(matches!(rx.recv().await, Some(LoadEvent::DecodeFailed { .. })));
    }

    #[tokio::test]
    async fn test_concurrent_loads_share_one_fetch() {
        let fetcher = Arc::new(
            FakeFetcher::serving(URL, png_bytes(1, 1, [0, 255, 0]))
                .with_delay(Duration::from_millis(50)),
        );
        let (loader, _cache) = loader_with(fetcher.clone());
        let a = ImageSlot::new();
        let b = ImageSlot::new();

        let first = loader.load(URL, None, &a);
        let second = loader.load(URL, None, &b);
        first.await.unwrap();
        second.await.unwrap();

        assert_eq!(fetcher.calls(URL), 1);
        assert!(a.current().unwrap().ptr_eq(&b.current().unwrap()));
    }

    #[tokio::test]
    async fn test_reused_slot_ignores_stale_result() {
        let slow = "https://x/slow.png";
        let fast = "https://x/fast.png";
        let fetcher = Arc::new(
            FakeFetcher::serving(slow, png_bytes(1, 1, [255, 0, 0]))
                .and_serving(fast, png_bytes(1, 1, [0, 0, 255]))
                .with_delay_for(slow, Duration::from_millis(80)),
        );
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (loader, _cache) = loader_with(fetcher);
        let loader = loader.with_events(tx);
        let slot = ImageSlot::new();

        let stale = loader.load(slow, None, &slot);
        let fresh = loader.load(fast, None, &slot);
        fresh.await.unwrap();
        stale.await.unwrap();

        assert_eq!(slot.current().unwrap().rgb_at(0, 0), [0, 0, 255]);
        let mut superseded = false;
        while let Ok(event) = rx.try_recv() {
            superseded |= matches!(event, LoadEvent::Superseded { ref key } if key == slow);
        }
        assert!(superseded);
    }

    #[tokio::test]
    async fn test_large_decode_does_not_stall_runtime() {
        // Single-threaded runtime: an inline decode would finish before the
        // loop below got another turn.
        let fetcher = Arc::new(FakeFetcher::serving(URL, png_bytes(3000, 3000, [7, 7, 7])));
        let (loader, _cache) = loader_with(fetcher);
        let slot = ImageSlot::new();

        let handle = loader.load(URL, None, &slot);
        let mut turns = 0usize;
        while !handle.is_finished() {
            turns += 1;
            tokio::task::yield_now().await;
        }
        handle.await.unwrap();

        assert!(turns > 10, "runtime only got {turns} turns during decode");
        assert_eq!(slot.current().unwrap().width(), 3000);
    }

    #[tokio::test]
    async fn test_cleared_cache_refetches() {
        let fetcher = Arc::new(FakeFetcher::serving(URL, png_bytes(1, 1, [1, 1, 1])));
        let (loader, cache) = loader_with(fetcher.clone());

        loader.load(URL, None, &ImageSlot::new()).await.unwrap();
        cache.clear().await;
        loader.load(URL, None, &ImageSlot::new()).await.unwrap();

        assert_eq!(fetcher.calls(URL), 2);
    }
}
