//! Key → image store shared by concurrent loads.

use std::collections::HashMap;

use async_trait::async_trait;
use log::debug;
use tokio::sync::RwLock;

use super::Image;

#[async_trait]
pub trait ImageCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<Image>;

    /// Stores `image`, replacing any existing entry for `key`.
    async fn set(&self, key: &str, image: Image);

    async fn clear(&self);
}

/// In-memory cache. No TTL and no eviction; entries leave only on `clear()`.
#[derive(Default)]
pub struct MemoryImageCache {
    entries: RwLock<HashMap<String, Image>>,
}

impl MemoryImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl ImageCache for MemoryImageCache {
    async fn get(&self, key: &str) -> Option<Image> {
        self.entries.read().await.get(key).cloned()
    }

    async fn set(&self, key: &str, image: Image) {
        self.entries.write().await.insert(key.to_string(), image);
    }

    async fn clear(&self) {
        let mut entries = self.entries.write().await;
        debug!("Clearing image cache ({} entries)", entries.len());
        entries.clear();
    }
}
