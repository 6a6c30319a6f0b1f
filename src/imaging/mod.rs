//! # Image Acquisition
//!
//! Cache-aside image loading for the list and detail screens.
//!
//! ```text
//! ImageLoader::load(key, placeholder, slot)
//!   │  slot ← placeholder                       (immediately)
//!   ▼
//! ImageCache::get(key) ── hit ──► slot ← image
//!   │ miss
//!   ▼
//! ImageFetcher::fetch(key) ─► decode ─► ImageCache::set ─► slot ← image
//!   │ failure
//!   ▼
//! placeholder stays, LoadEvent emitted
//! ```
//!
//! The cache and fetcher are always injected; there is no shared instance.

pub mod cache;
pub mod fetch;
pub mod loader;

use std::fmt;
use std::sync::Arc;

use image::{DynamicImage, GenericImageView, ImageError, Rgb, RgbImage};

pub use cache::{ImageCache, MemoryImageCache};
pub use fetch::{FetchError, HttpImageFetcher, ImageFetcher};
pub use loader::{ImageLoader, ImageSlot, LoadEvent};

/// A decoded bitmap. Clones share the same pixels.
#[derive(Clone)]
pub struct Image(Arc<DynamicImage>);

impl Image {
    pub fn new(bitmap: DynamicImage) -> Self {
        Self(Arc::new(bitmap))
    }

    /// Decodes PNG, JPEG or GIF bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, ImageError> {
        image::load_from_memory(bytes).map(Self::new)
    }

    /// A single-colour image, handy as a placeholder.
    pub fn solid(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        Self::new(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            width,
            height,
            Rgb(rgb),
        )))
    }

    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }

    pub fn bitmap(&self) -> &DynamicImage {
        &self.0
    }

    /// RGB of the pixel at `(x, y)`, clamped to the image bounds.
    pub fn rgb_at(&self, x: u32, y: u32) -> [u8; 3] {
        if self.width() == 0 || self.height() == 0 {
            return [0, 0, 0];
        }
        let p = self
            .0
            .get_pixel(x.min(self.width() - 1), y.min(self.height() - 1));
        [p[0], p[1], p[2]]
    }

    /// True if both handles point at the same decoded bitmap.
    pub fn ptr_eq(&self, other: &Image) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Image({}x{})", self.width(), self.height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::png_bytes;

    #[test]
    fn test_decode_png() {
        let image = Image::decode(&png_bytes(4, 3, [10, 20, 30])).unwrap();
        assert_eq!((image.width(), image.height()), (4, 3));
        assert_eq!(image.rgb_at(0, 0), [10, 20, 30]);
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(Image::decode(b"definitely not an image").is_err());
    }

    #[test]
    fn test_clones_share_pixels() {
        let a = Image::solid(1, 1, [0, 0, 0]);
        let b = a.clone();
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&Image::solid(1, 1, [0, 0, 0])));
    }

    #[test]
    fn test_rgb_at_clamps() {
        let image = Image::solid(2, 2, [1, 2, 3]);
        assert_eq!(image.rgb_at(50, 50), [1, 2, 3]);
    }
}
