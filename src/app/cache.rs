// src/app/cache.rs
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use image::DynamicImage;
use tracing::warn;

use crate::app::error::DecodeError;
use crate::app::types::DecodedImage;

/// URL → decoded artwork. Written once per key by the prefetch worker, read by the render pass.
///
/// The lock is only ever held for a lookup or an insert, never across a fetch or decode.
#[derive(Clone, Default)]
pub struct ArtworkCache {
    inner: Arc<Mutex<HashMap<String, Arc<DecodedImage>>>>,
}

impl ArtworkCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<DecodedImage>>> {
        // A panicked writer leaves the map consistent (single insert), so keep serving it.
        self.inner.lock().unwrap_or_else(|poisoned| {
            warn!("artwork cache mutex poisoned; continuing");
            poisoned.into_inner()
        })
    }

    pub fn contains(&self, url: &str) -> bool {
        self.lock().contains_key(url)
    }

    pub fn get(&self, url: &str) -> Option<Arc<DecodedImage>> {
        self.lock().get(url).cloned()
    }

    /// Insert unless present. Returns the entry that ends up in the cache, so a
    /// late writer observes the first writer's image.
    pub fn insert(&self, url: &str, image: DecodedImage) -> Arc<DecodedImage> {
        self.lock()
            .entry(url.to_string())
            .or_insert_with(|| Arc::new(image))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Decode encoded artwork bytes into a packed 8/24/32-bit buffer.
pub fn decode_artwork(bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
    let img = image::load_from_memory(bytes)?;
    let (width, height) = (img.width(), img.height());
    if width == 0 || height == 0 {
        return Err(DecodeError::Empty(width, height));
    }

    let (bits_per_pixel, pixels) = match img {
        DynamicImage::ImageLuma8(buf) => (8, buf.into_raw()),
        DynamicImage::ImageRgb8(buf) => (24, buf.into_raw()),
        DynamicImage::ImageRgba8(buf) => (32, buf.into_raw()),
        // 16-bit, float and grey+alpha layouts all normalise to RGBA8
        other => (32, other.to_rgba8().into_raw()),
    };

    Ok(DecodedImage {
        width,
        height,
        bits_per_pixel,
        pixels,
    })
}
