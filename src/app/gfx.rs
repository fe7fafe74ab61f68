// src/app/gfx.rs
use std::path::Path;

use eframe::egui::{self as eg, ColorImage, TextureHandle};
use tracing::warn;

use crate::app::cache::decode_artwork;
use crate::app::types::{Catalog, DecodedImage, TileId, VideoFrame};

/// Pixel buffer → egui image, whatever the channel layout.
pub fn to_color_image(img: &DecodedImage) -> ColorImage {
    let size = img.size();
    match img.bits_per_pixel {
        8 => ColorImage::from_gray(size, &img.pixels),
        24 => ColorImage::from_rgb(size, &img.pixels),
        _ => ColorImage::from_rgba_unmultiplied(size, &img.pixels),
    }
}

/// Upload a decoded image to a GPU texture. (UI thread only)
pub fn materialize(ctx: &eg::Context, img: &DecodedImage, name: &str) -> TextureHandle {
    ctx.load_texture(name.to_string(), to_color_image(img), eg::TextureOptions::LINEAR)
}

/// Load the brand logo from disk. Missing or broken logos fall back to flat placeholders.
pub fn load_logo(ctx: &eg::Context, path: &Path) -> Option<TextureHandle> {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) => {
            warn!("logo {}: {e}", path.display());
            return None;
        }
    };
    match decode_artwork(&bytes) {
        Ok(img) => Some(materialize(ctx, &img, "brand-logo")),
        Err(e) => {
            warn!("logo {}: {e}", path.display());
            None
        }
    }
}

/// Per-tile renderable handles, filled lazily on the render thread. Each slot is set once.
pub struct ArtworkHandles<H> {
    rows: Vec<Vec<Option<H>>>,
}

impl<H> ArtworkHandles<H> {
    pub fn for_catalog(catalog: &Catalog) -> Self {
        let rows = catalog
            .rows
            .iter()
            .map(|r| r.tiles.iter().map(|_| None).collect())
            .collect();
        Self { rows }
    }

    pub fn get(&self, id: TileId) -> Option<&H> {
        self.rows.get(id.row)?.get(id.column)?.as_ref()
    }

    /// Store `handle` unless the slot is already resolved; returns the resolved handle.
    pub fn resolve(&mut self, id: TileId, handle: H) -> Option<&H> {
        let slot = self.rows.get_mut(id.row)?.get_mut(id.column)?;
        Some(slot.get_or_insert(handle))
    }

    pub fn resolved_count(&self) -> usize {
        self.rows.iter().flatten().filter(|s| s.is_some()).count()
    }
}

fn frame_image(frame: &VideoFrame) -> ColorImage {
    ColorImage::from_rgba_unmultiplied([frame.width as usize, frame.height as usize], &frame.rgba)
}

/// The single texture the current preview frame is drawn from.
#[derive(Default)]
pub struct VideoTexture {
    handle: Option<TextureHandle>,
    serial: u64,
}

impl VideoTexture {
    /// Swap in `frame` if it is newer than what the texture holds.
    pub fn sync(&mut self, ctx: &eg::Context, frame: &VideoFrame, serial: u64) -> &TextureHandle {
        let mut fresh = false;
        let handle = self.handle.get_or_insert_with(|| {
            fresh = true;
            ctx.load_texture("preview-frame", frame_image(frame), eg::TextureOptions::LINEAR)
        });
        if !fresh && self.serial != serial {
            handle.set(frame_image(frame), eg::TextureOptions::LINEAR);
        }
        self.serial = serial;
        handle
    }

    pub fn clear(&mut self) {
        self.handle = None;
        self.serial = 0;
    }
}
