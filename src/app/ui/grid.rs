// src/app/ui/grid.rs
use std::sync::Arc;

use eframe::egui as eg;

use crate::app::gfx::materialize;
use crate::app::types::DecodedImage;
use crate::app::utils::tile_caption;

/// Rows on screen.
pub const ROW_COUNT: f32 = 4.0;
/// Five full columns plus half of the next one.
pub const COLUMN_COUNT: f32 = 5.5;
pub const TILE_SCALE: f32 = 0.90;
pub const SELECTED_SCALE: f32 = 0.95;
/// Artwork is 1.78:1.
pub const TILE_ASPECT: f32 = 16.0 / 9.0;

pub const BACKGROUND: eg::Color32 = eg::Color32::from_rgb(20, 56, 102);
const SELECTION: eg::Color32 = eg::Color32::from_rgb(235, 240, 250);
const PLACEHOLDER: eg::Color32 = eg::Color32::from_gray(40);

/// What a grid cell shows this frame, in priority order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CellSource {
    VideoFrame,
    Artwork,
    Materialize(Arc<DecodedImage>),
    Placeholder,
}

/// Pick a cell's content. The cache is only consulted when nothing better is available.
pub fn resolve_cell<F>(video_ready: bool, has_handle: bool, cached: F) -> CellSource
where
    F: FnOnce() -> Option<Arc<DecodedImage>>,
{
    if video_ready {
        CellSource::VideoFrame
    } else if has_handle {
        CellSource::Artwork
    } else if let Some(img) = cached() {
        CellSource::Materialize(img)
    } else {
        CellSource::Placeholder
    }
}

/// Screen geometry of the 4 × 5.5 grid.
#[derive(Clone, Copy, Debug)]
pub struct GridLayout {
    screen: eg::Rect,
    tile_w: f32,
    tile_h: f32,
}

impl GridLayout {
    pub fn new(screen: eg::Rect) -> Self {
        Self {
            screen,
            tile_w: screen.width() / COLUMN_COUNT,
            tile_h: screen.height() / ROW_COUNT,
        }
    }

    pub fn caption_font(&self) -> eg::FontId {
        eg::FontId::proportional((self.tile_h * 0.11).clamp(11.0, 28.0))
    }

    pub fn row_caption_pos(&self, screen_row: usize) -> eg::Pos2 {
        eg::pos2(
            self.screen.left() + self.tile_w * 0.13,
            self.screen.top() + self.tile_h * (screen_row as f32 + 0.125),
        )
    }

    pub fn cell_center(&self, screen_row: usize, screen_column: usize) -> eg::Pos2 {
        eg::pos2(
            self.screen.left() + self.tile_w * (screen_column as f32 + 0.6),
            self.screen.top() + self.tile_h * (screen_row as f32 + 0.58),
        )
    }

    pub fn tile_rect(&self, screen_row: usize, screen_column: usize, selected: bool) -> eg::Rect {
        let scale = if selected { SELECTED_SCALE } else { TILE_SCALE };
        let w = self.tile_w * scale;
        let h = (w / TILE_ASPECT).min(self.tile_h * 0.75);
        eg::Rect::from_center_size(self.cell_center(screen_row, screen_column), eg::vec2(w, h))
    }
}

fn paint_texture(p: &eg::Painter, tex: eg::TextureId, rect: eg::Rect) {
    p.image(
        tex,
        rect,
        eg::Rect::from_min_max(eg::pos2(0.0, 0.0), eg::pos2(1.0, 1.0)),
        eg::Color32::WHITE,
    );
}

fn paint_placeholder(p: &eg::Painter, rect: eg::Rect, logo: Option<&eg::TextureHandle>) {
    p.rect_filled(rect, 6.0, PLACEHOLDER);
    if let Some(logo) = logo {
        paint_texture(p, logo.id(), rect.shrink(rect.height() * 0.2));
    }
}

impl crate::app::BrowseScreen {
    /// The render pass: one draw per visible cell, video > artwork > fresh upload > placeholder.
    pub(crate) fn ui_render_grid(&mut self, ui: &eg::Ui, ctx: &eg::Context) {
        let layout = GridLayout::new(ui.max_rect());
        let painter = ui.painter();
        let catalog = Arc::clone(&self.catalog);

        for (screen_row, row) in self.nav.visible_rows().enumerate() {
            painter.text(
                layout.row_caption_pos(screen_row),
                eg::Align2::LEFT_CENTER,
                &catalog.rows[row].name,
                layout.caption_font(),
                eg::Color32::WHITE,
            );
        }

        for cell in self.nav.visible_cells() {
            let Some(tile) = catalog.tile(cell.tile) else {
                continue;
            };
            let rect = layout.tile_rect(cell.screen_row, cell.screen_column, cell.selected);

            if cell.selected {
                painter.rect_filled(rect.expand(rect.height() * 0.04), 8.0, SELECTION);
            }

            let video_ready = cell.selected
                && tile.video().is_some()
                && self.playback.frame_for(cell.tile).is_some();
            let source = resolve_cell(video_ready, self.handles.get(cell.tile).is_some(), || {
                self.cache.get(&tile.artwork_url)
            });

            match source {
                CellSource::VideoFrame => {
                    if let Some(frame) = self.playback.frame_for(cell.tile) {
                        let serial = self.playback.frame_serial();
                        let tex = self.video_tex.sync(ctx, frame, serial);
                        paint_texture(painter, tex.id(), rect);
                    }
                }
                CellSource::Artwork => {
                    if let Some(tex) = self.handles.get(cell.tile) {
                        paint_texture(painter, tex.id(), rect);
                    }
                }
                CellSource::Materialize(img) => {
                    let tex = materialize(ctx, &img, &tile.artwork_url);
                    if let Some(tex) = self.handles.resolve(cell.tile, tex) {
                        paint_texture(painter, tex.id(), rect);
                    }
                }
                CellSource::Placeholder => paint_placeholder(painter, rect, self.logo.as_ref()),
            }

            if cell.selected {
                painter.text(
                    eg::pos2(rect.center().x, rect.bottom() + rect.height() * 0.08),
                    eg::Align2::CENTER_TOP,
                    tile_caption(tile),
                    eg::FontId::proportional((rect.height() * 0.11).clamp(10.0, 20.0)),
                    eg::Color32::WHITE,
                );
            }
        }
    }
}
