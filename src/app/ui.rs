// src/app/ui.rs
pub mod grid;

use eframe::egui as eg;

impl crate::app::BrowseScreen {
    /// Full-window brand card shown while the first artwork streams in.
    pub(crate) fn ui_render_splash(&self, ui: &eg::Ui) {
        let rect = ui.max_rect();
        let painter = ui.painter();

        if let Some(logo) = &self.logo {
            let size = logo.size_vec2();
            let (w, h) = (size.x.max(1.0), size.y.max(1.0));
            let scale = (rect.width() * 0.5 / w).min(rect.height() * 0.5 / h);
            let logo_rect = eg::Rect::from_center_size(rect.center(), eg::vec2(w * scale, h * scale));
            painter.image(
                logo.id(),
                logo_rect,
                eg::Rect::from_min_max(eg::pos2(0.0, 0.0), eg::pos2(1.0, 1.0)),
                eg::Color32::WHITE,
            );
        } else {
            painter.text(
                rect.center(),
                eg::Align2::CENTER_CENTER,
                crate::app::APP_TITLE,
                eg::FontId::proportional(48.0),
                eg::Color32::WHITE,
            );
        }
    }

    pub(crate) fn ui_render(&mut self, ctx: &eg::Context) {
        let in_splash = self.clock.now().saturating_sub(self.started_at) < crate::app::SPLASH_DURATION;

        eg::CentralPanel::default()
            .frame(eg::Frame::none().fill(grid::BACKGROUND))
            .show(ctx, |ui| {
                if in_splash {
                    self.ui_render_splash(ui);
                } else {
                    self.ui_render_grid(ui, ctx);
                }
            });
    }
}
