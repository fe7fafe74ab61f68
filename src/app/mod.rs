// src/app/mod.rs: the browse screen and the eframe app that drives it

use std::sync::Arc;
use std::time::Duration;

use eframe::egui::{self as eg, TextureHandle};
use tracing::{debug, info};

// ---- Local modules ----
pub mod cache;
pub mod catalog;
pub mod clock;
pub mod error;
pub mod fetch;
pub mod gfx;
pub mod input;
pub mod nav;
pub mod playback;
pub mod prefetch;
pub mod types;
pub mod ui;
pub mod utils;
pub mod video;

use crate::app::cache::ArtworkCache;
use crate::app::clock::{Clock, MonotonicClock};
use crate::app::fetch::Fetcher;
use crate::app::gfx::{ArtworkHandles, VideoTexture};
use crate::app::nav::{GridNavigator, SelectionChanged};
use crate::app::playback::{PlaybackController, VideoSource};
use crate::app::prefetch::PrefetchWorker;
use crate::app::types::{Direction, SharedCatalog, Tile};
use crate::app::video::FfmpegSource;
use crate::config::AppConfig;

// ---- Tunables ----
pub const APP_TITLE: &str = "tilegrid";
/// Brand card shown at startup while the first artwork arrives.
pub const SPLASH_DURATION: Duration = Duration::from_secs(2);

/// Process-wide collaborators, built once in `main` and handed to the screen.
pub struct Services {
    pub config: AppConfig,
    pub fetcher: Arc<dyn Fetcher>,
    pub video: FfmpegSource,
    pub clock: Box<dyn Clock>,
}

impl Services {
    pub fn new(config: AppConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        let video = FfmpegSource::new(&config);
        Self {
            config,
            fetcher,
            video,
            clock: Box::new(MonotonicClock::new()),
        }
    }
}

/// The one screen: a scrollable grid of rows with a live preview on the focused tile.
pub struct BrowseScreen {
    // data
    catalog: SharedCatalog,
    nav: GridNavigator,

    // artwork
    cache: ArtworkCache,
    handles: ArtworkHandles<TextureHandle>,
    fetcher: Arc<dyn Fetcher>,
    prefetch: Option<PrefetchWorker>,

    // preview
    playback: PlaybackController<FfmpegSource>,
    video_tex: VideoTexture,

    // chrome
    config: AppConfig,
    logo: Option<TextureHandle>,
    clock: Box<dyn Clock>,
    started_at: Duration,
}

impl BrowseScreen {
    pub fn new(catalog: SharedCatalog, services: Services) -> Self {
        let Services {
            config,
            fetcher,
            video,
            clock,
        } = services;

        Self {
            nav: GridNavigator::new(Arc::clone(&catalog)),
            handles: ArtworkHandles::for_catalog(&catalog),
            catalog,
            cache: ArtworkCache::new(),
            fetcher,
            prefetch: None,
            playback: PlaybackController::new(video),
            video_tex: VideoTexture::default(),
            config,
            logo: None,
            started_at: clock.now(),
            clock,
        }
    }

    /// Load chrome, kick off the artwork pass and arm the preview for the initial selection.
    pub fn create(&mut self, ctx: &eg::Context) {
        self.started_at = self.clock.now();

        if let Some(path) = self.config.logo_path.clone() {
            self.logo = gfx::load_logo(ctx, &path);
        }

        let on_screen: Vec<_> = self.nav.visible_cells().iter().map(|c| c.tile).collect();
        self.prefetch = Some(PrefetchWorker::start(
            Arc::clone(&self.catalog),
            &on_screen,
            self.cache.clone(),
            Arc::clone(&self.fetcher),
        ));

        arm_selection(&self.nav, &mut self.playback, self.started_at);

        info!(
            "Browse screen ready: {} rows, {} tiles",
            self.catalog.row_count(),
            self.catalog.tile_count()
        );
    }

    /// Input and timers; runs before `render` every frame.
    pub fn update(&mut self, ctx: &eg::Context) {
        let now = self.clock.now();

        let events = ctx.input(|i| i.events.clone());
        for dir in input::directions_from_events(&events) {
            steer(&mut self.nav, &mut self.playback, dir, now);
        }

        self.playback.tick(now);
    }

    pub fn render(&mut self, ctx: &eg::Context) {
        self.ui_render(ctx);
    }

    /// Stop playback and wait for the artwork pass. Called once at shutdown.
    pub fn destroy(&mut self) {
        self.playback.stop();
        self.video_tex.clear();
        if let Some(mut worker) = self.prefetch.take() {
            if !worker.is_finished() {
                info!("Waiting for artwork prefetch to finish…");
            }
            if let Some(report) = worker.join() {
                debug!("prefetch report at shutdown: {report:?}");
            }
        }
        info!(
            "Shutting down ({} of {} artwork textures resolved)",
            self.handles.resolved_count(),
            self.catalog.tile_count()
        );
    }
}

/// Hand whatever the navigator has selected to playback, e.g. at startup.
pub fn arm_selection<V: VideoSource>(
    nav: &GridNavigator,
    playback: &mut PlaybackController<V>,
    now: Duration,
) {
    let selected = nav.selected();
    let video = nav.catalog().tile(selected).and_then(Tile::video);
    playback.on_selection_changed(selected, video, now);
}

/// One directional press. Playback is only retargeted when the selected tile actually changed.
pub fn steer<V: VideoSource>(
    nav: &mut GridNavigator,
    playback: &mut PlaybackController<V>,
    direction: Direction,
    now: Duration,
) -> Option<SelectionChanged> {
    let change = nav.handle_direction(direction)?;
    let tile = nav.catalog().tile(change.current);
    debug!(
        "selection {:?} -> {:?} ({})",
        change.previous,
        change.current,
        tile.map_or("?", |t| t.name.as_str())
    );
    playback.on_selection_changed(change.current, tile.and_then(Tile::video), now);
    Some(change)
}

/// Application loop: owns the single screen and drives its lifecycle.
pub struct GridApp {
    screen: BrowseScreen,
}

impl GridApp {
    pub fn new(cc: &eframe::CreationContext<'_>, mut screen: BrowseScreen) -> Self {
        screen.create(&cc.egui_ctx);
        Self { screen }
    }
}

impl eframe::App for GridApp {
    fn update(&mut self, ctx: &eg::Context, _frame: &mut eframe::Frame) {
        self.screen.update(ctx);
        self.screen.render(ctx);
        // previews and streaming artwork need continuous frames
        ctx.request_repaint();
    }
}

impl Drop for GridApp {
    fn drop(&mut self) {
        self.screen.destroy();
    }
}
