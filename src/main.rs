// src/main.rs
use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use eframe::egui as eg;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tilegrid::app::catalog::load_catalog;
use tilegrid::app::fetch::HttpFetcher;
use tilegrid::app::{BrowseScreen, GridApp, Services, APP_TITLE};
use tilegrid::config::load_config;

fn pick_renderer() -> eframe::Renderer {
    match env::var("TILEGRID_RENDERER").as_deref() {
        Ok("glow") => eframe::Renderer::Glow,
        Ok("wgpu") => eframe::Renderer::Wgpu,
        _ => {
            // Default: Windows = WGPU (DX12), Others = Glow (GL)
            #[cfg(target_os = "windows")]
            { eframe::Renderer::Wgpu }
            #[cfg(not(target_os = "windows"))]
            { eframe::Renderer::Glow }
        }
    }
}

fn main() -> ExitCode {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();

    #[cfg(target_os = "linux")]
    {
        info!("XDG_SESSION_TYPE={:?}", env::var_os("XDG_SESSION_TYPE"));
        info!("WAYLAND_DISPLAY={:?}", env::var_os("WAYLAND_DISPLAY"));
        info!("DISPLAY={:?}", env::var_os("DISPLAY"));
    }

    let config = load_config();

    let fetcher = match HttpFetcher::new(&config) {
        Ok(f) => f,
        Err(e) => {
            error!("HTTP client setup failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    // The grid has nothing to show without a catalog; fetch it before opening a window.
    let catalog = match load_catalog(&fetcher, &config) {
        Ok(c) => Arc::new(c),
        Err(e) => {
            error!("catalog load failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    let services = Services::new(config, Arc::new(fetcher));

    let options = eframe::NativeOptions {
        renderer: pick_renderer(),
        multisampling: 0,
        viewport: eg::ViewportBuilder::default()
            .with_title(APP_TITLE)
            .with_inner_size([1280.0, 720.0]),
        ..Default::default()
    };

    match eframe::run_native(
        APP_TITLE,
        options,
        Box::new(move |cc| {
            let screen = BrowseScreen::new(catalog, services);
            Ok(Box::new(GridApp::new(cc, screen)))
        }),
    ) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("eframe failed to start: {e:?}");
            error!("Hint: try TILEGRID_RENDERER=wgpu or glow.");
            ExitCode::FAILURE
        }
    }
}
