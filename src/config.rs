use std::{env, fs, path::Path, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

pub const CONFIG_FILE: &str = "config.json";
pub const CONFIG_ENV: &str = "TILEGRID_CONFIG";

const DEFAULT_HOME_URL: &str = "https://cd-static.bamgrid.com/dp-117731241344/home.json";
const DEFAULT_SET_REF_URL: &str = "https://cd-static.bamgrid.com/dp-117731241344/sets/{ref_id}.json";
const DEFAULT_USER_AGENT: &str = "tilegrid/0.1";

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    /// Catalog home document.
    pub home_url: String,
    /// Template for referenced rows; `{ref_id}` is replaced with the row's ref id.
    pub set_ref_url: String,
    pub ffmpeg_cmd: String,
    pub logo_path: Option<PathBuf>,
    pub user_agent: String,
    /// `None` means fetches never time out.
    pub fetch_timeout: Option<Duration>,
    pub preview_width: u32,
    pub preview_height: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            home_url: DEFAULT_HOME_URL.into(),
            set_ref_url: DEFAULT_SET_REF_URL.into(),
            ffmpeg_cmd: "ffmpeg".into(),
            logo_path: None,
            user_agent: DEFAULT_USER_AGENT.into(),
            fetch_timeout: None,
            preview_width: 480,
            preview_height: 270,
        }
    }
}

impl AppConfig {
    pub fn set_ref_url_for(&self, ref_id: &str) -> String {
        self.set_ref_url
            .replace("{ref_id}", &urlencoding::encode(ref_id))
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    home_url: Option<String>,
    set_ref_url: Option<String>,
    ffmpeg_cmd: Option<String>,
    logo_path: Option<String>,
    user_agent: Option<String>,
    fetch_timeout_secs: Option<u64>,
    preview_width: Option<u32>,
    preview_height: Option<u32>,
}

/// Load `config.json` (or the file named by `TILEGRID_CONFIG`), falling back to defaults.
pub fn load_config() -> AppConfig {
    let path = env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
    load_config_from(&path)
}

pub fn load_config_from(cfg_path: &Path) -> AppConfig {
    let mut cfg = AppConfig::default();

    match fs::read_to_string(cfg_path) {
        Ok(raw) => match serde_json::from_str::<RawConfig>(&raw) {
            Ok(parsed) => {
                apply_raw(&mut cfg, parsed);
                info!("Loaded config from {}", cfg_path.display());
            }
            Err(err) => {
                warn!(
                    "Failed to parse {} ({}). Using defaults.",
                    cfg_path.display(),
                    err
                );
            }
        },
        Err(_) => {
            info!("No {} found; using defaults", cfg_path.display());
        }
    }

    cfg
}

fn apply_raw(cfg: &mut AppConfig, parsed: RawConfig) {
    if let Some(url) = parsed.home_url.filter(|s| !s.trim().is_empty()) {
        cfg.home_url = url;
    }
    if let Some(tpl) = parsed.set_ref_url.filter(|s| !s.trim().is_empty()) {
        if !tpl.contains("{ref_id}") {
            warn!("`set_ref_url` has no {{ref_id}} placeholder; referenced rows will all resolve to the same document.");
        }
        cfg.set_ref_url = tpl;
    }
    if let Some(cmd) = parsed.ffmpeg_cmd.filter(|s| !s.trim().is_empty()) {
        cfg.ffmpeg_cmd = cmd;
    }
    if let Some(logo) = parsed.logo_path.filter(|s| !s.trim().is_empty()) {
        cfg.logo_path = Some(PathBuf::from(logo));
    }
    if let Some(ua) = parsed.user_agent.filter(|s| !s.trim().is_empty()) {
        cfg.user_agent = ua;
    }
    // 0 keeps the "no timeout" default
    if let Some(secs) = parsed.fetch_timeout_secs.filter(|s| *s > 0) {
        cfg.fetch_timeout = Some(Duration::from_secs(secs));
    }
    if let Some(w) = parsed.preview_width {
        cfg.preview_width = w.clamp(64, 1920);
    }
    if let Some(h) = parsed.preview_height {
        cfg.preview_height = h.clamp(36, 1080);
    }
}
