// src/app/fetch.rs
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};

use crate::app::error::FetchError;
use crate::config::AppConfig;

/// Blocking request/response: URL in, body bytes out.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Shared reqwest client; cheap to clone (the pool is reference counted).
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(cfg: &AppConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("image/avif,image/webp,image/*;q=0.8,application/json;q=0.8,*/*;q=0.5"),
        );

        let mut builder = Client::builder()
            .user_agent(cfg.user_agent.clone())
            .pool_max_idle_per_host(8)
            .default_headers(headers);
        // reqwest's blocking client defaults to 30s; we want "no timeout" unless configured
        builder = builder.timeout(cfg.fetch_timeout);

        let client = builder
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| FetchError::Transport {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        if !resp.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: resp.status().as_u16(),
            });
        }
        let body = resp.bytes().map_err(|e| FetchError::Transport {
            url: url.to_string(),
            reason: format!("read body: {e}"),
        })?;
        Ok(body.to_vec())
    }
}
