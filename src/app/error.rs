// src/app/error.rs
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("http client: {0}")]
    Client(String),
    #[error("GET {url}: {reason}")]
    Transport { url: String, reason: String },
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("decode image: {0}")]
    Image(#[from] image::ImageError),
    #[error("empty image {0}x{1}")]
    Empty(u32, u32),
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("fetch catalog: {0}")]
    Fetch(#[from] FetchError),
    #[error("parse catalog json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("catalog document has no `{0}`")]
    Missing(&'static str),
    #[error("catalog has no rows with tiles")]
    Empty,
}

#[derive(Debug, Error)]
pub enum VideoError {
    #[error("spawn {cmd}: {source}")]
    Spawn {
        cmd: String,
        #[source]
        source: std::io::Error,
    },
    #[error("decoder produced no stdout pipe")]
    NoStdout,
    #[error("start frame reader: {0}")]
    Reader(#[source] std::io::Error),
    #[error("empty video url")]
    EmptyUrl,
}
