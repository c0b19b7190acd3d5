pub mod alerts;
pub mod config;
pub mod metrics;
pub mod rundeck;
pub mod server;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Rundeck returned {status}: {body}")]
    Rundeck { status: u16, body: String },
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
