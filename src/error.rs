use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}: {body}")]
    UnexpectedStatus {
        url: String,
        status: u16,
        body: String,
    },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No bounding box registered for EPSG:{0}")]
    UnknownEpsg(u32),

    #[error("Image mismatch: {actual} differs from {expected}", actual = .actual.display(), expected = .expected.display())]
    ImageMismatch { actual: PathBuf, expected: PathBuf },

    #[error("Missing expected image: {}", .0.display())]
    MissingExpectedImage(PathBuf),
}

impl From<config::ConfigError> for HarnessError {
    fn from(e: config::ConfigError) -> Self {
        HarnessError::Config(e.to_string())
    }
}

pub type HarnessResult<T> = Result<T, HarnessError>;
