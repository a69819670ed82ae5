// src/error.rs
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PolicyError>;

/// Failure taxonomy for the data and rules pipeline.
///
/// `Configuration` is fatal at client construction and never retried.
/// `DataUnavailable` covers empty fetches, indicators that stay unset after
/// resolution, and historical tables that cannot be reconciled. Source and
/// cache failures propagate unchanged; nothing downgrades an error into a
/// partial result.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("required data unavailable: {0}")]
    DataUnavailable(String),

    #[error("cache i/o error: {0}")]
    Cache(#[from] std::io::Error),

    #[error("external source error: {0}")]
    Source(#[from] reqwest::Error),

    #[error("malformed payload: {0}")]
    Payload(#[from] serde_json::Error),
}
