//! Error handling and custom error types
//!
//! Provides unified error handling across the service using thiserror. The
//! API layer maps each variant onto an HTTP status in `api::error`.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid value for '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Upstream AI provider error: {0}")]
    Upstream(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Poster is {size} bytes, exceeding the {max} byte limit")]
    FileTooLarge { size: u64, max: u64 },

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invariant violation: {0}")]
    Invariant(String),
}

impl Error {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Maps a reqwest failure onto `Upstream`, calling out timeouts explicitly.
    pub fn upstream_http(provider: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Upstream(format!("{} request timed out: {}", provider, err))
        } else {
            Self::Upstream(format!("{} request failed: {}", provider, err))
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
