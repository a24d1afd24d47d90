use crate::models::{Price, Side, Size};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Environment variable error: {0}")]
    Env(#[from] std::env::VarError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Serialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("Feed error: {0}")]
    Feed(String),
}

/// Per-entry faults raised by the book. None of them abort a batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookError {
    #[error("invalid {side} level at {price}: negative size {size}")]
    InvalidLevel { side: Side, price: Price, size: Size },

    #[error("malformed timestamp {0:?}")]
    MalformedTimestamp(String),
}
