//! Events channel error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventsError {
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("timeout error: {0}")]
    Timeout(String),

    #[error("not connected")]
    NotConnected,

    #[error("already connected")]
    AlreadyConnected,

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("gave up after {0} reconnect attempts")]
    RetriesExhausted(u32),
}

pub type Result<T> = std::result::Result<T, EventsError>;
