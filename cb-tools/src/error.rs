use cb_transport::{ConfigError, TransportError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ToolError>;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("invalid arguments: {0}")]
    Validation(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("{operation} failed: status={status} body={body}")]
    Backend {
        operation: String,
        status: u16,
        body: String,
    },

    #[error("{operation} returned an unreadable response: {detail}")]
    InvalidResponse { operation: String, detail: String },

    #[error("unknown tool: {0}")]
    UnknownTool(String),
}

impl From<ConfigError> for ToolError {
    fn from(e: ConfigError) -> Self {
        Self::Configuration(e.to_string())
    }
}

impl From<TransportError> for ToolError {
    fn from(e: TransportError) -> Self {
        Self::Transport(e.to_string())
    }
}
