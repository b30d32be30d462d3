use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{field} is not configured: set {config_key} or the {env_var} environment variable")]
    Missing {
        field: &'static str,
        config_key: String,
        env_var: &'static str,
    },
}

/// The request never produced an HTTP response.
///
/// A response with a non-2xx status is not a transport error; it comes back
/// as a [`crate::TransportResult`] with `ok == false`.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid bridge url: {0}")]
    InvalidUrl(String),

    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("failed to read response body: {0}")]
    Body(String),
}
