//! Connection plumbing for companion bridges.
//!
//! A bridge is an out-of-process HTTP service (the local filesystem/command
//! bridge or the Drive playground). This crate resolves how to reach one and
//! issues single authenticated requests against it; interpreting responses is
//! left to the tool layer.

mod config;
mod error;
mod transport;

pub use config::{BridgeConfig, BridgeSettings, BridgeSources, EnvSnapshot, Environment, ProcessEnv};
pub use error::{ConfigError, TransportError};
pub use transport::{
    API_KEY_HEADER, DEFAULT_REQUEST_TIMEOUT, HttpTransport, Method, OperationRequest, Transport,
    TransportResult, build_url,
};
