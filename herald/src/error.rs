//! Service-level error types.

use thiserror::Error;

/// Errors raised while reading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable is missing
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    /// Environment variable has an unusable value
    #[error("Invalid value for {var}: {reason}")]
    InvalidValue { var: String, reason: String },
}

/// Errors from binding or running the HTTP listener.
#[derive(Debug, Error)]
pub enum ServeError {
    /// Failed to bind the configured listen address
    #[error("Failed to bind contact server to {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    /// The server encountered a runtime error
    #[error("Contact server error: {0}")]
    Server(String),
}
