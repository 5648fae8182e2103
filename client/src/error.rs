use common::error::{DocumentError, ProtocolError};
use thiserror::Error;

/// The remote call itself failed. Logged, never shown to the user.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Malformed response: {0}")]
    Decode(#[from] ProtocolError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session has shut down")]
    Closed,

    #[error(transparent)]
    Document(#[from] DocumentError),
}
