//! Client error types.

use gcalbill_core::CoreError;
use gcalbill_providers::ProviderError;
use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that end a `gcalbill` run.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Bad flags or config file.
    #[error("configuration error: {0}")]
    Config(String),

    /// Calendar, authentication or holiday backend failure.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Invalid billing period.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The overall deadline expired before the report was complete.
    #[error("timeout: {0}")]
    Timeout(String),
}

impl ClientError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
