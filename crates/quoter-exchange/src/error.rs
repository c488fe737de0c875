//! Error types for exchange connectivity.

use thiserror::Error;

/// Exchange errors.
///
/// `Config` covers everything raised before a network call (unsupported
/// network, missing limit price, missing trading key); it is never retried.
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Transport(String),

    #[error("Exchange API error: {0}")]
    Api(String),

    #[error("Signing error: {0}")]
    Sign(#[from] crate::signer::SignError),
}

/// Result type alias for exchange operations.
pub type Result<T> = std::result::Result<T, ExchangeError>;
