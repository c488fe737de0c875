//! Error types for quoter-core.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Unsupported time-in-force: {0}")]
    UnsupportedTimeInForce(String),

    #[error("Unsupported order type: {0}")]
    UnsupportedOrderType(String),

    #[error("Decimal parse error: {0}")]
    DecimalParse(#[from] rust_decimal::Error),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
