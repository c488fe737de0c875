//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Exchange error: {0}")]
    Exchange(#[from] quoter_exchange::ExchangeError),

    #[error("Analysis error: {0}")]
    Analysis(#[from] quoter_analysis::AnalysisError),

    #[error("No market snapshots available; check tickers or configured markets")]
    NoSnapshots,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
