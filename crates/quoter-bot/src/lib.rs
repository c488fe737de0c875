//! Cycle orchestration for the perp quoter.

pub mod config;
pub mod cycle;
pub mod error;
pub mod flatten;
pub mod logging;
pub mod snapshot;

pub use config::AppConfig;
pub use cycle::{CycleSummary, MarketMaker};
pub use error::{AppError, AppResult};
pub use flatten::{close_all_positions, FlattenOrder, FlattenReport, FlattenStatus};
