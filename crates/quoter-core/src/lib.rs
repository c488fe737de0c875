//! Core domain types for the perp quoter.
//!
//! This crate provides the types shared across the quoting pipeline:
//! - `SymbolSnapshot`: per-market state captured at the start of a cycle
//! - `AnalysisResult`: parsed model parameters from the analysis provider
//! - `OrderSide`, `OrderType`, `TimeInForce`, `OrderRequest`: trading types

pub mod analysis;
pub mod error;
pub mod order;
pub mod snapshot;

pub use analysis::{AnalysisResult, ModelParameters, RiskAssessment, StrategyRecommendations};
pub use error::{CoreError, Result};
pub use order::{ClientOrderId, OrderRequest, OrderSide, OrderType, TimeInForce};
pub use snapshot::SymbolSnapshot;

use std::pin::Pin;

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;
