//! Hyperliquid connectivity for the perp quoter.
//!
//! Reads (tickers, positions) go through the public `/info` endpoint;
//! writes go through `/exchange` with EIP-712 action signing. The
//! `Exchange` trait is the seam the orchestrator and flattener consume.

pub mod api;
pub mod changes;
pub mod client;
pub mod error;
pub mod signer;

pub use api::{DynExchange, Exchange, OrderAck, PerpPosition, Ticker};
pub use changes::{ChangeFeed, CoingeckoClient, DynChangeFeed};
pub use client::{ExchangeConfig, HyperliquidClient};
pub use error::{ExchangeError, Result};
pub use signer::{SignError, TradingKey};
