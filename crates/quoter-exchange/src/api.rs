//! The exchange seam consumed by the orchestrator and flattener.

use std::collections::HashMap;
use std::sync::Arc;

use quoter_core::{BoxFuture, OrderRequest};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One market's ticker as returned by the read interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticker {
    /// Mid (or mark, when no mid is available) price.
    pub mid_price: Decimal,
    /// Decimals allowed in order sizes.
    pub sz_decimals: u32,
    /// 24h notional volume, when the exchange reports it.
    pub day_notional_volume: Option<Decimal>,
}

/// An open perp position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerpPosition {
    /// Symbol in `{COIN}-PERP` form.
    pub symbol: String,
    /// Signed size, positive = long.
    pub signed_size: Decimal,
}

/// Submission result for one order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderAck {
    /// Exchange-reported status string.
    pub status: String,
    /// Raw response body for diagnostics.
    pub response: serde_json::Value,
}

/// Exchange read/write interface.
///
/// Dyn-compatible so orchestration code can hold `Arc<dyn Exchange>` and
/// tests can substitute an in-memory implementation.
pub trait Exchange: Send + Sync {
    /// Current tickers keyed by symbol. Transport failures propagate.
    fn tickers(&self) -> BoxFuture<'_, Result<HashMap<String, Ticker>>>;

    /// Open positions. Transport failures propagate.
    fn positions(&self) -> BoxFuture<'_, Result<Vec<PerpPosition>>>;

    /// Submit one order. Only limit orders are supported; a missing limit
    /// price is a configuration error raised before any network call.
    fn place_order<'a>(&'a self, request: &'a OrderRequest) -> BoxFuture<'a, Result<OrderAck>>;
}

/// Arc wrapper for `Exchange` trait objects.
pub type DynExchange = Arc<dyn Exchange>;
