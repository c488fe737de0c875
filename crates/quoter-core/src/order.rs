//! Order-related types and identifiers.

use crate::error::CoreError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Order side: buy or sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// Returns the opposite side.
    pub fn opposite(&self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }

    /// Returns 1 for buy, -1 for sell (for position calculations).
    pub fn sign(&self) -> i8 {
        match self {
            Self::Buy => 1,
            Self::Sell => -1,
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

/// Order type. Only limit orders are supported by the exchange client;
/// `Market` exists so callers get a configuration error, not a silent remap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Limit,
    Market,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Limit => write!(f, "limit"),
            Self::Market => write!(f, "market"),
        }
    }
}

/// Time-in-force for orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeInForce {
    /// Good-til-cancelled (quoting orders).
    #[default]
    #[serde(rename = "Gtc")]
    GoodTilCancelled,
    /// Immediate-or-cancel (flatten orders).
    #[serde(rename = "Ioc")]
    ImmediateOrCancel,
    /// Add-liquidity-only.
    #[serde(rename = "Alo")]
    AddLiquidityOnly,
}

impl TimeInForce {
    /// Wire representation expected by the exchange.
    pub fn as_wire(&self) -> &'static str {
        match self {
            Self::GoodTilCancelled => "Gtc",
            Self::ImmediateOrCancel => "Ioc",
            Self::AddLiquidityOnly => "Alo",
        }
    }
}

impl fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_wire())
    }
}

impl FromStr for TimeInForce {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "GTC" => Ok(Self::GoodTilCancelled),
            "IOC" => Ok(Self::ImmediateOrCancel),
            "ALO" => Ok(Self::AddLiquidityOnly),
            other => Err(CoreError::UnsupportedTimeInForce(other.to_string())),
        }
    }
}

/// Client order ID for idempotency.
///
/// Every submitted order carries a unique cloid so retries can never
/// double-fill.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientOrderId(String);

impl ClientOrderId {
    /// Create a new unique client order ID.
    ///
    /// Format: `0x` + 32 hex chars (the exchange requires a 128-bit hex cloid).
    pub fn new() -> Self {
        Self(format!("0x{}", Uuid::new_v4().simple()))
    }

    /// Create from an existing string (for parsing responses).
    pub fn from_string(s: String) -> Self {
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ClientOrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClientOrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single order to submit to the exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    /// Symbol in `{COIN}-PERP` form.
    pub symbol: String,
    pub side: OrderSide,
    /// Quantity in contracts, already rounded to the market's size decimals.
    pub quantity: Decimal,
    pub order_type: OrderType,
    /// Required when `order_type` is `Limit`; validated before any network call.
    pub limit_price: Option<Decimal>,
    pub time_in_force: TimeInForce,
    pub reduce_only: bool,
}

impl OrderRequest {
    /// A GTC limit order (the quoting cycle's default shape).
    pub fn limit(symbol: impl Into<String>, side: OrderSide, quantity: Decimal, limit_price: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            quantity,
            order_type: OrderType::Limit,
            limit_price: Some(limit_price),
            time_in_force: TimeInForce::GoodTilCancelled,
            reduce_only: false,
        }
    }

    /// A reduce-only IOC limit order (the flattener's shape).
    pub fn reduce_only_ioc(
        symbol: impl Into<String>,
        side: OrderSide,
        quantity: Decimal,
        limit_price: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            quantity,
            order_type: OrderType::Limit,
            limit_price: Some(limit_price),
            time_in_force: TimeInForce::ImmediateOrCancel,
            reduce_only: true,
        }
    }
}
