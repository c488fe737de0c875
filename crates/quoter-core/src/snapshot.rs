//! Per-market snapshot taken at the start of each quoting cycle.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// State of one tradable market, captured fresh each cycle.
///
/// The serialized (camelCase) form of this struct is embedded verbatim in
/// the analysis provider's background prompt, so the field renames are part
/// of the provider contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolSnapshot {
    /// Symbol in `{COIN}-PERP` form.
    pub symbol: String,
    /// Mid price. Always positive: symbols without a usable price are
    /// excluded from the cycle, never defaulted to zero.
    pub mid_price: Decimal,
    /// Number of decimals allowed in order sizes for this market.
    pub size_decimals: u32,
    /// Signed net position, positive = long.
    pub inventory: Decimal,
    /// 24h price change in percent, when the batched lookup had data.
    pub change_24h: Option<Decimal>,
    /// 24h notional volume, when the ticker carried it.
    pub notional_liquidity: Option<Decimal>,
}

impl SymbolSnapshot {
    pub fn new(symbol: impl Into<String>, mid_price: Decimal, size_decimals: u32, inventory: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            mid_price,
            size_decimals,
            inventory,
            change_24h: None,
            notional_liquidity: None,
        }
    }
}
