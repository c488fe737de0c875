//! Snapshot assembly for one quoting cycle.
//!
//! Pure functions over the maps fetched at cycle start, so ordering and
//! skip behavior are testable without a live exchange.

use std::collections::HashMap;

use quoter_core::SymbolSnapshot;
use quoter_exchange::{PerpPosition, Ticker};
use rust_decimal::Decimal;
use tracing::warn;

/// Signed inventory per symbol from the open-position list.
pub fn build_inventory_map(positions: &[PerpPosition]) -> HashMap<String, Decimal> {
    positions
        .iter()
        .map(|p| (p.symbol.clone(), p.signed_size))
        .collect()
}

/// Build ordered snapshots for the configured markets.
///
/// A symbol absent from the ticker map or without a positive price is
/// skipped, never defaulted. Inventory defaults to zero; 24h changes and
/// notional liquidity are merged when available.
pub fn build_snapshots(
    markets: &[String],
    tickers: &HashMap<String, Ticker>,
    inventory: &HashMap<String, Decimal>,
    changes: &HashMap<String, Decimal>,
) -> Vec<SymbolSnapshot> {
    let mut snapshots = Vec::with_capacity(markets.len());
    for symbol in markets {
        let Some(ticker) = tickers.get(symbol) else {
            warn!(%symbol, "Skipping market: missing ticker");
            continue;
        };
        if ticker.mid_price <= Decimal::ZERO {
            warn!(%symbol, price = %ticker.mid_price, "Skipping market: invalid price");
            continue;
        }

        let mut snapshot = SymbolSnapshot::new(
            symbol.clone(),
            ticker.mid_price,
            ticker.sz_decimals,
            inventory.get(symbol).copied().unwrap_or(Decimal::ZERO),
        );
        snapshot.change_24h = changes.get(symbol).copied();
        snapshot.notional_liquidity = ticker.day_notional_volume;
        snapshots.push(snapshot);
    }
    snapshots
}
