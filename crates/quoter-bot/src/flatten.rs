//! Position flattening.
//!
//! Computes reduce-only IOC closing orders for every open position,
//! independent of the quoting cycle. The limit price is mid adjusted by a
//! slippage fraction in the direction that guarantees a fill.

use quoter_core::{OrderRequest, OrderSide};
use quoter_exchange::DynExchange;
use quoter_strategy::round_price;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::AppResult;

/// Outcome of one closing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlattenStatus {
    /// No usable price; nothing was attempted.
    Skipped,
    DryRun,
    Submitted,
    Error,
}

/// One entry of the flatten report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlattenOrder {
    pub symbol: String,
    pub side: OrderSide,
    /// Absolute size being closed.
    pub size: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_price: Option<Decimal>,
    pub status: FlattenStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Per-order outcomes for one flatten pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlattenReport {
    pub orders: Vec<FlattenOrder>,
}

impl FlattenReport {
    pub fn submitted(&self) -> usize {
        self.orders
            .iter()
            .filter(|o| o.status == FlattenStatus::Submitted)
            .count()
    }
}

/// Closing side and tier-rounded limit price for a position.
///
/// Against a long, sell below mid; against a short, buy above mid.
fn closing_order(signed_size: Decimal, mid: Decimal, slippage: Decimal) -> (OrderSide, Decimal) {
    if signed_size < Decimal::ZERO {
        (OrderSide::Buy, round_price(mid * (Decimal::ONE + slippage)))
    } else {
        (OrderSide::Sell, round_price(mid * (Decimal::ONE - slippage)))
    }
}

/// Flatten every open position with a nonzero signed quantity.
pub async fn close_all_positions(
    exchange: &DynExchange,
    slippage: Decimal,
    execute: bool,
) -> AppResult<FlattenReport> {
    let dry_run = !execute;
    info!(dry_run, %slippage, "Closing all positions");

    let positions: Vec<_> = exchange
        .positions()
        .await?
        .into_iter()
        .filter(|p| !p.signed_size.is_zero())
        .collect();

    if positions.is_empty() {
        info!("No open positions to close");
        return Ok(FlattenReport::default());
    }

    let tickers = exchange.tickers().await?;
    let mut report = FlattenReport::default();

    for position in positions {
        let size = position.signed_size.abs();
        let mid = tickers
            .get(&position.symbol)
            .map(|t| t.mid_price)
            .filter(|p| *p > Decimal::ZERO);

        let Some(mid) = mid else {
            warn!(symbol = %position.symbol, "Skipping close: no usable price");
            report.orders.push(FlattenOrder {
                symbol: position.symbol.clone(),
                side: if position.signed_size < Decimal::ZERO {
                    OrderSide::Buy
                } else {
                    OrderSide::Sell
                },
                size,
                limit_price: None,
                status: FlattenStatus::Skipped,
                error: None,
            });
            continue;
        };

        let (side, limit_price) = closing_order(position.signed_size, mid, slippage);

        if dry_run {
            report.orders.push(FlattenOrder {
                symbol: position.symbol.clone(),
                side,
                size,
                limit_price: Some(limit_price),
                status: FlattenStatus::DryRun,
                error: None,
            });
            continue;
        }

        let request = OrderRequest::reduce_only_ioc(&position.symbol, side, size, limit_price);
        let (status, error) = match exchange.place_order(&request).await {
            Ok(_) => (FlattenStatus::Submitted, None),
            Err(err) => {
                warn!(symbol = %position.symbol, error = %err, "Close order failed");
                (FlattenStatus::Error, Some(err.to_string()))
            }
        };
        report.orders.push(FlattenOrder {
            symbol: position.symbol.clone(),
            side,
            size,
            limit_price: Some(limit_price),
            status,
            error,
        });
    }

    info!(
        orders = report.orders.len(),
        submitted = report.submitted(),
        dry_run,
        "Close pass finished"
    );
    Ok(report)
}
