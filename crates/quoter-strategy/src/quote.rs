//! Quote price and size calculation.
//!
//! Implements the Avellaneda-Stoikov-style quoting rule:
//! - base spread from gamma, sigma and the time horizon
//! - inventory skew shifting bids and asks apart as inventory builds
//! - clamping into the provider's recommended spread band
//! - capital- and inventory-limited sizing per side

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use quoter_core::{ModelParameters, OrderSide, StrategyRecommendations, SymbolSnapshot};

use crate::config::SizingConfig;
use crate::rounding::{round_price, round_size};

/// Why a symbol produced no orders this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The recommended max position is zero or negative.
    NoPositionCapacity,
    /// One side's rounded quantity fell below the minimum order value.
    BelowMinimumValue,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoPositionCapacity => write!(f, "no position capacity"),
            Self::BelowMinimumValue => write!(f, "below minimum order value"),
        }
    }
}

/// Per-symbol output of the calculator. Derived purely from the analysis
/// result and the snapshot; no hidden state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteDecision {
    pub symbol: String,
    /// Clamped fractional spreads.
    pub bid_spread: Decimal,
    pub ask_spread: Decimal,
    /// Tier-rounded quote prices.
    pub bid_price: Decimal,
    pub ask_price: Decimal,
    /// Rounded sizes; zero means the side quotes nothing.
    pub bid_size: Decimal,
    pub ask_size: Decimal,
    pub skip_reason: Option<SkipReason>,
}

impl QuoteDecision {
    /// Both sides carry size, so the symbol gets a bid and an ask.
    pub fn is_quotable(&self) -> bool {
        self.skip_reason.is_none()
    }
}

/// Raw (unclamped) bid/ask spreads.
///
/// base = gamma * sigma^2 * (timeHorizon / 60); the skew term widens the
/// side that would add to the held position and narrows the other.
pub fn calculate_spreads(
    params: &ModelParameters,
    inventory: Decimal,
    max_inventory: Decimal,
) -> (Decimal, Decimal) {
    let horizon_hours = params.time_horizon / dec!(60);
    let base_spread = params.gamma * params.sigma * params.sigma * horizon_hours;

    let inventory_ratio = if max_inventory.is_zero() {
        Decimal::ZERO
    } else {
        inventory / max_inventory
    };
    let inventory_skew = params.inventory_risk_weight * inventory_ratio;

    (base_spread - inventory_skew, base_spread + inventory_skew)
}

/// Compute the full quote decision for one symbol.
pub fn compute_quote(
    snapshot: &SymbolSnapshot,
    params: &ModelParameters,
    recs: &StrategyRecommendations,
    sizing: &SizingConfig,
    market_count: usize,
) -> QuoteDecision {
    let (raw_bid, raw_ask) = calculate_spreads(params, snapshot.inventory, recs.max_position);
    let bid_spread = raw_bid.max(recs.min_spread).min(recs.max_spread);
    let ask_spread = raw_ask.max(recs.min_spread).min(recs.max_spread);

    let bid_price = round_price(snapshot.mid_price * (Decimal::ONE - bid_spread));
    let ask_price = round_price(snapshot.mid_price * (Decimal::ONE + ask_spread));

    if recs.max_position <= Decimal::ZERO {
        return QuoteDecision {
            symbol: snapshot.symbol.clone(),
            bid_spread,
            ask_spread,
            bid_price,
            ask_price,
            bid_size: Decimal::ZERO,
            ask_size: Decimal::ZERO,
            skip_reason: Some(SkipReason::NoPositionCapacity),
        };
    }

    let bid_size = side_size(snapshot, recs, sizing, market_count, OrderSide::Buy);
    let ask_size = side_size(snapshot, recs, sizing, market_count, OrderSide::Sell);

    let skip_reason = if bid_size.is_zero() || ask_size.is_zero() {
        Some(SkipReason::BelowMinimumValue)
    } else {
        None
    };

    QuoteDecision {
        symbol: snapshot.symbol.clone(),
        bid_spread,
        ask_spread,
        bid_price,
        ask_price,
        bid_size,
        ask_size,
        skip_reason,
    }
}

/// Size for one side, rounded to the market's size decimals.
///
/// Capital per market is the portfolio split evenly across configured
/// symbols; at most half of it is quoted as notional per side. The
/// dampening factor max(0.3, 1 - |inventory| / maxPosition) applies only
/// to the side that would grow the held direction.
fn side_size(
    snapshot: &SymbolSnapshot,
    recs: &StrategyRecommendations,
    sizing: &SizingConfig,
    market_count: usize,
    side: OrderSide,
) -> Decimal {
    let price = snapshot.mid_price;
    let markets = Decimal::from(market_count.max(1) as u64);
    let capital_per_market = sizing.portfolio_value / markets;
    let max_notional = capital_per_market * dec!(0.5);
    let max_quantity = (max_notional / price).min(recs.max_position);

    let inventory = snapshot.inventory;
    let grows_position = match side {
        OrderSide::Buy => inventory > Decimal::ZERO,
        OrderSide::Sell => inventory < Decimal::ZERO,
    };
    let inventory_factor = if grows_position {
        (Decimal::ONE - inventory.abs() / recs.max_position).max(dec!(0.3))
    } else {
        Decimal::ONE
    };

    let quantity = round_size(max_quantity * inventory_factor, snapshot.size_decimals);
    if quantity * price < sizing.min_order_value {
        return Decimal::ZERO;
    }
    quantity
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> ModelParameters {
        ModelParameters {
            gamma: dec!(0.2),
            kappa: dec!(1.5),
            sigma: dec!(0.3),
            time_horizon: dec!(60),
            target_inventory: Decimal::ZERO,
            inventory_risk_weight: dec!(0.2),
        }
    }

    fn recs() -> StrategyRecommendations {
        StrategyRecommendations {
            min_spread: dec!(0.001),
            max_spread: dec!(0.05),
            max_position: dec!(5),
            notes: String::new(),
        }
    }

    fn sizing() -> SizingConfig {
        SizingConfig {
            portfolio_value: dec!(997.5),
            min_order_value: dec!(10),
        }
    }

    fn snapshot(mid: Decimal, inventory: Decimal) -> SymbolSnapshot {
        SymbolSnapshot::new("BTC-PERP", mid, 4, inventory)
    }

    #[test]
    fn test_flat_inventory_reference_quote() {
        // base spread = 0.2 * 0.09 * 1 = 0.018, inside [0.001, 0.05]
        let decision = compute_quote(&snapshot(dec!(100), dec!(0)), &params(), &recs(), &sizing(), 3);
        assert_eq!(decision.bid_spread, dec!(0.018));
        assert_eq!(decision.ask_spread, dec!(0.018));
        assert_eq!(decision.bid_price, dec!(98.20));
        assert_eq!(decision.ask_price, dec!(101.80));
        assert!(decision.is_quotable());
    }

    #[test]
    fn test_spreads_always_within_bounds() {
        let p = params();
        let r = recs();
        for inventory in [dec!(-50), dec!(-5), dec!(-0.5), dec!(0), dec!(0.5), dec!(5), dec!(50)] {
            let decision = compute_quote(&snapshot(dec!(100), inventory), &p, &r, &sizing(), 3);
            assert!(decision.bid_spread >= r.min_spread && decision.bid_spread <= r.max_spread);
            assert!(decision.ask_spread >= r.min_spread && decision.ask_spread <= r.max_spread);
        }
    }

    #[test]
    fn test_skew_monotonic_in_inventory() {
        let p = params();
        // Long inventory widens the ask, narrows the bid (raw spreads).
        let (bid_flat, ask_flat) = calculate_spreads(&p, dec!(0), dec!(5));
        let (bid_long, ask_long) = calculate_spreads(&p, dec!(2.5), dec!(5));
        let (bid_longer, ask_longer) = calculate_spreads(&p, dec!(5), dec!(5));
        assert!(bid_long < bid_flat && bid_longer < bid_long);
        assert!(ask_long > ask_flat && ask_longer > ask_long);

        // Symmetric for shorts.
        let (bid_short, ask_short) = calculate_spreads(&p, dec!(-2.5), dec!(5));
        assert!(bid_short > bid_flat);
        assert!(ask_short < ask_flat);
    }

    #[test]
    fn test_zero_max_inventory_means_no_skew() {
        let (bid, ask) = calculate_spreads(&params(), dec!(3), Decimal::ZERO);
        assert_eq!(bid, ask);
    }

    #[test]
    fn test_dampening_applies_to_growing_side_only() {
        // Long 2.5 of max 5: bid side dampened by max(0.3, 1 - 0.5) = 0.5.
        let long = compute_quote(&snapshot(dec!(10), dec!(2.5)), &params(), &recs(), &sizing(), 3);
        // capital/market = 332.5, max notional 166.25, qty by capital = 16.625,
        // capped at max_position 5. Bid: 5 * 0.5 = 2.5; ask: 5.
        assert_eq!(long.bid_size, dec!(2.5));
        assert_eq!(long.ask_size, dec!(5));

        let short = compute_quote(&snapshot(dec!(10), dec!(-2.5)), &params(), &recs(), &sizing(), 3);
        assert_eq!(short.bid_size, dec!(5));
        assert_eq!(short.ask_size, dec!(2.5));
    }

    #[test]
    fn test_dampening_floor() {
        // |inventory| = max position: factor bottoms out at 0.3, not 0.
        let decision = compute_quote(&snapshot(dec!(10), dec!(5)), &params(), &recs(), &sizing(), 3);
        assert_eq!(decision.bid_size, dec!(1.5));
    }

    #[test]
    fn test_below_minimum_value_side_skips_symbol() {
        // qty by capital = 166.25 / 20000 ~= 0.0083, notional ~166 is fine,
        // but with a tiny max position the notional drops under 10 USD.
        let tight = StrategyRecommendations {
            max_position: dec!(0.0004),
            ..recs()
        };
        let decision = compute_quote(&snapshot(dec!(20000), dec!(0)), &params(), &tight, &sizing(), 3);
        assert_eq!(decision.bid_size, Decimal::ZERO);
        assert_eq!(decision.ask_size, Decimal::ZERO);
        assert_eq!(decision.skip_reason, Some(SkipReason::BelowMinimumValue));
        assert!(!decision.is_quotable());
    }

    #[test]
    fn test_zero_max_position_skips() {
        let capped = StrategyRecommendations {
            max_position: Decimal::ZERO,
            ..recs()
        };
        let decision = compute_quote(&snapshot(dec!(100), dec!(0)), &params(), &capped, &sizing(), 3);
        assert_eq!(decision.skip_reason, Some(SkipReason::NoPositionCapacity));
        assert_eq!(decision.bid_size, Decimal::ZERO);
        assert_eq!(decision.ask_size, Decimal::ZERO);
    }

    #[test]
    fn test_extreme_skew_clamps_to_band_edges() {
        // Inventory ratio 10 with weight 0.2 swings spreads by 2.0 either way.
        let decision = compute_quote(&snapshot(dec!(100), dec!(50)), &params(), &recs(), &sizing(), 3);
        assert_eq!(decision.bid_spread, dec!(0.001));
        assert_eq!(decision.ask_spread, dec!(0.05));
    }

    #[test]
    fn test_quantity_rounds_to_size_decimals() {
        // capital/market = 997.5, max notional 498.75 at price 3: 166.25 raw,
        // capped at 100; size decimals 0 keeps it integral.
        let wide = StrategyRecommendations {
            max_position: dec!(100),
            ..recs()
        };
        let mut snap = snapshot(dec!(3), dec!(0));
        snap.size_decimals = 0;
        let decision = compute_quote(&snap, &params(), &wide, &sizing(), 1);
        assert_eq!(decision.bid_size, dec!(100));
        assert_eq!(decision.ask_size.scale(), 0);
    }
}
