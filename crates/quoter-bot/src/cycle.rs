//! One full market-making cycle.
//!
//! positions -> inventory -> tickers -> snapshots -> analysis (with
//! fallback) -> per-symbol quotes -> submit or simulate. Per-symbol
//! submission failures are isolated; an analysis failure aborts the cycle
//! because quoting without parameters is never acceptable.

use std::sync::Arc;

use quoter_analysis::{AnalysisError, AnalysisSource};
use quoter_core::{AnalysisResult, OrderRequest, OrderSide, SymbolSnapshot};
use quoter_exchange::{DynChangeFeed, DynExchange, ExchangeError};
use quoter_strategy::{compute_quote, QuoteDecision, SizingConfig};
use tracing::{error, info, warn};

use crate::error::{AppError, AppResult};
use crate::snapshot::{build_inventory_map, build_snapshots};

/// Final counts for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleSummary {
    /// Orders placed (two per quoted symbol; dry-run counts as placed).
    pub orders_placed: u32,
    /// Symbols skipped (zero-size side or failed submission).
    pub symbols_skipped: u32,
    pub dry_run: bool,
}

/// Drives the periodic quoting cycle.
pub struct MarketMaker {
    exchange: DynExchange,
    /// Ordered provider chain: the first entry is the primary, the rest
    /// are fallbacks tried with identical input.
    providers: Vec<Arc<dyn AnalysisSource>>,
    changes: DynChangeFeed,
    sizing: SizingConfig,
    markets: Vec<String>,
}

impl MarketMaker {
    pub fn new(
        exchange: DynExchange,
        providers: Vec<Arc<dyn AnalysisSource>>,
        changes: DynChangeFeed,
        sizing: SizingConfig,
        markets: Vec<String>,
    ) -> Self {
        Self {
            exchange,
            providers,
            changes,
            sizing,
            markets,
        }
    }

    /// Run one full pass. `execute = false` simulates order placement.
    pub async fn run_cycle(&self, execute: bool) -> AppResult<CycleSummary> {
        let dry_run = !execute;
        info!(dry_run, "Starting Avellaneda-Stoikov cycle");

        let positions = self.exchange.positions().await?;
        let inventory = build_inventory_map(&positions);
        let tickers = self.exchange.tickers().await?;
        let changes = self.changes.fetch_24h_changes(&self.markets).await;
        let snapshots = build_snapshots(&self.markets, &tickers, &inventory, &changes);

        if snapshots.is_empty() {
            return Err(AppError::NoSnapshots);
        }

        let analysis = self.fetch_analysis(&snapshots).await?;
        let params = &analysis.parameters;
        let recs = &analysis.strategy_recommendations;

        info!(
            gamma = %params.gamma,
            sigma = %params.sigma,
            kappa = %params.kappa,
            time_horizon = %params.time_horizon,
            "Model parameters"
        );
        info!(
            min_spread = %recs.min_spread,
            max_spread = %recs.max_spread,
            max_position = %recs.max_position,
            risk_level = %analysis.risk_assessment.level,
            "Spread bounds"
        );

        let mut orders_placed = 0u32;
        let mut symbols_skipped = 0u32;

        for snapshot in &snapshots {
            let decision = compute_quote(snapshot, params, recs, &self.sizing, self.markets.len());
            info!(
                symbol = %snapshot.symbol,
                mid = %snapshot.mid_price,
                inventory = %snapshot.inventory,
                bid_spread = %decision.bid_spread,
                ask_spread = %decision.ask_spread,
                bid = %decision.bid_price,
                bid_size = %decision.bid_size,
                ask = %decision.ask_price,
                ask_size = %decision.ask_size,
                "Quote"
            );

            if let Some(reason) = decision.skip_reason {
                warn!(symbol = %snapshot.symbol, %reason, "Skipping symbol");
                symbols_skipped += 1;
                continue;
            }

            if dry_run {
                orders_placed += 2;
                continue;
            }

            match self.submit_quotes(&decision).await {
                Ok(()) => orders_placed += 2,
                Err(err) => {
                    error!(symbol = %snapshot.symbol, error = %err, "Order placement failed");
                    symbols_skipped += 1;
                }
            }
        }

        info!(orders_placed, symbols_skipped, dry_run, "Cycle completed");
        Ok(CycleSummary {
            orders_placed,
            symbols_skipped,
            dry_run,
        })
    }

    async fn submit_quotes(&self, decision: &QuoteDecision) -> Result<(), ExchangeError> {
        let bid = OrderRequest::limit(
            &decision.symbol,
            OrderSide::Buy,
            decision.bid_size,
            decision.bid_price,
        );
        self.exchange.place_order(&bid).await?;

        let ask = OrderRequest::limit(
            &decision.symbol,
            OrderSide::Sell,
            decision.ask_size,
            decision.ask_price,
        );
        self.exchange.place_order(&ask).await?;
        Ok(())
    }

    /// Acquire analysis through the provider chain. Later providers get
    /// identical input; when every provider fails, the first failure is
    /// the one surfaced.
    pub async fn fetch_analysis(&self, snapshots: &[SymbolSnapshot]) -> AppResult<AnalysisResult> {
        let mut first_error: Option<AnalysisError> = None;

        for provider in &self.providers {
            match provider.fetch_analysis(snapshots).await {
                Ok(analysis) => {
                    if first_error.is_some() {
                        info!(provider = provider.name(), "Fallback provider succeeded");
                    }
                    return Ok(analysis);
                }
                Err(err) => {
                    warn!(provider = provider.name(), error = %err, "Analysis provider failed");
                    first_error.get_or_insert(err);
                }
            }
        }

        Err(first_error.map(AppError::Analysis).unwrap_or_else(|| {
            AppError::Config("No analysis providers configured".to_string())
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use quoter_core::{BoxFuture, ModelParameters, RiskAssessment, StrategyRecommendations};
    use quoter_exchange::{ChangeFeed, Exchange, OrderAck, PerpPosition, Ticker};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::{HashMap, HashSet};

    struct StubExchange {
        tickers: HashMap<String, Ticker>,
        positions: Vec<PerpPosition>,
        fail_symbols: HashSet<String>,
        placed: Mutex<Vec<OrderRequest>>,
    }

    impl StubExchange {
        fn new(tickers: HashMap<String, Ticker>, positions: Vec<PerpPosition>) -> Self {
            Self {
                tickers,
                positions,
                fail_symbols: HashSet::new(),
                placed: Mutex::new(Vec::new()),
            }
        }

        fn failing_on(mut self, symbol: &str) -> Self {
            self.fail_symbols.insert(symbol.to_string());
            self
        }
    }

    impl Exchange for StubExchange {
        fn tickers(&self) -> BoxFuture<'_, quoter_exchange::Result<HashMap<String, Ticker>>> {
            let tickers = self.tickers.clone();
            Box::pin(async move { Ok(tickers) })
        }

        fn positions(&self) -> BoxFuture<'_, quoter_exchange::Result<Vec<PerpPosition>>> {
            let positions = self.positions.clone();
            Box::pin(async move { Ok(positions) })
        }

        fn place_order<'a>(
            &'a self,
            request: &'a OrderRequest,
        ) -> BoxFuture<'a, quoter_exchange::Result<OrderAck>> {
            Box::pin(async move {
                if self.fail_symbols.contains(&request.symbol) {
                    return Err(ExchangeError::Api("simulated rejection".to_string()));
                }
                self.placed.lock().push(request.clone());
                Ok(OrderAck {
                    status: "ok".to_string(),
                    response: serde_json::Value::Null,
                })
            })
        }
    }

    struct StubChanges;

    impl ChangeFeed for StubChanges {
        fn fetch_24h_changes<'a>(
            &'a self,
            _symbols: &'a [String],
        ) -> BoxFuture<'a, HashMap<String, Decimal>> {
            Box::pin(async { HashMap::new() })
        }
    }

    struct StubProvider {
        name: &'static str,
        outcome: Result<AnalysisResult, &'static str>,
    }

    impl AnalysisSource for StubProvider {
        fn name(&self) -> &str {
            self.name
        }

        fn fetch_analysis<'a>(
            &'a self,
            _snapshots: &'a [SymbolSnapshot],
        ) -> BoxFuture<'a, Result<AnalysisResult, AnalysisError>> {
            Box::pin(async move {
                match &self.outcome {
                    Ok(analysis) => Ok(analysis.clone()),
                    Err(instance) => Err(AnalysisError::NoResponse(instance.to_string())),
                }
            })
        }
    }

    fn analysis() -> AnalysisResult {
        AnalysisResult {
            market_analysis: serde_json::Value::Null,
            parameters: ModelParameters {
                gamma: dec!(0.2),
                kappa: dec!(1.5),
                sigma: dec!(0.3),
                time_horizon: dec!(60),
                target_inventory: Decimal::ZERO,
                inventory_risk_weight: dec!(0.2),
            },
            risk_assessment: RiskAssessment {
                level: "LOW".to_string(),
                factors: Vec::new(),
            },
            strategy_recommendations: StrategyRecommendations {
                min_spread: dec!(0.001),
                max_spread: dec!(0.05),
                max_position: dec!(5),
                notes: String::new(),
            },
            reasoning: String::new(),
        }
    }

    fn ticker(mid: Decimal) -> Ticker {
        Ticker {
            mid_price: mid,
            sz_decimals: 4,
            day_notional_volume: None,
        }
    }

    fn two_market_tickers() -> HashMap<String, Ticker> {
        let mut tickers = HashMap::new();
        tickers.insert("FOO-PERP".to_string(), ticker(dec!(100)));
        tickers.insert("BAR-PERP".to_string(), ticker(dec!(50)));
        tickers
    }

    fn markets() -> Vec<String> {
        vec!["FOO-PERP".to_string(), "BAR-PERP".to_string()]
    }

    fn maker(
        exchange: Arc<StubExchange>,
        providers: Vec<Arc<dyn AnalysisSource>>,
    ) -> MarketMaker {
        MarketMaker::new(
            exchange,
            providers,
            Arc::new(StubChanges),
            SizingConfig {
                portfolio_value: dec!(997.5),
                min_order_value: dec!(10),
            },
            markets(),
        )
    }

    #[tokio::test]
    async fn test_dry_run_counts_without_submitting() {
        let exchange = Arc::new(StubExchange::new(two_market_tickers(), Vec::new()));
        let maker = maker(
            exchange.clone(),
            vec![Arc::new(StubProvider {
                name: "primary",
                outcome: Ok(analysis()),
            })],
        );

        let summary = maker.run_cycle(false).await.unwrap();

        assert_eq!(summary.orders_placed, 4);
        assert_eq!(summary.symbols_skipped, 0);
        assert!(summary.dry_run);
        assert!(exchange.placed.lock().is_empty());
    }

    #[tokio::test]
    async fn test_execute_submits_in_configured_order() {
        let exchange = Arc::new(StubExchange::new(two_market_tickers(), Vec::new()));
        let maker = maker(
            exchange.clone(),
            vec![Arc::new(StubProvider {
                name: "primary",
                outcome: Ok(analysis()),
            })],
        );

        let summary = maker.run_cycle(true).await.unwrap();
        assert_eq!(summary.orders_placed, 4);

        let placed = exchange.placed.lock();
        let symbols: Vec<_> = placed.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, ["FOO-PERP", "FOO-PERP", "BAR-PERP", "BAR-PERP"]);
        assert_eq!(placed[0].side, OrderSide::Buy);
        assert_eq!(placed[1].side, OrderSide::Sell);
    }

    #[tokio::test]
    async fn test_per_symbol_failure_does_not_abort_cycle() {
        let exchange =
            Arc::new(StubExchange::new(two_market_tickers(), Vec::new()).failing_on("FOO-PERP"));
        let maker = maker(
            exchange.clone(),
            vec![Arc::new(StubProvider {
                name: "primary",
                outcome: Ok(analysis()),
            })],
        );

        let summary = maker.run_cycle(true).await.unwrap();

        assert_eq!(summary.orders_placed, 2);
        assert_eq!(summary.symbols_skipped, 1);
        assert!(exchange.placed.lock().iter().all(|r| r.symbol == "BAR-PERP"));
    }

    #[tokio::test]
    async fn test_empty_snapshots_fail_fast() {
        let exchange = Arc::new(StubExchange::new(HashMap::new(), Vec::new()));
        let maker = maker(
            exchange,
            vec![Arc::new(StubProvider {
                name: "primary",
                outcome: Ok(analysis()),
            })],
        );

        let result = maker.run_cycle(false).await;
        assert!(matches!(result, Err(AppError::NoSnapshots)));
    }

    #[tokio::test]
    async fn test_fallback_provider_rescues_cycle() {
        let exchange = Arc::new(StubExchange::new(two_market_tickers(), Vec::new()));
        let maker = maker(
            exchange,
            vec![
                Arc::new(StubProvider {
                    name: "primary",
                    outcome: Err("inst-primary"),
                }),
                Arc::new(StubProvider {
                    name: "fallback",
                    outcome: Ok(analysis()),
                }),
            ],
        );

        let summary = maker.run_cycle(false).await.unwrap();
        assert_eq!(summary.orders_placed, 4);
    }

    #[tokio::test]
    async fn test_both_providers_failing_surfaces_primary_error() {
        let exchange = Arc::new(StubExchange::new(two_market_tickers(), Vec::new()));
        let maker = maker(
            exchange,
            vec![
                Arc::new(StubProvider {
                    name: "primary",
                    outcome: Err("inst-primary"),
                }),
                Arc::new(StubProvider {
                    name: "fallback",
                    outcome: Err("inst-fallback"),
                }),
            ],
        );

        let result = maker.run_cycle(false).await;
        match result {
            Err(AppError::Analysis(AnalysisError::NoResponse(instance))) => {
                assert_eq!(instance, "inst-primary");
            }
            other => panic!("expected primary analysis error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_inventory_flows_into_snapshots() {
        // A short position dampens the ask side; sizes reflect it.
        let positions = vec![PerpPosition {
            symbol: "FOO-PERP".to_string(),
            signed_size: dec!(-2.5),
        }];
        let exchange = Arc::new(StubExchange::new(two_market_tickers(), positions));
        let maker = maker(
            exchange.clone(),
            vec![Arc::new(StubProvider {
                name: "primary",
                outcome: Ok(analysis()),
            })],
        );

        maker.run_cycle(true).await.unwrap();

        let placed = exchange.placed.lock();
        let foo_ask = placed
            .iter()
            .find(|r| r.symbol == "FOO-PERP" && r.side == OrderSide::Sell)
            .unwrap();
        let foo_bid = placed
            .iter()
            .find(|r| r.symbol == "FOO-PERP" && r.side == OrderSide::Buy)
            .unwrap();
        assert!(foo_ask.quantity < foo_bid.quantity);
    }
}
