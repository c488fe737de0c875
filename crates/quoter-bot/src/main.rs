//! Avellaneda-Stoikov perp quoter - entry point.
//!
//! One invocation runs one cycle (or one flatten pass). Scheduling repeated
//! runs is left to the operator; `--continuous` only warns.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{info, warn};

use quoter_analysis::{AgentMarketClient, AgentMarketProvider, AnalysisSource};
use quoter_bot::{close_all_positions, AppConfig, MarketMaker};
use quoter_exchange::{CoingeckoClient, DynExchange, HyperliquidClient, TradingKey};

/// Analysis parameter source. Both modes resolve to agent.market; the
/// HTTP-only fallback mode of earlier revisions no longer exists, so any
/// other value is rejected at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ProviderMode {
    Auto,
    Agent,
}

/// Hyperliquid Avellaneda-Stoikov quoter
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via QUOTER_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,

    /// Submit live orders instead of dry run
    #[arg(long)]
    execute: bool,

    /// Only flatten positions
    #[arg(long)]
    close_only: bool,

    /// How Avellaneda parameters are generated (agent.market required)
    #[arg(long, value_enum, default_value = "auto")]
    analysis_provider: ProviderMode,

    /// Run repeatedly (not yet implemented)
    #[arg(long)]
    continuous: bool,

    /// Minutes between cycles in continuous mode
    #[arg(long, default_value_t = 5)]
    interval: u64,
}

fn build_providers(mode: ProviderMode, config: &AppConfig) -> Result<Vec<Arc<dyn AnalysisSource>>> {
    // auto and agent are the same thing today; the match documents that an
    // extension point exists, not a dead branch.
    match mode {
        ProviderMode::Auto | ProviderMode::Agent => {}
    }

    let api_key = std::env::var("AGENT_MARKET_API_KEY").unwrap_or_default();
    let client = AgentMarketClient::new(api_key, config.agent_market.clone())
        .context("AGENT_MARKET_API_KEY must be set to run the Avellaneda analysis")?;
    Ok(vec![Arc::new(AgentMarketProvider::new(client))])
}

#[tokio::main]
async fn main() -> Result<()> {
    quoter_bot::logging::init_logging();

    let args = Args::parse();

    let config_path = args
        .config
        .or_else(|| std::env::var("QUOTER_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());
    info!(config_path = %config_path, "Loading configuration");
    let config = AppConfig::load(&config_path)?;

    let trading_key = match std::env::var("QUOTER_TRADING_KEY") {
        Ok(key) if !key.trim().is_empty() => {
            Some(TradingKey::from_hex(&key).context("Invalid QUOTER_TRADING_KEY")?)
        }
        _ => None,
    };
    if args.execute && trading_key.is_none() {
        anyhow::bail!("QUOTER_TRADING_KEY must be set to submit live orders");
    }

    let exchange: DynExchange = Arc::new(HyperliquidClient::new(
        config.exchange.clone(),
        trading_key,
    )?);
    let providers = build_providers(args.analysis_provider, &config)?;

    info!(
        markets = ?config.markets,
        network = %config.exchange.network,
        execute = args.execute,
        "Starting quoter-bot v{}",
        env!("CARGO_PKG_VERSION")
    );

    if args.close_only {
        let report = close_all_positions(&exchange, config.flatten_slippage, args.execute).await?;
        info!(result = %serde_json::to_string_pretty(&report)?, "Close result");
    } else {
        let maker = MarketMaker::new(
            exchange,
            providers,
            Arc::new(CoingeckoClient::new()),
            config.sizing.clone(),
            config.markets.clone(),
        );
        maker.run_cycle(args.execute).await?;
    }

    if args.continuous {
        warn!(interval_minutes = args.interval, "Continuous mode not implemented; rerun manually for now");
    }

    Ok(())
}
