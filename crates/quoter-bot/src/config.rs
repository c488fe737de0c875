//! Application configuration.

use crate::error::{AppError, AppResult};
use quoter_analysis::AgentMarketConfig;
use quoter_exchange::ExchangeConfig;
use quoter_strategy::SizingConfig;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration.
///
/// Secrets (the agent.market API key and the trading key) are injected
/// from the environment at startup, never stored here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Markets to quote, in processing order.
    #[serde(default = "default_markets")]
    pub markets: Vec<String>,

    /// Slippage fraction for reduce-only flatten orders.
    #[serde(default = "default_flatten_slippage")]
    pub flatten_slippage: Decimal,

    /// Capital and minimum-order settings.
    #[serde(default)]
    pub sizing: SizingConfig,

    /// Exchange connection.
    #[serde(default)]
    pub exchange: ExchangeConfig,

    /// agent.market connection.
    #[serde(default)]
    pub agent_market: AgentMarketConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            markets: default_markets(),
            flatten_slippage: default_flatten_slippage(),
            sizing: SizingConfig::default(),
            exchange: ExchangeConfig::default(),
            agent_market: AgentMarketConfig::default(),
        }
    }
}

fn default_markets() -> Vec<String> {
    ["BTC-PERP", "ETH-PERP", "SOL-PERP"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_flatten_slippage() -> Decimal {
    Decimal::new(2, 2) // 0.02
}

impl AppConfig {
    /// Load from `path`, falling back to built-in defaults when the file
    /// does not exist.
    pub fn load(path: &str) -> AppResult<Self> {
        if Path::new(path).exists() {
            Self::from_file(path)
        } else {
            tracing::warn!(%path, "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        toml::from_str(&content).map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.markets, vec!["BTC-PERP", "ETH-PERP", "SOL-PERP"]);
        assert_eq!(config.flatten_slippage, dec!(0.02));
        assert_eq!(config.exchange.network, "mainnet");
    }

    #[test]
    fn test_partial_toml_overrides() {
        let toml_str = r#"
markets = ["ARB-PERP"]

[sizing]
portfolio_value = 2500

[exchange]
network = "testnet"

[agent_market]
max_polls = 6
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.markets, vec!["ARB-PERP"]);
        assert_eq!(config.sizing.portfolio_value, dec!(2500));
        assert_eq!(config.sizing.min_order_value, dec!(10));
        assert_eq!(config.exchange.network, "testnet");
        assert_eq!(config.agent_market.max_polls, 6);
        assert_eq!(config.flatten_slippage, dec!(0.02));
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let config = AppConfig::default();
        let serialized = toml::to_string(&config).unwrap();
        let back: AppConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(back.markets, config.markets);
    }
}
