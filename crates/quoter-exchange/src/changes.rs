//! Batched 24h price-change lookup via Coingecko.
//!
//! Best-effort: the quoting cycle runs fine without this data, so every
//! failure degrades to an empty map with a warning.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use quoter_core::BoxFuture;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::warn;

const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Symbol -> Coingecko id for the markets this system knows about.
const COINGECKO_IDS: &[(&str, &str)] = &[
    ("BTC-PERP", "bitcoin"),
    ("ETH-PERP", "ethereum"),
    ("SOL-PERP", "solana"),
    ("ARB-PERP", "arbitrum"),
    ("AVAX-PERP", "avalanche-2"),
    ("OP-PERP", "optimism"),
];

fn coingecko_id(symbol: &str) -> Option<&'static str> {
    COINGECKO_IDS
        .iter()
        .find(|(s, _)| *s == symbol)
        .map(|(_, id)| *id)
}

#[derive(Debug, Deserialize)]
struct SimplePriceEntry {
    #[serde(default)]
    usd_24h_change: Option<f64>,
}

/// Batched 24h-change lookup seam.
pub trait ChangeFeed: Send + Sync {
    /// 24h change in percent per symbol; best-effort, never fails.
    fn fetch_24h_changes<'a>(
        &'a self,
        symbols: &'a [String],
    ) -> BoxFuture<'a, HashMap<String, Decimal>>;
}

/// Arc wrapper for `ChangeFeed` trait objects.
pub type DynChangeFeed = Arc<dyn ChangeFeed>;

impl ChangeFeed for CoingeckoClient {
    fn fetch_24h_changes<'a>(
        &'a self,
        symbols: &'a [String],
    ) -> BoxFuture<'a, HashMap<String, Decimal>> {
        Box::pin(self.fetch_24h_changes(symbols))
    }
}

/// Client for the Coingecko simple-price endpoint.
pub struct CoingeckoClient {
    client: reqwest::Client,
    base_url: String,
}

impl Default for CoingeckoClient {
    fn default() -> Self {
        Self::new()
    }
}

impl CoingeckoClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// 24h change in percent per symbol. Symbols without a known id and
    /// any transport or decode failure simply produce no entry.
    pub async fn fetch_24h_changes(&self, symbols: &[String]) -> HashMap<String, Decimal> {
        let ids: BTreeSet<&str> = symbols
            .iter()
            .filter_map(|symbol| coingecko_id(symbol))
            .collect();
        if ids.is_empty() {
            return HashMap::new();
        }

        let joined = ids.into_iter().collect::<Vec<_>>().join(",");
        let url = format!("{}/simple/price", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("ids", joined.as_str()),
                ("vs_currencies", "usd"),
                ("include_24hr_change", "true"),
            ])
            .send()
            .await;

        let data: HashMap<String, SimplePriceEntry> = match response {
            Ok(resp) if resp.status().is_success() => match resp.json().await {
                Ok(data) => data,
                Err(error) => {
                    warn!(%error, "Failed to decode Coingecko response");
                    return HashMap::new();
                }
            },
            Ok(resp) => {
                warn!(status = %resp.status(), "Coingecko request rejected");
                return HashMap::new();
            }
            Err(error) => {
                warn!(%error, "Failed to fetch Coingecko changes");
                return HashMap::new();
            }
        };

        merge_changes(symbols, &data)
    }
}

fn merge_changes(
    symbols: &[String],
    data: &HashMap<String, SimplePriceEntry>,
) -> HashMap<String, Decimal> {
    let mut output = HashMap::new();
    for symbol in symbols {
        let Some(id) = coingecko_id(symbol) else {
            continue;
        };
        let Some(change) = data.get(id).and_then(|entry| entry.usd_24h_change) else {
            continue;
        };
        if let Some(change) = Decimal::from_f64_retain(change) {
            output.insert(symbol.clone(), change);
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_known_id_mapping() {
        assert_eq!(coingecko_id("BTC-PERP"), Some("bitcoin"));
        assert_eq!(coingecko_id("DOGE-PERP"), None);
    }

    #[test]
    fn test_merge_keys_by_configured_symbol() {
        let body = r#"{
            "bitcoin": {"usd": 65000.0, "usd_24h_change": 1.5},
            "ethereum": {"usd": 3200.0}
        }"#;
        let data: HashMap<String, SimplePriceEntry> = serde_json::from_str(body).unwrap();
        let merged = merge_changes(&symbols(&["BTC-PERP", "ETH-PERP", "DOGE-PERP"]), &data);

        assert_eq!(merged.len(), 1);
        assert!(merged.contains_key("BTC-PERP"));
        // No change field and no known id respectively: absent, not zeroed.
        assert!(!merged.contains_key("ETH-PERP"));
        assert!(!merged.contains_key("DOGE-PERP"));
    }
}
