//! REST client for the Hyperliquid API.
//!
//! Reads use the public `/info` endpoint (`metaAndAssetCtxs` for tickers
//! and asset indices, `clearinghouseState` for positions). Writes sign an
//! order action and POST it to `/exchange`.

use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use parking_lot::RwLock;
use quoter_core::{BoxFuture, ClientOrderId, OrderRequest, OrderSide, OrderType};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::api::{Exchange, OrderAck, PerpPosition, Ticker};
use crate::error::{ExchangeError, Result};
use crate::signer::{Action, OrderTypeWire, OrderWire, TradingKey};

const MAINNET_API_URL: &str = "https://api.hyperliquid.xyz";
const TESTNET_API_URL: &str = "https://api.hyperliquid-testnet.xyz";

/// Exchange connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeConfig {
    /// "mainnet" or "testnet"; anything else is a configuration error.
    #[serde(default = "default_network")]
    pub network: String,

    /// Explicit API base URL override.
    #[serde(default)]
    pub api_base: Option<String>,

    /// Account address. Derived from the trading key when absent.
    #[serde(default)]
    pub wallet_address: Option<String>,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            network: default_network(),
            api_base: None,
            wallet_address: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_network() -> String {
    "mainnet".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// `BTC` or `dex:BTC` -> `BTC-PERP`.
fn coin_to_symbol(coin: &str) -> String {
    let base = coin.rsplit(':').next().unwrap_or(coin);
    format!("{base}-PERP")
}

#[derive(Debug, Serialize)]
struct InfoRequest {
    #[serde(rename = "type")]
    request_type: &'static str,
}

#[derive(Debug, Serialize)]
struct UserInfoRequest {
    #[serde(rename = "type")]
    request_type: &'static str,
    user: String,
}

#[derive(Debug, Deserialize)]
struct MetaResponse {
    universe: Vec<UniverseEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UniverseEntry {
    name: String,
    #[serde(default)]
    sz_decimals: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssetCtxRaw {
    #[serde(default)]
    mid_px: Option<String>,
    #[serde(default)]
    mark_px: Option<String>,
    #[serde(default)]
    day_ntl_vlm: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClearinghouseState {
    #[serde(default)]
    asset_positions: Vec<AssetPositionRaw>,
}

#[derive(Debug, Deserialize)]
struct AssetPositionRaw {
    #[serde(default)]
    position: Option<PositionRaw>,
}

#[derive(Debug, Deserialize)]
struct PositionRaw {
    #[serde(default)]
    coin: Option<String>,
    #[serde(default)]
    szi: Option<String>,
}

#[derive(Debug, Serialize)]
struct ExchangeRequest<'a> {
    action: &'a Action,
    nonce: u64,
    signature: &'a crate::signer::ActionSignature,
}

/// Per-asset metadata cached from `metaAndAssetCtxs`, keyed by symbol.
#[derive(Debug, Clone, Copy)]
struct AssetEntry {
    index: u32,
    #[allow(dead_code)]
    sz_decimals: u32,
}

/// Client for the Hyperliquid REST API.
///
/// A client without a trading key serves reads; writes raise a
/// configuration error.
pub struct HyperliquidClient {
    client: reqwest::Client,
    info_url: String,
    exchange_url: String,
    wallet_address: String,
    trading_key: Option<TradingKey>,
    is_mainnet: bool,
    assets: RwLock<HashMap<String, AssetEntry>>,
}

impl HyperliquidClient {
    /// Create a new client.
    ///
    /// # Errors
    /// `Config` on an unsupported network or when neither a wallet address
    /// nor a trading key is provided.
    pub fn new(config: ExchangeConfig, trading_key: Option<TradingKey>) -> Result<Self> {
        let network = config.network.trim().to_lowercase();
        if network != "mainnet" && network != "testnet" {
            return Err(ExchangeError::Config(format!(
                "Unsupported network '{}' (expected mainnet or testnet)",
                config.network
            )));
        }
        let base_url = match config.api_base.as_deref() {
            Some(base) => base.trim_end_matches('/').to_string(),
            None if network == "mainnet" => MAINNET_API_URL.to_string(),
            None => TESTNET_API_URL.to_string(),
        };

        let wallet_address = match config
            .wallet_address
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            Some(addr) => addr.to_string(),
            None => match &trading_key {
                Some(key) => key.address().to_string(),
                None => {
                    return Err(ExchangeError::Config(
                        "wallet_address must be set when no trading key is configured".to_string(),
                    ))
                }
            },
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ExchangeError::Transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            info_url: format!("{base_url}/info"),
            exchange_url: format!("{base_url}/exchange"),
            wallet_address,
            trading_key,
            is_mainnet: network == "mainnet",
            assets: RwLock::new(HashMap::new()),
        })
    }

    /// Whether this client can submit orders.
    pub fn can_trade(&self) -> bool {
        self.trading_key.is_some()
    }

    async fn post_info<T: serde::de::DeserializeOwned>(&self, body: &impl Serialize) -> Result<T> {
        let response = self
            .client
            .post(&self.info_url)
            .json(body)
            .send()
            .await
            .map_err(|e| ExchangeError::Transport(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExchangeError::Transport(format!("HTTP {status}: {body}")));
        }

        response
            .json()
            .await
            .map_err(|e| ExchangeError::Api(format!("Failed to parse response: {e}")))
    }

    async fn fetch_tickers(&self) -> Result<HashMap<String, Ticker>> {
        let (meta, ctxs): (MetaResponse, Vec<AssetCtxRaw>) = self
            .post_info(&InfoRequest {
                request_type: "metaAndAssetCtxs",
            })
            .await?;

        let (tickers, assets) = parse_tickers(meta, ctxs);
        debug!(markets = tickers.len(), "Fetched tickers");
        *self.assets.write() = assets;
        Ok(tickers)
    }

    async fn fetch_positions(&self) -> Result<Vec<PerpPosition>> {
        let state: ClearinghouseState = self
            .post_info(&UserInfoRequest {
                request_type: "clearinghouseState",
                user: self.wallet_address.clone(),
            })
            .await?;

        let positions = parse_positions(state);
        debug!(positions = positions.len(), "Fetched positions");
        Ok(positions)
    }

    /// Asset index for a symbol, refreshing the cache once on a miss.
    async fn asset_for_symbol(&self, symbol: &str) -> Result<AssetEntry> {
        if let Some(entry) = self.assets.read().get(symbol) {
            return Ok(*entry);
        }
        self.fetch_tickers().await?;
        self.assets
            .read()
            .get(symbol)
            .copied()
            .ok_or_else(|| ExchangeError::Api(format!("Unknown symbol '{symbol}'")))
    }

    async fn submit_order(&self, request: &OrderRequest) -> Result<OrderAck> {
        if request.order_type != OrderType::Limit {
            return Err(ExchangeError::Config(format!(
                "Unsupported order type '{}' for Hyperliquid exchange API",
                request.order_type
            )));
        }
        let limit_price = request.limit_price.ok_or_else(|| {
            ExchangeError::Config("limit_price is required for limit orders".to_string())
        })?;
        let key = self.trading_key.as_ref().ok_or_else(|| {
            ExchangeError::Config("A trading key must be configured to submit orders".to_string())
        })?;

        let asset = self.asset_for_symbol(&request.symbol).await?;
        let wire = OrderWire {
            asset: asset.index,
            is_buy: request.side == OrderSide::Buy,
            limit_px: format_decimal(limit_price),
            sz: format_decimal(request.quantity),
            reduce_only: request.reduce_only,
            order_type: OrderTypeWire::limit(request.time_in_force.as_wire()),
            cloid: Some(ClientOrderId::new().to_string()),
        };
        let action = Action::order(vec![wire]);
        let nonce = Utc::now().timestamp_millis() as u64;
        let signature = key.sign_action(&action, nonce, self.is_mainnet).await?;

        let response = self
            .client
            .post(&self.exchange_url)
            .json(&ExchangeRequest {
                action: &action,
                nonce,
                signature: &signature,
            })
            .send()
            .await
            .map_err(|e| ExchangeError::Transport(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        let body: serde_json::Value = if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| ExchangeError::Api(format!("Failed to parse response: {e}")))?
        } else {
            let body = response.text().await.unwrap_or_default();
            return Err(ExchangeError::Transport(format!("HTTP {status}: {body}")));
        };

        let ack_status = body
            .get("status")
            .and_then(|s| s.as_str())
            .unwrap_or_default()
            .to_string();
        if ack_status != "ok" {
            return Err(ExchangeError::Api(format!("Order rejected: {body}")));
        }

        info!(
            symbol = %request.symbol,
            side = %request.side,
            quantity = %request.quantity,
            limit_price = %limit_price,
            reduce_only = request.reduce_only,
            "Order submitted"
        );
        Ok(OrderAck {
            status: ack_status,
            response: body,
        })
    }
}

impl Exchange for HyperliquidClient {
    fn tickers(&self) -> BoxFuture<'_, Result<HashMap<String, Ticker>>> {
        Box::pin(self.fetch_tickers())
    }

    fn positions(&self) -> BoxFuture<'_, Result<Vec<PerpPosition>>> {
        Box::pin(self.fetch_positions())
    }

    fn place_order<'a>(&'a self, request: &'a OrderRequest) -> BoxFuture<'a, Result<OrderAck>> {
        Box::pin(self.submit_order(request))
    }
}

/// Render a decimal without trailing zeros for the wire.
fn format_decimal(value: Decimal) -> String {
    value.normalize().to_string()
}

fn parse_tickers(
    meta: MetaResponse,
    ctxs: Vec<AssetCtxRaw>,
) -> (HashMap<String, Ticker>, HashMap<String, AssetEntry>) {
    let mut tickers = HashMap::new();
    let mut assets = HashMap::new();

    for (index, (entry, ctx)) in meta.universe.into_iter().zip(ctxs).enumerate() {
        let symbol = coin_to_symbol(&entry.name);
        assets.insert(
            symbol.clone(),
            AssetEntry {
                index: index as u32,
                sz_decimals: entry.sz_decimals,
            },
        );

        let price_str = match ctx.mid_px.or(ctx.mark_px) {
            Some(p) => p,
            None => continue,
        };
        let mid_price: Decimal = match price_str.parse() {
            Ok(p) => p,
            Err(_) => {
                warn!(coin = %entry.name, price = %price_str, "Skipping unparseable price");
                continue;
            }
        };

        tickers.insert(
            symbol,
            Ticker {
                mid_price,
                sz_decimals: entry.sz_decimals,
                day_notional_volume: ctx.day_ntl_vlm.and_then(|v| v.parse().ok()),
            },
        );
    }

    (tickers, assets)
}

fn parse_positions(state: ClearinghouseState) -> Vec<PerpPosition> {
    state
        .asset_positions
        .into_iter()
        .filter_map(|raw| raw.position)
        .filter_map(|position| {
            let coin = position.coin?;
            let signed_size = position
                .szi
                .and_then(|s| s.parse().ok())
                .unwrap_or(Decimal::ZERO);
            Some(PerpPosition {
                symbol: coin_to_symbol(&coin),
                signed_size,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_coin_symbol_mapping() {
        assert_eq!(coin_to_symbol("BTC"), "BTC-PERP");
        assert_eq!(coin_to_symbol("xyz:SILVER"), "SILVER-PERP");
    }

    #[test]
    fn test_unsupported_network_rejected() {
        let config = ExchangeConfig {
            network: "devnet".to_string(),
            ..Default::default()
        };
        let result = HyperliquidClient::new(config, None);
        assert!(matches!(result, Err(ExchangeError::Config(_))));
    }

    #[test]
    fn test_wallet_address_required_without_key() {
        let result = HyperliquidClient::new(ExchangeConfig::default(), None);
        assert!(matches!(result, Err(ExchangeError::Config(_))));
    }

    #[test]
    fn test_read_only_client_cannot_trade() {
        let config = ExchangeConfig {
            wallet_address: Some("0x1111111111111111111111111111111111111111".to_string()),
            ..Default::default()
        };
        let client = HyperliquidClient::new(config, None).unwrap();
        assert!(!client.can_trade());
    }

    #[test]
    fn test_parse_tickers_fixture() {
        let body = r#"[
            {"universe": [
                {"name": "BTC", "szDecimals": 5},
                {"name": "ETH", "szDecimals": 4},
                {"name": "STALE", "szDecimals": 2}
            ]},
            [
                {"midPx": "65000.0", "markPx": "65001.0", "dayNtlVlm": "123456.7"},
                {"markPx": "3200.5"},
                {}
            ]
        ]"#;
        let (meta, ctxs): (MetaResponse, Vec<AssetCtxRaw>) = serde_json::from_str(body).unwrap();
        let (tickers, assets) = parse_tickers(meta, ctxs);

        let btc = &tickers["BTC-PERP"];
        assert_eq!(btc.mid_price, dec!(65000.0));
        assert_eq!(btc.sz_decimals, 5);
        assert_eq!(btc.day_notional_volume, Some(dec!(123456.7)));

        // No mid price: falls back to mark.
        assert_eq!(tickers["ETH-PERP"].mid_price, dec!(3200.5));

        // No price at all: excluded from tickers but still indexable.
        assert!(!tickers.contains_key("STALE-PERP"));
        assert_eq!(assets["STALE-PERP"].index, 2);
        assert_eq!(assets["BTC-PERP"].index, 0);
    }

    #[test]
    fn test_parse_positions_fixture() {
        let body = r#"{
            "assetPositions": [
                {"position": {"coin": "BTC", "szi": "-2.5"}},
                {"position": {"coin": "ETH", "szi": "0.75"}},
                {"position": {"szi": "1.0"}},
                {}
            ],
            "marginSummary": {"accountValue": "1000"}
        }"#;
        let state: ClearinghouseState = serde_json::from_str(body).unwrap();
        let positions = parse_positions(state);

        assert_eq!(positions.len(), 2);
        assert_eq!(positions[0].symbol, "BTC-PERP");
        assert_eq!(positions[0].signed_size, dec!(-2.5));
        assert_eq!(positions[1].signed_size, dec!(0.75));
    }

    #[test]
    fn test_format_decimal_trims_trailing_zeros() {
        assert_eq!(format_decimal(dec!(102.00)), "102");
        assert_eq!(format_decimal(dec!(0.2500)), "0.25");
        assert_eq!(format_decimal(dec!(98.2)), "98.2");
    }
}
