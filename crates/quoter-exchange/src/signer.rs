//! Hyperliquid L1 action signing.
//!
//! Order submission is a two-stage signature:
//! 1. `action_hash` = keccak256(msgpack(action) + nonce + vault tag)
//! 2. EIP-712 signature over the phantom agent `{source, connectionId}`
//!
//! The msgpack byte layout must match the reference SDK exactly; a field
//! reordered or an omitted-`None` serialized as nil changes the hash and
//! the exchange rejects the signature.

use alloy::primitives::{keccak256, Address, B256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer as AlloySigner;
use alloy::sol;
use alloy::sol_types::{eip712_domain, SolStruct};
use serde::Serialize;
use thiserror::Error;
use zeroize::Zeroizing;

/// Signing errors.
#[derive(Debug, Error)]
pub enum SignError {
    #[error("Failed to decode hex key: {0}")]
    HexDecode(#[from] hex::FromHexError),

    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    #[error("Signing failed: {0}")]
    SigningFailed(#[from] alloy::signers::Error),

    #[error("Action serialization failed: {0}")]
    SerializationFailed(String),
}

/// L1 order action. Field order is part of the signed byte layout.
#[derive(Debug, Clone, Serialize)]
pub struct Action {
    /// Always "order" for this system.
    #[serde(rename = "type")]
    pub action_type: String,
    pub orders: Vec<OrderWire>,
    /// "na" for ungrouped orders.
    pub grouping: String,
}

impl Action {
    pub fn order(orders: Vec<OrderWire>) -> Self {
        Self {
            action_type: "order".to_string(),
            orders,
            grouping: "na".to_string(),
        }
    }
}

/// Order wire format. Single-letter keys are the exchange's schema.
#[derive(Debug, Clone, Serialize)]
pub struct OrderWire {
    /// Asset index.
    #[serde(rename = "a")]
    pub asset: u32,

    /// Buy (true) or sell (false).
    #[serde(rename = "b")]
    pub is_buy: bool,

    /// Limit price as string.
    #[serde(rename = "p")]
    pub limit_px: String,

    /// Size as string.
    #[serde(rename = "s")]
    pub sz: String,

    /// Reduce-only flag.
    #[serde(rename = "r")]
    pub reduce_only: bool,

    #[serde(rename = "t")]
    pub order_type: OrderTypeWire,

    /// Client order ID; omitted keys must stay omitted, not nil.
    #[serde(rename = "c", skip_serializing_if = "Option::is_none")]
    pub cloid: Option<String>,
}

/// Order type wire: `{"limit": {"tif": "Gtc"|"Ioc"|"Alo"}}`. Trigger
/// orders are not part of this system.
#[derive(Debug, Clone, Serialize)]
pub struct OrderTypeWire {
    pub limit: LimitTif,
}

impl OrderTypeWire {
    pub fn limit(tif: &str) -> Self {
        Self {
            limit: LimitTif { tif: tif.to_string() },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LimitTif {
    pub tif: String,
}

/// Compute the action hash: msgpack(action) + big-endian nonce + vault tag
/// (0x00 when absent, 0x01 + address when present).
pub fn action_hash(action: &Action, nonce: u64, vault_address: Option<Address>) -> Result<B256, SignError> {
    let mut data = rmp_serde::to_vec_named(action)
        .map_err(|e| SignError::SerializationFailed(e.to_string()))?;
    data.extend_from_slice(&nonce.to_be_bytes());
    match vault_address {
        None => data.push(0x00),
        Some(addr) => {
            data.push(0x01);
            data.extend_from_slice(addr.as_slice());
        }
    }
    Ok(keccak256(&data))
}

// EIP-712 domain the exchange verifies against.
const EIP712_DOMAIN_NAME: &str = "Exchange";
const EIP712_DOMAIN_VERSION: &str = "1";
const EIP712_CHAIN_ID: u64 = 1337;

sol! {
    #[derive(Debug)]
    struct Agent {
        string source;
        bytes32 connectionId;
    }
}

/// EIP-712 signature components in the exchange's JSON shape.
#[derive(Debug, Clone, Serialize)]
pub struct ActionSignature {
    /// r component, 0x-prefixed hex.
    pub r: String,
    /// s component, 0x-prefixed hex.
    pub s: String,
    /// Recovery id, 27 or 28.
    pub v: u8,
}

/// Trading key wrapper. Key bytes are zeroized after parsing; never log
/// anything derived from the secret besides the address.
pub struct TradingKey {
    signer: PrivateKeySigner,
}

impl TradingKey {
    /// Parse a hex private key (with or without 0x prefix).
    pub fn from_hex(hex_key: &str) -> Result<Self, SignError> {
        let secret: Zeroizing<Vec<u8>> =
            Zeroizing::new(hex::decode(hex_key.trim().trim_start_matches("0x"))?);
        let signer = PrivateKeySigner::from_slice(&secret)
            .map_err(|e| SignError::InvalidKey(e.to_string()))?;
        Ok(Self { signer })
    }

    /// Address derived from the key.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Sign an action: hash it, wrap in the phantom agent ("a" mainnet,
    /// "b" testnet), sign the EIP-712 digest.
    pub async fn sign_action(
        &self,
        action: &Action,
        nonce: u64,
        is_mainnet: bool,
    ) -> Result<ActionSignature, SignError> {
        let connection_id = action_hash(action, nonce, None)?;

        let domain = eip712_domain! {
            name: EIP712_DOMAIN_NAME,
            version: EIP712_DOMAIN_VERSION,
            chain_id: EIP712_CHAIN_ID,
            verifying_contract: Address::ZERO,
        };
        let agent = Agent {
            source: if is_mainnet { "a" } else { "b" }.to_string(),
            connectionId: connection_id,
        };

        let digest = agent.eip712_signing_hash(&domain);
        let signature = self.signer.sign_hash(&digest).await?;

        Ok(ActionSignature {
            r: format!("0x{}", hex::encode(signature.r().to_be_bytes::<32>())),
            s: format!("0x{}", hex::encode(signature.s().to_be_bytes::<32>())),
            v: if signature.v() { 28 } else { 27 },
        })
    }
}
