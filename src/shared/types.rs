//! Common types used across the application

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::shared::errors::ConfigError;

/// Token representation, immutable once loaded from configuration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
    /// Move type tag of the coin; empty until the token is deployed
    #[serde(default)]
    pub address: String,
    pub icon: String,
    #[serde(default)]
    pub is_native: bool,
}

impl Token {
    /// A token with no on-chain address is a placeholder and cannot be traded
    pub fn is_tradable(&self) -> bool {
        !self.address.trim().is_empty()
    }
}

/// Supported Supra networks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Testnet,
    Mainnet,
}

impl Default for Network {
    fn default() -> Self {
        Network::Testnet
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Testnet => write!(f, "testnet"),
            Network::Mainnet => write!(f, "mainnet"),
        }
    }
}

impl FromStr for Network {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "testnet" => Ok(Network::Testnet),
            "mainnet" => Ok(Network::Mainnet),
            other => Err(ConfigError::InvalidNetwork(other.to_string())),
        }
    }
}

/// Account/chain pair reported by the wallet after a successful connect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub address: String,
    pub chain_id: u64,
}

/// Network info returned by the wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInfo {
    #[serde(rename = "chainId")]
    pub chain_id: u64,
    #[serde(default)]
    pub name: String,
}

/// Hash of a submitted transaction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxHash(pub String);

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of a submitted transaction; never carries both hash and error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TransactionResult {
    pub fn submitted(hash: TxHash) -> Self {
        Self {
            success: true,
            hash: Some(hash.0),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            hash: None,
            error: Some(error.into()),
        }
    }
}

/// Liquidity pool descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pool {
    pub coin_a: Token,
    pub coin_b: Token,
    pub reserve_a: String,
    pub reserve_b: String,
    pub lp_supply: String,
    /// Fee in percent (0.3 = 0.3%)
    pub fee: f64,
    pub apr: f64,
}

impl Pool {
    pub fn name(&self) -> String {
        format!("{} / {}", self.coin_a.symbol, self.coin_b.symbol)
    }
}
