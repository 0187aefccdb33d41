//! Configuration file and read-only registry (networks, contracts, tokens)

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};
use tracing::{debug, info};

use crate::infrastructure::blockchain::rpc_client::SUPRA_COIN_TYPE;
use crate::shared::errors::ConfigError;
use crate::shared::types::{Network, Token};

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "Config.toml";

/// Largest token precision whose base-unit scale fits in a `u64`
pub const MAX_TOKEN_DECIMALS: u8 = 19;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointCfg {
    pub rpc_url: String,
    pub chain_id: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkCfg {
    pub active: Network,
    pub testnet: EndpointCfg,
    pub mainnet: EndpointCfg,
    /// Testnet only
    pub faucet_url: String,
    pub explorer_url: String,
}

impl Default for NetworkCfg {
    fn default() -> Self {
        Self {
            active: Network::Testnet,
            testnet: EndpointCfg {
                rpc_url: "https://rpc-testnet.supra.com".to_string(),
                chain_id: 6,
            },
            mainnet: EndpointCfg {
                rpc_url: "https://rpc-mainnet.supra.com".to_string(),
                chain_id: 8,
            },
            faucet_url: "https://rpc-testnet.supra.com/rpc/v1/wallet/faucet".to_string(),
            explorer_url: "https://suprascan.io".to_string(),
        }
    }
}

/// Deployed contract addresses; empty until deployment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractsCfg {
    pub amm: String,
    pub router: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeCfg {
    /// Slippage tolerance in percent
    pub slippage_pct: Decimal,
    /// Placeholder exchange rate used until pool reads are wired in
    pub mock_rate: Decimal,
}

impl Default for TradeCfg {
    fn default() -> Self {
        Self {
            slippage_pct: dec!(0.5),
            mock_rate: dec!(1.5),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletCfg {
    pub install_url: String,
    /// Directory holding the persisted reconnection hint
    pub storage_dir: PathBuf,
    pub error_display_secs: u64,
    pub request_timeout_ms: u64,
}

impl Default for WalletCfg {
    fn default() -> Self {
        Self {
            install_url: "https://starkey.app".to_string(),
            storage_dir: PathBuf::from(".yudiswap"),
            error_display_secs: 5,
            request_timeout_ms: 30_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub network: NetworkCfg,
    pub contracts: ContractsCfg,
    pub trade: TradeCfg,
    pub wallet: WalletCfg,
    pub tokens: Vec<Token>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: NetworkCfg::default(),
            contracts: ContractsCfg::default(),
            trade: TradeCfg::default(),
            wallet: WalletCfg::default(),
            tokens: default_tokens(),
        }
    }
}

fn default_tokens() -> Vec<Token> {
    vec![
        Token {
            symbol: "SUPRA".to_string(),
            name: "Supra Token".to_string(),
            decimals: 8,
            address: SUPRA_COIN_TYPE.to_string(),
            icon: "S".to_string(),
            is_native: true,
        },
        Token {
            symbol: "USDC".to_string(),
            name: "USD Coin".to_string(),
            decimals: 6,
            address: String::new(),
            icon: "U".to_string(),
            is_native: false,
        },
        Token {
            symbol: "USDT".to_string(),
            name: "Tether USD".to_string(),
            decimals: 6,
            address: String::new(),
            icon: "T".to_string(),
            is_native: false,
        },
    ]
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let s = fs::read_to_string(path.as_ref())?;
        Self::from_toml(&s)
    }

    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values the swap flow cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let slippage = self.trade.slippage_pct;
        if slippage.is_sign_negative() || slippage > Decimal::ONE_HUNDRED {
            return Err(ConfigError::Invalid(format!(
                "slippage_pct must be between 0 and 100, got {}",
                slippage
            )));
        }
        if self.trade.mock_rate <= Decimal::ZERO {
            return Err(ConfigError::Invalid(format!(
                "mock_rate must be positive, got {}",
                self.trade.mock_rate
            )));
        }
        for (i, token) in self.tokens.iter().enumerate() {
            if token.decimals > MAX_TOKEN_DECIMALS {
                return Err(ConfigError::Invalid(format!(
                    "token {} has {} decimals, at most {} supported",
                    token.symbol, token.decimals, MAX_TOKEN_DECIMALS
                )));
            }
            if self.tokens[..i].iter().any(|t| t.symbol.eq_ignore_ascii_case(&token.symbol)) {
                return Err(ConfigError::Invalid(format!("token {} listed twice", token.symbol)));
            }
        }
        Ok(())
    }

    /// Load an explicit file, or `Config.toml` when present, or the defaults
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                Self::from_file(path)
            }
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                info!("Loading configuration from {}", DEFAULT_CONFIG_FILE);
                Self::from_file(DEFAULT_CONFIG_FILE)
            }
            None => {
                debug!("No config file found, using built-in defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn active_network(&self) -> Network {
        self.network.active
    }

    fn endpoint(&self) -> &EndpointCfg {
        match self.network.active {
            Network::Testnet => &self.network.testnet,
            Network::Mainnet => &self.network.mainnet,
        }
    }

    pub fn rpc_url(&self) -> &str {
        &self.endpoint().rpc_url
    }

    pub fn chain_id(&self) -> u64 {
        self.endpoint().chain_id
    }

    pub fn faucet_url(&self) -> Option<&str> {
        match self.network.active {
            Network::Testnet if !self.network.faucet_url.is_empty() => Some(&self.network.faucet_url),
            _ => None,
        }
    }

    pub fn explorer_url(&self) -> &str {
        &self.network.explorer_url
    }

    /// Address hosting the AMM `router` module
    pub fn pool_address(&self) -> &str {
        &self.contracts.amm
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn token(&self, symbol: &str) -> Result<&Token, ConfigError> {
        self.tokens
            .iter()
            .find(|t| t.symbol.eq_ignore_ascii_case(symbol))
            .ok_or_else(|| ConfigError::UnknownToken(symbol.to_string()))
    }

    pub fn tradable_tokens(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter().filter(|t| t.is_tradable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_registry() {
        let cfg = Config::default();
        assert_eq!(cfg.active_network(), Network::Testnet);
        assert_eq!(cfg.rpc_url(), "https://rpc-testnet.supra.com");
        assert_eq!(cfg.chain_id(), 6);
        assert_eq!(cfg.tokens().len(), 3);
        assert!(cfg.faucet_url().is_some());
        assert_eq!(cfg.trade.slippage_pct, dec!(0.5));
    }

    #[test]
    fn test_tradable_tokens_skip_placeholders() {
        let cfg = Config::default();
        let tradable: Vec<_> = cfg.tradable_tokens().map(|t| t.symbol.as_str()).collect();
        assert_eq!(tradable, vec!["SUPRA"]);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let cfg = Config::from_toml(
            r#"
            [network]
            active = "mainnet"

            [contracts]
            amm = "0xamm"

            [trade]
            slippage_pct = "1.0"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.active_network(), Network::Mainnet);
        assert_eq!(cfg.chain_id(), 8);
        assert_eq!(cfg.rpc_url(), "https://rpc-mainnet.supra.com");
        assert!(cfg.faucet_url().is_none());
        assert_eq!(cfg.pool_address(), "0xamm");
        assert_eq!(cfg.trade.slippage_pct, dec!(1.0));
        assert_eq!(cfg.trade.mock_rate, dec!(1.5));
        assert_eq!(cfg.tokens().len(), 3);
    }

    #[test]
    fn test_out_of_range_values_are_rejected() {
        let err = Config::from_toml("[trade]\nslippage_pct = \"150\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(matches!(
            Config::from_toml("[trade]\nslippage_pct = \"-1\"\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Config::from_toml("[trade]\nmock_rate = \"0\"\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(Config::from_toml("[trade]\nslippage_pct = \"100\"\n").is_ok());
    }

    #[test]
    fn test_token_precision_is_bounded() {
        let mut cfg = Config::default();
        cfg.tokens[1].decimals = 20;
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));

        cfg.tokens[1].decimals = MAX_TOKEN_DECIMALS;
        assert!(cfg.validate().is_ok());

        cfg.tokens[2].symbol = "usdc".to_string();
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_token_lookup() {
        let cfg = Config::default();
        assert_eq!(cfg.token("supra").unwrap().decimals, 8);
        assert!(matches!(cfg.token("ETH"), Err(ConfigError::UnknownToken(_))));
    }
}
