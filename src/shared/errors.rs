//! Error handling for the application

use thiserror::Error;

/// Wallet / provider errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// No wallet capability injected
    #[error("StarKey wallet not installed. Please install StarKey extension.")]
    ProviderUnavailable,

    /// Capability present but no live session at call time
    #[error("Wallet not connected")]
    WalletNotConnected,

    #[error("{0}")]
    ProviderRejected(String),

    /// Best-effort reads; logged and swallowed by callers
    #[error("Query failed: {0}")]
    QueryFailed(String),
}

/// Swap / liquidity flow errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SwapError {
    #[error("Select a token")]
    TokenNotSelected,

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Token {0} is not tradable yet")]
    TokenNotTradable(String),

    #[error("Cannot pair {0} with itself")]
    IdenticalTokens(String),

    #[error("AMM contract is not deployed on this network")]
    ContractNotDeployed,

    #[error("A transaction is already being submitted")]
    SubmissionInFlight,

    #[error("Pricing unavailable: {0}")]
    Pricing(String),

    #[error(transparent)]
    Wallet(#[from] WalletError),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Unknown token: {0}")]
    UnknownToken(String),

    #[error("Invalid network: {0}")]
    InvalidNetwork(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Storage errors for the persisted session hint
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// General application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Wallet error: {0}")]
    Wallet(#[from] WalletError),

    #[error("Swap error: {0}")]
    Swap(#[from] SwapError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swap_error_wraps_wallet_error() {
        let err: SwapError = WalletError::WalletNotConnected.into();
        assert_eq!(err.to_string(), "Wallet not connected");
    }
}
