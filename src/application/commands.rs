//! CLI commands and handlers
use chrono::Utc;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::application::{BalanceBook, PoolService, SwapService, WalletService};
use crate::config::Config;
use crate::domain::execution::TransactionBuilder;
use crate::domain::pricing::FixedRatePricing;
use crate::domain::session::{SessionStore, WalletSession};
use crate::domain::swap::{Side, SwapForm};
use crate::infrastructure::blockchain::SupraRpcClient;
use crate::infrastructure::provider::{ProviderBridge, ProviderSlot, SimulatedWallet};
use crate::infrastructure::storage::FileHintStore;
use crate::math::{format_fixed, OUTPUT_DISPLAY_DP};
use crate::shared::errors::{AppError, ConfigError, WalletError};
use crate::shared::types::{Network, Token, TransactionResult};
use crate::shared::utils::{explorer_url, format_address};

#[derive(Parser, Debug)]
#[command(name = "yudiswap")]
#[command(version, about = "YudiSwap - AMM swaps and liquidity on Supra")]
pub struct Cli {
    /// Path to config file (defaults to ./Config.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Network to use (testnet, mainnet)
    #[arg(long, global = true)]
    pub network: Option<Network>,

    /// RPC endpoint URL (overrides config)
    #[arg(long, global = true)]
    pub rpc_url: Option<String>,

    /// AMM contract address (overrides config)
    #[arg(long, global = true)]
    pub pool_address: Option<String>,

    /// Slippage tolerance in percent
    #[arg(long, global = true)]
    pub slippage: Option<Decimal>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Account exposed by the simulated wallet
    #[arg(long, global = true, default_value = "0x8f3ab2c9d1e4f5a6b7c8d9e0f1a2b3c4d5e6f7a8b9c0d1e2f3a4b5c6d7e8f9a0")]
    pub wallet_address: String,

    /// Run without any wallet injected
    #[arg(long, global = true)]
    pub no_wallet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// List configured tokens
    Tokens,

    /// Show the active configuration
    Config,

    /// Quote a swap without submitting
    Quote {
        /// Input token symbol
        #[arg(long)]
        from: String,

        /// Output token symbol
        #[arg(long)]
        to: String,

        /// Input amount
        #[arg(long)]
        amount: String,
    },

    /// Connect the wallet, then submit a swap
    Swap {
        #[arg(long)]
        from: String,

        #[arg(long)]
        to: String,

        #[arg(long)]
        amount: String,
    },

    /// Connect the wallet and show the session
    Connect,

    /// Disconnect and forget the remembered address
    Disconnect,

    /// Show the remembered address and what the wallet reports
    Status,

    /// Connect the wallet and read token balances
    Balance,

    /// List liquidity pools
    Pools,

    /// Deposit into a pool
    AddLiquidity {
        #[arg(long)]
        token_a: String,

        #[arg(long)]
        token_b: String,

        #[arg(long)]
        amount_a: String,

        #[arg(long)]
        amount_b: String,
    },

    /// Withdraw from a pool
    RemoveLiquidity {
        #[arg(long)]
        token_a: String,

        #[arg(long)]
        token_b: String,

        /// LP tokens to burn, in base units
        #[arg(long)]
        lp_amount: u64,

        #[arg(long, default_value = "0")]
        min_a: Decimal,

        #[arg(long, default_value = "0")]
        min_b: Decimal,
    },
}

/// Everything a command may need, wired from one [`Config`]
pub struct Services {
    pub config: Config,
    pub wallet: WalletService,
    pub swap: SwapService,
    pub pools: PoolService,
    pub balances: BalanceBook,
}

impl Services {
    /// `wallet_address: None` leaves the provider slot empty
    pub fn build(config: Config, wallet_address: Option<&str>) -> Result<Self, AppError> {
        let slot = match wallet_address {
            Some(address) => {
                let wallet = Arc::new(SimulatedWallet::new(address, config.chain_id()));
                ProviderSlot::with_provider(wallet)
            }
            None => ProviderSlot::empty(),
        };
        let bridge = Arc::new(ProviderBridge::new(
            slot,
            Duration::from_millis(config.wallet.request_timeout_ms),
        ));
        let store = Arc::new(SessionStore::new());

        let wallet = WalletService::new(
            bridge.clone(),
            store.clone(),
            Arc::new(FileHintStore::new(&config.wallet.storage_dir)),
            chrono::Duration::seconds(config.wallet.error_display_secs as i64),
            config.wallet.install_url.clone(),
        );

        let native = config
            .tokens()
            .iter()
            .find(|t| t.is_native)
            .or_else(|| config.tokens().first())
            .cloned()
            .ok_or_else(|| ConfigError::UnknownToken("no tokens configured".to_string()))?;

        let swap = SwapService::new(
            store.clone(),
            bridge.clone(),
            Arc::new(FixedRatePricing::new(config.trade.mock_rate)),
            TransactionBuilder::new(config.pool_address()),
            SwapForm::new(native, config.trade.slippage_pct),
        );
        let pools = PoolService::new(
            store,
            bridge,
            TransactionBuilder::new(config.pool_address()),
            config.trade.slippage_pct,
        );
        let balances = BalanceBook::new(
            Arc::new(SupraRpcClient::new(config.rpc_url())),
            config.tradable_tokens().cloned().collect(),
        );

        Ok(Self {
            config,
            wallet,
            swap,
            pools,
            balances,
        })
    }

    fn token(&self, symbol: &str) -> Result<Token, AppError> {
        Ok(self.config.token(symbol)?.clone())
    }

    /// Connect, reporting the session error as a command failure
    async fn require_session(&self) -> Result<WalletSession, AppError> {
        let session = self.wallet.connect().await;
        if session.is_connected() {
            return Ok(session);
        }
        if !self.wallet.bridge().is_available() {
            warn!("Install a wallet from {}", self.wallet.install_url());
            return Err(WalletError::ProviderUnavailable.into());
        }
        let reason = session.error().unwrap_or("connection refused").to_string();
        Err(WalletError::ProviderRejected(reason).into())
    }
}

pub struct CommandExecutor;

impl CommandExecutor {
    /// Execute the selected command
    pub async fn execute(command: Commands, services: &Services) -> Result<(), AppError> {
        match command {
            Commands::Tokens => Self::execute_tokens_command(services),
            Commands::Config => Self::execute_config_command(services),
            Commands::Quote { from, to, amount } => Self::execute_quote_command(services, &from, &to, &amount).await,
            Commands::Swap { from, to, amount } => Self::execute_swap_command(services, &from, &to, &amount).await,
            Commands::Connect => Self::execute_connect_command(services).await,
            Commands::Disconnect => Self::execute_disconnect_command(services).await,
            Commands::Status => Self::execute_status_command(services).await,
            Commands::Balance => Self::execute_balance_command(services).await,
            Commands::Pools => Self::execute_pools_command(services),
            Commands::AddLiquidity { token_a, token_b, amount_a, amount_b } => {
                let a = services.token(&token_a)?;
                let b = services.token(&token_b)?;
                services.require_session().await?;
                let result = services.pools.add_liquidity(&a, &b, &amount_a, &amount_b).await?;
                Self::report(services, &result);
                Ok(())
            }
            Commands::RemoveLiquidity { token_a, token_b, lp_amount, min_a, min_b } => {
                let a = services.token(&token_a)?;
                let b = services.token(&token_b)?;
                services.require_session().await?;
                let result = services.pools.remove_liquidity(&a, &b, lp_amount, min_a, min_b).await?;
                Self::report(services, &result);
                Ok(())
            }
        }
    }

    fn execute_tokens_command(services: &Services) -> Result<(), AppError> {
        for token in services.config.tokens() {
            let status = if token.is_tradable() { token.address.as_str() } else { "(not deployed)" };
            println!("{:<6} {:<12} {:>2} dp  {}", token.symbol, token.name, token.decimals, status);
        }
        Ok(())
    }

    fn execute_config_command(services: &Services) -> Result<(), AppError> {
        let cfg = &services.config;
        println!("network:   {} (chain {})", cfg.active_network(), cfg.chain_id());
        println!("rpc:       {}", cfg.rpc_url());
        println!("explorer:  {}", cfg.explorer_url());
        if let Some(faucet) = cfg.faucet_url() {
            println!("faucet:    {}", faucet);
        }
        let pool = if cfg.pool_address().is_empty() { "(not deployed)" } else { cfg.pool_address() };
        println!("amm:       {}", pool);
        println!("slippage:  {}%", cfg.trade.slippage_pct);
        Ok(())
    }

    async fn execute_quote_command(services: &Services, from: &str, to: &str, amount: &str) -> Result<(), AppError> {
        let swap = &services.swap;
        swap.select_token(Side::From, services.token(from)?).await?;
        swap.select_token(Side::To, services.token(to)?).await?;

        match swap.set_amount_in(amount).await? {
            Some(quote) => {
                let form = swap.form();
                println!("{} {} -> {} {}", quote.amount_in, quote.route[0], form.to_amount(), quote.route[1]);
                println!("rate:         1 {} ≈ {} {}", quote.route[0], quote.rate, quote.route[1]);
                println!("fee:          {} {}", quote.fee, quote.route[0]);
                println!("price impact: {}%", quote.price_impact);
                let min_out = crate::math::calculate_min_out(quote.amount_out, form.slippage_pct());
                println!(
                    "min received: {} {} ({}% slippage)",
                    format_fixed(min_out, OUTPUT_DISPLAY_DP),
                    quote.route[1],
                    form.slippage_pct()
                );
            }
            None => println!("Enter an amount"),
        }
        Ok(())
    }

    async fn execute_swap_command(services: &Services, from: &str, to: &str, amount: &str) -> Result<(), AppError> {
        let swap = &services.swap;
        swap.select_token(Side::From, services.token(from)?).await?;
        swap.select_token(Side::To, services.token(to)?).await?;
        swap.set_amount_in(amount).await?;

        services.require_session().await?;
        info!("{}", swap.action().label());

        let result = swap.execute().await?;
        Self::report(services, &result);
        Ok(())
    }

    async fn execute_connect_command(services: &Services) -> Result<(), AppError> {
        let session = services.require_session().await?;
        Self::print_session(services, &session);
        Ok(())
    }

    async fn execute_disconnect_command(services: &Services) -> Result<(), AppError> {
        services.wallet.disconnect().await;
        println!("Disconnected");
        Ok(())
    }

    async fn execute_status_command(services: &Services) -> Result<(), AppError> {
        if let Some(hint) = services.wallet.address_hint().await {
            println!("last account: {}", format_address(&hint));
        }
        let session = services.wallet.check_connection().await;
        Self::print_session(services, &session);
        Ok(())
    }

    async fn execute_balance_command(services: &Services) -> Result<(), AppError> {
        let session = services.require_session().await?;
        let Some(address) = session.address() else {
            return Ok(());
        };
        services.balances.refresh(address).await;
        for token in services.config.tokens() {
            println!("{:<6} {}", token.symbol, services.balances.balance(&token.symbol).await);
        }
        Ok(())
    }

    fn execute_pools_command(services: &Services) -> Result<(), AppError> {
        for pool in services.pools.available_pools(services.config.tokens()) {
            println!(
                "{:<14} fee {}%  reserves {} / {}  apr {}%",
                pool.name(),
                pool.fee,
                pool.reserve_a,
                pool.reserve_b,
                pool.apr
            );
        }
        Ok(())
    }

    fn print_session(services: &Services, session: &WalletSession) {
        match session.address() {
            Some(address) => {
                println!("connected:    {}", format_address(address));
                println!("chain:        {}", session.chain_id().unwrap_or_default());
                println!("explorer:     {}", explorer_url(services.config.explorer_url(), address));
            }
            None => println!("Not connected"),
        }
        if let Some(error) = services.wallet.visible_error(Utc::now()) {
            println!("error:        {}", error);
        }
    }

    fn report(services: &Services, result: &TransactionResult) {
        match (&result.hash, &result.error) {
            (Some(hash), _) => {
                println!("Submitted: {}", hash);
                println!("{}/tx/{}", services.config.explorer_url().trim_end_matches('/'), hash);
            }
            (None, Some(error)) => println!("Transaction failed: {}", error),
            (None, None) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::errors::SwapError;

    fn services(dir: &std::path::Path, wallet: Option<&str>) -> Services {
        let mut config = Config::default();
        config.wallet.storage_dir = dir.to_path_buf();
        config.contracts.amm = "0xpool".to_string();
        config.tokens[1].address = "0xcafe::usdc::USDC".to_string();
        Services::build(config, wallet).unwrap()
    }

    #[test]
    fn test_cli_parses_global_flags() {
        let cli = Cli::parse_from(["yudiswap", "quote", "--from", "SUPRA", "--to", "USDC", "--amount", "10", "--network", "mainnet"]);
        assert_eq!(cli.network, Some(Network::Mainnet));
        assert!(matches!(cli.command, Commands::Quote { .. }));
    }

    #[tokio::test]
    async fn test_swap_command_submits() {
        let dir = tempfile::tempdir().unwrap();
        let services = services(dir.path(), Some("0xabc"));
        CommandExecutor::execute(
            Commands::Swap {
                from: "SUPRA".to_string(),
                to: "USDC".to_string(),
                amount: "10".to_string(),
            },
            &services,
        )
        .await
        .unwrap();

        assert!(services.wallet.session().is_connected());
        assert_eq!(services.swap.form().from_amount(), "");
        assert_eq!(services.wallet.address_hint().await, Some("0xabc".to_string()));
    }

    #[tokio::test]
    async fn test_connect_without_wallet_fails() {
        let dir = tempfile::tempdir().unwrap();
        let services = services(dir.path(), None);
        let err = CommandExecutor::execute(Commands::Connect, &services).await.unwrap_err();
        assert!(err.to_string().contains("StarKey wallet not installed"));
    }

    #[tokio::test]
    async fn test_unknown_token_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let services = services(dir.path(), Some("0xabc"));
        let err = CommandExecutor::execute(
            Commands::Quote {
                from: "SUPRA".to_string(),
                to: "DOGE".to_string(),
                amount: "1".to_string(),
            },
            &services,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Config(ConfigError::UnknownToken(_))));
    }

    #[tokio::test]
    async fn test_same_token_quote_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let services = services(dir.path(), Some("0xabc"));
        let err = CommandExecutor::execute(
            Commands::Quote {
                from: "SUPRA".to_string(),
                to: "supra".to_string(),
                amount: "1".to_string(),
            },
            &services,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Swap(SwapError::IdenticalTokens(_))));
        assert!(services.swap.form().to_token().is_none());
    }
}
