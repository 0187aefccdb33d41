// src/app.rs
use anyhow::{Context, Result};
use tracing::{debug, info};

use yudiswap::application::commands::{Cli, CommandExecutor, Commands, Services};
use yudiswap::config::Config;
use yudiswap::shared::types::Network;
use yudiswap::shared::utils::is_hex_address;

#[derive(Debug, Clone)]
pub struct AppCfg {
    pub config: Config,
    /// `None` runs with no wallet injected
    pub wallet_address: Option<String>,
}

impl AppCfg {
    /// Priority: CLI args > config file > defaults
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

        if let Some(network) = cli.network {
            config.network.active = network;
        }
        if let Some(rpc_url) = &cli.rpc_url {
            let endpoint = match config.network.active {
                Network::Testnet => &mut config.network.testnet,
                Network::Mainnet => &mut config.network.mainnet,
            };
            endpoint.rpc_url = rpc_url.clone();
        }
        if let Some(pool_address) = &cli.pool_address {
            config.contracts.amm = pool_address.clone();
        }
        if let Some(slippage) = cli.slippage {
            config.trade.slippage_pct = slippage;
        }
        config.validate().context("Invalid configuration after CLI overrides")?;

        if !cli.no_wallet && !is_hex_address(&cli.wallet_address) {
            anyhow::bail!("Wallet address must be 0x-prefixed hex, got {}", cli.wallet_address);
        }

        Ok(Self {
            config,
            wallet_address: (!cli.no_wallet).then(|| cli.wallet_address.clone()),
        })
    }
}

pub async fn run(app_cfg: AppCfg, command: Commands) -> Result<()> {
    info!(
        "YudiSwap on {} ({})",
        app_cfg.config.active_network(),
        app_cfg.config.rpc_url()
    );
    debug!("Configuration: {:?}", app_cfg);

    let services = Services::build(app_cfg.config, app_cfg.wallet_address.as_deref())
        .context("Failed to initialise services")?;
    CommandExecutor::execute(command, &services).await?;
    Ok(())
}
