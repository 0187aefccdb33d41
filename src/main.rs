mod app;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use yudiswap::application::commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    let app_cfg = app::AppCfg::from_cli(&cli)?;
    app::run(app_cfg, cli.command).await
}
