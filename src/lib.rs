//! YudiSwap - wallet session, quoting and swap execution for a Supra AMM
//! Built with Domain-Driven Design principles

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod math;
pub mod shared;

// Re-export main types for convenience
pub use application::{BalanceBook, PoolService, SwapService, WalletService};
pub use config::Config;
pub use domain::session::{ConnectionStatus, SessionStore, WalletSession};
pub use domain::swap::{Side, SwapAction, SwapForm};
pub use infrastructure::provider::{ProviderBridge, ProviderSlot, WalletProvider};
