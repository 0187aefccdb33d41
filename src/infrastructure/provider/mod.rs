//! Injected wallet provider (StarKey-style) and the bridge around it
//!
//! The wallet is an external collaborator with no guarantee of presence.
//! [`ProviderSlot`] models the optional injection point; every call site
//! resolves it again instead of caching the provider.

mod bridge;
mod simulated;

pub use bridge::ProviderBridge;
pub use simulated::SimulatedWallet;

use async_trait::async_trait;
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tokio::sync::broadcast;

use crate::domain::execution::EntryFunctionPayload;
use crate::shared::types::{NetworkInfo, TxHash};

/// Raw failure reported by the wallet (user rejection, internal error...)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ProviderFailure(pub String);

/// Push notifications from the wallet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    /// `None` when the wallet no longer exposes an account
    AccountChanged(Option<String>),
    NetworkChanged { chain_id: u64 },
}

/// Capabilities of the injected wallet object
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Returns the connected account address
    async fn connect(&self) -> Result<String, ProviderFailure>;

    async fn disconnect(&self) -> Result<(), ProviderFailure>;

    async fn is_connected(&self) -> Result<bool, ProviderFailure>;

    async fn get_accounts(&self) -> Result<Vec<String>, ProviderFailure>;

    async fn network(&self) -> Result<NetworkInfo, ProviderFailure>;

    async fn sign_transaction(&self, payload: &EntryFunctionPayload) -> Result<serde_json::Value, ProviderFailure>;

    async fn sign_and_submit_transaction(&self, payload: &EntryFunctionPayload) -> Result<TxHash, ProviderFailure>;

    /// Returns the signature
    async fn sign_message(&self, message: &str) -> Result<String, ProviderFailure>;

    /// Account and network change notifications
    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent>;
}

/// Optional injection point for the wallet. Cloning shares the slot.
#[derive(Clone, Default)]
pub struct ProviderSlot {
    inner: Arc<RwLock<Option<Arc<dyn WalletProvider>>>>,
}

impl ProviderSlot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_provider(provider: Arc<dyn WalletProvider>) -> Self {
        let slot = Self::default();
        slot.inject(provider);
        slot
    }

    pub fn inject(&self, provider: Arc<dyn WalletProvider>) {
        *self.inner.write().unwrap_or_else(|e| e.into_inner()) = Some(provider);
    }

    pub fn eject(&self) {
        *self.inner.write().unwrap_or_else(|e| e.into_inner()) = None;
    }

    /// The provider as of right now
    pub fn resolve(&self) -> Option<Arc<dyn WalletProvider>> {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl std::fmt::Debug for ProviderSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSlot")
            .field("injected", &self.resolve().is_some())
            .finish()
    }
}
