//! Provider bridge: every wallet call goes through here

use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, error, warn};

use crate::domain::execution::EntryFunctionPayload;
use crate::shared::errors::WalletError;
use crate::shared::types::{Connection, TxHash};
use super::{ProviderEvent, ProviderFailure, ProviderSlot};

/// Wraps the optional wallet. Failures, panics and hung requests inside the
/// provider come back as [`WalletError`] values, never as panics.
#[derive(Debug, Clone)]
pub struct ProviderBridge {
    slot: ProviderSlot,
    request_timeout: Duration,
}

impl ProviderBridge {
    pub fn new(slot: ProviderSlot, request_timeout: Duration) -> Self {
        Self { slot, request_timeout }
    }

    pub fn slot(&self) -> &ProviderSlot {
        &self.slot
    }

    pub fn is_available(&self) -> bool {
        self.slot.resolve().is_some()
    }

    async fn call<T, F>(&self, op: &'static str, fut: F) -> Result<T, WalletError>
    where
        F: Future<Output = Result<T, ProviderFailure>>,
    {
        debug!("Wallet call: {}", op);
        match tokio::time::timeout(self.request_timeout, AssertUnwindSafe(fut).catch_unwind()).await {
            Ok(Ok(Ok(value))) => Ok(value),
            Ok(Ok(Err(ProviderFailure(message)))) => Err(WalletError::ProviderRejected(message)),
            Ok(Err(_panic)) => {
                error!("Wallet provider panicked during {}", op);
                Err(WalletError::ProviderRejected(format!("Wallet failed during {}", op)))
            }
            Err(_elapsed) => {
                warn!("Wallet call {} timed out after {:?}", op, self.request_timeout);
                Err(WalletError::ProviderRejected("Wallet request timed out".to_string()))
            }
        }
    }

    /// Connect and read the active network
    pub async fn connect(&self) -> Result<Connection, WalletError> {
        let provider = self.slot.resolve().ok_or(WalletError::ProviderUnavailable)?;
        let address = self.call("connect", provider.connect()).await?;
        let network = self.call("network", provider.network()).await?;
        Ok(Connection {
            address,
            chain_id: network.chain_id,
        })
    }

    /// Best effort; provider-side errors are logged and swallowed
    pub async fn disconnect(&self) {
        let Some(provider) = self.slot.resolve() else {
            return;
        };
        if let Err(e) = self.call("disconnect", provider.disconnect()).await {
            error!("Disconnect error: {}", e);
        }
    }

    /// Look for an existing provider session.
    ///
    /// `Ok(None)` means the provider affirmatively has no active account;
    /// query failures come back as [`WalletError::QueryFailed`].
    pub async fn check_connection(&self) -> Result<Option<Connection>, WalletError> {
        let provider = self.slot.resolve().ok_or(WalletError::ProviderUnavailable)?;

        let connected = self
            .call("is_connected", provider.is_connected())
            .await
            .map_err(into_query_failure)?;
        if !connected {
            return Ok(None);
        }

        let accounts = self
            .call("get_accounts", provider.get_accounts())
            .await
            .map_err(into_query_failure)?;
        let network = self
            .call("network", provider.network())
            .await
            .map_err(into_query_failure)?;

        Ok(accounts.into_iter().next().map(|address| Connection {
            address,
            chain_id: network.chain_id,
        }))
    }

    /// The live binding is checked here, not the cached session state
    pub async fn sign_and_submit_transaction(&self, payload: &EntryFunctionPayload) -> Result<TxHash, WalletError> {
        let provider = self.slot.resolve().ok_or(WalletError::WalletNotConnected)?;
        self.call("sign_and_submit_transaction", provider.sign_and_submit_transaction(payload))
            .await
    }

    pub async fn sign_transaction(&self, payload: &EntryFunctionPayload) -> Result<serde_json::Value, WalletError> {
        let provider = self.slot.resolve().ok_or(WalletError::WalletNotConnected)?;
        self.call("sign_transaction", provider.sign_transaction(payload)).await
    }

    pub async fn sign_message(&self, message: &str) -> Result<String, WalletError> {
        let provider = self.slot.resolve().ok_or(WalletError::WalletNotConnected)?;
        self.call("sign_message", provider.sign_message(message)).await
    }

    pub fn subscribe(&self) -> Option<broadcast::Receiver<ProviderEvent>> {
        self.slot.resolve().map(|provider| provider.subscribe())
    }
}

fn into_query_failure(err: WalletError) -> WalletError {
    match err {
        WalletError::ProviderRejected(message) => WalletError::QueryFailed(message),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::provider::SimulatedWallet;
    use std::sync::Arc;

    fn bridge_with(wallet: Arc<SimulatedWallet>) -> ProviderBridge {
        ProviderBridge::new(ProviderSlot::with_provider(wallet), Duration::from_secs(5))
    }

    fn payload() -> EntryFunctionPayload {
        EntryFunctionPayload {
            payload_type: "entry_function_payload".to_string(),
            function: "0xpool::router::swap_exact_tokens_for_tokens".to_string(),
            type_arguments: vec!["0x1::a::A".to_string(), "0x1::b::B".to_string()],
            arguments: vec!["0xpool".to_string(), "1".to_string(), "1".to_string()],
        }
    }

    #[tokio::test]
    async fn test_connect_without_provider() {
        let bridge = ProviderBridge::new(ProviderSlot::empty(), Duration::from_secs(5));
        assert_eq!(bridge.connect().await, Err(WalletError::ProviderUnavailable));
        assert_eq!(
            bridge.sign_and_submit_transaction(&payload()).await,
            Err(WalletError::WalletNotConnected)
        );
        // does not fail
        bridge.disconnect().await;
    }

    #[tokio::test]
    async fn test_connect_returns_address_and_chain() {
        let wallet = Arc::new(SimulatedWallet::new("0xabc", 6));
        let bridge = bridge_with(wallet);
        let conn = bridge.connect().await.unwrap();
        assert_eq!(conn.address, "0xabc");
        assert_eq!(conn.chain_id, 6);
    }

    #[tokio::test]
    async fn test_provider_rejection_is_mapped() {
        let wallet = Arc::new(SimulatedWallet::new("0xabc", 6));
        wallet.reject_next("User rejected the request");
        let bridge = bridge_with(wallet);
        assert_eq!(
            bridge.connect().await,
            Err(WalletError::ProviderRejected("User rejected the request".to_string()))
        );
    }

    #[tokio::test]
    async fn test_provider_panic_is_contained() {
        let wallet = Arc::new(SimulatedWallet::new("0xabc", 6));
        wallet.panic_next();
        let bridge = bridge_with(wallet);
        assert!(matches!(bridge.connect().await, Err(WalletError::ProviderRejected(_))));
    }

    #[tokio::test]
    async fn test_hung_request_times_out() {
        let wallet = Arc::new(SimulatedWallet::new("0xabc", 6));
        let _gate = wallet.defer_connect();
        let bridge = ProviderBridge::new(ProviderSlot::with_provider(wallet), Duration::from_millis(20));
        assert_eq!(
            bridge.connect().await,
            Err(WalletError::ProviderRejected("Wallet request timed out".to_string()))
        );
    }

    #[tokio::test]
    async fn test_check_connection_distinguishes_absent_and_failed() {
        let wallet = Arc::new(SimulatedWallet::new("0xabc", 6));
        let bridge = bridge_with(wallet.clone());

        assert_eq!(bridge.check_connection().await, Ok(None));

        wallet.set_connected(true);
        let conn = bridge.check_connection().await.unwrap().unwrap();
        assert_eq!(conn.address, "0xabc");

        wallet.fail_queries(true);
        assert!(matches!(bridge.check_connection().await, Err(WalletError::QueryFailed(_))));
    }

    #[tokio::test]
    async fn test_ejected_provider_is_seen_at_call_time() {
        let wallet = Arc::new(SimulatedWallet::new("0xabc", 6));
        let bridge = bridge_with(wallet);
        bridge.connect().await.unwrap();

        bridge.slot().eject();
        assert_eq!(
            bridge.sign_and_submit_transaction(&payload()).await,
            Err(WalletError::WalletNotConnected)
        );
    }
}
