//! In-process wallet backing the CLI and the tests

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::{broadcast, oneshot};
use tracing::info;

use crate::domain::execution::EntryFunctionPayload;
use crate::shared::types::{NetworkInfo, TxHash};
use super::{ProviderEvent, ProviderFailure, WalletProvider};

type ConnectReply = Result<String, ProviderFailure>;

struct SimState {
    address: String,
    chain_id: u64,
    connected: bool,
    reject_next: Option<String>,
    panic_next: bool,
    fail_queries: bool,
    deferred_connects: VecDeque<oneshot::Receiver<ConnectReply>>,
    submitted: Vec<EntryFunctionPayload>,
}

/// Scriptable wallet: approves everything unless told otherwise
pub struct SimulatedWallet {
    state: Mutex<SimState>,
    events: broadcast::Sender<ProviderEvent>,
}

impl SimulatedWallet {
    pub fn new(address: impl Into<String>, chain_id: u64) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            state: Mutex::new(SimState {
                address: address.into(),
                chain_id,
                connected: false,
                reject_next: None,
                panic_next: false,
                fail_queries: false,
                deferred_connects: VecDeque::new(),
                submitted: Vec::new(),
            }),
            events,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Next approval-type call (connect / sign) fails with `message`
    pub fn reject_next(&self, message: impl Into<String>) {
        self.lock().reject_next = Some(message.into());
    }

    /// Next approval-type call panics inside the provider
    pub fn panic_next(&self) {
        self.lock().panic_next = true;
    }

    /// Make `is_connected` / `get_accounts` error out
    pub fn fail_queries(&self, fail: bool) {
        self.lock().fail_queries = fail;
    }

    /// Pretend a session already exists (or not) on the wallet side
    pub fn set_connected(&self, connected: bool) {
        self.lock().connected = connected;
    }

    /// Hold the next `connect` until the returned sender fires
    pub fn defer_connect(&self) -> oneshot::Sender<ConnectReply> {
        let (tx, rx) = oneshot::channel();
        self.lock().deferred_connects.push_back(rx);
        tx
    }

    /// User switched account in the wallet UI
    pub fn switch_account(&self, address: Option<String>) {
        {
            let mut state = self.lock();
            match &address {
                Some(address) => state.address = address.clone(),
                None => state.connected = false,
            }
        }
        let _ = self.events.send(ProviderEvent::AccountChanged(address));
    }

    /// User switched network in the wallet UI
    pub fn switch_network(&self, chain_id: u64) {
        self.lock().chain_id = chain_id;
        let _ = self.events.send(ProviderEvent::NetworkChanged { chain_id });
    }

    pub fn submitted(&self) -> Vec<EntryFunctionPayload> {
        self.lock().submitted.clone()
    }

    fn scripted_outcome(&self) -> Result<(), ProviderFailure> {
        let (panic_next, reject_next) = {
            let mut state = self.lock();
            (std::mem::take(&mut state.panic_next), state.reject_next.take())
        };
        if panic_next {
            panic!("simulated wallet crash");
        }
        match reject_next {
            Some(message) => Err(ProviderFailure(message)),
            None => Ok(()),
        }
    }

    fn query_outcome(&self) -> Result<(), ProviderFailure> {
        if self.lock().fail_queries {
            return Err(ProviderFailure("Wallet RPC unavailable".to_string()));
        }
        Ok(())
    }

    fn require_connected(&self) -> Result<(), ProviderFailure> {
        if !self.lock().connected {
            return Err(ProviderFailure("Wallet not connected".to_string()));
        }
        Ok(())
    }
}

fn random_hex(len: usize) -> String {
    let bytes: Vec<u8> = (0..len).map(|_| rand::random::<u8>()).collect();
    format!("0x{}", hex::encode(bytes))
}

#[async_trait]
impl WalletProvider for SimulatedWallet {
    async fn connect(&self) -> Result<String, ProviderFailure> {
        self.scripted_outcome()?;
        let deferred = self.lock().deferred_connects.pop_front();

        let address = match deferred {
            Some(reply) => reply
                .await
                .map_err(|_| ProviderFailure("Connection request dropped".to_string()))??,
            None => {
                let state = self.lock();
                state.address.clone()
            }
        };

        let mut state = self.lock();
        state.connected = true;
        state.address = address.clone();
        Ok(address)
    }

    async fn disconnect(&self) -> Result<(), ProviderFailure> {
        self.lock().connected = false;
        Ok(())
    }

    async fn is_connected(&self) -> Result<bool, ProviderFailure> {
        self.query_outcome()?;
        Ok(self.lock().connected)
    }

    async fn get_accounts(&self) -> Result<Vec<String>, ProviderFailure> {
        self.query_outcome()?;
        let state = self.lock();
        if state.connected {
            Ok(vec![state.address.clone()])
        } else {
            Ok(Vec::new())
        }
    }

    async fn network(&self) -> Result<NetworkInfo, ProviderFailure> {
        let chain_id = self.lock().chain_id;
        Ok(NetworkInfo {
            chain_id,
            name: format!("supra-{}", chain_id),
        })
    }

    async fn sign_transaction(&self, payload: &EntryFunctionPayload) -> Result<serde_json::Value, ProviderFailure> {
        self.require_connected()?;
        self.scripted_outcome()?;
        Ok(serde_json::json!({
            "payload": payload,
            "signature": random_hex(64),
        }))
    }

    async fn sign_and_submit_transaction(&self, payload: &EntryFunctionPayload) -> Result<TxHash, ProviderFailure> {
        self.require_connected()?;
        self.scripted_outcome()?;
        let hash = random_hex(32);
        info!("Simulated wallet submitted {} as {}", payload.function, hash);
        self.lock().submitted.push(payload.clone());
        Ok(TxHash(hash))
    }

    async fn sign_message(&self, _message: &str) -> Result<String, ProviderFailure> {
        self.require_connected()?;
        self.scripted_outcome()?;
        Ok(random_hex(64))
    }

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.events.subscribe()
    }
}
