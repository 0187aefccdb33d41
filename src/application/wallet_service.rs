//! Wallet session service: connect / disconnect / check-connection

use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::session::{Epoch, SessionEvent, SessionStore, WalletSession};
use crate::infrastructure::provider::{ProviderBridge, ProviderEvent};
use crate::infrastructure::storage::SessionHintStore;

/// Drives the session through the provider bridge. All provider outcomes end
/// up as session state; none of these operations return an error.
pub struct WalletService {
    bridge: Arc<ProviderBridge>,
    store: Arc<SessionStore>,
    hints: Arc<dyn SessionHintStore>,
    listener: Mutex<Option<JoinHandle<()>>>,
    error_raised_at: Mutex<Option<DateTime<Utc>>>,
    error_ttl: Duration,
    install_url: String,
}

impl WalletService {
    pub fn new(
        bridge: Arc<ProviderBridge>,
        store: Arc<SessionStore>,
        hints: Arc<dyn SessionHintStore>,
        error_ttl: Duration,
        install_url: impl Into<String>,
    ) -> Self {
        Self {
            bridge,
            store,
            hints,
            listener: Mutex::new(None),
            error_raised_at: Mutex::new(None),
            error_ttl,
            install_url: install_url.into(),
        }
    }

    pub fn session(&self) -> WalletSession {
        self.store.snapshot()
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn bridge(&self) -> &Arc<ProviderBridge> {
        &self.bridge
    }

    /// Where to send the user when no wallet is injected
    pub fn install_url(&self) -> &str {
        &self.install_url
    }

    /// Address remembered from a previous run. Display only.
    pub async fn address_hint(&self) -> Option<String> {
        match self.hints.load().await {
            Ok(hint) => hint,
            Err(e) => {
                warn!("Failed to read session hint: {}", e);
                None
            }
        }
    }

    pub async fn connect(&self) -> WalletSession {
        let epoch = self.store.begin(SessionEvent::ConnectStarted);
        *self.lock_raised_at() = None;

        match self.bridge.connect().await {
            Ok(conn) => {
                let applied = self.store.apply(
                    epoch,
                    SessionEvent::ConnectSucceeded {
                        address: conn.address.clone(),
                        chain_id: conn.chain_id,
                    },
                );
                if applied {
                    info!("Wallet connected: {} (chain {})", conn.address, conn.chain_id);
                    self.start_listener(epoch);
                    self.persist_hint(Some(&conn.address)).await;
                }
            }
            Err(e) => {
                warn!("Wallet connection error: {}", e);
                if self.store.apply(epoch, SessionEvent::ConnectFailed { error: e.to_string() }) {
                    self.mark_error_raised();
                }
            }
        }
        self.session()
    }

    /// Local state is reset first and always wins over the provider's view
    pub async fn disconnect(&self) -> WalletSession {
        self.store.begin(SessionEvent::Disconnected);
        *self.lock_raised_at() = None;
        self.stop_listener();
        self.persist_hint(None).await;

        self.bridge.disconnect().await;
        info!("Wallet disconnected");
        self.session()
    }

    /// Re-validate against the provider. Query failures keep the current state.
    pub async fn check_connection(&self) -> WalletSession {
        let epoch = self.store.epoch();

        match self.bridge.check_connection().await {
            Ok(Some(conn)) => {
                let restored = self.store.apply(
                    epoch,
                    SessionEvent::SessionRestored {
                        address: conn.address.clone(),
                        chain_id: conn.chain_id,
                    },
                );
                if restored && self.store.snapshot().is_connected() {
                    info!("Restored wallet session for {}", conn.address);
                    if !self.listener_running() {
                        self.start_listener(epoch);
                    }
                    self.persist_hint(Some(&conn.address)).await;
                }
            }
            Ok(None) => {
                if self.store.apply(epoch, SessionEvent::SessionAbsent) && !self.store.snapshot().is_connected() {
                    self.stop_listener();
                    self.persist_hint(None).await;
                }
            }
            Err(e) => warn!("Check connection error: {}", e),
        }
        self.session()
    }

    pub fn set_error(&self, error: Option<String>) {
        let raised = error.is_some();
        self.store.dispatch(SessionEvent::ErrorSet(error));
        *self.lock_raised_at() = raised.then(Utc::now);
    }

    /// The session error while it is still within its display window
    pub fn visible_error(&self, now: DateTime<Utc>) -> Option<String> {
        let error = self.store.snapshot().error()?.to_string();
        match *self.lock_raised_at() {
            Some(raised_at) if now - raised_at >= self.error_ttl => None,
            _ => Some(error),
        }
    }

    /// Clear the error once its display window has passed
    pub fn dismiss_expired_error(&self, now: DateTime<Utc>) -> bool {
        if self.store.snapshot().error().is_none() || self.visible_error(now).is_some() {
            return false;
        }
        self.set_error(None);
        true
    }

    fn mark_error_raised(&self) {
        *self.lock_raised_at() = Some(Utc::now());
    }

    fn lock_raised_at(&self) -> std::sync::MutexGuard<'_, Option<DateTime<Utc>>> {
        self.error_raised_at.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_listener(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.listener.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn listener_running(&self) -> bool {
        self.lock_listener().as_ref().is_some_and(|handle| !handle.is_finished())
    }

    fn stop_listener(&self) {
        if let Some(handle) = self.lock_listener().take() {
            handle.abort();
        }
    }

    /// Forward wallet push events into the session for as long as `epoch` is current.
    /// A superseded epoch never replaces the running listener.
    fn start_listener(&self, epoch: Epoch) {
        let mut listener = self.lock_listener();
        if self.store.epoch() != epoch {
            debug!("Not starting wallet listener for superseded {:?}", epoch);
            return;
        }
        let Some(mut events) = self.bridge.subscribe() else {
            return;
        };
        let store = self.store.clone();
        let hints = self.hints.clone();

        let handle = tokio::spawn(async move {
            loop {
                let event = match events.recv().await {
                    Ok(event) => event,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Missed {} wallet events", skipped);
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };
                let applied = match event {
                    ProviderEvent::AccountChanged(account) => {
                        info!("Wallet account changed: {:?}", account);
                        store.apply(epoch, SessionEvent::AccountChanged(account))
                    }
                    ProviderEvent::NetworkChanged { chain_id } => {
                        info!("Wallet network changed: {}", chain_id);
                        store.apply(epoch, SessionEvent::NetworkChanged(chain_id))
                    }
                };
                if applied {
                    let address = store.snapshot().address().map(str::to_string);
                    if let Err(e) = hints.save(address.as_deref()).await {
                        warn!("Failed to persist session hint: {}", e);
                    }
                }
            }
        });

        if let Some(previous) = listener.replace(handle) {
            previous.abort();
        }
    }

    async fn persist_hint(&self, address: Option<&str>) {
        if let Err(e) = self.hints.save(address).await {
            warn!("Failed to persist session hint: {}", e);
        }
    }
}

impl Drop for WalletService {
    fn drop(&mut self) {
        self.stop_listener();
    }
}
