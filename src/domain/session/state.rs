//! Wallet session state and its reducer

use serde::{Deserialize, Serialize};

/// Connection status; address and chain only exist while connected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected { address: String, chain_id: u64 },
}

/// Events driving the session state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    ConnectStarted,
    ConnectSucceeded { address: String, chain_id: u64 },
    ConnectFailed { error: String },
    Disconnected,
    AccountChanged(Option<String>),
    NetworkChanged(u64),
    /// An existing provider session was found on load
    SessionRestored { address: String, chain_id: u64 },
    /// The provider affirmatively reports no active account
    SessionAbsent,
    ErrorSet(Option<String>),
}

/// Process-wide wallet session.
///
/// Fields are private: the only way to obtain a new state is [`WalletSession::reduce`],
/// which keeps `connected => address` and `connecting => !connected` true by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletSession {
    status: ConnectionStatus,
    error: Option<String>,
}

impl Default for WalletSession {
    fn default() -> Self {
        Self {
            status: ConnectionStatus::Disconnected,
            error: None,
        }
    }
}

impl WalletSession {
    pub fn status(&self) -> &ConnectionStatus {
        &self.status
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.status, ConnectionStatus::Connected { .. })
    }

    pub fn is_connecting(&self) -> bool {
        matches!(self.status, ConnectionStatus::Connecting)
    }

    pub fn address(&self) -> Option<&str> {
        match &self.status {
            ConnectionStatus::Connected { address, .. } => Some(address),
            _ => None,
        }
    }

    pub fn chain_id(&self) -> Option<u64> {
        match &self.status {
            ConnectionStatus::Connected { chain_id, .. } => Some(*chain_id),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Compute the next state. Events that make no sense in the current
    /// state leave it unchanged.
    pub fn reduce(&self, event: SessionEvent) -> WalletSession {
        use ConnectionStatus::*;

        let mut next = self.clone();
        match (event, &self.status) {
            (SessionEvent::ConnectStarted, _) => {
                next.status = Connecting;
                next.error = None;
            }
            (SessionEvent::ConnectSucceeded { address, chain_id }, Connecting) => {
                next.status = Connected { address, chain_id };
                next.error = None;
            }
            (SessionEvent::ConnectFailed { error }, Connecting) => {
                next.status = Disconnected;
                next.error = Some(error);
            }
            (SessionEvent::Disconnected, _) => {
                next.status = Disconnected;
                next.error = None;
            }
            (SessionEvent::AccountChanged(None), Connected { .. }) => {
                next.status = Disconnected;
            }
            (SessionEvent::AccountChanged(Some(address)), Connected { chain_id, .. }) => {
                next.status = Connected {
                    address,
                    chain_id: *chain_id,
                };
            }
            (SessionEvent::NetworkChanged(chain_id), Connected { address, .. }) => {
                next.status = Connected {
                    address: address.clone(),
                    chain_id,
                };
            }
            (SessionEvent::SessionRestored { address, chain_id }, Disconnected | Connected { .. }) => {
                next.status = Connected { address, chain_id };
            }
            (SessionEvent::SessionAbsent, Connected { .. }) => {
                next.status = Disconnected;
            }
            (SessionEvent::ErrorSet(error), _) => {
                next.error = error;
            }
            _ => {}
        }
        next
    }
}
