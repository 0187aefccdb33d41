//! Single-writer session container with epoch guard

use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tracing::debug;

use super::state::{SessionEvent, WalletSession};

/// Identifies the state-mutating operation an async resolution belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Epoch(u64);

/// Owns the one [`WalletSession`].
///
/// Readers get snapshots or a `watch` receiver. Writes go through the reducer and
/// are serialized under the watch lock; an async resolution is applied only if no
/// newer operation has started since its epoch was taken.
#[derive(Debug)]
pub struct SessionStore {
    tx: watch::Sender<WalletSession>,
    epoch: AtomicU64,
    revision: AtomicU64,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(WalletSession::default());
        Self {
            tx,
            epoch: AtomicU64::new(0),
            revision: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> WalletSession {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<WalletSession> {
        self.tx.subscribe()
    }

    /// Current epoch, for operations that must not supersede others
    pub fn epoch(&self) -> Epoch {
        Epoch(self.epoch.load(Ordering::SeqCst))
    }

    /// Bumped on every observable change; quotes compare against it
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }

    /// Start a superseding operation: new epoch, then apply `event`
    pub(crate) fn begin(&self, event: SessionEvent) -> Epoch {
        let mut epoch = 0;
        self.tx.send_if_modified(|session| {
            epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
            self.commit(session, event)
        });
        Epoch(epoch)
    }

    /// Apply `event` if `epoch` is still current. Returns false for stale resolutions.
    pub(crate) fn apply(&self, epoch: Epoch, event: SessionEvent) -> bool {
        let mut applied = false;
        self.tx.send_if_modified(|session| {
            if self.epoch.load(Ordering::SeqCst) != epoch.0 {
                debug!("Dropping stale session event {:?} from epoch {}", event, epoch.0);
                return false;
            }
            applied = true;
            self.commit(session, event)
        });
        applied
    }

    /// Apply a direct user action regardless of epoch
    pub(crate) fn dispatch(&self, event: SessionEvent) {
        self.tx.send_if_modified(|session| self.commit(session, event));
    }

    fn commit(&self, session: &mut WalletSession, event: SessionEvent) -> bool {
        let next = session.reduce(event);
        if next == *session {
            return false;
        }
        *session = next;
        self.revision.fetch_add(1, Ordering::SeqCst);
        true
    }
}
