//! Persisted reconnection hint
//!
//! Only the wallet address survives a restart, and only as a hint for
//! pre-filling the UI. It is never proof of a session.

mod file_hint_store;

pub use file_hint_store::FileHintStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use crate::shared::errors::StorageError;

/// Fixed storage name of the hint
pub const HINT_STORAGE_KEY: &str = "yudiswap-wallet";

/// On-disk layout, compatible with the web app's persisted store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedHint {
    pub state: HintState,
    #[serde(default)]
    pub version: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HintState {
    pub address: Option<String>,
}

/// Storage for the reconnection hint
#[async_trait]
pub trait SessionHintStore: Send + Sync {
    async fn load(&self) -> Result<Option<String>, StorageError>;

    /// `None` clears the hint
    async fn save(&self, address: Option<&str>) -> Result<(), StorageError>;
}

/// Volatile store, used when no storage directory is configured
#[derive(Debug, Default)]
pub struct MemoryHintStore {
    address: Mutex<Option<String>>,
}

impl MemoryHintStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionHintStore for MemoryHintStore {
    async fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self.address.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    async fn save(&self, address: Option<&str>) -> Result<(), StorageError> {
        *self.address.lock().unwrap_or_else(|e| e.into_inner()) = address.map(str::to_string);
        Ok(())
    }
}
