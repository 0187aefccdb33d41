//! File-backed hint store

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::shared::errors::StorageError;
use super::{HintState, PersistedHint, SessionHintStore, HINT_STORAGE_KEY};

/// Stores the hint as `<dir>/yudiswap-wallet.json`
#[derive(Debug, Clone)]
pub struct FileHintStore {
    path: PathBuf,
}

impl FileHintStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            path: dir.as_ref().join(format!("{}.json", HINT_STORAGE_KEY)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SessionHintStore for FileHintStore {
    async fn load(&self) -> Result<Option<String>, StorageError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str::<PersistedHint>(&raw) {
            Ok(hint) => Ok(hint.state.address),
            Err(e) => {
                // a corrupt hint is as good as no hint
                warn!("Ignoring unreadable session hint {}: {}", self.path.display(), e);
                Ok(None)
            }
        }
    }

    async fn save(&self, address: Option<&str>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let hint = PersistedHint {
            state: HintState {
                address: address.map(str::to_string),
            },
            version: 0,
        };
        let json = serde_json::to_string(&hint)?;
        tokio::fs::write(&self.path, json).await?;
        debug!("Session hint written to {}", self.path.display());
        Ok(())
    }
}
