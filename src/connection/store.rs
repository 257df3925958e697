//! SessionStore - last-session record, on disk or in memory.
//!
//! File layout: `<root>/<app>/data/session.json`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

use super::session::ConnectionSession;
use crate::providers::ProviderId;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("session store io: {0}")]
    Io(#[from] std::io::Error),

    #[error("session store json: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// What survives a restart: enough to offer `reconnect()`, never the balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSession {
    pub provider: ProviderId,
    pub account: String,
    pub chain_id: u64,
    pub connected_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<&ConnectionSession> for PersistedSession {
    fn from(s: &ConnectionSession) -> Self {
        Self {
            provider: s.provider,
            account: s.account.clone(),
            chain_id: s.chain_id,
            connected_at: s.connected_at,
            expires_at: s.expires_at,
        }
    }
}

enum Backing {
    File(PathBuf),
    Memory(Mutex<Option<PersistedSession>>),
}

pub struct SessionStore {
    backing: Backing,
}

impl SessionStore {
    pub fn memory() -> Self { Self { backing: Backing::Memory(Mutex::new(None)) } }

    pub fn file(path: impl Into<PathBuf>) -> Self { Self { backing: Backing::File(path.into()) } }

    pub fn for_app(root: &Path, app: &str) -> Self { Self::file(root.join(app).join("data").join("session.json")) }

    pub fn path(&self) -> Option<&Path> {
        match &self.backing { Backing::File(p) => Some(p), Backing::Memory(_) => None }
    }

    pub async fn load(&self) -> StoreResult<Option<PersistedSession>> {
        match &self.backing {
            Backing::Memory(slot) => {
                let record = slot.lock().unwrap_or_else(|p| p.into_inner()).clone();
                Ok(record)
            }
            Backing::File(path) => match tokio::fs::read(path).await {
                Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(e.into()),
            },
        }
    }

    pub async fn save(&self, record: &PersistedSession) -> StoreResult<()> {
        match &self.backing {
            Backing::Memory(slot) => {
                *slot.lock().unwrap_or_else(|p| p.into_inner()) = Some(record.clone());
                Ok(())
            }
            Backing::File(path) => {
                if let Some(parent) = path.parent() {
                    tokio::fs::create_dir_all(parent).await?;
                }
                let json = serde_json::to_vec_pretty(record)?;
                tokio::fs::write(path, json).await?;
                Ok(())
            }
        }
    }

    pub async fn clear(&self) -> StoreResult<()> {
        match &self.backing {
            Backing::Memory(slot) => {
                *slot.lock().unwrap_or_else(|p| p.into_inner()) = None;
                Ok(())
            }
            Backing::File(path) => match tokio::fs::remove_file(path).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> PersistedSession {
        let now = Utc::now();
        PersistedSession {
            provider: ProviderId::Coinbase,
            account: "0x742d35cc6634c0532925a3b844bc454e4438f44e".into(),
            chain_id: 8453,
            connected_at: now,
            expires_at: now + chrono::Duration::hours(1),
        }
    }

    #[tokio::test]
    async fn file_store_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::for_app(dir.path(), "cryb-test");
        assert_eq!(store.load().await.unwrap(), None);

        let r = record();
        store.save(&r).await.unwrap();
        assert!(dir.path().join("cryb-test/data/session.json").exists());
        assert_eq!(store.load().await.unwrap(), Some(r));

        store.clear().await.unwrap();
        store.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn corrupt_file_is_a_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, b"{not json").unwrap();
        let err = SessionStore::file(&path).load().await.unwrap_err();
        assert!(matches!(err, StoreError::Json(_)));
    }

    #[tokio::test]
    async fn memory_store() {
        let store = SessionStore::memory();
        assert!(store.path().is_none());
        store.save(&record()).await.unwrap();
        assert!(store.load().await.unwrap().is_some());
        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }
}
