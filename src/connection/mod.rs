//! Connection State Machine
//!
//! ```text
//!                  init()
//! Uninitialized ──────────► Disconnected ◄──────────────┐
//!                              │    ▲                    │ disconnect() / accounts []
//!                    connect() │    │ retry(Dismiss)     │
//!                              ▼    │                    │
//!                         Connecting ──ok──► Connected ──┘
//!                              │                 │
//!                          err │                 │ check_expiry()
//!                              ▼                 ▼
//!                            Error { error, retry: Connect(p) | Dismiss }
//! ```
//!
//! | Event while | Connecting | Connected | other |
//! |-------------|------------|-----------|-------|
//! | accountsChanged([]) | queued | → Disconnected, `on_disconnect` | ignored |
//! | accountsChanged([a, ..]) | queued | account updated | ignored |
//! | chainChanged(id) | queued | chain updated, warn if unsupported | ignored |
//! | disconnect | queued | → Disconnected, `on_disconnect` | ignored |

mod backend;
mod chains;
mod config;
mod manager;
mod session;
mod state;
mod store;

pub use backend::{Handshake, MockWallet, ProviderError, WalletBackend};
pub use chains::{is_supported, parse_chain_id, supported_chain, Chain, SUPPORTED_CHAINS};
pub use config::ManagerConfig;
pub use manager::ConnectionManager;
pub use session::{format_address, format_units, ConnectionSession, SessionHealth};
pub use state::{ConnectOutcome, ConnectionState, ProviderEvent, RetryAction};
pub use store::{PersistedSession, SessionStore, StoreError, StoreResult};

use thiserror::Error;

use crate::errors::ClassifiedError;
use crate::providers::ProviderId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConnectError {
    #[error("connection manager not initialized")]
    NotInitialized,

    #[error("already connecting to {}", .0.as_str())]
    AlreadyConnecting(ProviderId),

    #[error("wallet already connected")]
    AlreadyConnected,

    /// The state moved on (teardown) while the handshake was in flight.
    #[error("connect attempt superseded")]
    Superseded,

    #[error("no remembered session to reconnect")]
    NothingToReconnect,

    #[error("{0}")]
    Failed(ClassifiedError),
}

impl ConnectError {
    /// Classified form, for callers that only render the taxonomy.
    pub fn classified(&self) -> Option<&ClassifiedError> {
        match self { ConnectError::Failed(e) => Some(e), _ => None }
    }
}
