//! CRYB wallet core: provider detection, connection state machine, error taxonomy, gas estimation.
//!
//! # Architecture
//!
//! ```text
//! ConnectionManager (one per app instance)
//!   │
//!   ├── ProviderRegistry ── EnvironmentProbe (injected)
//!   ├── WalletBackend (handshake / disconnect, bounded by timeouts)
//!   ├── SessionStore (<root>/<app>/data/session.json)
//!   ├── ErrorFeed ◄── classify(RawError)
//!   └── watch::Sender<ConnectionState> → UI subscribers
//!
//! GasEstimator
//!   ├── NetworkOracle (snapshot)
//!   └── estimate() → apply_preset() → GasEstimate
//!
//! WalletHooks: on_connect, on_disconnect, on_error, on_gas_estimate_change
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use cryb_wallet::{ConnectionManager, ManagerConfig, MockWallet, ProviderId, ProviderRegistry, StaticProbe};
//! use std::sync::Arc;
//!
//! let registry = ProviderRegistry::new(Arc::new(StaticProbe::new().with_flag("ethereum", "isMetaMask")));
//! let manager = ConnectionManager::new(ManagerConfig::from_env(), registry, Arc::new(MockWallet::new()));
//! manager.init().await;
//! let outcome = manager.connect(ProviderId::MetaMask).await?;
//! ```

pub mod connection;
pub mod core;
pub mod errors;
pub mod gas;
pub mod logging;
pub mod providers;

pub use connection::{
    ConnectError, ConnectOutcome, ConnectionManager, ConnectionSession, ConnectionState, ManagerConfig, MockWallet,
    ProviderError, ProviderEvent, RetryAction, SessionHealth, SessionStore, WalletBackend,
};
pub use crate::core::hooks::{NoHooks, WalletHooks};
pub use errors::{classify, ClassifiedError, ErrorFeed, ErrorKind, RawError, Severity};
pub use gas::{
    GasError, GasEstimate, GasEstimator, GasPreset, MockNetworkOracle, NetworkOracle, NetworkStatus,
    TransactionDescriptor, TransactionType,
};
pub use providers::{EnvironmentProbe, InstallInfo, ProviderId, ProviderRegistry, StaticProbe, WalletProvider};
