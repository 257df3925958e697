//! ConnectionManager - owns the single wallet connection of an app instance.
//!
//! All mutation goes through one `Mutex<ManagerInner>` that is released before
//! every await (handshake, backend disconnect, store I/O). Each transition is
//! published on a watch channel; hooks fire after the lock is dropped.
//!
//! Store writes are serialized and always persist the state current at write
//! time, so a slow save can never outlive a later disconnect.

use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::{mpsc, watch, Mutex as AsyncMutex};
use tokio::task::JoinHandle;

use super::backend::{Handshake, ProviderError, WalletBackend};
use super::chains::is_supported;
use super::config::ManagerConfig;
use super::session::{ConnectionSession, SessionHealth};
use super::state::{ConnectOutcome, ConnectionState, ProviderEvent, RetryAction};
use super::store::{PersistedSession, SessionStore};
use super::ConnectError;
use crate::core::consts::context;
use crate::core::hooks::{NoHooks, WalletHooks};
use crate::errors::{classify, ErrorFeed, FeedEntry, RawError};
use crate::providers::{ProviderId, ProviderRegistry};

struct ManagerInner {
    state: ConnectionState,
    /// Provider events that arrived while `Connecting`
    pending: Vec<ProviderEvent>,
    remembered: Option<PersistedSession>,
    feed: ErrorFeed,
    torn_down: bool,
}

pub struct ConnectionManager {
    config: ManagerConfig,
    registry: ProviderRegistry,
    backend: Arc<dyn WalletBackend>,
    store: SessionStore,
    hooks: Arc<dyn WalletHooks>,
    inner: Mutex<ManagerInner>,
    state_tx: watch::Sender<ConnectionState>,
    /// Flips to true on teardown; event pumps watch it
    stopped: watch::Sender<bool>,
    persist: AsyncMutex<()>,
}

impl ConnectionManager {
    pub fn new(config: ManagerConfig, registry: ProviderRegistry, backend: Arc<dyn WalletBackend>) -> Self {
        let store = if config.persist {
            SessionStore::for_app(&config.resolved_root(), &config.app)
        } else {
            SessionStore::memory()
        };
        let (state_tx, _) = watch::channel(ConnectionState::Uninitialized);
        let inner = ManagerInner {
            state: ConnectionState::Uninitialized,
            pending: Vec::new(),
            remembered: None,
            feed: ErrorFeed::new(config.error_auto_clear),
            torn_down: false,
        };
        Self {
            config,
            registry,
            backend,
            store,
            hooks: Arc::new(NoHooks),
            inner: Mutex::new(inner),
            state_tx,
            stopped: watch::channel(false).0,
            persist: AsyncMutex::new(()),
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn WalletHooks>) -> Self { self.hooks = hooks; self }
    pub fn with_store(mut self, store: SessionStore) -> Self { self.store = store; self }

    fn lock(&self) -> MutexGuard<'_, ManagerInner> {
        self.inner.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn transition(&self, inner: &mut ManagerInner, next: ConnectionState) {
        tracing::info!(from = inner.state.name(), to = next.name(), "connection state changed");
        inner.state = next.clone();
        self.state_tx.send_replace(next);
    }

    pub fn config(&self) -> &ManagerConfig { &self.config }
    pub fn registry(&self) -> &ProviderRegistry { &self.registry }
    pub fn state(&self) -> ConnectionState { self.lock().state.clone() }
    pub fn session(&self) -> Option<ConnectionSession> { self.lock().state.session().cloned() }
    pub fn remembered(&self) -> Option<PersistedSession> { self.lock().remembered.clone() }

    /// Latest state plus every later transition.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> { self.state_tx.subscribe() }

    /// Visible error feed; transient kinds drop out after `error_auto_clear`.
    pub fn errors(&self) -> Vec<FeedEntry> { self.lock().feed.visible() }
    pub fn errors_at(&self, now: DateTime<Utc>) -> Vec<FeedEntry> { self.lock().feed.visible_at(now) }
    pub fn dismiss_error(&self, id: u64) -> bool { self.lock().feed.dismiss(id) }

    /// Read the persisted record and leave `Uninitialized`.
    ///
    /// Only the first call does anything. Expired records are discarded.
    pub async fn init(&self) -> Option<PersistedSession> {
        {
            let inner = self.lock();
            if inner.torn_down || !matches!(inner.state, ConnectionState::Uninitialized) {
                return inner.remembered.clone();
            }
        }
        let loaded = match self.store.load().await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("ignoring unreadable session record: {}", e);
                None
            }
        };
        let remembered = match loaded {
            Some(record) if record.expires_at <= Utc::now() => {
                tracing::debug!(provider = record.provider.as_str(), "persisted session expired");
                self.clear_store().await;
                None
            }
            other => other,
        };

        let mut inner = self.lock();
        if inner.torn_down || !matches!(inner.state, ConnectionState::Uninitialized) {
            return inner.remembered.clone();
        }
        inner.remembered = remembered.clone();
        self.transition(&mut inner, ConnectionState::Disconnected);
        remembered
    }

    /// Run the provider handshake and move to `Connected`.
    ///
    /// Feature-flag and install checks happen before any state change. Events
    /// queued during the handshake are replayed once connected.
    pub async fn connect(&self, provider: ProviderId) -> Result<ConnectOutcome, ConnectError> {
        {
            let mut inner = self.lock();
            match &inner.state {
                ConnectionState::Uninitialized => return Err(ConnectError::NotInitialized),
                ConnectionState::Connecting { provider: busy } => return Err(ConnectError::AlreadyConnecting(*busy)),
                ConnectionState::Connected { .. } => return Err(ConnectError::AlreadyConnected),
                ConnectionState::Disconnected | ConnectionState::Error { .. } => {}
            }
            if !self.config.web3_enabled {
                tracing::info!(provider = provider.as_str(), "web3 disabled, connect is coming soon");
                return Ok(ConnectOutcome::ComingSoon);
            }
            if self.config.install_prompts && !self.registry.is_installed(provider) {
                tracing::info!(provider = provider.as_str(), "provider not installed, prompting install");
                return Ok(ConnectOutcome::InstallRequired { install: self.registry.resolve_install_info(provider) });
            }
            inner.pending.clear();
            self.transition(&mut inner, ConnectionState::Connecting { provider });
        }

        let handshake = bounded(self.config.connect_timeout, "connection request", self.backend.request_accounts(provider)).await;
        let result = handshake.and_then(|h| self.build_session(provider, h));

        match result {
            Ok(session) => {
                let pending = {
                    let mut inner = self.lock();
                    if inner.state != (ConnectionState::Connecting { provider }) {
                        tracing::debug!(provider = provider.as_str(), "handshake result superseded");
                        return Err(ConnectError::Superseded);
                    }
                    inner.remembered = Some(PersistedSession::from(&session));
                    self.transition(&mut inner, ConnectionState::Connected { session: session.clone() });
                    std::mem::take(&mut inner.pending)
                };
                tracing::info!(provider = provider.as_str(), account = %session.short_account(), chain_id = session.chain_id, "wallet connected");
                self.hooks.on_connect(provider, &session.account);
                self.sync_store().await;
                for event in pending {
                    self.apply_event(event).await;
                }
                Ok(ConnectOutcome::Connected { session })
            }
            Err(e) => {
                let error = classify(&RawError::from(&e));
                {
                    let mut inner = self.lock();
                    if inner.state != (ConnectionState::Connecting { provider }) {
                        return Err(ConnectError::Superseded);
                    }
                    inner.pending.clear();
                    inner.feed.push(error.clone(), context::CONNECT);
                    self.transition(&mut inner, ConnectionState::Error { error: error.clone(), retry: RetryAction::Connect(provider) });
                }
                tracing::warn!(provider = provider.as_str(), kind = error.kind.as_str(), "connect failed: {}", e);
                self.hooks.on_error(&error, context::CONNECT);
                Err(ConnectError::Failed(error))
            }
        }
    }

    fn build_session(&self, provider: ProviderId, handshake: Handshake) -> Result<ConnectionSession, ProviderError> {
        let account = handshake.accounts.into_iter().next().ok_or_else(|| ProviderError::new("No accounts returned by wallet"))?;
        let now = Utc::now();
        Ok(ConnectionSession {
            provider,
            account,
            chain_id: handshake.chain_id,
            balance_wei: handshake.balance_wei,
            display_name: handshake.display_name,
            connected_at: now,
            expires_at: now + self.config.session_ttl,
        })
    }

    /// Connect with the provider of the remembered session.
    pub async fn reconnect(&self) -> Result<ConnectOutcome, ConnectError> {
        let provider = self.lock().remembered.as_ref().map(|r| r.provider);
        match provider {
            Some(provider) => self.connect(provider).await,
            None => Err(ConnectError::NothingToReconnect),
        }
    }

    /// Clear the session and tell the wallet.
    ///
    /// Outside `Connected` this is a no-op, except that an `Error` state is
    /// dismissed. A backend failure still clears the session and fires
    /// `on_disconnect`; the classified error becomes `Error { retry: Dismiss }`.
    pub async fn disconnect(&self) -> Result<(), ConnectError> {
        let provider = {
            let mut inner = self.lock();
            match &inner.state {
                ConnectionState::Connected { session } => {
                    let provider = session.provider;
                    inner.remembered = None;
                    self.transition(&mut inner, ConnectionState::Disconnected);
                    provider
                }
                ConnectionState::Error { .. } => {
                    self.transition(&mut inner, ConnectionState::Disconnected);
                    return Ok(());
                }
                _ => return Ok(()),
            }
        };

        self.sync_store().await;
        let outcome = bounded(self.config.disconnect_timeout, "disconnect request", self.backend.disconnect(provider)).await;
        tracing::info!(provider = provider.as_str(), "wallet disconnected");
        self.hooks.on_disconnect();

        match outcome {
            Ok(()) => Ok(()),
            Err(e) => {
                let error = classify(&RawError::from(&e));
                {
                    let mut inner = self.lock();
                    inner.feed.push(error.clone(), context::DISCONNECT);
                    if matches!(inner.state, ConnectionState::Disconnected) {
                        self.transition(&mut inner, ConnectionState::Error { error: error.clone(), retry: RetryAction::Dismiss });
                    }
                }
                tracing::warn!(provider = provider.as_str(), kind = error.kind.as_str(), "backend disconnect failed: {}", e);
                self.hooks.on_error(&error, context::DISCONNECT);
                Err(ConnectError::Failed(error))
            }
        }
    }

    /// Run the action bound to the current `Error` state. `None` when nothing ran.
    pub async fn retry(&self) -> Result<Option<ConnectOutcome>, ConnectError> {
        let action = match &self.lock().state {
            ConnectionState::Error { retry, .. } => *retry,
            _ => return Ok(None),
        };
        match action {
            RetryAction::Connect(provider) => self.connect(provider).await.map(Some),
            RetryAction::Dismiss => {
                let mut inner = self.lock();
                if matches!(inner.state, ConnectionState::Error { .. }) {
                    self.transition(&mut inner, ConnectionState::Disconnected);
                }
                Ok(None)
            }
        }
    }

    pub async fn handle_accounts_changed(&self, accounts: Vec<String>) {
        let updated = {
            let mut inner = self.lock();
            let session = match &inner.state {
                ConnectionState::Connecting { .. } => {
                    inner.pending.push(ProviderEvent::AccountsChanged(accounts));
                    return;
                }
                ConnectionState::Connected { session } => session.clone(),
                _ => {
                    tracing::debug!(state = inner.state.name(), "accountsChanged ignored");
                    return;
                }
            };
            match accounts.into_iter().next() {
                None => None,
                Some(account) if account == session.account => return,
                Some(account) => {
                    let session = ConnectionSession { account, display_name: None, ..session };
                    self.transition(&mut inner, ConnectionState::Connected { session: session.clone() });
                    Some(session)
                }
            }
        };
        match updated {
            Some(session) => {
                tracing::info!(account = %session.short_account(), "active account changed");
                self.sync_store().await;
            }
            None => self.drop_session("wallet reported no accounts").await,
        }
    }

    pub async fn handle_chain_changed(&self, chain_id: u64) {
        let unsupported = {
            let mut inner = self.lock();
            let session = match &inner.state {
                ConnectionState::Connecting { .. } => {
                    inner.pending.push(ProviderEvent::ChainChanged(chain_id));
                    return;
                }
                ConnectionState::Connected { session } if session.chain_id == chain_id => return,
                ConnectionState::Connected { session } => ConnectionSession { chain_id, ..session.clone() },
                _ => {
                    tracing::debug!(state = inner.state.name(), "chainChanged ignored");
                    return;
                }
            };
            self.transition(&mut inner, ConnectionState::Connected { session });
            (!is_supported(chain_id)).then(|| {
                let error = classify(&RawError::new(format!("Unsupported chain {}", chain_id)));
                inner.feed.push(error.clone(), context::CHAIN_CHANGED);
                error
            })
        };
        tracing::info!(chain_id, "active chain changed");
        self.sync_store().await;
        if let Some(error) = unsupported {
            tracing::warn!(chain_id, "wallet switched to an unsupported chain");
            self.hooks.on_error(&error, context::CHAIN_CHANGED);
        }
    }

    /// Dispatch one event from the wallet's event source.
    pub async fn apply_event(&self, event: ProviderEvent) {
        match event {
            ProviderEvent::AccountsChanged(accounts) => self.handle_accounts_changed(accounts).await,
            ProviderEvent::ChainChanged(chain_id) => self.handle_chain_changed(chain_id).await,
            ProviderEvent::Disconnect => {
                let queued = {
                    let mut inner = self.lock();
                    let connecting = inner.state.is_connecting();
                    if connecting { inner.pending.push(ProviderEvent::Disconnect); }
                    connecting
                };
                if !queued { self.drop_session("wallet disconnected").await; }
            }
        }
    }

    /// Local teardown for wallet-initiated disconnects: no backend call.
    async fn drop_session(&self, reason: &str) {
        {
            let mut inner = self.lock();
            if !inner.state.is_connected() { return; }
            inner.remembered = None;
            self.transition(&mut inner, ConnectionState::Disconnected);
        }
        tracing::info!("session dropped: {}", reason);
        self.sync_store().await;
        self.hooks.on_disconnect();
    }

    /// Push the expiry to `now + session_ttl`. `None` unless connected and not yet expired.
    pub async fn extend_session(&self) -> Option<ConnectionSession> {
        let session = {
            let mut inner = self.lock();
            let now = Utc::now();
            let session = match &inner.state {
                ConnectionState::Connected { session } if !session.is_expired_at(now) => {
                    ConnectionSession { expires_at: now + self.config.session_ttl, ..session.clone() }
                }
                _ => return None,
            };
            inner.remembered = Some(PersistedSession::from(&session));
            self.transition(&mut inner, ConnectionState::Connected { session: session.clone() });
            session
        };
        tracing::debug!(expires_at = %session.expires_at, "session extended");
        self.sync_store().await;
        Some(session)
    }

    pub fn session_health(&self) -> Option<SessionHealth> { self.session_health_at(Utc::now()) }

    pub fn session_health_at(&self, now: DateTime<Utc>) -> Option<SessionHealth> {
        self.lock().state.session().map(|s| s.health_at(now, self.config.expiry_warning))
    }

    pub async fn check_expiry(&self) -> bool { self.check_expiry_at(Utc::now()).await }

    /// Destroy an expired session: `Error { auth_expired, retry: Connect(provider) }`.
    pub async fn check_expiry_at(&self, now: DateTime<Utc>) -> bool {
        let error = {
            let mut inner = self.lock();
            let provider = match &inner.state {
                ConnectionState::Connected { session } if session.is_expired_at(now) => session.provider,
                _ => return false,
            };
            let error = classify(&RawError::new("Session expired"));
            inner.remembered = None;
            inner.feed.push(error.clone(), context::SESSION);
            self.transition(&mut inner, ConnectionState::Error { error: error.clone(), retry: RetryAction::Connect(provider) });
            error
        };
        tracing::info!("session expired");
        self.sync_store().await;
        self.hooks.on_error(&error, context::SESSION);
        true
    }

    /// Feed provider events from a channel until it closes or the manager is torn down.
    pub fn spawn_event_pump(self: &Arc<Self>, mut events: mpsc::Receiver<ProviderEvent>) -> JoinHandle<()> {
        let manager = Arc::clone(self);
        let mut stopped = self.stopped.subscribe();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = async { let _ = stopped.wait_for(|s| *s).await; } => {
                        tracing::debug!("event pump stopped");
                        break;
                    }
                    event = events.recv() => match event {
                        Some(event) => manager.apply_event(event).await,
                        None => break,
                    },
                }
            }
        })
    }

    /// Stop event pumps and return to `Uninitialized` for good. The persisted record is kept.
    pub async fn teardown(&self) {
        self.stopped.send_replace(true);
        let mut inner = self.lock();
        if inner.torn_down { return; }
        inner.torn_down = true;
        inner.pending.clear();
        inner.feed.clear();
        self.transition(&mut inner, ConnectionState::Uninitialized);
    }

    /// Write the current session to the store, or clear it when there is none.
    ///
    /// Leaves the record alone after teardown.
    async fn sync_store(&self) {
        let _serial = self.persist.lock().await;
        let record = match &self.lock().state {
            ConnectionState::Uninitialized => return,
            ConnectionState::Connected { session } => Some(PersistedSession::from(session)),
            _ => None,
        };
        let result = match &record {
            Some(record) => self.store.save(record).await,
            None => self.store.clear().await,
        };
        if let Err(e) = result {
            tracing::warn!("failed to sync persisted session: {}", e);
        }
    }

    async fn clear_store(&self) {
        let _serial = self.persist.lock().await;
        if let Err(e) = self.store.clear().await {
            tracing::warn!("failed to clear persisted session: {}", e);
        }
    }
}

/// Await `call`, turning an elapsed `limit` into a timeout `ProviderError`.
async fn bounded<T>(
    limit: Option<Duration>,
    what: &str,
    call: impl Future<Output = Result<T, ProviderError>>,
) -> Result<T, ProviderError> {
    match limit {
        None => call.await,
        Some(limit) => match tokio::time::timeout(limit, call).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::new(format!("{} timed out after {}ms", what, limit.as_millis()))),
        },
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager").field("app", &self.config.app).field("state", &self.state().name()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::backend::MockWallet;
    use crate::errors::ErrorKind;
    use crate::providers::StaticProbe;

    fn manager(wallet: Arc<MockWallet>) -> ConnectionManager {
        let probe = StaticProbe::new().with_flag("ethereum", "isMetaMask");
        ConnectionManager::new(ManagerConfig::default(), ProviderRegistry::new(Arc::new(probe)), wallet)
    }

    fn instant_wallet() -> Arc<MockWallet> { Arc::new(MockWallet::new().with_latency(Duration::ZERO)) }

    #[tokio::test]
    async fn connect_requires_init() {
        let m = manager(instant_wallet());
        assert!(matches!(m.connect(ProviderId::MetaMask).await, Err(ConnectError::NotInitialized)));
        m.init().await;
        assert_eq!(m.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn connect_then_already_connected() {
        let m = manager(instant_wallet());
        m.init().await;
        let outcome = m.connect(ProviderId::MetaMask).await.unwrap();
        assert!(matches!(outcome, ConnectOutcome::Connected { .. }));
        assert!(m.state().is_connected());
        assert!(matches!(m.connect(ProviderId::MetaMask).await, Err(ConnectError::AlreadyConnected)));
    }

    #[tokio::test]
    async fn empty_handshake_is_a_failure() {
        struct NoAccounts;
        #[async_trait::async_trait]
        impl WalletBackend for NoAccounts {
            async fn request_accounts(&self, _: ProviderId) -> Result<Handshake, ProviderError> {
                Ok(Handshake { accounts: vec![], chain_id: 1, balance_wei: 0, display_name: None })
            }
            async fn disconnect(&self, _: ProviderId) -> Result<(), ProviderError> { Ok(()) }
        }

        let probe = StaticProbe::new().with_flag("ethereum", "isMetaMask");
        let m = ConnectionManager::new(ManagerConfig::default(), ProviderRegistry::new(Arc::new(probe)), Arc::new(NoAccounts));
        m.init().await;
        let err = m.connect(ProviderId::MetaMask).await.unwrap_err();
        assert!(matches!(err, ConnectError::Failed(ref e) if e.kind == ErrorKind::WalletNotConnected));
        assert!(matches!(m.state(), ConnectionState::Error { retry: RetryAction::Connect(ProviderId::MetaMask), .. }));
    }

    #[tokio::test]
    async fn retry_dismiss_goes_to_disconnected() {
        let wallet = instant_wallet();
        let m = manager(wallet.clone());
        m.init().await;
        m.connect(ProviderId::MetaMask).await.unwrap();
        wallet.set_disconnect_failure(Some(ProviderError::new("network request failed")));
        assert!(m.disconnect().await.is_err());
        assert!(matches!(m.state(), ConnectionState::Error { retry: RetryAction::Dismiss, .. }));
        assert_eq!(m.retry().await.unwrap(), None);
        assert_eq!(m.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn teardown_is_terminal() {
        let m = manager(instant_wallet());
        m.init().await;
        m.teardown().await;
        assert_eq!(m.state(), ConnectionState::Uninitialized);
        m.init().await;
        assert_eq!(m.state(), ConnectionState::Uninitialized);
        assert!(matches!(m.connect(ProviderId::MetaMask).await, Err(ConnectError::NotInitialized)));
    }
}
