//! Connection states, retry actions and provider events.

use serde::Serialize;

use super::session::ConnectionSession;
use crate::errors::ClassifiedError;
use crate::providers::{InstallInfo, ProviderId};

/// What `retry()` does from an `Error` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "provider", rename_all = "lowercase")]
pub enum RetryAction {
    /// Re-run `connect` with the same provider.
    Connect(ProviderId),
    /// Nothing to re-run; retrying clears the error.
    Dismiss,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum ConnectionState {
    Uninitialized,
    Disconnected,
    Connecting { provider: ProviderId },
    Connected { session: ConnectionSession },
    Error { error: ClassifiedError, retry: RetryAction },
}

impl ConnectionState {
    pub fn name(&self) -> &'static str {
        match self {
            ConnectionState::Uninitialized => "uninitialized",
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting { .. } => "connecting",
            ConnectionState::Connected { .. } => "connected",
            ConnectionState::Error { .. } => "error",
        }
    }

    pub fn session(&self) -> Option<&ConnectionSession> {
        match self { ConnectionState::Connected { session } => Some(session), _ => None }
    }

    pub fn error(&self) -> Option<&ClassifiedError> {
        match self { ConnectionState::Error { error, .. } => Some(error), _ => None }
    }

    pub fn is_connected(&self) -> bool { matches!(self, ConnectionState::Connected { .. }) }
    pub fn is_connecting(&self) -> bool { matches!(self, ConnectionState::Connecting { .. }) }
}

/// Non-error results of `connect`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ConnectOutcome {
    Connected { session: ConnectionSession },
    /// Provider missing and install prompts enabled; no handshake was attempted.
    InstallRequired { install: InstallInfo },
    /// Web3 features are switched off for this deployment.
    ComingSoon,
}

/// Events pushed by the wallet's event source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    AccountsChanged(Vec<String>),
    ChainChanged(u64),
    Disconnect,
}
