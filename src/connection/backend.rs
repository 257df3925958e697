//! WalletBackend - the provider handshake seam, plus the simulated wallet used by the UI mocks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;

use crate::core::consts::timing;
use crate::errors::RawError;
use crate::providers::ProviderId;

/// Error reported by a wallet provider (EIP-1193 style: optional numeric code + message).
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message}")]
pub struct ProviderError {
    pub code: Option<i64>,
    pub message: String,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self { Self { code: None, message: message.into() } }
    pub fn with_code(mut self, code: i64) -> Self { self.code = Some(code); self }
}

impl From<&ProviderError> for RawError {
    fn from(e: &ProviderError) -> Self { RawError { message: e.message.clone(), code: e.code, stack: None } }
}

/// What a successful `eth_requestAccounts`-style handshake yields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Handshake {
    pub accounts: Vec<String>,
    pub chain_id: u64,
    pub balance_wei: u128,
    pub display_name: Option<String>,
}

#[async_trait]
pub trait WalletBackend: Send + Sync {
    async fn request_accounts(&self, provider: ProviderId) -> Result<Handshake, ProviderError>;
    async fn disconnect(&self, provider: ProviderId) -> Result<(), ProviderError>;
}

/// Simulated wallet: resolves after a delay with a deterministic account, or rejects.
pub struct MockWallet {
    seed: String,
    latency: Duration,
    chain_id: u64,
    balance_wei: u128,
    display_name: Option<String>,
    reject: Mutex<Option<ProviderError>>,
    disconnect_failure: Mutex<Option<ProviderError>>,
    handshakes: AtomicUsize,
    disconnects: AtomicUsize,
}

impl Default for MockWallet {
    fn default() -> Self {
        Self {
            seed: "cryb".into(),
            latency: Duration::from_millis(timing::HANDSHAKE_LATENCY_MS),
            chain_id: 1,
            balance_wei: 1_500_000_000_000_000_000,
            display_name: None,
            reject: Mutex::new(None),
            disconnect_failure: Mutex::new(None),
            handshakes: AtomicUsize::new(0),
            disconnects: AtomicUsize::new(0),
        }
    }
}

impl MockWallet {
    pub fn new() -> Self { Self::default() }
    pub fn with_seed(mut self, seed: impl Into<String>) -> Self { self.seed = seed.into(); self }
    pub fn with_latency(mut self, latency: Duration) -> Self { self.latency = latency; self }
    pub fn with_chain(mut self, chain_id: u64) -> Self { self.chain_id = chain_id; self }
    pub fn with_balance(mut self, wei: u128) -> Self { self.balance_wei = wei; self }
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self { self.display_name = Some(name.into()); self }

    /// Make the next handshakes fail (None restores success).
    pub fn set_reject(&self, error: Option<ProviderError>) {
        *self.reject.lock().unwrap_or_else(|p| p.into_inner()) = error;
    }

    pub fn set_disconnect_failure(&self, error: Option<ProviderError>) {
        *self.disconnect_failure.lock().unwrap_or_else(|p| p.into_inner()) = error;
    }

    pub fn handshake_calls(&self) -> usize { self.handshakes.load(Ordering::SeqCst) }
    pub fn disconnect_calls(&self) -> usize { self.disconnects.load(Ordering::SeqCst) }

    /// `0x` + 40 hex chars derived from seed and provider.
    pub fn account_for(&self, provider: ProviderId) -> String {
        let digest = Sha256::digest(format!("{}:{}", self.seed, provider.as_str()).as_bytes());
        format!("0x{}", &hex::encode(digest)[..40])
    }
}

#[async_trait]
impl WalletBackend for MockWallet {
    async fn request_accounts(&self, provider: ProviderId) -> Result<Handshake, ProviderError> {
        self.handshakes.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() { tokio::time::sleep(self.latency).await; }
        let rejection = self.reject.lock().unwrap_or_else(|p| p.into_inner()).clone();
        if let Some(error) = rejection { return Err(error); }
        Ok(Handshake {
            accounts: vec![self.account_for(provider)],
            chain_id: self.chain_id,
            balance_wei: self.balance_wei,
            display_name: self.display_name.clone(),
        })
    }

    async fn disconnect(&self, _provider: ProviderId) -> Result<(), ProviderError> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        let failure = self.disconnect_failure.lock().unwrap_or_else(|p| p.into_inner()).clone();
        match failure { Some(error) => Err(error), None => Ok(()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accounts_are_deterministic_addresses() {
        let wallet = MockWallet::new();
        let a = wallet.account_for(ProviderId::MetaMask);
        assert_eq!(a.len(), 42);
        assert!(a.starts_with("0x"));
        assert_eq!(a, MockWallet::new().account_for(ProviderId::MetaMask));
        assert_ne!(a, wallet.account_for(ProviderId::Coinbase));
    }

    #[tokio::test]
    async fn rejects_when_configured() {
        let wallet = MockWallet::new().with_latency(Duration::ZERO);
        wallet.set_reject(Some(ProviderError::new("User rejected the request.").with_code(4001)));
        let err = wallet.request_accounts(ProviderId::MetaMask).await.unwrap_err();
        assert_eq!(err.code, Some(4001));
        assert_eq!(wallet.handshake_calls(), 1);
    }
}
