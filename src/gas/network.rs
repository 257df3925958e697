//! Network conditions: fee snapshot + the oracle trait that supplies it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use std::time::Duration;

use super::GasError;
use crate::core::consts::network;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Congestion { Low, #[default] Medium, High }

impl Congestion {
    pub fn as_str(&self) -> &'static str {
        match self { Congestion::Low => "low", Congestion::Medium => "medium", Congestion::High => "high" }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Congestion::Low),
            "medium" | "normal" => Some(Congestion::Medium),
            "high" => Some(Congestion::High),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkStatus {
    pub base_fee_gwei: f64,
    pub priority_fee_gwei: f64,
    pub standard_gas_price_gwei: f64,
    pub congestion: Congestion,
    pub avg_block_time_secs: f64,
    /// Native token price in USD
    pub native_usd_price: f64,
    pub fetched_at: DateTime<Utc>,
}

impl Default for NetworkStatus {
    fn default() -> Self {
        Self {
            base_fee_gwei: network::BASE_FEE_GWEI,
            priority_fee_gwei: network::PRIORITY_FEE_GWEI,
            standard_gas_price_gwei: network::STANDARD_GAS_PRICE_GWEI,
            congestion: Congestion::Medium,
            avg_block_time_secs: network::AVG_BLOCK_TIME_SECS,
            native_usd_price: network::NATIVE_USD_PRICE,
            fetched_at: Utc::now(),
        }
    }
}

impl NetworkStatus {
    pub fn with_standard_price(mut self, gwei: f64) -> Self { self.standard_gas_price_gwei = gwei; self }
    pub fn with_congestion(mut self, congestion: Congestion) -> Self { self.congestion = congestion; self }
    pub fn with_native_usd_price(mut self, usd: f64) -> Self { self.native_usd_price = usd; self }
}

/// Source of network fee snapshots.
#[async_trait]
pub trait NetworkOracle: Send + Sync {
    async fn snapshot(&self) -> Result<NetworkStatus, GasError>;
}

/// Fixed snapshot returned after a simulated round trip.
pub struct MockNetworkOracle {
    status: RwLock<NetworkStatus>,
    latency: Duration,
    failure: RwLock<Option<String>>,
}

impl Default for MockNetworkOracle {
    fn default() -> Self { Self::new(NetworkStatus::default()) }
}

impl MockNetworkOracle {
    pub fn new(status: NetworkStatus) -> Self {
        Self { status: RwLock::new(status), latency: Duration::from_millis(network::SIMULATED_LATENCY_MS), failure: RwLock::new(None) }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self { self.latency = latency; self }

    pub fn set_status(&self, status: NetworkStatus) {
        if let Ok(mut guard) = self.status.write() { *guard = status; }
    }

    /// Make subsequent snapshots fail with `message` (None restores success).
    pub fn set_failure(&self, message: Option<&str>) {
        if let Ok(mut guard) = self.failure.write() { *guard = message.map(str::to_string); }
    }
}

#[async_trait]
impl NetworkOracle for MockNetworkOracle {
    async fn snapshot(&self) -> Result<NetworkStatus, GasError> {
        if !self.latency.is_zero() { tokio::time::sleep(self.latency).await; }
        if let Some(message) = self.failure.read().map_err(|_| GasError::Network("lock".into()))?.clone() {
            return Err(GasError::Network(message));
        }
        let mut status = self.status.read().map_err(|_| GasError::Network("lock".into()))?.clone();
        status.fetched_at = Utc::now();
        Ok(status)
    }
}
