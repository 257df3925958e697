//! GasEstimator - holds the caller's current descriptor, preset and estimate.
//!
//! Every change recomputes the whole `GasEstimate` and replaces it. A failed
//! estimation leaves the last good estimate in place and records a classified
//! error with a retry path. Overlapping calls commit in the order they were
//! issued: a result whose call has been overtaken is returned to its caller
//! but never replaces the newer estimate.

use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};

use super::descriptor::TransactionDescriptor;
use super::estimate::{apply_preset, estimate, BaseGasParams, CustomGas, GasEstimate, GasPreset};
use super::network::NetworkOracle;
use super::GasError;
use crate::core::consts::context;
use crate::core::hooks::{NoHooks, WalletHooks};
use crate::errors::{ClassifiedError, ErrorKind, RawError};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum EstimationStatus {
    Idle,
    Estimating,
    Ready,
    /// Recoverable; `GasEstimator::retry` re-runs the last descriptor.
    Failed { error: ClassifiedError },
}

#[derive(Default)]
struct EstimatorInner {
    descriptor: Option<TransactionDescriptor>,
    base: Option<BaseGasParams>,
    preset: GasPreset,
    custom: Option<CustomGas>,
    current: Option<GasEstimate>,
    status: Option<EstimationStatus>,
    /// Bumped by every `estimate_gas` call
    generation: u64,
}

pub struct GasEstimator {
    oracle: Arc<dyn NetworkOracle>,
    hooks: Arc<dyn WalletHooks>,
    inner: Mutex<EstimatorInner>,
}

impl GasEstimator {
    pub fn new(oracle: Arc<dyn NetworkOracle>) -> Self {
        Self { oracle, hooks: Arc::new(NoHooks), inner: Mutex::new(EstimatorInner::default()) }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn WalletHooks>) -> Self { self.hooks = hooks; self }

    fn lock(&self) -> MutexGuard<'_, EstimatorInner> {
        self.inner.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn current(&self) -> Option<GasEstimate> { self.lock().current.clone() }
    pub fn preset(&self) -> GasPreset { self.lock().preset }
    pub fn status(&self) -> EstimationStatus { self.lock().status.clone().unwrap_or(EstimationStatus::Idle) }

    /// Fetch a network snapshot and estimate `descriptor` under the current preset.
    pub async fn estimate_gas(&self, descriptor: TransactionDescriptor) -> Result<GasEstimate, ClassifiedError> {
        let ticket = {
            let mut inner = self.lock();
            inner.generation += 1;
            inner.descriptor = Some(descriptor.clone());
            inner.status = Some(EstimationStatus::Estimating);
            inner.generation
        };
        match self.compute(&descriptor).await {
            Ok(base) => {
                let estimate = {
                    let mut inner = self.lock();
                    let estimate = apply_preset(&base, inner.preset, inner.custom.as_ref());
                    if inner.generation != ticket {
                        tracing::debug!(tx_type = descriptor.tx_type.as_str(), "stale gas estimate discarded");
                        return Ok(estimate);
                    }
                    inner.base = Some(base);
                    inner.current = Some(estimate.clone());
                    inner.status = Some(EstimationStatus::Ready);
                    estimate
                };
                tracing::debug!(
                    preset = estimate.preset.as_str(),
                    gas_limit = estimate.gas_limit,
                    fee = %estimate.fee,
                    "gas estimate updated"
                );
                self.hooks.on_gas_estimate_change(&estimate);
                Ok(estimate)
            }
            Err(e) => {
                // the message carries oracle and user text, so it is not reclassified
                let error = ClassifiedError::of(ErrorKind::GasEstimationFailed).with_details(&RawError::new(e.to_string()));
                {
                    let mut inner = self.lock();
                    if inner.generation != ticket {
                        tracing::debug!("stale gas estimation failure discarded: {}", e);
                        return Err(error);
                    }
                    inner.status = Some(EstimationStatus::Failed { error: error.clone() });
                }
                tracing::warn!("gas estimation failed: {}", e);
                self.hooks.on_error(&error, context::GAS);
                Err(error)
            }
        }
    }

    async fn compute(&self, descriptor: &TransactionDescriptor) -> Result<BaseGasParams, GasError> {
        // validate before paying for a network round trip
        descriptor.validate()?;
        let network = self.oracle.snapshot().await?;
        estimate(descriptor, &network)
    }

    /// Switch preset and recompute from the cached base params.
    pub fn set_preset(&self, preset: GasPreset) -> Option<GasEstimate> {
        let estimate = {
            let mut inner = self.lock();
            inner.preset = preset;
            Self::recompute(&mut inner)
        };
        if let Some(estimate) = &estimate { self.hooks.on_gas_estimate_change(estimate); }
        estimate
    }

    /// Store clamped custom inputs and switch to the custom preset.
    pub fn set_custom_gas(&self, gas_price_gwei: f64, gas_limit: u64) -> Option<GasEstimate> {
        let estimate = {
            let mut inner = self.lock();
            inner.custom = Some(CustomGas::new(gas_price_gwei, gas_limit));
            inner.preset = GasPreset::Custom;
            Self::recompute(&mut inner)
        };
        if let Some(estimate) = &estimate { self.hooks.on_gas_estimate_change(estimate); }
        estimate
    }

    fn recompute(inner: &mut EstimatorInner) -> Option<GasEstimate> {
        let base = inner.base.as_ref()?;
        let estimate = apply_preset(base, inner.preset, inner.custom.as_ref());
        inner.current = Some(estimate.clone());
        Some(estimate)
    }

    /// Re-run the last descriptor against a fresh network snapshot.
    pub async fn refresh_network(&self) -> Result<GasEstimate, ClassifiedError> {
        let descriptor = self.lock().descriptor.clone();
        match descriptor {
            Some(d) => self.estimate_gas(d).await,
            None => Err(ClassifiedError::of(ErrorKind::GasEstimationFailed)),
        }
    }

    pub async fn retry(&self) -> Result<GasEstimate, ClassifiedError> { self.refresh_network().await }
}
