//! Outbound hooks: the callbacks UI layers register with the wallet core.

use crate::errors::ClassifiedError;
use crate::gas::GasEstimate;
use crate::providers::ProviderId;

/// Callbacks fired by `ConnectionManager` and `GasEstimator`.
///
/// Every method defaults to a no-op so callers only implement what they render.
/// Hooks run on the caller's task with no internal lock held.
pub trait WalletHooks: Send + Sync {
    /// Fires exactly once per successful connect.
    fn on_connect(&self, _provider: ProviderId, _account: &str) {}
    fn on_disconnect(&self) {}
    /// `context` names the operation that failed (see `consts::context`).
    fn on_error(&self, _error: &ClassifiedError, _context: &str) {}
    fn on_gas_estimate_change(&self, _estimate: &GasEstimate) {}
}

/// Hooks that ignore everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHooks;

impl WalletHooks for NoHooks {}
