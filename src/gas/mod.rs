//! Gas Estimation Engine
//!
//! ```text
//! TransactionDescriptor ──┐
//!                         ├──► estimate() → BaseGasParams ──► apply_preset(preset, custom) → GasEstimate
//! NetworkOracle.snapshot()┘
//! ```
//!
//! | Type | Base limit | ×1.5 with data / contract flag |
//! |------|-----------:|-------------------------------:|
//! | transfer | 21 000 | 31 500 |
//! | contract, swap | 150 000 | 225 000 |
//! | nft | 85 000 | 127 500 |
//! | stake | 120 000 | 180 000 |
//! | other | 65 000 | 97 500 |
//!
//! | Preset | Price |
//! |--------|-------|
//! | slow | standard × 0.9 |
//! | standard | standard × 1.0 |
//! | fast | standard × 1.25 |
//! | custom | user input, ≥ 1 gwei, limit ≥ 21 000 |

mod descriptor;
mod estimate;
mod estimator;
mod network;

pub use descriptor::{TransactionDescriptor, TransactionType};
pub use estimate::{apply_preset, estimate, format_native, BaseGasParams, Confidence, CustomGas, GasEstimate, GasPreset};
pub use estimator::{EstimationStatus, GasEstimator};
pub use network::{Congestion, MockNetworkOracle, NetworkOracle, NetworkStatus};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GasError {
    #[error("malformed transaction descriptor: {0}")]
    MalformedDescriptor(String),

    #[error("network snapshot unavailable: {0}")]
    Network(String),
}
