//! Constant tables for the wallet core
//!
//! Centralized registry for gas limits, preset multipliers, timing defaults
//! and hook context labels.

/// Gas limits and fee math
pub mod gas {
    /// Minimum limit for a plain value transfer
    pub const MIN_GAS_LIMIT: u64 = 21_000;
    /// Floor for user-supplied gas prices (gwei)
    pub const MIN_GAS_PRICE_GWEI: f64 = 1.0;

    pub const TRANSFER_LIMIT: u64 = 21_000;
    pub const CONTRACT_LIMIT: u64 = 150_000;
    pub const NFT_LIMIT: u64 = 85_000;
    pub const STAKE_LIMIT: u64 = 120_000;
    pub const DEFAULT_LIMIT: u64 = 65_000;

    /// Applied when the descriptor carries calldata or a contract flag
    pub const COMPLEXITY_FACTOR: f64 = 1.5;
    /// Not-to-exceed buffer on top of the computed fee
    pub const MAX_FEE_BUFFER: f64 = 1.20;

    pub const SLOW_MULTIPLIER: f64 = 0.9;
    pub const STANDARD_MULTIPLIER: f64 = 1.0;
    pub const FAST_MULTIPLIER: f64 = 1.25;

    pub const GWEI_PER_NATIVE: f64 = 1e9;
    /// Decimal places used for native fee strings
    pub const FEE_DECIMALS: usize = 6;
}

/// Mock network snapshot
pub mod network {
    pub const BASE_FEE_GWEI: f64 = 15.5;
    pub const PRIORITY_FEE_GWEI: f64 = 2.0;
    pub const STANDARD_GAS_PRICE_GWEI: f64 = 25.0;
    pub const AVG_BLOCK_TIME_SECS: f64 = 12.0;
    pub const NATIVE_USD_PRICE: f64 = 2000.0;
    pub const SIMULATED_LATENCY_MS: u64 = 300;
}

/// Timing defaults for the connection manager
pub mod timing {
    pub const CONNECT_TIMEOUT_MS: u64 = 30_000;
    pub const DISCONNECT_TIMEOUT_MS: u64 = 10_000;
    /// 24h sessions
    pub const SESSION_TTL_SECS: i64 = 86_400;
    pub const EXPIRY_WARNING_SECS: i64 = 600;
    pub const ERROR_AUTO_CLEAR_MS: i64 = 4_000;
    pub const HANDSHAKE_LATENCY_MS: u64 = 500;
}

/// Context labels passed to `on_error`
pub mod context {
    pub const CONNECT: &str = "connect";
    pub const DISCONNECT: &str = "disconnect";
    pub const CHAIN_CHANGED: &str = "chainChanged";
    pub const SESSION: &str = "session";
    pub const GAS: &str = "gas";
}

/// Environment variables read by `ManagerConfig::from_env`
pub mod env {
    pub const APP: &str = "CRYB_APP";
    pub const ROOT: &str = "CRYB_ROOT";
    pub const WEB3_ENABLED: &str = "CRYB_WEB3_ENABLED";
    pub const INSTALL_PROMPTS: &str = "CRYB_INSTALL_PROMPTS";
    pub const CONNECT_TIMEOUT_MS: &str = "CRYB_CONNECT_TIMEOUT_MS";
    pub const SESSION_TTL_SECS: &str = "CRYB_SESSION_TTL_SECS";
    pub const LOG_JSON: &str = "CRYB_LOG_JSON";
    /// CLI only: comma-separated `global.flag` specs for the static probe
    pub const INJECT: &str = "CRYB_INJECT";
}
