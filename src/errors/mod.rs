//! Error Classifier - heterogeneous wallet/RPC errors → fixed taxonomy
//!
//! ```text
//! RawError {message, code, stack}
//!     │
//!     ▼
//! classify()  (ordered predicates, first match wins)
//!     │
//!     ▼
//! ClassifiedError {kind, severity, title, message, solutions, actionable}
//!     │
//!     └── ErrorFeed (visible list, transient kinds auto-clear)
//! ```
//!
//! | Severity | Kinds |
//! |----------|-------|
//! | error | wallet_not_found, network_error, transaction_failed, unknown_error |
//! | warning | wallet_not_connected, connection_rejected, gas_estimation_failed, unsupported_chain, chain_switch_rejected, chain_not_added, signature_rejected, auth_expired, timeout, insufficient_funds, request_pending |
//! | info | user_rejected_transaction |

mod classify;
mod feed;
mod taxonomy;

pub use classify::{classify, ClassifiedError, RawError, TechnicalDetails, CODE_CHAIN_NOT_ADDED, CODE_REQUEST_PENDING};
pub use feed::{ErrorFeed, FeedEntry};
pub use taxonomy::{ErrorKind, Severity};
