//! The fixed error taxonomy: kinds, severities and user-facing copy.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity { Info, Warning, Error }

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self { Severity::Info => "info", Severity::Warning => "warning", Severity::Error => "error" }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    WalletNotFound,
    WalletNotConnected,
    ConnectionRejected,
    UserRejectedTransaction,
    SignatureRejected,
    ChainSwitchRejected,
    ChainNotAdded,
    UnsupportedChain,
    InsufficientFunds,
    GasEstimationFailed,
    TransactionFailed,
    NetworkError,
    RequestPending,
    AuthExpired,
    Timeout,
    UnknownError,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 16] = [
        ErrorKind::WalletNotFound,
        ErrorKind::WalletNotConnected,
        ErrorKind::ConnectionRejected,
        ErrorKind::UserRejectedTransaction,
        ErrorKind::SignatureRejected,
        ErrorKind::ChainSwitchRejected,
        ErrorKind::ChainNotAdded,
        ErrorKind::UnsupportedChain,
        ErrorKind::InsufficientFunds,
        ErrorKind::GasEstimationFailed,
        ErrorKind::TransactionFailed,
        ErrorKind::NetworkError,
        ErrorKind::RequestPending,
        ErrorKind::AuthExpired,
        ErrorKind::Timeout,
        ErrorKind::UnknownError,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::WalletNotFound => "wallet_not_found",
            ErrorKind::WalletNotConnected => "wallet_not_connected",
            ErrorKind::ConnectionRejected => "connection_rejected",
            ErrorKind::UserRejectedTransaction => "user_rejected_transaction",
            ErrorKind::SignatureRejected => "signature_rejected",
            ErrorKind::ChainSwitchRejected => "chain_switch_rejected",
            ErrorKind::ChainNotAdded => "chain_not_added",
            ErrorKind::UnsupportedChain => "unsupported_chain",
            ErrorKind::InsufficientFunds => "insufficient_funds",
            ErrorKind::GasEstimationFailed => "gas_estimation_failed",
            ErrorKind::TransactionFailed => "transaction_failed",
            ErrorKind::NetworkError => "network_error",
            ErrorKind::RequestPending => "request_pending",
            ErrorKind::AuthExpired => "auth_expired",
            ErrorKind::Timeout => "timeout",
            ErrorKind::UnknownError => "unknown_error",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        let value = value.trim().to_ascii_lowercase();
        Self::ALL.iter().copied().find(|k| k.as_str() == value)
    }

    pub fn severity(&self) -> Severity {
        match self {
            ErrorKind::WalletNotFound
            | ErrorKind::NetworkError
            | ErrorKind::TransactionFailed
            | ErrorKind::UnknownError => Severity::Error,
            ErrorKind::UserRejectedTransaction => Severity::Info,
            _ => Severity::Warning,
        }
    }

    /// Plain user cancellation is the only kind that offers no retry.
    pub fn is_actionable(&self) -> bool { *self != ErrorKind::UserRejectedTransaction }

    /// User-initiated rejections clear themselves from the error feed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ErrorKind::UserRejectedTransaction
                | ErrorKind::ChainSwitchRejected
                | ErrorKind::SignatureRejected
                | ErrorKind::ConnectionRejected
        )
    }

    pub fn title(&self) -> &'static str { self.copy().0 }
    pub fn message(&self) -> &'static str { self.copy().1 }
    pub fn solutions(&self) -> &'static [&'static str] { self.copy().2 }

    fn copy(&self) -> (&'static str, &'static str, &'static [&'static str]) {
        match self {
            ErrorKind::WalletNotFound => (
                "Wallet not found",
                "No compatible wallet was detected in this browser.",
                &["Install a supported wallet extension such as MetaMask", "Refresh the page after installing", "Use WalletConnect to link a mobile wallet"],
            ),
            ErrorKind::WalletNotConnected => (
                "Wallet not connected",
                "Connect your wallet to continue.",
                &["Click Connect Wallet", "Unlock your wallet extension", "Make sure an account is selected in your wallet"],
            ),
            ErrorKind::ConnectionRejected => (
                "Connection rejected",
                "The connection request was declined in your wallet.",
                &["Try connecting again", "Approve the request in your wallet popup"],
            ),
            ErrorKind::UserRejectedTransaction => (
                "Transaction cancelled",
                "You cancelled the transaction in your wallet.",
                &["Submit the transaction again when you are ready"],
            ),
            ErrorKind::SignatureRejected => (
                "Signature rejected",
                "The signature request was declined.",
                &["Sign the message to verify account ownership", "Try again and approve the signature request"],
            ),
            ErrorKind::ChainSwitchRejected => (
                "Network switch rejected",
                "The request to switch networks was declined.",
                &["Approve the network switch in your wallet", "Switch networks manually in your wallet"],
            ),
            ErrorKind::ChainNotAdded => (
                "Network not added",
                "This network is not configured in your wallet yet.",
                &["Approve the request to add the network", "Add the network manually in your wallet settings"],
            ),
            ErrorKind::UnsupportedChain => (
                "Unsupported network",
                "Your wallet is connected to a network CRYB does not support.",
                &["Switch to Ethereum mainnet or a supported network", "Check the list of supported networks"],
            ),
            ErrorKind::InsufficientFunds => (
                "Insufficient funds",
                "Your balance does not cover the amount plus network fees.",
                &["Add funds to your wallet", "Lower the amount", "Choose a slower gas preset"],
            ),
            ErrorKind::GasEstimationFailed => (
                "Gas estimation failed",
                "We could not estimate the network fee for this transaction.",
                &["Try again in a moment", "Set a custom gas limit", "Check the transaction details"],
            ),
            ErrorKind::TransactionFailed => (
                "Transaction failed",
                "The transaction was not executed by the network.",
                &["Check the transaction on a block explorer", "Increase the gas limit and retry"],
            ),
            ErrorKind::NetworkError => (
                "Network error",
                "We could not reach the network.",
                &["Check your internet connection", "Try again in a moment", "Switch to a different RPC endpoint"],
            ),
            ErrorKind::RequestPending => (
                "Request already pending",
                "Your wallet already has a pending request from this site.",
                &["Open your wallet and finish or cancel the pending request"],
            ),
            ErrorKind::AuthExpired => (
                "Session expired",
                "Your wallet session has expired.",
                &["Reconnect your wallet", "Sign in again"],
            ),
            ErrorKind::Timeout => (
                "Request timed out",
                "The wallet did not respond in time.",
                &["Open your wallet and check for a pending request", "Try again"],
            ),
            ErrorKind::UnknownError => (
                "Something went wrong",
                "An unexpected error occurred.",
                &["Try again", "Refresh the page", "Contact support if the problem persists"],
            ),
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.as_str()) }
}
