//! Raw error → taxonomy entry. Ordered substring/code predicates, first match wins.

use serde::{Deserialize, Serialize};

use super::taxonomy::{ErrorKind, Severity};

/// Provider code for "unrecognized chain" (EIP-3085 wallets)
pub const CODE_CHAIN_NOT_ADDED: i64 = 4902;
/// JSON-RPC "resource unavailable": a request of the same type is already open
pub const CODE_REQUEST_PENDING: i64 = -32002;

/// An error as it arrives from a wallet, RPC, or internal failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl RawError {
    pub fn new(message: impl Into<String>) -> Self { Self { message: message.into(), ..Default::default() } }
    pub fn with_code(mut self, code: i64) -> Self { self.code = Some(code); self }
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self { self.stack = Some(stack.into()); self }
}

impl From<&str> for RawError {
    fn from(message: &str) -> Self { Self::new(message) }
}

impl From<String> for RawError {
    fn from(message: String) -> Self { Self::new(message) }
}

/// Raw detail kept for the "technical details" disclosure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechnicalDetails {
    pub message: String,
    pub code: Option<i64>,
    pub stack: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedError {
    pub kind: ErrorKind,
    pub severity: Severity,
    pub title: String,
    pub message: String,
    pub solutions: Vec<String>,
    pub actionable: bool,
    #[serde(skip_serializing)]
    technical: Option<TechnicalDetails>,
}

impl ClassifiedError {
    /// Taxonomy entry with no raw detail attached.
    pub fn of(kind: ErrorKind) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            title: kind.title().to_string(),
            message: kind.message().to_string(),
            solutions: kind.solutions().iter().map(|s| s.to_string()).collect(),
            actionable: kind.is_actionable(),
            technical: None,
        }
    }

    /// Keep `raw` for the technical-details disclosure without reclassifying it.
    pub fn with_details(mut self, raw: &RawError) -> Self {
        self.technical = Some(TechnicalDetails { message: raw.message.clone(), code: raw.code, stack: raw.stack.clone() });
        self
    }

    /// Raw message, code and stack. Not part of the default user-visible surface.
    pub fn technical_details(&self) -> Option<&TechnicalDetails> { self.technical.as_ref() }

    pub fn is_transient(&self) -> bool { self.kind.is_transient() }
}

impl std::fmt::Display for ClassifiedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}

/// Map a raw error onto the taxonomy. Total and deterministic.
pub fn classify(raw: &RawError) -> ClassifiedError {
    let kind = classify_kind(&raw.message, raw.code);
    tracing::debug!(kind = kind.as_str(), code = ?raw.code, "classified error: {}", raw.message);
    ClassifiedError::of(kind).with_details(raw)
}

fn classify_kind(message: &str, code: Option<i64>) -> ErrorKind {
    if code == Some(CODE_CHAIN_NOT_ADDED) { return ErrorKind::ChainNotAdded; }

    let msg = message.to_lowercase();
    let has = |needle: &str| msg.contains(needle);
    let any = |needles: &[&str]| needles.iter().any(|n| msg.contains(n));

    if any(&["user rejected", "user denied"]) {
        if has("transaction") { return ErrorKind::UserRejectedTransaction; }
        if any(&["chain", "switch"]) { return ErrorKind::ChainSwitchRejected; }
        if any(&["signature", "sign"]) { return ErrorKind::SignatureRejected; }
    }
    if code == Some(CODE_REQUEST_PENDING) || any(&["already pending", "already processing"]) {
        return ErrorKind::RequestPending;
    }
    if any(&["rejected", "denied"]) { return ErrorKind::ConnectionRejected; }
    if any(&["insufficient funds", "insufficient balance"]) { return ErrorKind::InsufficientFunds; }
    if has("gas") && has("estimat") { return ErrorKind::GasEstimationFailed; }
    if any(&["unrecognized chain", "chain not added"]) { return ErrorKind::ChainNotAdded; }
    if any(&["unsupported chain", "unsupported network", "chain not supported"]) { return ErrorKind::UnsupportedChain; }
    if any(&["timeout", "timed out"]) { return ErrorKind::Timeout; }
    if has("expired") { return ErrorKind::AuthExpired; }
    if any(&["not installed", "no provider", "no ethereum provider"])
        || (has("not found") && any(&["wallet", "provider", "metamask"]))
    {
        return ErrorKind::WalletNotFound;
    }
    if any(&["not connected", "no accounts"]) { return ErrorKind::WalletNotConnected; }
    if any(&["transaction failed", "reverted"]) { return ErrorKind::TransactionFailed; }
    if any(&["network", "fetch", "connection refused"]) { return ErrorKind::NetworkError; }
    ErrorKind::UnknownError
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(message: &str) -> ErrorKind { classify(&RawError::new(message)).kind }

    #[test]
    fn user_rejection_sub_keywords_take_precedence() {
        assert_eq!(kind("MetaMask Tx Signature: User rejected the transaction"), ErrorKind::UserRejectedTransaction);
        assert_eq!(kind("User rejected the request to switch chain"), ErrorKind::ChainSwitchRejected);
        assert_eq!(kind("User rejected signature request"), ErrorKind::SignatureRejected);
        assert_eq!(kind("User rejected the request."), ErrorKind::ConnectionRejected);
        assert_eq!(kind("Request rejected"), ErrorKind::ConnectionRejected);
        assert_eq!(kind("MetaMask Message Signature: User denied message signature."), ErrorKind::SignatureRejected);
    }

    #[test]
    fn chain_not_added_by_code_ignores_message() {
        for message in ["", "User rejected the transaction", "insufficient funds", "anything"] {
            let classified = classify(&RawError::new(message).with_code(CODE_CHAIN_NOT_ADDED));
            assert_eq!(classified.kind, ErrorKind::ChainNotAdded);
        }
        assert_eq!(kind("Unrecognized chain ID \"0x89\""), ErrorKind::ChainNotAdded);
    }

    #[test]
    fn fixture_strings() {
        let cases = [
            ("insufficient funds for gas * price + value", ErrorKind::InsufficientFunds),
            ("cannot estimate gas; transaction may fail", ErrorKind::GasEstimationFailed),
            ("Unsupported chain id 56", ErrorKind::UnsupportedChain),
            ("Request timed out after 30000ms", ErrorKind::Timeout),
            ("Session expired", ErrorKind::AuthExpired),
            ("MetaMask not installed", ErrorKind::WalletNotFound),
            ("No Ethereum provider found", ErrorKind::WalletNotFound),
            ("Wallet not connected", ErrorKind::WalletNotConnected),
            ("execution reverted: ERC20: transfer amount exceeds balance", ErrorKind::TransactionFailed),
            ("Failed to fetch", ErrorKind::NetworkError),
            ("Request of type 'wallet_requestPermissions' already pending", ErrorKind::RequestPending),
            ("kaboom", ErrorKind::UnknownError),
            ("", ErrorKind::UnknownError),
        ];
        for (message, expected) in cases {
            assert_eq!(kind(message), expected, "{message}");
        }
    }

    #[test]
    fn pending_code_and_case_insensitivity() {
        assert_eq!(classify(&RawError::new("busy").with_code(CODE_REQUEST_PENDING)).kind, ErrorKind::RequestPending);
        assert_eq!(kind("USER REJECTED TRANSACTION"), ErrorKind::UserRejectedTransaction);
    }

    #[test]
    fn technical_details_stay_behind_disclosure() {
        let raw = RawError::new("kaboom").with_code(-32603).with_stack("at connect()");
        let classified = classify(&raw);
        let details = classified.technical_details().unwrap();
        assert_eq!(details.message, "kaboom");
        assert_eq!(details.code, Some(-32603));
        assert_eq!(details.stack.as_deref(), Some("at connect()"));

        let visible = serde_json::to_value(&classified).unwrap();
        assert!(visible.get("technical").is_none());
        assert_eq!(visible["kind"], "unknown_error");
        assert_eq!(visible["severity"], "error");
    }

    #[test]
    fn deterministic() {
        let raw = RawError::new("User rejected the transaction");
        assert_eq!(classify(&raw), classify(&raw));
        assert!(!classify(&raw).actionable);
    }
}
