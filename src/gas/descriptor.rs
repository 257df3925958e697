//! Transaction descriptors handed to the gas engine by UI callers.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;

use super::GasError;
use crate::core::consts::gas;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    #[default]
    Transfer,
    Contract,
    Swap,
    Nft,
    Stake,
    /// Anything the table has no row for
    #[serde(other)]
    Other,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Transfer => "transfer",
            TransactionType::Contract => "contract",
            TransactionType::Swap => "swap",
            TransactionType::Nft => "nft",
            TransactionType::Stake => "stake",
            TransactionType::Other => "other",
        }
    }

    /// Unknown names fall into `Other` rather than failing.
    pub fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "transfer" | "send" => TransactionType::Transfer,
            "contract" => TransactionType::Contract,
            "swap" => TransactionType::Swap,
            "nft" | "mint" => TransactionType::Nft,
            "stake" | "staking" => TransactionType::Stake,
            _ => TransactionType::Other,
        }
    }

    pub fn base_gas_limit(&self) -> u64 {
        match self {
            TransactionType::Transfer => gas::TRANSFER_LIMIT,
            TransactionType::Contract | TransactionType::Swap => gas::CONTRACT_LIMIT,
            TransactionType::Nft => gas::NFT_LIMIT,
            TransactionType::Stake => gas::STAKE_LIMIT,
            TransactionType::Other => gas::DEFAULT_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDescriptor {
    #[serde(rename = "type", default)]
    pub tx_type: TransactionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    /// Value in wei, carried as a decimal string on the wire
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default)]
    pub contract_interaction: bool,
}

impl TransactionDescriptor {
    pub fn new(tx_type: TransactionType) -> Self { Self { tx_type, ..Default::default() } }
    pub fn transfer() -> Self { Self::new(TransactionType::Transfer) }
    pub fn with_to(mut self, to: impl Into<String>) -> Self { self.to = Some(to.into()); self }
    pub fn with_value(mut self, wei: u128) -> Self { self.value = Some(wei.to_string()); self }
    pub fn with_data(mut self, data: impl Into<String>) -> Self { self.data = Some(data.into()); self }
    pub fn with_contract_interaction(mut self) -> Self { self.contract_interaction = true; self }

    pub fn from_value(value: Value) -> Result<Self, GasError> {
        let descriptor: Self = serde_json::from_value(value).map_err(|e| GasError::MalformedDescriptor(e.to_string()))?;
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Calldata beyond an empty `0x` counts as a payload.
    pub fn has_payload(&self) -> bool {
        self.data.as_deref().map(|d| d.trim_start_matches("0x")).is_some_and(|d| !d.is_empty())
    }

    pub fn is_complex(&self) -> bool { self.contract_interaction || self.has_payload() }

    pub fn validate(&self) -> Result<(), GasError> {
        if let Some(to) = &self.to {
            if !address_re().is_match(to) {
                return Err(GasError::MalformedDescriptor(format!("invalid recipient '{}'", to)));
            }
        }
        if let Some(data) = &self.data {
            if !data_re().is_match(data) {
                return Err(GasError::MalformedDescriptor("data must be 0x-prefixed hex".into()));
            }
        }
        if let Some(value) = &self.value {
            value.parse::<u128>().map_err(|_| GasError::MalformedDescriptor(format!("invalid value '{}'", value)))?;
        }
        Ok(())
    }
}

fn address_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("static regex"))
}

fn data_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^0x([0-9a-fA-F]{2})*$").expect("static regex"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_js_shaped_descriptors() {
        let d = TransactionDescriptor::from_value(json!({"type": "swap", "contractInteraction": true})).unwrap();
        assert_eq!(d.tx_type, TransactionType::Swap);
        assert!(d.is_complex());

        let d = TransactionDescriptor::from_value(json!({"type": "bridge"})).unwrap();
        assert_eq!(d.tx_type, TransactionType::Other);
        assert_eq!(d.tx_type.base_gas_limit(), gas::DEFAULT_LIMIT);

        let d = TransactionDescriptor::from_value(json!({})).unwrap();
        assert_eq!(d.tx_type, TransactionType::Transfer);
    }

    #[test]
    fn rejects_malformed_fields() {
        assert!(TransactionDescriptor::from_value(json!({"type": "transfer", "to": "0x123"})).is_err());
        assert!(TransactionDescriptor::from_value(json!({"data": "deadbeef"})).is_err());
        assert!(TransactionDescriptor::from_value(json!({"data": "0xabc"})).is_err());
        assert!(TransactionDescriptor::from_value(json!({"value": "-1"})).is_err());
        assert!(TransactionDescriptor::from_value(json!({"type": 7})).is_err());
    }

    #[test]
    fn empty_calldata_is_not_a_payload() {
        assert!(!TransactionDescriptor::transfer().with_data("0x").has_payload());
        assert!(TransactionDescriptor::transfer().with_data("0xa9059cbb").has_payload());
    }
}
