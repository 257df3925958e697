//! Supported chains and chain-id parsing.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Chain {
    pub id: u64,
    pub name: &'static str,
    pub symbol: &'static str,
    pub decimals: u32,
    pub testnet: bool,
}

pub static SUPPORTED_CHAINS: [Chain; 6] = [
    Chain { id: 1, name: "Ethereum", symbol: "ETH", decimals: 18, testnet: false },
    Chain { id: 10, name: "Optimism", symbol: "ETH", decimals: 18, testnet: false },
    Chain { id: 137, name: "Polygon", symbol: "POL", decimals: 18, testnet: false },
    Chain { id: 8453, name: "Base", symbol: "ETH", decimals: 18, testnet: false },
    Chain { id: 42161, name: "Arbitrum One", symbol: "ETH", decimals: 18, testnet: false },
    Chain { id: 11155111, name: "Sepolia", symbol: "ETH", decimals: 18, testnet: true },
];

pub fn supported_chain(id: u64) -> Option<&'static Chain> { SUPPORTED_CHAINS.iter().find(|c| c.id == id) }

pub fn is_supported(id: u64) -> bool { supported_chain(id).is_some() }

/// Providers emit chain ids as hex (`0x89`); config and CLI use decimal.
pub fn parse_chain_id(value: &str) -> Option<u64> {
    let value = value.trim();
    match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) if !hex.is_empty() => u64::from_str_radix(hex, 16).ok(),
        Some(_) => None,
        None => value.parse().ok(),
    }
}
