//! Static wallet catalog. Installed status is never stored here; see `ProviderRegistry`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId { MetaMask, WalletConnect, Coinbase, Phantom, Trust, Brave }

impl ProviderId {
    pub const ALL: [ProviderId; 6] = [
        ProviderId::MetaMask,
        ProviderId::WalletConnect,
        ProviderId::Coinbase,
        ProviderId::Phantom,
        ProviderId::Trust,
        ProviderId::Brave,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::MetaMask => "metamask",
            ProviderId::WalletConnect => "walletconnect",
            ProviderId::Coinbase => "coinbase",
            ProviderId::Phantom => "phantom",
            ProviderId::Trust => "trust",
            ProviderId::Brave => "brave",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace(['-', '_', ' '], "").as_str() {
            "metamask" => Some(ProviderId::MetaMask),
            "walletconnect" | "wc" => Some(ProviderId::WalletConnect),
            "coinbase" | "coinbasewallet" => Some(ProviderId::Coinbase),
            "phantom" => Some(ProviderId::Phantom),
            "trust" | "trustwallet" => Some(ProviderId::Trust),
            "brave" | "bravewallet" => Some(ProviderId::Brave),
            _ => None,
        }
    }

    pub fn entry(&self) -> &'static CatalogEntry {
        CATALOG.iter().find(|e| e.id == *self).unwrap_or(&CATALOG[0])
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.as_str()) }
}

/// How a provider announces itself in the host environment.
#[derive(Debug, Clone, Copy)]
pub enum Detect {
    /// Protocol-based, no local extension needed.
    Always,
    Global(&'static str),
    Flag(&'static str, &'static str),
}

#[derive(Debug)]
pub struct CatalogEntry {
    pub id: ProviderId,
    pub name: &'static str,
    pub recommended: bool,
    pub download_url: &'static str,
    pub instructions: &'static str,
    /// Any match counts as installed.
    pub detect: &'static [Detect],
}

/// Display order.
pub static CATALOG: [CatalogEntry; 6] = [
    CatalogEntry {
        id: ProviderId::MetaMask,
        name: "MetaMask",
        recommended: true,
        download_url: "https://metamask.io/download/",
        instructions: "Install the MetaMask extension for your browser, create or import a wallet, then refresh this page.",
        detect: &[Detect::Flag("ethereum", "isMetaMask")],
    },
    CatalogEntry {
        id: ProviderId::WalletConnect,
        name: "WalletConnect",
        recommended: false,
        download_url: "https://walletconnect.com/explorer",
        instructions: "Open any WalletConnect-compatible mobile wallet and scan the QR code.",
        detect: &[Detect::Always],
    },
    CatalogEntry {
        id: ProviderId::Coinbase,
        name: "Coinbase Wallet",
        recommended: false,
        download_url: "https://www.coinbase.com/wallet/downloads",
        instructions: "Install the Coinbase Wallet extension or app, then refresh this page.",
        detect: &[Detect::Flag("ethereum", "isCoinbaseWallet"), Detect::Global("coinbaseWalletExtension")],
    },
    CatalogEntry {
        id: ProviderId::Phantom,
        name: "Phantom",
        recommended: false,
        download_url: "https://phantom.app/download",
        instructions: "Install the Phantom extension, create a wallet, then refresh this page.",
        detect: &[Detect::Flag("solana", "isPhantom"), Detect::Global("phantom")],
    },
    CatalogEntry {
        id: ProviderId::Trust,
        name: "Trust Wallet",
        recommended: false,
        download_url: "https://trustwallet.com/download",
        instructions: "Install the Trust Wallet extension or open this page in the Trust Wallet browser.",
        detect: &[Detect::Flag("ethereum", "isTrust"), Detect::Global("trustwallet")],
    },
    CatalogEntry {
        id: ProviderId::Brave,
        name: "Brave Wallet",
        recommended: false,
        download_url: "https://brave.com/wallet/",
        instructions: "Open this page in the Brave browser and enable Brave Wallet in settings.",
        detect: &[Detect::Flag("ethereum", "isBraveWallet")],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_id_has_one_entry() {
        for id in ProviderId::ALL {
            assert_eq!(CATALOG.iter().filter(|e| e.id == id).count(), 1);
            assert_eq!(id.entry().id, id);
            assert_eq!(ProviderId::from_str(id.as_str()), Some(id));
        }
        assert_eq!(ProviderId::from_str("Wallet-Connect"), Some(ProviderId::WalletConnect));
        assert_eq!(ProviderId::from_str("ledger"), None);
    }
}
