//! Provider Registry - wallet catalog + live installation detection
//!
//! ```text
//! CATALOG (static)  ──┐
//!                     ├──► ProviderRegistry::detect_providers() → Vec<WalletProvider>
//! EnvironmentProbe ───┘        (installed re-evaluated on every call)
//! ```

mod catalog;
mod probe;

pub use catalog::{CatalogEntry, Detect, ProviderId, CATALOG};
pub use probe::{EmptyProbe, EnvironmentProbe, StaticProbe};

use serde::Serialize;
use std::sync::Arc;

/// Catalog entry plus the installed flag observed at detection time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalletProvider {
    pub id: ProviderId,
    pub name: String,
    pub installed: bool,
    pub recommended: bool,
    pub download_url: String,
    pub instructions: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallInfo {
    pub provider: ProviderId,
    pub name: String,
    pub download_url: String,
    pub instructions: String,
}

#[derive(Clone)]
pub struct ProviderRegistry {
    probe: Arc<dyn EnvironmentProbe>,
}

impl ProviderRegistry {
    pub fn new(probe: Arc<dyn EnvironmentProbe>) -> Self { Self { probe } }

    pub fn is_installed(&self, id: ProviderId) -> bool {
        id.entry().detect.iter().any(|d| match *d {
            Detect::Always => true,
            Detect::Global(global) => self.probe.has_global(global),
            Detect::Flag(global, flag) => self.probe.has_flag(global, flag),
        })
    }

    pub fn detect(&self, id: ProviderId) -> WalletProvider {
        let entry = id.entry();
        WalletProvider {
            id,
            name: entry.name.to_string(),
            installed: self.is_installed(id),
            recommended: entry.recommended,
            download_url: entry.download_url.to_string(),
            instructions: entry.instructions.to_string(),
        }
    }

    /// All providers in catalog order. Extension state can change at runtime, so nothing is cached.
    pub fn detect_providers(&self) -> Vec<WalletProvider> {
        let providers: Vec<_> = CATALOG.iter().map(|e| self.detect(e.id)).collect();
        tracing::debug!(
            installed = ?providers.iter().filter(|p| p.installed).map(|p| p.id.as_str()).collect::<Vec<_>>(),
            "detected wallet providers"
        );
        providers
    }

    pub fn resolve_install_info(&self, id: ProviderId) -> InstallInfo {
        let entry = id.entry();
        InstallInfo {
            provider: id,
            name: entry.name.to_string(),
            download_url: entry.download_url.to_string(),
            instructions: entry.instructions.to_string(),
        }
    }

    /// First installed recommended provider, else first installed, else WalletConnect.
    pub fn recommended(&self) -> WalletProvider {
        let providers = self.detect_providers();
        providers.iter().find(|p| p.installed && p.recommended)
            .or_else(|| providers.iter().find(|p| p.installed))
            .cloned()
            .unwrap_or_else(|| self.detect(ProviderId::WalletConnect))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(specs: &[&str]) -> ProviderRegistry {
        ProviderRegistry::new(Arc::new(StaticProbe::from_specs(specs.iter().copied())))
    }

    #[test]
    fn empty_environment_only_has_walletconnect() {
        let reg = ProviderRegistry::new(Arc::new(EmptyProbe));
        let installed: Vec<_> = reg.detect_providers().into_iter().filter(|p| p.installed).map(|p| p.id).collect();
        assert_eq!(installed, vec![ProviderId::WalletConnect]);
        assert_eq!(reg.recommended().id, ProviderId::WalletConnect);
    }

    #[test]
    fn flags_drive_detection() {
        let reg = registry(&["ethereum.isMetaMask", "phantom"]);
        assert!(reg.is_installed(ProviderId::MetaMask));
        assert!(reg.is_installed(ProviderId::Phantom));
        assert!(!reg.is_installed(ProviderId::Coinbase));
        // a bare ethereum object is not MetaMask
        assert!(!registry(&["ethereum"]).is_installed(ProviderId::MetaMask));
    }

    #[test]
    fn recommended_prefers_recommended_then_installed() {
        assert_eq!(registry(&["ethereum.isMetaMask", "ethereum.isCoinbaseWallet"]).recommended().id, ProviderId::MetaMask);
        // WalletConnect precedes Coinbase in the catalog and is always installed
        assert_eq!(registry(&["ethereum.isCoinbaseWallet"]).recommended().id, ProviderId::WalletConnect);
    }

    #[test]
    fn install_info_matches_catalog() {
        let info = registry(&[]).resolve_install_info(ProviderId::MetaMask);
        assert_eq!(info.download_url, "https://metamask.io/download/");
        assert!(info.instructions.contains("MetaMask"));
    }
}
