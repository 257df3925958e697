//! Environment probes - where wallets inject themselves (`window.ethereum`, `window.solana`, ...).

use std::collections::HashSet;

/// Read-only view of the host's wallet injection points.
///
/// Implementations must not fail: an absent global simply reports `false`.
pub trait EnvironmentProbe: Send + Sync {
    /// A global injection point such as `ethereum` or `phantom` exists.
    fn has_global(&self, global: &str) -> bool;
    /// The object injected at `global` carries a truthy `flag` (e.g. `isMetaMask`).
    fn has_flag(&self, global: &str, flag: &str) -> bool;
}

/// Probe backed by a fixed set of globals and flags.
///
/// Used by tests, the CLI (`--inject ethereum.isMetaMask`), and headless hosts.
#[derive(Debug, Clone, Default)]
pub struct StaticProbe {
    globals: HashSet<String>,
    flags: HashSet<(String, String)>,
}

impl StaticProbe {
    pub fn new() -> Self { Self::default() }

    pub fn with_global(mut self, global: impl Into<String>) -> Self { self.globals.insert(global.into()); self }

    /// A flag implies its global.
    pub fn with_flag(mut self, global: impl Into<String>, flag: impl Into<String>) -> Self {
        let global = global.into();
        self.globals.insert(global.clone());
        self.flags.insert((global, flag.into()));
        self
    }

    /// Parse `global` or `global.flag` specs.
    pub fn from_specs<'a>(specs: impl IntoIterator<Item = &'a str>) -> Self {
        specs.into_iter().map(str::trim).filter(|s| !s.is_empty()).fold(Self::new(), |probe, spec| {
            match spec.split_once('.') {
                Some((global, flag)) => probe.with_flag(global, flag),
                None => probe.with_global(spec),
            }
        })
    }
}

impl EnvironmentProbe for StaticProbe {
    fn has_global(&self, global: &str) -> bool { self.globals.contains(global) }
    fn has_flag(&self, global: &str, flag: &str) -> bool { self.flags.contains(&(global.to_string(), flag.to_string())) }
}

/// Nothing injected: a fresh browser or a server.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyProbe;

impl EnvironmentProbe for EmptyProbe {
    fn has_global(&self, _: &str) -> bool { false }
    fn has_flag(&self, _: &str, _: &str) -> bool { false }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn specs_parse_globals_and_flags() {
        let probe = StaticProbe::from_specs(["ethereum.isMetaMask", "phantom", " "]);
        assert!(probe.has_global("ethereum"));
        assert!(probe.has_flag("ethereum", "isMetaMask"));
        assert!(!probe.has_flag("ethereum", "isCoinbaseWallet"));
        assert!(probe.has_global("phantom"));
        assert!(!probe.has_global("solana"));
    }
}
