//! Manager Configuration - passed from the embedding app

use chrono::Duration;
use std::path::PathBuf;

use crate::core::consts::{env, timing};

#[derive(Debug, Clone)]
pub struct ManagerConfig {
    pub app: String,
    /// Off => every connect resolves to "coming soon"
    pub web3_enabled: bool,
    pub install_prompts: bool,
    /// None disables the bound
    pub connect_timeout: Option<std::time::Duration>,
    pub disconnect_timeout: Option<std::time::Duration>,
    pub session_ttl: Duration,
    pub expiry_warning: Duration,
    pub error_auto_clear: Duration,
    pub persist: bool,
    /// Persistence root; `<root>/<app>/data/session.json`
    pub data_dir: Option<PathBuf>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            app: "cryb".into(),
            web3_enabled: true,
            install_prompts: true,
            connect_timeout: Some(std::time::Duration::from_millis(timing::CONNECT_TIMEOUT_MS)),
            disconnect_timeout: Some(std::time::Duration::from_millis(timing::DISCONNECT_TIMEOUT_MS)),
            session_ttl: Duration::seconds(timing::SESSION_TTL_SECS),
            expiry_warning: Duration::seconds(timing::EXPIRY_WARNING_SECS),
            error_auto_clear: Duration::milliseconds(timing::ERROR_AUTO_CLEAR_MS),
            persist: false,
            data_dir: None,
        }
    }
}

impl ManagerConfig {
    pub fn new(app: impl Into<String>) -> Self {
        Self { app: app.into(), ..Default::default() }
    }
    pub fn with_web3(mut self, enabled: bool) -> Self { self.web3_enabled = enabled; self }
    pub fn with_install_prompts(mut self, enabled: bool) -> Self { self.install_prompts = enabled; self }
    pub fn with_connect_timeout(mut self, t: Option<std::time::Duration>) -> Self { self.connect_timeout = t; self }
    pub fn with_disconnect_timeout(mut self, t: Option<std::time::Duration>) -> Self { self.disconnect_timeout = t; self }
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self { self.session_ttl = ttl; self }
    pub fn with_expiry_warning(mut self, w: Duration) -> Self { self.expiry_warning = w; self }
    pub fn with_error_auto_clear(mut self, d: Duration) -> Self { self.error_auto_clear = d; self }
    pub fn with_persistence(mut self) -> Self { self.persist = true; self }
    pub fn with_data_dir(mut self, path: impl Into<PathBuf>) -> Self { self.persist = true; self.data_dir = Some(path.into()); self }

    /// Defaults overlaid with `CRYB_*` variables. Unparseable values are ignored.
    pub fn from_env() -> Self {
        let mut config = match std::env::var(env::APP) {
            Ok(app) if !app.trim().is_empty() => Self::new(app.trim()),
            _ => Self::default(),
        };
        if let Some(v) = env_flag(env::WEB3_ENABLED) { config.web3_enabled = v; }
        if let Some(v) = env_flag(env::INSTALL_PROMPTS) { config.install_prompts = v; }
        if let Some(ms) = env_number(env::CONNECT_TIMEOUT_MS) {
            config.connect_timeout = (ms > 0).then(|| std::time::Duration::from_millis(ms));
        }
        if let Some(secs) = env_number(env::SESSION_TTL_SECS).filter(|s| *s > 0) {
            config.session_ttl = Duration::seconds(secs.min(i64::MAX as u64) as i64);
        }
        if let Ok(root) = std::env::var(env::ROOT) {
            config.persist = true;
            config.data_dir = Some(PathBuf::from(root));
        }
        config
    }

    /// `data_dir`, else `CRYB_ROOT`, else the platform data dir.
    pub fn resolved_root(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            std::env::var(env::ROOT)
                .map(PathBuf::from)
                .unwrap_or_else(|_| dirs::data_local_dir().unwrap_or_else(|| PathBuf::from(".")))
        })
    }
}

fn env_flag(name: &str) -> Option<bool> {
    match std::env::var(name).ok()?.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn env_number(name: &str) -> Option<u64> { std::env::var(name).ok()?.trim().parse().ok() }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = ManagerConfig::default();
        assert_eq!(c.app, "cryb");
        assert!(c.web3_enabled && c.install_prompts && !c.persist);
        assert_eq!(c.connect_timeout, Some(std::time::Duration::from_secs(30)));
        assert_eq!(c.disconnect_timeout, Some(std::time::Duration::from_secs(10)));
        assert_eq!(c.session_ttl, Duration::hours(24));
        assert_eq!(c.error_auto_clear, Duration::seconds(4));
    }

    #[test]
    fn data_dir_enables_persistence() {
        let c = ManagerConfig::new("t").with_data_dir("/tmp/x");
        assert!(c.persist);
        assert_eq!(c.resolved_root(), PathBuf::from("/tmp/x"));
    }
}
