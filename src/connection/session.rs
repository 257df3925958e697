//! ConnectionSession - the live record of an active wallet connection.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::chains::supported_chain;
use crate::providers::ProviderId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionSession {
    pub provider: ProviderId,
    /// Opaque address string, only shortened for display
    pub account: String,
    pub chain_id: u64,
    /// Native balance in minor units (wei)
    #[serde(with = "wei_string")]
    pub balance_wei: u128,
    /// ENS-style name, when the wallet resolves one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub connected_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionHealth {
    Fresh { remaining: Duration },
    /// Inside the warning window; the UI should offer `extend_session`.
    ExpiringSoon { remaining: Duration },
    Expired,
}

impl ConnectionSession {
    pub fn health_at(&self, now: DateTime<Utc>, warning: Duration) -> SessionHealth {
        let remaining = self.expires_at - now;
        if remaining <= Duration::zero() {
            SessionHealth::Expired
        } else if remaining <= warning {
            SessionHealth::ExpiringSoon { remaining }
        } else {
            SessionHealth::Fresh { remaining }
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool { self.expires_at <= now }

    pub fn short_account(&self) -> String { format_address(&self.account) }

    /// ENS name if known, else the shortened address.
    pub fn label(&self) -> String { self.display_name.clone().unwrap_or_else(|| self.short_account()) }

    pub fn formatted_balance(&self) -> String {
        let (decimals, symbol) = supported_chain(self.chain_id).map(|c| (c.decimals, c.symbol)).unwrap_or((18, "ETH"));
        format!("{} {}", format_units(self.balance_wei, decimals, 4), symbol)
    }
}

/// `0x1234...abcd`; short or non-hex strings pass through untouched.
pub fn format_address(address: &str) -> String {
    if address.len() <= 12 || !address.is_ascii() { return address.to_string(); }
    format!("{}...{}", &address[..6], &address[address.len() - 4..])
}

/// Minor units → decimal string, truncated to `precision` places.
///
/// Decimals beyond what `u128` can scale return the raw amount.
pub fn format_units(amount: u128, decimals: u32, precision: u32) -> String {
    let Some(unit) = 10u128.checked_pow(decimals) else { return amount.to_string() };
    let whole = amount / unit;
    let frac = amount % unit;
    let precision = precision.min(decimals);
    if precision == 0 { return whole.to_string(); }
    let shown = frac / 10u128.pow(decimals - precision);
    format!("{}.{:0width$}", whole, shown, width = precision as usize)
}

mod wei_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u128, s: S) -> Result<S::Ok, S::Error> { s.serialize_str(&value.to_string()) }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<u128, D::Error> {
        let raw = String::deserialize(d)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(expires_in: Duration) -> ConnectionSession {
        let now = Utc::now();
        ConnectionSession {
            provider: ProviderId::MetaMask,
            account: "0x742d35cc6634c0532925a3b844bc454e4438f44e".into(),
            chain_id: 1,
            balance_wei: 1_234_567_890_000_000_000,
            display_name: None,
            connected_at: now,
            expires_at: now + expires_in,
        }
    }

    #[test]
    fn formatting() {
        let s = session(Duration::hours(1));
        assert_eq!(s.short_account(), "0x742d...f44e");
        assert_eq!(s.label(), "0x742d...f44e");
        assert_eq!(s.formatted_balance(), "1.2345 ETH");
        assert_eq!(format_units(0, 18, 4), "0.0000");
        assert_eq!(format_units(5, 0, 4), "5");
        assert_eq!(format_units(12345, 39, 4), "12345");
        assert_eq!(format_address("0xabc"), "0xabc");
    }

    #[test]
    fn health_windows() {
        let warning = Duration::minutes(10);
        let now = Utc::now();
        assert!(matches!(session(Duration::hours(2)).health_at(now, warning), SessionHealth::Fresh { .. }));
        assert!(matches!(session(Duration::minutes(5)).health_at(now, warning), SessionHealth::ExpiringSoon { .. }));
        assert_eq!(session(Duration::minutes(-1)).health_at(now, warning), SessionHealth::Expired);
    }

    #[test]
    fn balance_serializes_as_string() {
        let s = session(Duration::hours(1));
        let value = serde_json::to_value(&s).unwrap();
        assert_eq!(value["balance_wei"], "1234567890000000000");
        let back: ConnectionSession = serde_json::from_value(value).unwrap();
        assert_eq!(back, s);
    }
}
