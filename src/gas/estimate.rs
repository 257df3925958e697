//! Pure fee math: descriptor + network → base params, base params + preset → GasEstimate.

use serde::{Deserialize, Serialize};

use super::descriptor::TransactionDescriptor;
use super::network::{Congestion, NetworkStatus};
use super::GasError;
use crate::core::consts::gas;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GasPreset { Slow, #[default] Standard, Fast, Custom }

impl GasPreset {
    pub const ALL: [GasPreset; 4] = [GasPreset::Slow, GasPreset::Standard, GasPreset::Fast, GasPreset::Custom];

    pub fn as_str(&self) -> &'static str {
        match self { GasPreset::Slow => "slow", GasPreset::Standard => "standard", GasPreset::Fast => "fast", GasPreset::Custom => "custom" }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "slow" => Some(GasPreset::Slow),
            "standard" | "normal" => Some(GasPreset::Standard),
            "fast" => Some(GasPreset::Fast),
            "custom" => Some(GasPreset::Custom),
            _ => None,
        }
    }

    /// Multiplier on the network standard price; `None` for custom.
    pub fn multiplier(&self) -> Option<f64> {
        match self {
            GasPreset::Slow => Some(gas::SLOW_MULTIPLIER),
            GasPreset::Standard => Some(gas::STANDARD_MULTIPLIER),
            GasPreset::Fast => Some(gas::FAST_MULTIPLIER),
            GasPreset::Custom => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence { Low, Medium, High }

/// User-entered gas inputs. Clamped on construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CustomGas {
    pub gas_price_gwei: f64,
    pub gas_limit: u64,
}

impl CustomGas {
    /// Non-finite or sub-1 prices clamp to 1 gwei; limits below a plain transfer clamp to 21000.
    pub fn new(gas_price_gwei: f64, gas_limit: u64) -> Self {
        let gas_price_gwei =
            if gas_price_gwei.is_finite() { gas_price_gwei.max(gas::MIN_GAS_PRICE_GWEI) } else { gas::MIN_GAS_PRICE_GWEI };
        Self { gas_price_gwei, gas_limit: gas_limit.max(gas::MIN_GAS_LIMIT) }
    }
}

/// Output of `estimate`: the preset-independent half of the computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseGasParams {
    pub gas_limit: u64,
    pub complex: bool,
    pub network: NetworkStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GasEstimate {
    pub gas_price_gwei: f64,
    pub gas_limit: u64,
    /// Native units, six decimals
    pub fee: String,
    pub fee_native: f64,
    pub fee_usd: f64,
    /// `fee * 1.2`, the not-to-exceed figure
    pub max_fee: String,
    pub max_fee_native: f64,
    pub preset: GasPreset,
    pub confirmation_time: String,
    pub confidence: Confidence,
    pub congestion: Congestion,
}

/// Base gas limit for a descriptor under the given network snapshot.
pub fn estimate(descriptor: &TransactionDescriptor, network: &NetworkStatus) -> Result<BaseGasParams, GasError> {
    descriptor.validate()?;
    let base = descriptor.tx_type.base_gas_limit();
    let complex = descriptor.is_complex();
    let gas_limit = if complex { (base as f64 * gas::COMPLEXITY_FACTOR).ceil() as u64 } else { base };
    Ok(BaseGasParams { gas_limit, complex, network: network.clone() })
}

pub fn apply_preset(base: &BaseGasParams, preset: GasPreset, custom: Option<&CustomGas>) -> GasEstimate {
    let standard = base.network.standard_gas_price_gwei;
    let (gas_price_gwei, gas_limit) = match preset.multiplier() {
        Some(m) => (standard * m, base.gas_limit),
        None => {
            let c = custom.copied().unwrap_or_else(|| CustomGas::new(standard, base.gas_limit));
            let c = CustomGas::new(c.gas_price_gwei, c.gas_limit);
            (c.gas_price_gwei, c.gas_limit)
        }
    };

    let fee_native = gas_price_gwei * gas_limit as f64 / gas::GWEI_PER_NATIVE;
    let max_fee_native = fee_native * gas::MAX_FEE_BUFFER;
    let ratio = if standard > 0.0 { gas_price_gwei / standard } else { 1.0 };
    let (confirmation_time, confidence) = speed_bucket(ratio, base.network.congestion);

    GasEstimate {
        gas_price_gwei,
        gas_limit,
        fee: format_native(fee_native),
        fee_native,
        fee_usd: fee_native * base.network.native_usd_price,
        max_fee: format_native(max_fee_native),
        max_fee_native,
        preset,
        confirmation_time: confirmation_time.to_string(),
        confidence,
        congestion: base.network.congestion,
    }
}

const BUCKETS: [(&str, Confidence); 4] = [
    ("> 10 min", Confidence::Low),
    ("5-10 min", Confidence::Low),
    ("1-3 min", Confidence::Medium),
    ("< 30 sec", Confidence::High),
];

/// Price ratio vs. standard picks the bucket; high congestion pushes it one step slower.
fn speed_bucket(ratio: f64, congestion: Congestion) -> (&'static str, Confidence) {
    let eps = 1e-9;
    let mut idx: usize = if ratio + eps >= gas::FAST_MULTIPLIER {
        3
    } else if ratio + eps >= gas::STANDARD_MULTIPLIER {
        2
    } else if ratio + eps >= gas::SLOW_MULTIPLIER {
        1
    } else {
        0
    };
    if congestion == Congestion::High { idx = idx.saturating_sub(1); }
    BUCKETS[idx]
}

pub fn format_native(value: f64) -> String { format!("{:.*}", gas::FEE_DECIMALS, value) }

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gas::TransactionType;

    fn network() -> NetworkStatus { NetworkStatus::default().with_standard_price(25.0) }

    #[test]
    fn custom_price_rejects_non_finite() {
        for price in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            assert_eq!(CustomGas::new(price, 30_000).gas_price_gwei, 1.0);
        }
        let base = estimate(&TransactionDescriptor::transfer(), &network()).unwrap();
        let est = apply_preset(&base, GasPreset::Custom, Some(&CustomGas { gas_price_gwei: f64::INFINITY, gas_limit: 21_000 }));
        assert_eq!(est.fee, "0.000021");
    }

    #[test]
    fn transfer_standard_end_to_end() {
        let base = estimate(&TransactionDescriptor::transfer(), &network()).unwrap();
        assert_eq!(base.gas_limit, 21_000);
        let est = apply_preset(&base, GasPreset::Standard, None);
        assert_eq!(est.gas_price_gwei, 25.0);
        assert!((est.fee_native - 0.000525).abs() < 1e-12);
        assert_eq!(est.fee, "0.000525");
        assert_eq!(est.max_fee, "0.000630");
        assert!((est.fee_usd - 0.000525 * 2000.0).abs() < 1e-9);
        assert_eq!(est.confirmation_time, "1-3 min");
    }

    #[test]
    fn complexity_factor_applies_to_payload_or_flag() {
        let net = network();
        let with_data = estimate(&TransactionDescriptor::transfer().with_data("0xa9059cbb"), &net).unwrap();
        assert_eq!(with_data.gas_limit, 31_500);
        let flagged = estimate(&TransactionDescriptor::new(TransactionType::Nft).with_contract_interaction(), &net).unwrap();
        assert_eq!(flagged.gas_limit, 127_500);
        assert_eq!(estimate(&TransactionDescriptor::new(TransactionType::Stake), &net).unwrap().gas_limit, 120_000);
    }

    #[test]
    fn presets_are_ordered_and_buffered() {
        let base = estimate(&TransactionDescriptor::new(TransactionType::Swap), &network()).unwrap();
        let slow = apply_preset(&base, GasPreset::Slow, None);
        let standard = apply_preset(&base, GasPreset::Standard, None);
        let fast = apply_preset(&base, GasPreset::Fast, None);
        assert!(fast.gas_price_gwei >= standard.gas_price_gwei);
        assert!(standard.gas_price_gwei >= slow.gas_price_gwei);
        assert_eq!(slow.gas_limit, fast.gas_limit);
        for est in [slow, standard, fast] {
            assert!((est.max_fee_native - est.fee_native * 1.2).abs() < 1e-15);
        }
    }

    #[test]
    fn custom_inputs_are_clamped() {
        let base = estimate(&TransactionDescriptor::transfer(), &network()).unwrap();
        let est = apply_preset(&base, GasPreset::Custom, Some(&CustomGas { gas_price_gwei: 0.2, gas_limit: 5_000 }));
        assert_eq!(est.gas_price_gwei, 1.0);
        assert_eq!(est.gas_limit, 21_000);
        assert_eq!(CustomGas::new(f64::NAN, 0).gas_price_gwei, 1.0);
        assert_eq!(est.confirmation_time, "> 10 min");

        let prefilled = apply_preset(&base, GasPreset::Custom, None);
        assert_eq!(prefilled.gas_price_gwei, 25.0);
        assert_eq!(prefilled.gas_limit, 21_000);
    }

    #[test]
    fn congestion_slows_buckets() {
        let busy = network().with_congestion(Congestion::High);
        let base = estimate(&TransactionDescriptor::transfer(), &busy).unwrap();
        let fast = apply_preset(&base, GasPreset::Fast, None);
        assert_eq!(fast.confirmation_time, "1-3 min");
        assert_eq!(fast.confidence, Confidence::Medium);
        assert_eq!(fast.congestion, Congestion::High);
    }

    #[test]
    fn malformed_descriptor_fails() {
        assert!(estimate(&TransactionDescriptor::transfer().with_to("nope"), &network()).is_err());
    }
}
