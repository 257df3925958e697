//! Integration Tests: gas estimator end to end against the mock network

use async_trait::async_trait;
use cryb_wallet::gas::{Confidence, Congestion, EstimationStatus};
use cryb_wallet::{
    ClassifiedError, ErrorKind, GasError, GasEstimate, GasEstimator, GasPreset, MockNetworkOracle, NetworkOracle,
    NetworkStatus, TransactionDescriptor, TransactionType, WalletHooks,
};
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct GasHooks {
    fees: Mutex<Vec<String>>,
    errors: Mutex<Vec<(ErrorKind, String)>>,
}

impl WalletHooks for GasHooks {
    fn on_gas_estimate_change(&self, estimate: &GasEstimate) {
        self.fees.lock().unwrap().push(estimate.fee.clone());
    }
    fn on_error(&self, error: &ClassifiedError, context: &str) {
        self.errors.lock().unwrap().push((error.kind, context.to_string()));
    }
}

fn estimator(status: NetworkStatus) -> (Arc<MockNetworkOracle>, GasEstimator, Arc<GasHooks>) {
    let oracle = Arc::new(MockNetworkOracle::new(status).with_latency(Duration::ZERO));
    let hooks = Arc::new(GasHooks::default());
    let estimator = GasEstimator::new(oracle.clone()).with_hooks(hooks.clone());
    (oracle, estimator, hooks)
}

/// Test: plain transfer at 25 gwei standard
#[tokio::test]
async fn transfer_standard_fee() {
    let (_, estimator, hooks) = estimator(NetworkStatus::default().with_standard_price(25.0));
    assert_eq!(estimator.status(), EstimationStatus::Idle);

    let estimate = estimator.estimate_gas(TransactionDescriptor::transfer()).await.expect("estimate");
    assert_eq!(estimate.gas_limit, 21_000);
    assert_eq!(estimate.fee, "0.000525");
    assert_eq!(estimate.max_fee, "0.000630");
    assert!((estimate.fee_usd - 1.05).abs() < 1e-9);
    assert_eq!(estimate.confirmation_time, "1-3 min");
    assert_eq!(estimate.confidence, Confidence::Medium);
    assert_eq!(estimator.status(), EstimationStatus::Ready);
    assert_eq!(*hooks.fees.lock().unwrap(), vec!["0.000525".to_string()]);
}

/// Test: presets order prices and recompute without a network call
#[tokio::test]
async fn presets_and_custom_gas() {
    let (oracle, estimator, hooks) = estimator(NetworkStatus::default().with_standard_price(25.0));
    let descriptor = TransactionDescriptor::new(TransactionType::Swap).with_data("0xa9059cbb");
    let standard = estimator.estimate_gas(descriptor).await.expect("estimate");
    assert_eq!(standard.gas_limit, 225_000);

    // presets reuse the cached snapshot even if the network is now failing
    oracle.set_failure(Some("rpc down"));
    let slow = estimator.set_preset(GasPreset::Slow).expect("slow");
    let fast = estimator.set_preset(GasPreset::Fast).expect("fast");
    assert!(fast.gas_price_gwei >= standard.gas_price_gwei && standard.gas_price_gwei >= slow.gas_price_gwei);
    assert_eq!(fast.confirmation_time, "< 30 sec");
    assert_eq!(slow.confidence, Confidence::Low);
    assert!((fast.max_fee_native - fast.fee_native * 1.2).abs() < 1e-12);

    let custom = estimator.set_custom_gas(0.2, 100).expect("custom");
    assert_eq!(custom.preset, GasPreset::Custom);
    assert_eq!(custom.gas_limit, 21_000);
    assert_eq!(custom.gas_price_gwei, 1.0);
    assert_eq!(estimator.preset(), GasPreset::Custom);
    assert_eq!(hooks.fees.lock().unwrap().len(), 4);
}

/// Test: failure keeps the previous estimate and offers a retry
#[tokio::test]
async fn failure_keeps_previous_estimate() {
    let (oracle, estimator, hooks) = estimator(NetworkStatus::default());
    let good = estimator.estimate_gas(TransactionDescriptor::transfer()).await.expect("estimate");

    oracle.set_failure(Some("connection refused"));
    let err = estimator.refresh_network().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::GasEstimationFailed);
    assert!(matches!(estimator.status(), EstimationStatus::Failed { .. }));
    assert_eq!(estimator.current(), Some(good.clone()));
    assert_eq!(*hooks.errors.lock().unwrap(), vec![(ErrorKind::GasEstimationFailed, "gas".to_string())]);

    oracle.set_failure(None);
    oracle.set_status(NetworkStatus::default().with_congestion(Congestion::High));
    let retried = estimator.retry().await.expect("retry");
    assert_eq!(retried.congestion, Congestion::High);
    assert_eq!(retried.confirmation_time, "5-10 min");
    assert_eq!(estimator.status(), EstimationStatus::Ready);
}

/// Test: malformed descriptors never reach the network
#[tokio::test]
async fn malformed_descriptor_is_rejected() {
    let (_, estimator, _) = estimator(NetworkStatus::default());
    let err = estimator
        .estimate_gas(TransactionDescriptor::transfer().with_to("0x1234"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::GasEstimationFailed);
    assert!(err.technical_details().map(|t| t.message.contains("invalid recipient")).unwrap_or(false));
    assert_eq!(estimator.current(), None);

    let parsed = TransactionDescriptor::from_value(json!({"type": "nft", "contractInteraction": true})).expect("descriptor");
    let estimate = estimator.estimate_gas(parsed).await.expect("estimate");
    assert_eq!(estimate.gas_limit, 127_500);
}

/// Test: failure text that mentions rejection is still a gas failure
#[tokio::test]
async fn failure_kind_ignores_message_wording() {
    let (oracle, estimator, hooks) = estimator(NetworkStatus::default());

    oracle.set_failure(Some("eth_gasPrice rejected by rpc"));
    let err = estimator.estimate_gas(TransactionDescriptor::transfer()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::GasEstimationFailed);
    assert!(!err.is_transient());
    assert!(err.technical_details().map(|t| t.message.contains("rejected by rpc")).unwrap_or(false));

    oracle.set_failure(None);
    let denied = TransactionDescriptor::from_value(json!({"type": "transfer", "value": "denied"})).expect("descriptor");
    let err = estimator.estimate_gas(denied).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::GasEstimationFailed);
    assert!(!err.is_transient());
    assert!(matches!(estimator.status(), EstimationStatus::Failed { error } if error.kind == ErrorKind::GasEstimationFailed));
    assert_eq!(
        *hooks.errors.lock().unwrap(),
        vec![(ErrorKind::GasEstimationFailed, "gas".to_string()), (ErrorKind::GasEstimationFailed, "gas".to_string())]
    );
}

/// Oracle whose successive snapshots take the queued delays
struct StaggeredOracle {
    delays: Mutex<VecDeque<Duration>>,
}

#[async_trait]
impl NetworkOracle for StaggeredOracle {
    async fn snapshot(&self) -> Result<NetworkStatus, GasError> {
        let delay = self.delays.lock().unwrap().pop_front().unwrap_or_default();
        if !delay.is_zero() { tokio::time::sleep(delay).await; }
        Ok(NetworkStatus::default())
    }
}

/// Test: overlapping estimates commit in call order, not completion order
#[tokio::test]
async fn newer_estimate_wins_over_slower_older_one() {
    let oracle = Arc::new(StaggeredOracle {
        delays: Mutex::new(VecDeque::from([Duration::from_millis(50), Duration::ZERO])),
    });
    let hooks = Arc::new(GasHooks::default());
    let estimator = GasEstimator::new(oracle).with_hooks(hooks.clone());

    let (older, newer) = tokio::join!(
        estimator.estimate_gas(TransactionDescriptor::transfer()),
        estimator.estimate_gas(TransactionDescriptor::new(TransactionType::Swap)),
    );
    let older = older.expect("older");
    let newer = newer.expect("newer");
    assert_eq!(older.gas_limit, 21_000);
    assert_ne!(newer.gas_limit, older.gas_limit);
    assert_eq!(estimator.current(), Some(newer.clone()));
    assert_eq!(estimator.status(), EstimationStatus::Ready);
    assert_eq!(*hooks.fees.lock().unwrap(), vec![newer.fee.clone()]);

    // presets recompute from the newer descriptor's base params
    let fast = estimator.set_preset(GasPreset::Fast).expect("fast");
    assert_eq!(fast.gas_limit, newer.gas_limit);
}
