use std::sync::Arc;
use std::time::Duration;

use crate::config::loader::SimulatorSettings;
use crate::config::presets::MarketplaceParams;
use crate::consensus::randomness::RandomnessSource;
use crate::errors::SuretyError;
use crate::ledger::events::EventKind;
use crate::ledger::interface::LedgerInterface;
use crate::ledger::local::LocalLedger;
use crate::ledger::operations::Operation;
use crate::oracles::simulator::{oracle_identity, OracleSimulator, StatusPolicy};
use crate::types::{Address, FlightStatus, RequestKey};

struct ZeroRandomness;

impl RandomnessSource for ZeroRandomness {
    fn next_below(&mut self, _bound: u32) -> u32 {
        0
    }
}

fn airline() -> Address {
    Address::derived(0xa1, 1)
}

fn settings(oracle_count: usize, fixed_status: Option<u8>) -> SimulatorSettings {
    SimulatorSettings {
        oracle_count,
        seed: 7,
        fixed_status,
        poll_interval_ms: 5,
    }
}

/// Every oracle holds [0, 1, 2] and every request dispatches index 0.
fn ledger() -> Arc<LocalLedger> {
    let _ = env_logger::builder().is_test(true).try_init();
    Arc::new(LocalLedger::new(
        Address::ZERO,
        airline(),
        &MarketplaceParams::devnet(),
        Box::new(ZeroRandomness),
    ))
}

fn key() -> RequestKey {
    RequestKey::new(airline(), "SV 1265", 1_700_000_000)
}

fn request(ledger: &LocalLedger) {
    ledger
        .submit(
            Operation::RequestStatus {
                airline: airline(),
                flight: key().flight,
                timestamp: key().timestamp,
            },
            Address::derived(0xb0, 1),
            0,
        )
        .unwrap();
}

#[test]
fn test_policy_from_settings() {
    assert_eq!(
        StatusPolicy::from_settings(&settings(1, None)).unwrap(),
        StatusPolicy::Random
    );
    assert_eq!(
        StatusPolicy::from_settings(&settings(1, Some(20))).unwrap(),
        StatusPolicy::Fixed(FlightStatus::LateAirline)
    );
    assert!(matches!(
        StatusPolicy::from_settings(&settings(1, Some(0))),
        Err(SuretyError::ConfigError(_))
    ));
    assert!(matches!(
        StatusPolicy::from_settings(&settings(1, Some(21))),
        Err(SuretyError::InvalidArgument(_))
    ));
}

#[test]
fn test_register_assigns_identities() {
    let ledger = ledger();
    let simulator = OracleSimulator::register(Arc::clone(&ledger), &settings(4, Some(10)), 1).unwrap();
    assert_eq!(simulator.oracles().len(), 4);
    assert_eq!(simulator.oracles()[3], (oracle_identity(3), [0, 1, 2]));
    assert_eq!(ledger.health().oracles, 4);

    // the fee is checked by the registry
    let underpaid = OracleSimulator::register(Arc::clone(&ledger), &settings(5, Some(10)), 0);
    assert!(matches!(underpaid, Err(SuretyError::InsufficientFunds { .. })));
}

#[tokio::test]
async fn test_workers_finalize_requested_status() {
    let ledger = ledger();
    let simulator =
        OracleSimulator::register(Arc::clone(&ledger), &settings(6, Some(20)), 1).unwrap();
    request(&ledger);

    let handle = simulator.spawn();
    assert_eq!(handle.worker_count(), 6);
    let status = simulator
        .await_finalized(&key(), Duration::from_secs(5))
        .await
        .unwrap();
    let reports = handle.shutdown().await;

    assert_eq!(status, Some(FlightStatus::LateAirline));
    assert_eq!(reports.len(), 6);
    assert!(reports.iter().all(|r| r.failed == 0));
    assert!(reports.iter().map(|r| r.submitted).sum::<usize>() >= 3);
    assert_eq!(
        ledger
            .subscribe(Some(EventKind::StatusFinalized), 0)
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn test_restarted_workers_replay_without_refinalizing() {
    let ledger = ledger();
    let simulator =
        OracleSimulator::register(Arc::clone(&ledger), &settings(4, Some(30)), 1).unwrap();
    request(&ledger);

    let first = simulator.spawn();
    simulator
        .await_finalized(&key(), Duration::from_secs(5))
        .await
        .unwrap();
    first.shutdown().await;
    let root = ledger.state_root().unwrap();

    // fresh subscriptions start from genesis and see the request again
    let second = simulator.spawn();
    tokio::time::sleep(Duration::from_millis(100)).await;
    let reports = second.shutdown().await;

    assert!(reports.iter().all(|r| r.failed == 0));
    assert!(reports.iter().all(|r| r.requests_seen == 1));
    assert_eq!(ledger.state_root().unwrap(), root);
    assert_eq!(
        ledger
            .subscribe(Some(EventKind::StatusFinalized), 0)
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn test_shutdown_without_requests() {
    let ledger = ledger();
    let simulator = OracleSimulator::register(Arc::clone(&ledger), &settings(3, None), 1).unwrap();
    let handle = simulator.spawn();
    let reports = handle.shutdown().await;
    assert_eq!(reports.len(), 3);
    assert!(reports.iter().all(|r| r.requests_seen == 0 && r.submitted == 0));
}
