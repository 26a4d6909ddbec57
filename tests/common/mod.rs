#![allow(dead_code)]

use flightsurety_core::ledger::{LedgerInterface, LocalLedger, Operation, OperationOutcome, Query, QueryResult};
use flightsurety_core::{Address, MarketplaceParams, RandomnessSource, RequestKey};

pub const DEPARTURE: u64 = 1_700_000_000;
pub const FLIGHT: &str = "SV 1265";

/// Draws a fixed value, so every oracle holds `[v, v+1, v+2]` and every
/// request dispatches index `v`.
pub struct FixedDraw(pub u32);

impl RandomnessSource for FixedDraw {
    fn next_below(&mut self, bound: u32) -> u32 {
        self.0 % bound
    }
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn owner() -> Address {
    Address::derived(0x00, 1)
}

pub fn airline(n: u64) -> Address {
    Address::derived(0xa1, n)
}

pub fn oracle(n: u64) -> Address {
    Address::derived(0x0c, n)
}

pub fn passenger(n: u64) -> Address {
    Address::derived(0xb0, n)
}

pub fn flight_key() -> RequestKey {
    RequestKey::new(airline(1), FLIGHT, DEPARTURE)
}

/// Devnet ledger with airline 1 as the deployment-time airline.
pub fn devnet_ledger(draw: u32) -> LocalLedger {
    init_logger();
    LocalLedger::new(
        owner(),
        airline(1),
        &MarketplaceParams::devnet(),
        Box::new(FixedDraw(draw)),
    )
}

/// Funds well above the devnet threshold so the vault can cover payouts.
pub fn fund(ledger: &LocalLedger, n: u64) {
    ledger
        .submit(Operation::FundAirline { airline: airline(n) }, airline(n), 10_000)
        .unwrap();
}

pub fn register_flight(ledger: &LocalLedger) -> RequestKey {
    let receipt = ledger
        .submit(
            Operation::RegisterFlight {
                flight: FLIGHT.to_string(),
                timestamp: DEPARTURE,
            },
            airline(1),
            0,
        )
        .unwrap();
    match receipt.outcome {
        OperationOutcome::FlightRegistered { key } => key,
        other => panic!("unexpected outcome {:?}", other),
    }
}

pub fn register_oracles(ledger: &LocalLedger, count: u64) {
    for n in 0..count {
        ledger.submit(Operation::RegisterOracle, oracle(n), 1).unwrap();
    }
}

pub fn request_status(key: &RequestKey) -> Operation {
    Operation::RequestStatus {
        airline: key.airline,
        flight: key.flight.clone(),
        timestamp: key.timestamp,
    }
}

pub fn submit_response(key: &RequestKey, index: u8, status: u8) -> Operation {
    Operation::SubmitResponse {
        index,
        airline: key.airline,
        flight: key.flight.clone(),
        timestamp: key.timestamp,
        status,
    }
}

pub fn purchase(key: &RequestKey) -> Operation {
    Operation::PurchaseInsurance {
        airline: key.airline,
        flight: key.flight.clone(),
        timestamp: key.timestamp,
    }
}

pub fn withdraw(key: &RequestKey) -> Operation {
    Operation::WithdrawPayout {
        airline: key.airline,
        flight: key.flight.clone(),
        timestamp: key.timestamp,
    }
}

pub fn payout(ledger: &LocalLedger, n: u64, key: &RequestKey) -> u128 {
    let query = Query::Policy {
        passenger: passenger(n),
        airline: key.airline,
        flight: key.flight.clone(),
        timestamp: key.timestamp,
    };
    match ledger.call(&query).unwrap() {
        QueryResult::Policy(Some(policy)) => policy.payout,
        other => panic!("unexpected result {:?}", other),
    }
}
