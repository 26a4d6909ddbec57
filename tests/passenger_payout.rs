mod common;

use common::*;
use flightsurety_core::ledger::{EventKind, LedgerInterface, Query, QueryResult};
use flightsurety_core::{FlightStatus, SuretyError};

const PREMIUM: u128 = 400;

#[test]
fn test_late_airline_pays_insured_passenger() {
    // every oracle holds [5, 6, 7] and requests dispatch index 5
    let ledger = devnet_ledger(5);
    fund(&ledger, 1);
    let key = register_flight(&ledger);
    register_oracles(&ledger, 6);

    ledger.submit(purchase(&key), passenger(1), PREMIUM).unwrap();
    ledger.submit(request_status(&key), passenger(1), 0).unwrap();

    let late = FlightStatus::LateAirline.code();
    for n in 0..3 {
        ledger.submit(submit_response(&key, 5, late), oracle(n), 0).unwrap();
    }
    // stragglers after finalization change nothing
    for n in 3..6 {
        ledger
            .submit(submit_response(&key, 5, FlightStatus::OnTime.code()), oracle(n), 0)
            .unwrap();
    }

    let finalized = ledger.subscribe(Some(EventKind::StatusFinalized), 0).unwrap();
    assert_eq!(finalized.len(), 1);
    assert_eq!(
        ledger
            .call(&Query::CanonicalStatus {
                airline: key.airline,
                flight: key.flight.clone(),
                timestamp: key.timestamp,
            })
            .unwrap(),
        QueryResult::Status(Some(FlightStatus::LateAirline))
    );

    assert_eq!(payout(&ledger, 1, &key), PREMIUM * 3 / 2);
    let vault_before = ledger.health().vault_balance;

    ledger.submit(withdraw(&key), passenger(1), 0).unwrap();
    assert_eq!(payout(&ledger, 1, &key), 0);
    assert_eq!(ledger.health().vault_balance, vault_before - 600);
    assert_eq!(
        ledger
            .call(&Query::WithdrawnBalance {
                passenger: passenger(1)
            })
            .unwrap()
            .as_amount(),
        Some(600)
    );

    let repeat = ledger.submit(withdraw(&key), passenger(1), 0);
    assert!(matches!(repeat, Err(SuretyError::InsufficientFunds { .. })));
}

#[test]
fn test_weather_delay_pays_nothing() {
    let ledger = devnet_ledger(0);
    fund(&ledger, 1);
    let key = register_flight(&ledger);
    register_oracles(&ledger, 3);
    ledger.submit(purchase(&key), passenger(1), PREMIUM).unwrap();
    ledger.submit(request_status(&key), passenger(1), 0).unwrap();

    for n in 0..3 {
        ledger
            .submit(submit_response(&key, 0, FlightStatus::LateWeather.code()), oracle(n), 0)
            .unwrap();
    }
    assert_eq!(payout(&ledger, 1, &key), 0);
    assert!(ledger
        .subscribe(Some(EventKind::PayoutCredited), 0)
        .unwrap()
        .is_empty());
    assert!(matches!(
        ledger.submit(withdraw(&key), passenger(1), 0),
        Err(SuretyError::InsufficientFunds { .. })
    ));
}

#[test]
fn test_purchase_cap_is_cumulative() {
    let ledger = devnet_ledger(0);
    fund(&ledger, 1);
    let key = register_flight(&ledger);

    ledger.submit(purchase(&key), passenger(1), 600).unwrap();
    ledger.submit(purchase(&key), passenger(1), 400).unwrap();
    let over = ledger.submit(purchase(&key), passenger(1), 1);
    assert!(matches!(over, Err(SuretyError::PurchaseCapExceeded { .. })));

    // other passengers have their own cap
    ledger.submit(purchase(&key), passenger(2), 1_000).unwrap();
    assert_eq!(ledger.health().policies, 2);
}

#[test]
fn test_unregistered_flight_cannot_be_insured() {
    let ledger = devnet_ledger(0);
    fund(&ledger, 1);
    let key = flight_key();
    let result = ledger.submit(purchase(&key), passenger(1), 10);
    assert!(matches!(result, Err(SuretyError::NotFound(_))));
}

#[test]
fn test_replay_after_withdrawal_does_not_recredit() {
    let ledger = devnet_ledger(0);
    fund(&ledger, 1);
    let key = register_flight(&ledger);
    register_oracles(&ledger, 3);
    ledger.submit(purchase(&key), passenger(1), PREMIUM).unwrap();
    ledger.submit(request_status(&key), passenger(1), 0).unwrap();
    for n in 0..3 {
        ledger
            .submit(submit_response(&key, 0, FlightStatus::LateAirline.code()), oracle(n), 0)
            .unwrap();
    }
    ledger.submit(withdraw(&key), passenger(1), 0).unwrap();

    ledger.replay_finalized(owner(), 0).unwrap();
    assert_eq!(payout(&ledger, 1, &key), 0);
    assert!(matches!(
        ledger.submit(withdraw(&key), passenger(1), 0),
        Err(SuretyError::InsufficientFunds { .. })
    ));
}

#[test]
fn test_flight_registered_after_late_status_cannot_be_insured() {
    let ledger = devnet_ledger(0);
    fund(&ledger, 1);
    register_oracles(&ledger, 3);

    // the status is requested and settled before the airline lists the flight
    let key = flight_key();
    ledger.submit(request_status(&key), passenger(1), 0).unwrap();
    for n in 0..3 {
        ledger
            .submit(submit_response(&key, 0, FlightStatus::LateAirline.code()), oracle(n), 0)
            .unwrap();
    }
    assert_eq!(register_flight(&ledger), key);

    let bought = ledger.submit(purchase(&key), passenger(1), 1_000);
    assert!(matches!(bought, Err(SuretyError::FlightClosed(_))));

    ledger.replay_finalized(owner(), 0).unwrap();
    let policy = ledger
        .call(&Query::Policy {
            passenger: passenger(1),
            airline: key.airline,
            flight: key.flight.clone(),
            timestamp: key.timestamp,
        })
        .unwrap();
    assert_eq!(policy, QueryResult::Policy(None));
    assert!(matches!(
        ledger.submit(withdraw(&key), passenger(1), 0),
        Err(SuretyError::NotFound(_))
    ));
}
