use serde_json::json;

use super::airline;
use crate::errors::SuretyError;
use crate::ledger::operations::{Operation, Query};

#[test]
fn test_named_operation_decodes() {
    let candidate = airline(2);
    let op = Operation::from_named(
        "register_airline",
        json!({ "candidate": candidate.to_string() }),
    )
    .unwrap();
    assert_eq!(op, Operation::RegisterAirline { candidate });
    assert_eq!(op.name(), "register_airline");
}

#[test]
fn test_argumentless_operation_decodes_from_null() {
    let op = Operation::from_named("register_oracle", serde_json::Value::Null).unwrap();
    assert_eq!(op, Operation::RegisterOracle);
    assert!(op.is_payable());
}

#[test]
fn test_submit_response_carries_raw_status_code() {
    let op = Operation::from_named(
        "submit_response",
        json!({
            "index": 4,
            "airline": airline(1).to_string(),
            "flight": "SV 1265",
            "timestamp": 1_700_000_000u64,
            "status": 20,
        }),
    )
    .unwrap();
    assert!(matches!(op, Operation::SubmitResponse { index: 4, status: 20, .. }));
    assert!(!op.is_payable());
}

#[test]
fn test_unknown_or_malformed_operations_are_rejected() {
    let unknown = Operation::from_named("self_destruct", serde_json::Value::Null);
    assert!(matches!(unknown, Err(SuretyError::InvalidArgument(_))));

    let bad_address = Operation::from_named("fund_airline", json!({ "airline": "0x1234" }));
    assert!(matches!(bad_address, Err(SuretyError::InvalidArgument(_))));
}

#[test]
fn test_operation_wire_shape() {
    let op = Operation::SetOperational { operational: false };
    let encoded = serde_json::to_value(&op).unwrap();
    assert_eq!(
        encoded,
        json!({ "op": "set_operational", "args": { "operational": false } })
    );
}

#[test]
fn test_named_query_decodes() {
    let query = Query::from_named("health", serde_json::Value::Null).unwrap();
    assert_eq!(query, Query::Health);

    let query = Query::from_named(
        "registration_info",
        json!({ "airline": airline(5).to_string() }),
    )
    .unwrap();
    assert_eq!(query, Query::RegistrationInfo { airline: airline(5) });
}
